//! # GPX Segmenter
//!
//! Smoothing, kinematics and movement segmentation for timestamped GPS traces.
//!
//! A trace runs through these stages, each a pure function of its input:
//! - time normalization to epoch seconds
//! - trailing time-window averaging at two resolutions
//! - per-point speed, elevation rate and bearing
//! - noise and stationary filtering
//! - moving interval detection with climb classification
//! - re-selection of any sequence inside the intervals
//! - hybrid merge of a sparse and a dense sequence
//!
//! ```no_run
//! use std::path::Path;
//! use gpx_segmenter::{read_trace, Pipeline, Thresholds};
//!
//! let points = read_trace(Path::new("ride.gpx"))?;
//! let output = Pipeline::new(Thresholds::default())?.run(&points);
//! for interval in &output.intervals {
//!     println!("{:.0}s moving, climb: {}", interval.duration, interval.is_climb);
//! }
//! # Ok::<(), gpx_segmenter::TraceError>(())
//! ```

pub mod config;
pub mod error;
pub mod geometry;
pub mod gpx_processor;
pub mod hybrid_merger;
pub mod interval_report;
pub mod interval_segmenter;
pub mod kinematics;
pub mod noise_filter;
pub mod pipeline;
pub mod range_reconstitutor;
pub mod sample;
pub mod time_normalizer;
pub mod tolerant_gpx_reader;
pub mod trace_repair;
pub mod window_averager;

pub use config::{FilterPolicy, Thresholds};
pub use error::{Result, TraceError};
pub use interval_segmenter::{IntervalClass, IntervalSegmenter, MovingInterval};
pub use noise_filter::NoiseFilter;
pub use pipeline::{Pipeline, PipelineOutput, PipelineSummary};
pub use sample::{Coordinate, Kinematics, RawSample, Sample, SampleOrigin};
pub use tolerant_gpx_reader::{parse_trace, read_trace};
pub use window_averager::WindowAverager;
