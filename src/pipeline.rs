//! Composition of the stages into the canonical run over one trace.
//!
//! raw → normalize → {rough, fine} window averages → kinematics → noise filter
//! → intervals (from the filtered rough track) → raw samples inside intervals
//! and inside climbs → climbs merged with the fine track inside intervals.

use tracing::info;

use crate::config::Thresholds;
use crate::error::Result;
use crate::hybrid_merger::merge;
use crate::interval_segmenter::{IntervalClass, IntervalSegmenter, MovingInterval};
use crate::kinematics::derive_kinematics;
use crate::noise_filter::NoiseFilter;
use crate::range_reconstitutor::reconstitute;
use crate::sample::{RawSample, Sample};
use crate::time_normalizer::normalize;
use crate::window_averager::WindowAverager;

#[derive(Debug, Clone)]
pub struct Pipeline {
    thresholds: Thresholds,
    rough: WindowAverager,
    fine: WindowAverager,
    filter: NoiseFilter,
    segmenter: IntervalSegmenter,
}

/// Every named intermediate sequence of one run.
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    pub raw: Vec<Sample>,
    pub rough_average: Vec<Sample>,
    pub fine_average: Vec<Sample>,
    pub rough_moving: Vec<Sample>,
    pub fine_moving: Vec<Sample>,
    pub intervals: Vec<MovingInterval>,
    pub moving: Vec<Sample>,
    pub climbs: Vec<Sample>,
    pub hybrid: Vec<Sample>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineSummary {
    pub raw_points: usize,
    pub moving_points: usize,
    pub interval_count: usize,
    pub climb_count: usize,
    pub moving_seconds: f64,
    /// Sum of interval start to end distances, metres.
    pub moving_distance: f64,
    pub climbing_seconds: f64,
}

impl Pipeline {
    pub fn new(thresholds: Thresholds) -> Result<Self> {
        thresholds.validate()?;
        Ok(Pipeline {
            rough: WindowAverager::new(thresholds.rough_window_secs),
            fine: WindowAverager::new(thresholds.fine_window_secs),
            filter: NoiseFilter::new(&thresholds),
            segmenter: IntervalSegmenter::new(&thresholds),
            thresholds,
        })
    }

    pub fn run(&self, points: &[RawSample]) -> PipelineOutput {
        let raw = normalize(points);

        // The two passes read only the raw sequence.
        let (rough_average, fine_average) =
            rayon::join(|| self.rough.average(&raw), || self.fine.average(&raw));

        let raw = derive_kinematics(&raw);
        let rough_average = derive_kinematics(&rough_average);
        let fine_average = derive_kinematics(&fine_average);

        let rough_moving = self.filter.filter(&rough_average);
        let fine_moving = self.filter.filter(&fine_average);

        let intervals = self.segmenter.segment(&rough_moving);

        let moving = reconstitute(&raw, &intervals, IntervalClass::Any);
        let climbs = reconstitute(&raw, &intervals, IntervalClass::Climb);
        let fine_in_motion = reconstitute(&fine_average, &intervals, IntervalClass::Any);
        let hybrid = merge(&climbs, &fine_in_motion, self.thresholds.leap_secs);

        let output = PipelineOutput {
            raw,
            rough_average,
            fine_average,
            rough_moving,
            fine_moving,
            intervals,
            moving,
            climbs,
            hybrid,
        };

        let summary = output.summary();
        info!(
            raw = summary.raw_points,
            moving = summary.moving_points,
            intervals = summary.interval_count,
            climbs = summary.climb_count,
            moving_secs = summary.moving_seconds,
            moving_m = summary.moving_distance,
            "pipeline complete"
        );
        output
    }
}

impl PipelineOutput {
    /// Sequences worth exporting, keyed by the suffix of their output file.
    pub fn named_sequences(&self) -> [(&'static str, &[Sample]); 7] {
        [
            ("avg1", self.rough_average.as_slice()),
            ("avg2", self.fine_average.as_slice()),
            ("mov1", self.rough_moving.as_slice()),
            ("mov2", self.fine_moving.as_slice()),
            ("moving", self.moving.as_slice()),
            ("climb", self.climbs.as_slice()),
            ("hybrid", self.hybrid.as_slice()),
        ]
    }

    pub fn summary(&self) -> PipelineSummary {
        PipelineSummary {
            raw_points: self.raw.len(),
            moving_points: self.moving.len(),
            interval_count: self.intervals.len(),
            climb_count: self.intervals.iter().filter(|i| i.is_climb).count(),
            moving_seconds: self.intervals.iter().map(|i| i.duration).sum(),
            moving_distance: self.intervals.iter().map(|i| i.distance).sum(),
            climbing_seconds: self
                .intervals
                .iter()
                .filter(|i| i.is_climb)
                .map(|i| i.duration)
                .sum(),
        }
    }
}
