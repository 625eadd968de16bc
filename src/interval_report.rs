//! CSV rendering of moving intervals.

use std::path::Path;

use csv::Writer;
use serde::Serialize;

use crate::error::{Result, TraceError};
use crate::interval_segmenter::MovingInterval;

#[derive(Debug, Serialize)]
struct IntervalRow {
    index: usize,
    start_time: String,
    end_time: String,
    duration_s: f64,
    distance_m: f64,
    start_elevation_m: f64,
    end_elevation_m: f64,
    min_elevation_m: f64,
    max_elevation_m: f64,
    is_climb: bool,
    bounding_bearing_deg: Option<f64>,
    net_bearing_deg: Option<f64>,
}

impl IntervalRow {
    fn new(index: usize, interval: &MovingInterval) -> Self {
        IntervalRow {
            index,
            start_time: interval.start_sample.time.to_rfc3339(),
            end_time: interval.end_sample.time.to_rfc3339(),
            duration_s: round_to(interval.duration, 1),
            distance_m: round_to(interval.distance, 1),
            start_elevation_m: round_to(interval.start_sample.elevation, 1),
            end_elevation_m: round_to(interval.end_sample.elevation, 1),
            min_elevation_m: round_to(interval.min_elevation_sample.elevation, 1),
            max_elevation_m: round_to(interval.max_elevation_sample.elevation, 1),
            is_climb: interval.is_climb,
            bounding_bearing_deg: interval.bounding_bearing.map(|b| round_to(b, 1)),
            net_bearing_deg: interval.net_bearing.map(|b| round_to(b, 1)),
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Renders one CSV row per interval. `destination` is only used in errors.
pub fn render_interval_csv(intervals: &[MovingInterval], destination: &Path) -> Result<Vec<u8>> {
    let export_failure = |message: String| TraceError::ExportFailure {
        path: destination.to_path_buf(),
        message,
    };

    let mut wtr = Writer::from_writer(Vec::new());
    for (index, interval) in intervals.iter().enumerate() {
        wtr.serialize(IntervalRow::new(index, interval))
            .map_err(|e| export_failure(e.to_string()))?;
    }
    wtr.into_inner().map_err(|e| export_failure(e.to_string()))
}
