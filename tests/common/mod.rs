//! Shared builders for synthetic traces.
#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use gpx_segmenter::kinematics::derive_kinematics;
use gpx_segmenter::time_normalizer::normalize;
use gpx_segmenter::{RawSample, Sample};

/// Epoch seconds of the first sample of every synthetic trace.
pub const T0: i64 = 1_700_000_000;

/// Length of one degree of latitude on the haversine sphere, metres.
pub const METRES_PER_DEGREE: f64 = 111_195.08;

pub const BASE_LAT: f64 = 46.0;
pub const BASE_LON: f64 = 7.0;

pub fn raw(latitude: f64, longitude: f64, elevation: f64, secs: f64) -> RawSample {
    let millis = T0 * 1000 + (secs * 1000.0).round() as i64;
    RawSample {
        latitude,
        longitude,
        elevation,
        time: Utc.timestamp_millis_opt(millis).unwrap(),
    }
}

/// A raw sample `north_m` metres north of the base point.
pub fn raw_north(north_m: f64, elevation: f64, secs: f64) -> RawSample {
    raw(BASE_LAT + north_m / METRES_PER_DEGREE, BASE_LON, elevation, secs)
}

/// Normalized samples with kinematics.
pub fn enriched(points: &[RawSample]) -> Vec<Sample> {
    derive_kinematics(&normalize(points))
}

/// Samples at the given elapsed offsets from `T0`, all at the base point.
pub fn at_times(offsets: &[f64]) -> Vec<Sample> {
    let points: Vec<RawSample> = offsets
        .iter()
        .map(|&secs| raw(BASE_LAT, BASE_LON, 100.0, secs))
        .collect();
    normalize(&points)
}

/// 100 samples at 1 Hz: parked for 0-29, moving north at 2 m/s through 69,
/// parked again for 70-99. Sample 30 still sits at the start position.
pub fn stop_go_stop_trace() -> Vec<RawSample> {
    (0..100)
        .map(|i| {
            let moved_steps = (i.min(69) - 30).max(0) as f64;
            raw_north(moved_steps * 2.0, 250.0, i as f64)
        })
        .collect()
}

pub fn elapsed_offsets(samples: &[Sample]) -> Vec<f64> {
    samples
        .iter()
        .map(|s| s.elapsed_seconds - T0 as f64)
        .collect()
}
