//! Attaches elapsed epoch seconds to raw trackpoints.

use tracing::debug;

use crate::error::{Result, TraceError};
use crate::sample::{RawSample, Sample};

/// Epoch seconds of every sample, in input order. Empty input gives empty output.
pub fn normalize(raw: &[RawSample]) -> Vec<Sample> {
    let samples: Vec<Sample> = raw
        .iter()
        .map(|point| Sample::from_raw(point, epoch_seconds(point)))
        .collect();

    debug!(samples = samples.len(), "normalized trackpoint times");
    samples
}

/// Same as [`normalize`], for callers that cannot work with an empty trace.
pub fn normalize_non_empty(raw: &[RawSample]) -> Result<Vec<Sample>> {
    if raw.is_empty() {
        return Err(TraceError::EmptyTrace);
    }
    Ok(normalize(raw))
}

fn epoch_seconds(point: &RawSample) -> f64 {
    point.time.timestamp_millis() as f64 / 1000.0
}
