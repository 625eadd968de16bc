//! Trackpoint records flowing through the pipeline.
//!
//! Raw samples come straight from the trace file. Every later stage builds
//! new `Sample` values from its input rather than editing them, so a sequence
//! handed to one stage is never changed underneath another.

use chrono::{DateTime, TimeZone, Utc};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Coordinate { latitude, longitude }
    }
}

/// A trackpoint exactly as read from the trace file.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSample {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
    pub time: DateTime<Utc>,
}

/// Per-point motion relative to the previous point of the same sequence.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Kinematics {
    pub speed: f64,
    pub distance_from_prev: f64,
    pub elevation_delta: f64,
    pub elevation_rate: f64,
    pub bearing: f64,
    pub bearing_delta: f64,
    pub bearing_rate: f64,
}

/// Where a sample came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleOrigin {
    Raw,
    /// Synthetic point averaged over `window_len` raw samples.
    Averaged { window_len: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
    pub time: DateTime<Utc>,
    pub elapsed_seconds: f64,
    /// `None` for the first sample of a sequence, or before kinematics ran.
    pub kinematics: Option<Kinematics>,
    pub origin: SampleOrigin,
}

impl Sample {
    pub fn from_raw(raw: &RawSample, elapsed_seconds: f64) -> Self {
        Sample {
            latitude: raw.latitude,
            longitude: raw.longitude,
            elevation: raw.elevation,
            time: raw.time,
            elapsed_seconds,
            kinematics: None,
            origin: SampleOrigin::Raw,
        }
    }

    /// Builds a synthetic sample whose absolute time is derived from `elapsed_seconds`.
    pub fn averaged(
        coordinate: Coordinate,
        elevation: f64,
        elapsed_seconds: f64,
        window_len: usize,
    ) -> Self {
        Sample {
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
            elevation,
            time: time_from_elapsed(elapsed_seconds),
            elapsed_seconds,
            kinematics: None,
            origin: SampleOrigin::Averaged { window_len },
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    pub fn with_kinematics(&self, kinematics: Kinematics) -> Self {
        Sample {
            kinematics: Some(kinematics),
            ..self.clone()
        }
    }

    pub fn speed(&self) -> Option<f64> {
        self.kinematics.map(|k| k.speed)
    }

    pub fn bearing(&self) -> Option<f64> {
        self.kinematics.map(|k| k.bearing)
    }

    pub fn is_averaged(&self) -> bool {
        matches!(self.origin, SampleOrigin::Averaged { .. })
    }
}

/// Converts epoch seconds back to an absolute UTC time, at millisecond precision.
///
/// Averages of parsed times always lie within chrono's range. A value outside
/// it (only reachable through hand-built samples) maps to the Unix epoch.
pub fn time_from_elapsed(elapsed_seconds: f64) -> DateTime<Utc> {
    let millis = (elapsed_seconds * 1000.0).round() as i64;
    match Utc.timestamp_millis_opt(millis).single() {
        Some(time) => time,
        None => {
            warn!(elapsed_seconds, "elapsed time out of range, using the epoch");
            DateTime::<Utc>::default()
        }
    }
}
