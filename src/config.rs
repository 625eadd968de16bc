//! Threshold configuration shared by every pipeline stage.
//!
//! One immutable `Thresholds` value is built up front (defaults, optionally a
//! TOML file, then command-line overrides) and handed to each stage
//! constructor. Stages never read defaults on their own.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TraceError};

/// How the noise filter treats short runs of accepted samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterPolicy {
    /// Per-sample speed and step bounds only.
    Bounds,
    /// Bounds, plus retraction of runs shorter than `min_run_length`.
    Burst,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Trailing window of the light smoothing pass, seconds.
    pub rough_window_secs: f64,
    /// Trailing window of the heavy smoothing pass, seconds.
    pub fine_window_secs: f64,

    /// Exclusive lower speed bound, m/s.
    pub min_speed: f64,
    /// Exclusive upper speed bound, m/s.
    pub max_speed: f64,
    /// Largest accepted distance from the previous sample, metres.
    pub max_acceptable_step: Option<f64>,
    pub filter_policy: FilterPolicy,
    /// Largest gap between accepted samples that still continues a run, seconds.
    pub max_run_gap_secs: f64,
    /// Runs shorter than this many samples are retracted by the burst filter.
    pub min_run_length: usize,

    /// Gap between consecutive samples that splits intervals, seconds.
    pub leap_secs: f64,
    /// Intervals must last strictly longer than this, seconds.
    pub min_duration_secs: f64,
    /// Intervals shorter than this and closer than `min_detectable_distance` are dropped.
    pub drop_duration_secs: f64,
    /// Metres.
    pub min_detectable_distance: f64,

    /// Net gain an interval needs to count as a climb, metres.
    pub min_climb_elevation: f64,
    /// Start to end distance a climb needs, metres.
    pub min_climb_distance: f64,
    pub require_bearing_consistency: bool,
    /// Degrees.
    pub max_bearing_disagreement: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            rough_window_secs: 5.0,
            fine_window_secs: 30.0,
            min_speed: 1.0,
            max_speed: 80.0,
            max_acceptable_step: None,
            filter_policy: FilterPolicy::Burst,
            max_run_gap_secs: 5.0,
            min_run_length: 3,
            leap_secs: 10.0,
            min_duration_secs: 15.0,
            drop_duration_secs: 60.0,
            min_detectable_distance: 20.0,
            min_climb_elevation: 10.0,
            min_climb_distance: 100.0,
            require_bearing_consistency: true,
            max_bearing_disagreement: 90.0,
        }
    }
}

impl Thresholds {
    /// Reads thresholds from a TOML file. Missing keys keep their defaults.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let thresholds: Thresholds = toml::from_str(&content).map_err(|e| {
            TraceError::InvalidConfig(format!("{}: {}", path.display(), e))
        })?;
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> Result<()> {
        let named = [
            ("rough_window_secs", self.rough_window_secs),
            ("fine_window_secs", self.fine_window_secs),
            ("min_speed", self.min_speed),
            ("max_speed", self.max_speed),
            ("max_run_gap_secs", self.max_run_gap_secs),
            ("leap_secs", self.leap_secs),
            ("min_duration_secs", self.min_duration_secs),
            ("drop_duration_secs", self.drop_duration_secs),
            ("min_detectable_distance", self.min_detectable_distance),
            ("min_climb_elevation", self.min_climb_elevation),
            ("min_climb_distance", self.min_climb_distance),
            ("max_bearing_disagreement", self.max_bearing_disagreement),
        ];
        for (name, value) in named {
            if !value.is_finite() {
                return Err(invalid(format!("{} must be finite, got {}", name, value)));
            }
        }

        if self.rough_window_secs < 0.0 || self.fine_window_secs < 0.0 {
            return Err(invalid("window sizes must not be negative".to_string()));
        }
        if self.min_speed >= self.max_speed {
            return Err(invalid(format!(
                "min_speed ({}) must be below max_speed ({})",
                self.min_speed, self.max_speed
            )));
        }
        if let Some(step) = self.max_acceptable_step {
            if !(step.is_finite() && step > 0.0) {
                return Err(invalid(format!("max_acceptable_step must be positive, got {}", step)));
            }
        }
        if self.filter_policy == FilterPolicy::Burst && self.min_run_length == 0 {
            return Err(invalid("min_run_length must be at least 1 for the burst filter".to_string()));
        }
        if self.leap_secs <= 0.0 {
            return Err(invalid(format!("leap_secs must be positive, got {}", self.leap_secs)));
        }
        if !(0.0..=180.0).contains(&self.max_bearing_disagreement) {
            return Err(invalid(format!(
                "max_bearing_disagreement must lie in [0, 180], got {}",
                self.max_bearing_disagreement
            )));
        }
        Ok(())
    }
}

fn invalid(message: String) -> TraceError {
    TraceError::InvalidConfig(message)
}
