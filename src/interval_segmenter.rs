//! Splits a filtered trace into moving intervals and labels the climbs.
//!
//! Intervals are bounded by time gaps of at least `leap_secs` between
//! consecutive samples, the kind left behind by signal loss or by the noise
//! filter removing a stationary stretch.

use tracing::debug;

use crate::config::Thresholds;
use crate::geometry::{angle_diff, bearing_between, geodesic_distance};
use crate::sample::Sample;

#[derive(Debug, Clone, PartialEq)]
pub struct MovingInterval {
    /// Elapsed seconds of the first sample.
    pub start_time: f64,
    /// Elapsed seconds of the last sample.
    pub end_time: f64,
    pub duration: f64,
    /// Straight-line distance from first to last sample, metres.
    pub distance: f64,
    pub start_sample: Sample,
    pub end_sample: Sample,
    pub min_elevation_sample: Sample,
    pub max_elevation_sample: Sample,
    pub is_climb: bool,
    /// Bearing from the lowest to the highest sample.
    pub bounding_bearing: Option<f64>,
    /// Bearing from the first to the last sample.
    pub net_bearing: Option<f64>,
}

impl MovingInterval {
    pub fn contains(&self, elapsed_seconds: f64) -> bool {
        self.start_time <= elapsed_seconds && elapsed_seconds <= self.end_time
    }

    pub fn elevation_gain(&self) -> f64 {
        self.end_sample.elevation - self.start_sample.elevation
    }
}

/// Which intervals a consumer is interested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalClass {
    Any,
    Climb,
}

impl IntervalClass {
    pub fn matches(&self, interval: &MovingInterval) -> bool {
        match self {
            IntervalClass::Any => true,
            IntervalClass::Climb => interval.is_climb,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IntervalSegmenter {
    leap_secs: f64,
    min_duration_secs: f64,
    drop_duration_secs: f64,
    min_detectable_distance: f64,
    min_climb_elevation: f64,
    min_climb_distance: f64,
    require_bearing_consistency: bool,
    max_bearing_disagreement: f64,
}

/// Candidate interval being accumulated during the walk.
struct Candidate<'a> {
    start: &'a Sample,
    last: &'a Sample,
    lowest: &'a Sample,
    highest: &'a Sample,
}

impl<'a> Candidate<'a> {
    fn starting_at(sample: &'a Sample) -> Self {
        Candidate {
            start: sample,
            last: sample,
            lowest: sample,
            highest: sample,
        }
    }

    fn extend(&mut self, sample: &'a Sample) {
        if sample.elevation < self.lowest.elevation {
            self.lowest = sample;
        }
        if sample.elevation > self.highest.elevation {
            self.highest = sample;
        }
        self.last = sample;
    }
}

impl IntervalSegmenter {
    pub fn new(thresholds: &Thresholds) -> Self {
        IntervalSegmenter {
            leap_secs: thresholds.leap_secs,
            min_duration_secs: thresholds.min_duration_secs,
            drop_duration_secs: thresholds.drop_duration_secs,
            min_detectable_distance: thresholds.min_detectable_distance,
            min_climb_elevation: thresholds.min_climb_elevation,
            min_climb_distance: thresholds.min_climb_distance,
            require_bearing_consistency: thresholds.require_bearing_consistency,
            max_bearing_disagreement: thresholds.max_bearing_disagreement,
        }
    }

    pub fn segment(&self, samples: &[Sample]) -> Vec<MovingInterval> {
        let mut intervals = Vec::new();
        let Some(first) = samples.first() else {
            return intervals;
        };

        let mut candidate = Candidate::starting_at(first);
        let mut rejected = 0usize;

        for sample in &samples[1..] {
            if sample.elapsed_seconds - candidate.last.elapsed_seconds >= self.leap_secs {
                match self.finalize(&candidate) {
                    Some(interval) => intervals.push(interval),
                    None => rejected += 1,
                }
                candidate = Candidate::starting_at(sample);
            } else {
                candidate.extend(sample);
            }
        }
        match self.finalize(&candidate) {
            Some(interval) => intervals.push(interval),
            None => rejected += 1,
        }

        debug!(
            kept = intervals.len(),
            rejected,
            climbs = intervals.iter().filter(|i| i.is_climb).count(),
            "segmented moving intervals"
        );
        intervals
    }

    fn finalize(&self, candidate: &Candidate<'_>) -> Option<MovingInterval> {
        let start = candidate.start;
        let end = candidate.last;
        let duration = end.elapsed_seconds - start.elapsed_seconds;
        let distance = geodesic_distance(start.coordinate(), end.coordinate());

        if !self.is_valid(duration, distance) {
            return None;
        }

        let mut interval = MovingInterval {
            start_time: start.elapsed_seconds,
            end_time: end.elapsed_seconds,
            duration,
            distance,
            start_sample: start.clone(),
            end_sample: end.clone(),
            min_elevation_sample: candidate.lowest.clone(),
            max_elevation_sample: candidate.highest.clone(),
            is_climb: false,
            bounding_bearing: None,
            net_bearing: None,
        };
        self.classify(&mut interval);
        Some(interval)
    }

    fn is_valid(&self, duration: f64, distance: f64) -> bool {
        let near_stationary_blip =
            duration < self.drop_duration_secs && distance < self.min_detectable_distance;
        duration > self.min_duration_secs && !near_stationary_blip
    }

    fn classify(&self, interval: &mut MovingInterval) {
        let gains_enough = interval.elevation_gain() > self.min_climb_elevation
            && interval.distance > self.min_climb_distance;

        if !self.require_bearing_consistency {
            interval.is_climb = gains_enough;
            return;
        }

        // Elevation noise on a zig-zag course shows up as extrema that line up
        // with some other direction than the overall heading.
        let bounding = bearing_between(
            interval.min_elevation_sample.coordinate(),
            interval.max_elevation_sample.coordinate(),
        );
        let net = bearing_between(
            interval.start_sample.coordinate(),
            interval.end_sample.coordinate(),
        );
        interval.bounding_bearing = Some(bounding);
        interval.net_bearing = Some(net);
        interval.is_climb = gains_enough && angle_diff(bounding, net) <= self.max_bearing_disagreement;
    }
}
