//! Removal of GPS jitter and stationary periods.

use tracing::debug;

use crate::config::{FilterPolicy, Thresholds};
use crate::sample::Sample;

#[derive(Debug, Clone)]
pub struct NoiseFilter {
    policy: FilterPolicy,
    min_speed: f64,
    max_speed: f64,
    max_acceptable_step: Option<f64>,
    max_run_gap_secs: f64,
    min_run_length: usize,
}

/// Tracks the run of accepted samples currently at the tail of the output.
#[derive(Debug, Default)]
struct Run {
    start: usize,
    len: usize,
    last_elapsed: f64,
}

impl NoiseFilter {
    pub fn new(thresholds: &Thresholds) -> Self {
        NoiseFilter {
            policy: thresholds.filter_policy,
            min_speed: thresholds.min_speed,
            max_speed: thresholds.max_speed,
            max_acceptable_step: thresholds.max_acceptable_step,
            max_run_gap_secs: thresholds.max_run_gap_secs,
            min_run_length: thresholds.min_run_length,
        }
    }

    pub fn with_policy(mut self, policy: FilterPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// True when the sample has kinematics strictly inside the speed bounds and,
    /// if configured, a step shorter than the step limit.
    pub fn within_bounds(&self, sample: &Sample) -> bool {
        let Some(kinematics) = sample.kinematics else {
            return false;
        };
        let speed_ok = self.min_speed < kinematics.speed && kinematics.speed < self.max_speed;
        let step_ok = self
            .max_acceptable_step
            .map_or(true, |limit| kinematics.distance_from_prev < limit);
        speed_ok && step_ok
    }

    pub fn filter(&self, samples: &[Sample]) -> Vec<Sample> {
        let kept = match self.policy {
            FilterPolicy::Bounds => samples
                .iter()
                .filter(|s| self.within_bounds(s))
                .cloned()
                .collect(),
            FilterPolicy::Burst => self.filter_bursts(samples),
        };

        debug!(
            policy = ?self.policy,
            input = samples.len(),
            kept = kept.len(),
            "noise filter applied"
        );
        kept
    }

    fn filter_bursts(&self, samples: &[Sample]) -> Vec<Sample> {
        let mut kept: Vec<Sample> = Vec::with_capacity(samples.len());
        let mut run = Run::default();

        for sample in samples {
            if !self.within_bounds(sample) {
                self.close_run(&mut run, &mut kept);
                continue;
            }

            let continues_run =
                run.len > 0 && sample.elapsed_seconds - run.last_elapsed <= self.max_run_gap_secs;
            if !continues_run {
                self.close_run(&mut run, &mut kept);
                run.start = kept.len();
            }

            kept.push(sample.clone());
            run.len += 1;
            run.last_elapsed = sample.elapsed_seconds;
        }
        self.close_run(&mut run, &mut kept);

        kept
    }

    /// Ends the current run, retracting it from `kept` if it was too short.
    fn close_run(&self, run: &mut Run, kept: &mut Vec<Sample>) {
        if run.len > 0 && run.len < self.min_run_length {
            kept.truncate(run.start);
        }
        run.len = 0;
    }
}
