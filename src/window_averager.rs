//! Trailing time-window smoothing.
//!
//! Each output point is the spherical midpoint plus mean elevation and mean
//! time of the samples that sit within `window_secs` of the newest one.

use std::collections::VecDeque;

use tracing::debug;

use crate::geometry::midpoint;
use crate::sample::Sample;

#[derive(Debug, Clone, Copy)]
pub struct WindowAverager {
    window_secs: f64,
}

impl WindowAverager {
    pub fn new(window_secs: f64) -> Self {
        WindowAverager { window_secs }
    }

    pub fn average(&self, samples: &[Sample]) -> Vec<Sample> {
        let mut window: VecDeque<&Sample> = VecDeque::new();
        let mut averaged = Vec::with_capacity(samples.len());

        for sample in samples {
            while let Some(front) = window.front() {
                if sample.elapsed_seconds - front.elapsed_seconds <= self.window_secs {
                    break;
                }
                window.pop_front();
                // Odd-length windows are snapshotted mid-eviction.
                if window.len() % 2 == 1 {
                    averaged.extend(average_of(&window));
                }
            }

            window.push_back(sample);
            averaged.extend(average_of(&window));
        }

        debug!(
            window_secs = self.window_secs,
            input = samples.len(),
            output = averaged.len(),
            "window averaging complete"
        );
        averaged
    }
}

fn average_of(window: &VecDeque<&Sample>) -> Option<Sample> {
    let centre = midpoint(window.iter().map(|s| s.coordinate()))?;

    let n = window.len() as f64;
    let elevation = window.iter().map(|s| s.elevation).sum::<f64>() / n;
    let elapsed = window.iter().map(|s| s.elapsed_seconds).sum::<f64>() / n;

    Some(Sample::averaged(centre, elevation, elapsed, window.len()))
}
