//! Re-selects samples of any time-ordered sequence that fall inside intervals.

use tracing::debug;

use crate::interval_segmenter::{IntervalClass, MovingInterval};
use crate::sample::Sample;

/// Moves `cursor` past every interval that ends before `elapsed_seconds`.
///
/// Returns `intervals.len()` once the intervals are exhausted.
pub fn advance_cursor(intervals: &[MovingInterval], mut cursor: usize, elapsed_seconds: f64) -> usize {
    while cursor < intervals.len() && elapsed_seconds > intervals[cursor].end_time {
        cursor += 1;
    }
    cursor
}

/// Keeps the samples lying within `[start, end]` of an interval of the
/// requested class. Both inputs must be time-ordered; runs in
/// O(samples + intervals).
pub fn reconstitute(
    samples: &[Sample],
    intervals: &[MovingInterval],
    class: IntervalClass,
) -> Vec<Sample> {
    let mut selected = Vec::new();
    let mut cursor = 0;

    for sample in samples {
        cursor = advance_cursor(intervals, cursor, sample.elapsed_seconds);
        let Some(interval) = intervals.get(cursor) else {
            break;
        };
        if interval.contains(sample.elapsed_seconds) && class.matches(interval) {
            selected.push(sample.clone());
        }
    }

    debug!(
        ?class,
        input = samples.len(),
        intervals = intervals.len(),
        selected = selected.len(),
        "reconstituted samples"
    );
    selected
}
