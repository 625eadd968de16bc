//! Fills the time gaps of a sparse sequence with points from a denser one.

use tracing::debug;

use crate::sample::Sample;

/// Copies secondary samples lying strictly between `gap_start` and `gap_end`
/// into `out`, starting the scan at `cursor`. Returns the advanced cursor,
/// which never moves backwards.
pub fn fill_gap(
    secondary: &[Sample],
    mut cursor: usize,
    gap_start: f64,
    gap_end: f64,
    out: &mut Vec<Sample>,
) -> usize {
    while cursor < secondary.len() && secondary[cursor].elapsed_seconds <= gap_start {
        cursor += 1;
    }
    while cursor < secondary.len() && secondary[cursor].elapsed_seconds < gap_end {
        out.push(secondary[cursor].clone());
        cursor += 1;
    }
    cursor
}

/// Follows `primary`, inserting `secondary` points into every primary gap
/// longer than `leap_secs`, then appends secondary points that come after the
/// last primary point.
pub fn merge(primary: &[Sample], secondary: &[Sample], leap_secs: f64) -> Vec<Sample> {
    let mut merged = Vec::with_capacity(primary.len());
    let mut cursor = 0;
    let mut filled = 0usize;

    for (i, point) in primary.iter().enumerate() {
        if i > 0 {
            let gap_start = primary[i - 1].elapsed_seconds;
            if point.elapsed_seconds - gap_start > leap_secs {
                let before = merged.len();
                cursor = fill_gap(secondary, cursor, gap_start, point.elapsed_seconds, &mut merged);
                filled += merged.len() - before;
            }
        }
        merged.push(point.clone());
    }

    let tail_start = primary.last().map_or(f64::NEG_INFINITY, |p| p.elapsed_seconds);
    let before = merged.len();
    fill_gap(secondary, cursor, tail_start, f64::INFINITY, &mut merged);
    filled += merged.len() - before;

    debug!(
        primary = primary.len(),
        secondary = secondary.len(),
        filled,
        "hybrid merge complete"
    );
    merged
}
