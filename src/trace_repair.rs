//! Clean-up for traces from action cameras, whose GPS tends to repeat stale
//! fixes and to log several points with one timestamp.

use tracing::info;

use crate::sample::RawSample;

/// Drops every point whose time is not strictly after the previous input
/// point, or whose position equals it. The first point is always kept.
pub fn drop_stale_fixes(points: &[RawSample]) -> Vec<RawSample> {
    let Some(first) = points.first() else {
        return Vec::new();
    };

    let mut repaired = vec![first.clone()];
    for pair in points.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        let time_advances = cur.time > prev.time;
        let same_position = cur.latitude == prev.latitude && cur.longitude == prev.longitude;
        if time_advances && !same_position {
            repaired.push(cur.clone());
        }
    }

    let dropped = points.len() - repaired.len();
    if dropped > 0 {
        info!(dropped, kept = repaired.len(), "removed stale GPS fixes");
    }
    repaired
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn point(lat: f64, lon: f64, secs: i64) -> RawSample {
        RawSample {
            latitude: lat,
            longitude: lon,
            elevation: 100.0,
            time: Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::seconds(secs),
        }
    }

    #[test]
    fn repeated_timestamps_are_dropped() {
        let points = vec![
            point(45.0, 7.0, 0),
            point(45.001, 7.0, 0),
            point(45.002, 7.0, 1),
        ];
        let repaired = drop_stale_fixes(&points);
        assert_eq!(repaired.len(), 2);
        assert_eq!(repaired[1].latitude, 45.002);
    }

    #[test]
    fn repeated_positions_are_dropped() {
        let points = vec![point(45.0, 7.0, 0), point(45.0, 7.0, 1), point(45.001, 7.0, 2)];
        let repaired = drop_stale_fixes(&points);
        assert_eq!(repaired.len(), 2);
        assert_eq!(repaired[1].time, points[2].time);
    }

    #[test]
    fn backwards_time_is_dropped() {
        let points = vec![point(45.0, 7.0, 5), point(45.001, 7.0, 3), point(45.002, 7.0, 6)];
        // Each point is judged against its input predecessor, so the
        // point after the backwards jump survives.
        let repaired = drop_stale_fixes(&points);
        assert_eq!(repaired.len(), 2);
        assert_eq!(repaired[1].latitude, 45.002);
    }

    #[test]
    fn first_point_of_a_clean_trace_is_kept() {
        let points = vec![point(45.0, 7.0, 0), point(45.001, 7.0, 1), point(45.002, 7.0, 2)];
        assert_eq!(drop_stale_fixes(&points), points);
    }

    #[test]
    fn empty_input_stays_empty() {
        assert!(drop_stale_fixes(&[]).is_empty());
    }
}
