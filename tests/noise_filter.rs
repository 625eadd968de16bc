//! Tests for noise_filter module

mod common;

use common::{at_times, elapsed_offsets, enriched, raw_north};
use gpx_segmenter::{FilterPolicy, Kinematics, NoiseFilter, Sample, Thresholds};
use proptest::prelude::*;

fn thresholds(policy: FilterPolicy) -> Thresholds {
    Thresholds {
        min_speed: 1.0,
        max_speed: 80.0,
        filter_policy: policy,
        max_run_gap_secs: 5.0,
        min_run_length: 3,
        ..Thresholds::default()
    }
}

/// One sample per second carrying the given speed; `None` leaves kinematics off.
fn with_speeds(speeds: &[Option<f64>]) -> Vec<Sample> {
    let offsets: Vec<f64> = (0..speeds.len()).map(|i| i as f64).collect();
    at_times(&offsets)
        .into_iter()
        .zip(speeds)
        .map(|(sample, speed)| match speed {
            Some(speed) => sample.with_kinematics(Kinematics {
                speed: *speed,
                distance_from_prev: *speed,
                ..Kinematics::default()
            }),
            None => sample,
        })
        .collect()
}

#[test]
fn test_speed_bounds_are_exclusive() {
    let samples = with_speeds(&[None, Some(1.0), Some(1.0001), Some(79.999), Some(80.0)]);
    let filter = NoiseFilter::new(&thresholds(FilterPolicy::Bounds));
    let kept = filter.filter(&samples);
    assert_eq!(elapsed_offsets(&kept), vec![2.0, 3.0]);
}

#[test]
fn test_sample_without_kinematics_is_rejected() {
    let samples = with_speeds(&[None]);
    let filter = NoiseFilter::new(&thresholds(FilterPolicy::Bounds));
    assert!(!filter.within_bounds(&samples[0]));
}

#[test]
fn test_step_limit() {
    let samples = with_speeds(&[Some(30.0), Some(60.0), Some(40.0)]);
    let filter = NoiseFilter::new(&Thresholds {
        max_acceptable_step: Some(50.0),
        ..thresholds(FilterPolicy::Bounds)
    });
    assert_eq!(elapsed_offsets(&filter.filter(&samples)), vec![0.0, 2.0]);
}

fn parked_with_spike() -> Vec<Sample> {
    let points: Vec<_> = (0..20)
        .map(|i| {
            let north = if i == 10 { 10.0 } else { 0.0 };
            raw_north(north, 300.0, i as f64)
        })
        .collect();
    enriched(&points)
}

#[test]
fn test_burst_filter_retracts_spike_without_orphans() {
    let samples = parked_with_spike();
    let kept = NoiseFilter::new(&thresholds(FilterPolicy::Burst)).filter(&samples);
    assert!(kept.is_empty(), "spike left {:?}", elapsed_offsets(&kept));
}

#[test]
fn test_bounds_filter_keeps_spike() {
    let samples = parked_with_spike();
    let kept = NoiseFilter::new(&thresholds(FilterPolicy::Bounds)).filter(&samples);
    assert_eq!(elapsed_offsets(&kept), vec![10.0, 11.0]);
}

#[test]
fn test_policy_can_be_switched() {
    let samples = parked_with_spike();
    let filter = NoiseFilter::new(&thresholds(FilterPolicy::Burst)).with_policy(FilterPolicy::Bounds);
    assert_eq!(filter.filter(&samples).len(), 2);
}

#[test]
fn test_long_run_survives_and_short_run_after_gap_is_retracted() {
    let mut speeds = vec![Some(0.0)];
    speeds.extend(std::iter::repeat(Some(5.0)).take(6)); // 1..=6
    speeds.extend(std::iter::repeat(Some(0.0)).take(2)); // 7, 8
    speeds.extend(std::iter::repeat(Some(5.0)).take(2)); // 9, 10
    speeds.push(Some(0.0));
    let samples = with_speeds(&speeds);

    let kept = NoiseFilter::new(&thresholds(FilterPolicy::Burst)).filter(&samples);
    assert_eq!(elapsed_offsets(&kept), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
}

#[test]
fn test_time_gap_splits_runs() {
    // Two accepted pairs 8 s apart: each pair is its own run of two.
    let samples: Vec<Sample> = at_times(&[0.0, 1.0, 9.0, 10.0])
        .into_iter()
        .map(|s| {
            s.with_kinematics(Kinematics {
                speed: 3.0,
                ..Kinematics::default()
            })
        })
        .collect();

    let kept = NoiseFilter::new(&thresholds(FilterPolicy::Burst)).filter(&samples);
    assert!(kept.is_empty());

    let relaxed = NoiseFilter::new(&Thresholds {
        max_run_gap_secs: 10.0,
        ..thresholds(FilterPolicy::Burst)
    });
    assert_eq!(relaxed.filter(&samples).len(), 4);
}

#[test]
fn test_short_run_at_end_is_retracted() {
    let samples = with_speeds(&[Some(0.0), Some(0.0), Some(4.0), Some(4.0)]);
    let kept = NoiseFilter::new(&thresholds(FilterPolicy::Burst)).filter(&samples);
    assert!(kept.is_empty());
}

proptest! {
    #[test]
    fn prop_kept_samples_are_within_bounds(
        speeds in prop::collection::vec(prop::option::of(0.0f64..120.0), 0..100),
        burst in any::<bool>(),
    ) {
        let policy = if burst { FilterPolicy::Burst } else { FilterPolicy::Bounds };
        let samples = with_speeds(&speeds);
        let kept = NoiseFilter::new(&thresholds(policy)).filter(&samples);

        prop_assert!(kept.len() <= samples.len());
        for sample in &kept {
            let speed = sample.speed().unwrap();
            prop_assert!(1.0 < speed && speed < 80.0);
        }
        for pair in kept.windows(2) {
            prop_assert!(pair[0].elapsed_seconds < pair[1].elapsed_seconds);
        }
    }
}
