//! Tests for kinematics module

mod common;

use common::{enriched, raw, raw_north, BASE_LAT, BASE_LON, METRES_PER_DEGREE};
use gpx_segmenter::kinematics::derive_kinematics;

fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

#[test]
fn test_first_sample_has_no_kinematics() {
    let samples = enriched(&[raw_north(0.0, 100.0, 0.0), raw_north(10.0, 100.0, 5.0)]);
    assert!(samples[0].kinematics.is_none());
    assert!(samples[1].kinematics.is_some());
}

#[test]
fn test_speed_and_elevation_rate() {
    let samples = enriched(&[raw_north(0.0, 100.0, 0.0), raw_north(20.0, 110.0, 4.0)]);
    let k = samples[1].kinematics.unwrap();
    assert!(approx_eq(k.distance_from_prev, 20.0, 0.01));
    assert!(approx_eq(k.speed, 5.0, 0.01));
    assert_eq!(k.elevation_delta, 10.0);
    assert_eq!(k.elevation_rate, 2.5);
}

#[test]
fn test_identical_timestamps_give_zero_speed() {
    let samples = enriched(&[
        raw_north(0.0, 100.0, 0.0),
        raw_north(0.0, 100.0, 1.0),
        raw_north(15.0, 104.0, 1.0),
    ]);
    let k = samples[2].kinematics.unwrap();
    assert!(k.distance_from_prev > 14.0);
    assert_eq!(k.speed, 0.0);
    assert_eq!(k.elevation_rate, 0.0);
    assert_eq!(k.bearing_rate, 0.0);
    assert!(k.speed.is_finite());
}

#[test]
fn test_bearing_follows_coordinate_deltas() {
    let step = 10.0 / METRES_PER_DEGREE;
    let samples = enriched(&[
        raw(BASE_LAT, BASE_LON, 0.0, 0.0),
        raw(BASE_LAT + step, BASE_LON, 0.0, 1.0), // north
        raw(BASE_LAT + step, BASE_LON + step, 0.0, 3.0), // east
    ]);

    let north = samples[1].kinematics.unwrap();
    assert!(approx_eq(north.bearing, 90.0, 1e-9));
    // Previous sample had no bearing of its own.
    assert_eq!(north.bearing_delta, 0.0);

    let east = samples[2].kinematics.unwrap();
    assert!(approx_eq(east.bearing, 0.0, 1e-9));
    assert!(approx_eq(east.bearing_delta, -90.0, 1e-9));
    assert!(approx_eq(east.bearing_rate, -45.0, 1e-9));
}

#[test]
fn test_input_sequence_is_not_modified() {
    let samples = common::at_times(&[0.0, 1.0, 2.0]);
    let before = samples.clone();
    let _ = derive_kinematics(&samples);
    assert_eq!(samples, before);
}

#[test]
fn test_empty_sequence() {
    assert!(derive_kinematics(&[]).is_empty());
}
