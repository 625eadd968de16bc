//! Geometry helpers: haversine distance, spherical midpoint and planar bearing.

use geo::{point, HaversineDistance};

use crate::sample::Coordinate;

/// Great-circle distance in metres.
pub fn geodesic_distance(a: Coordinate, b: Coordinate) -> f64 {
    let pa = point!(x: a.longitude, y: a.latitude);
    let pb = point!(x: b.longitude, y: b.latitude);
    pa.haversine_distance(&pb)
}

/// Geographic midpoint of a set of coordinates.
///
/// Each coordinate is projected onto the unit sphere, the vectors are averaged
/// and the mean is projected back. A single coordinate is returned unchanged
/// and an empty set yields `None`.
pub fn midpoint<I>(coordinates: I) -> Option<Coordinate>
where
    I: IntoIterator<Item = Coordinate>,
{
    let mut iter = coordinates.into_iter();
    let first = iter.next()?;

    let mut count = 1usize;
    let (mut x, mut y, mut z) = to_cartesian(first);
    for coordinate in iter {
        let (cx, cy, cz) = to_cartesian(coordinate);
        x += cx;
        y += cy;
        z += cz;
        count += 1;
    }

    if count == 1 {
        return Some(first);
    }

    let n = count as f64;
    let (x, y, z) = (x / n, y / n, z / n);
    let longitude = y.atan2(x);
    let hyp = (x * x + y * y).sqrt();
    let latitude = z.atan2(hyp);

    Some(Coordinate::new(latitude.to_degrees(), longitude.to_degrees()))
}

fn to_cartesian(coordinate: Coordinate) -> (f64, f64, f64) {
    let lat = coordinate.latitude.to_radians();
    let lon = coordinate.longitude.to_radians();
    (lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin())
}

/// Angle of the vector `(dx, dy)` in degrees, within `[-180, 180]`.
///
/// Used with longitude/latitude deltas, so 0 is east and 90 is north.
pub fn planar_bearing(dx: f64, dy: f64) -> f64 {
    dy.atan2(dx).to_degrees()
}

/// Bearing from `from` to `to` on the longitude/latitude plane.
pub fn bearing_between(from: Coordinate, to: Coordinate) -> f64 {
    planar_bearing(to.longitude - from.longitude, to.latitude - from.latitude)
}

/// Circular distance between two angles in degrees, always in `[0, 180]`.
pub fn angle_diff(a: f64, b: f64) -> f64 {
    let diff = (a - b).rem_euclid(360.0);
    diff.min(360.0 - diff)
}
