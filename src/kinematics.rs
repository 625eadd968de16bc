//! Speed, elevation rate and bearing of each sample relative to its predecessor.

use tracing::debug;

use crate::geometry::{bearing_between, geodesic_distance};
use crate::sample::{Kinematics, Sample};

/// Returns a new sequence where every sample but the first carries [`Kinematics`].
///
/// Zero-duration steps resolve to zero speed and zero rates.
pub fn derive_kinematics(samples: &[Sample]) -> Vec<Sample> {
    let mut enriched: Vec<Sample> = Vec::with_capacity(samples.len());

    for (i, current) in samples.iter().enumerate() {
        if i == 0 {
            enriched.push(Sample {
                kinematics: None,
                ..current.clone()
            });
            continue;
        }

        let previous = &enriched[i - 1];
        let kinematics = step_kinematics(previous, current);
        enriched.push(current.with_kinematics(kinematics));
    }

    debug!(samples = enriched.len(), "derived kinematics");
    enriched
}

/// Motion from `previous` to `current`. `previous` must already carry its own
/// kinematics (if any) so the bearing delta can be computed.
pub fn step_kinematics(previous: &Sample, current: &Sample) -> Kinematics {
    let distance = geodesic_distance(previous.coordinate(), current.coordinate());
    let time_delta = current.elapsed_seconds - previous.elapsed_seconds;
    let elevation_delta = current.elevation - previous.elevation;
    let bearing = bearing_between(previous.coordinate(), current.coordinate());
    let bearing_delta = previous.bearing().map_or(0.0, |prev| bearing - prev);

    Kinematics {
        speed: per_second(distance, time_delta),
        distance_from_prev: distance,
        elevation_delta,
        elevation_rate: per_second(elevation_delta, time_delta),
        bearing,
        bearing_delta,
        bearing_rate: per_second(bearing_delta, time_delta),
    }
}

fn per_second(value: f64, time_delta: f64) -> f64 {
    if time_delta == 0.0 {
        0.0
    } else {
        value / time_delta
    }
}
