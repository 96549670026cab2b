//! The patrol sensor: a circle around a patrolling dog that spots sheep.

use bevy::prelude::*;

/// Radius of the detection circle (pixels).
pub const SENSOR_RADIUS: f32 = 150.0;

/// Marker on the sensor child of a patrolling dog.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct PatrolSensor;

/// A sheep overlapping the sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sighting<'a> {
    pub name: &'a str,
    pub position: Vec2,
    pub alive: bool,
}

/// Name of the nearest live sheep among `sightings`. Ties keep the first seen.
#[must_use]
pub fn nearest_sighting<'a>(
    origin: Vec2,
    sightings: impl IntoIterator<Item = Sighting<'a>>,
) -> Option<&'a str> {
    let mut nearest: Option<(&str, f32)> = None;
    for sighting in sightings {
        if !sighting.alive {
            continue;
        }
        let dist = origin.distance_squared(sighting.position);
        if nearest.is_none_or(|(_, d)| dist < d) {
            nearest = Some((sighting.name, dist));
        }
    }
    nearest.map(|(name, _)| name)
}
