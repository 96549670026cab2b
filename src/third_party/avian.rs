//! Avian2d physics configuration for the top-down pasture.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::gameplay::map::TILE_SIZE;

// === Collision Layers ===

/// Physics collision layers.
///
/// Sheep bodies collide with each other and with dogs. Dog sensors only
/// look at bodies and never push anything.
#[derive(PhysicsLayer, Clone, Copy, Debug, Default)]
pub enum CollisionLayer {
    /// Solid agent body.
    #[default]
    Body,
    /// Detection circle around a patrolling dog.
    Sensor,
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.add_plugins(PhysicsPlugins::default().with_length_unit(TILE_SIZE));
    app.insert_resource(Gravity::ZERO);
}
