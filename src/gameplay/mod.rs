//! Gameplay domain plugins: map, agents, combat, selection and the scene that ties them together.

pub(crate) mod animation;
pub mod combat;
pub mod dog;
pub(crate) mod input;
pub mod map;
pub mod registry;
pub(crate) mod render;
pub(crate) mod scene;
pub(crate) mod selection;
pub mod sheep;
pub(crate) mod wander;

use bevy::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Randomness for wander cycles and map generation.
///
/// Seeded from the OS by default; tests insert [`GameRng::seeded`] for
/// reproducible runs.
#[derive(Resource, Debug)]
pub struct GameRng(pub StdRng);

impl GameRng {
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self(StdRng::from_os_rng())
    }
}

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<GameRng>();

    app.add_plugins((
        animation::plugin,
        combat::plugin,
        dog::plugin,
        input::plugin,
        registry::plugin,
        render::plugin,
        scene::plugin,
        selection::plugin,
        sheep::plugin,
    ));
}
