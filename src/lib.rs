//! Herd: a flock of sheep on a tile map, hunted by patrolling dogs.

#[cfg(feature = "dev")]
mod dev_tools;
mod game;
pub mod gameplay;
#[cfg(test)]
pub mod testing;
pub mod third_party;

use bevy::prelude::*;

// === Z layers ===

/// Map tiles render at the back.
pub const Z_TILE: f32 = 0.0;
/// Sheep and dogs.
pub const Z_AGENT: f32 = 10.0;
/// Explosions and other short-lived effects.
pub const Z_EFFECT: f32 = 20.0;

/// Primary game states.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameState {
    /// Initial state, left on the first frame.
    #[default]
    Loading,
    /// The scene is live: map, flock and dogs exist.
    InGame,
}

/// Per-frame ordering of gameplay systems.
///
/// Orders issued in `Input` are seen by the brains in `Ai` the same frame,
/// and damage requested by `Ai` is resolved in `Combat`.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameSet {
    Input,
    Ai,
    Combat,
    Death,
    Ui,
}

/// Run condition: true while the scene is live.
pub fn gameplay_running(state: Option<Res<State<GameState>>>) -> bool {
    state.is_some_and(|state| *state.get() == GameState::InGame)
}

/// Core game plugin. Physics lives in [`third_party::plugin`] so headless
/// apps can run the simulation without a physics world.
pub fn plugin(app: &mut App) {
    app.configure_sets(
        Update,
        (
            GameSet::Input,
            GameSet::Ai,
            GameSet::Combat,
            GameSet::Death,
            GameSet::Ui,
        )
            .chain(),
    );

    app.add_plugins((game::plugin, gameplay::plugin));

    #[cfg(feature = "dev")]
    app.add_plugins(dev_tools::plugin);
}
