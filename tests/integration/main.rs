//! Crate-level tests driving `herd::plugin` headless.

mod scene_lifecycle;
mod state_transitions;

use bevy::input::InputPlugin;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

/// The game without a window or physics.
pub fn create_game_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(StatesPlugin);
    app.add_plugins(InputPlugin);
    app.add_plugins(herd::plugin);
    app
}
