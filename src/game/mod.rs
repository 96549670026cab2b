//! State machine bootstrap and the global camera.

use bevy::prelude::*;

use crate::GameState;

/// Camera centre: frames the corridor map and the pasture to its right.
const CAMERA_POSITION: Vec2 = Vec2::new(620.0, -140.0);

pub(super) fn plugin(app: &mut App) {
    app.init_state::<GameState>()
        .add_systems(Startup, setup_camera)
        .add_systems(
            Update,
            finish_loading.run_if(in_state(GameState::Loading)),
        );
}

/// Spawns the global 2D camera. Persists across all states (do NOT add `DespawnOnExit`).
fn setup_camera(mut commands: Commands) {
    commands.spawn((
        Name::new("Camera"),
        Camera2d,
        Transform::from_translation(CAMERA_POSITION.extend(0.0)),
    ));
}

/// Nothing is loaded from disk, so the scene starts on the first frame.
fn finish_loading(mut next_state: ResMut<NextState<GameState>>) {
    info!("loading complete, entering game");
    next_state.set(GameState::InGame);
}
