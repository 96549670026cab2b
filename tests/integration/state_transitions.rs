//! Tests for game state transitions.

use bevy::prelude::*;
use herd::GameState;
use pretty_assertions::assert_eq;

use crate::create_game_app;

#[test]
fn game_initializes_in_loading_state() {
    let app = create_game_app();
    let state = app.world().resource::<State<GameState>>();
    assert_eq!(*state.get(), GameState::Loading);
}

#[test]
fn loading_hands_over_to_the_game() {
    let mut app = create_game_app();

    app.update();
    app.update();

    let state = app.world().resource::<State<GameState>>();
    assert_eq!(*state.get(), GameState::InGame);
}

#[test]
fn camera_survives_leaving_the_game() {
    let mut app = create_game_app();
    app.update();
    app.update();

    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::Loading);
    app.update();

    let cameras = app
        .world_mut()
        .query_filtered::<(), With<Camera2d>>()
        .iter(app.world())
        .count();
    assert_eq!(cameras, 1);
}
