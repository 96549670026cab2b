//! The scene is built on entering the game and torn down on leaving it.

use bevy::prelude::*;
use herd::GameState;
use herd::gameplay::dog::Dog;
use herd::gameplay::registry::WorldRegistry;
use herd::gameplay::sheep::Sheep;
use pretty_assertions::assert_eq;

use crate::create_game_app;

fn count<F: bevy::ecs::query::QueryFilter>(app: &mut App) -> usize {
    app.world_mut()
        .query_filtered::<(), F>()
        .iter(app.world())
        .count()
}

fn enter_game() -> App {
    let mut app = create_game_app();
    app.update();
    app.update();
    app
}

#[test]
fn entering_the_game_spawns_flock_and_dogs() {
    let mut app = enter_game();

    let registry = app.world().resource::<WorldRegistry>();
    assert_eq!(registry.sheep_count(), 25);
    assert_eq!(registry.dog_count(), 2);
    assert_eq!(count::<With<Sheep>>(&mut app), 25);
    assert_eq!(count::<With<Dog>>(&mut app), 2);
}

#[test]
fn the_simulation_keeps_running() {
    let mut app = enter_game();

    for _ in 0..10 {
        app.update();
    }

    assert_eq!(count::<With<Sheep>>(&mut app), 25);
    assert_eq!(count::<With<Dog>>(&mut app), 2);
}

#[test]
fn leaving_the_game_clears_the_world() {
    let mut app = enter_game();

    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::Loading);
    app.update();

    assert!(!app.world().contains_resource::<WorldRegistry>());
    assert_eq!(count::<With<Sheep>>(&mut app), 0);
    assert_eq!(count::<With<Dog>>(&mut app), 0);
}
