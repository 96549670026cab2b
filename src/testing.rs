//! Testing utilities for Bevy systems.

#![cfg(test)]

use std::time::Duration;

use bevy::ecs::query::QueryFilter;
use bevy::ecs::system::RunSystemOnce;
use bevy::prelude::*;
use bevy::state::state::FreelyMutableState;
use bevy::time::TimeUpdateStrategy;

use crate::gameplay::GameRng;
use crate::gameplay::dog::{DogOptions, spawn_dog};
use crate::gameplay::registry::{SpawnError, WorldRegistry};
use crate::gameplay::sheep::{SheepOptions, spawn_sheep};

/// Creates a minimal app for testing with essential plugins.
pub fn create_test_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app
}

/// Creates a test app with state support.
pub fn create_test_app_with_state<S: FreelyMutableState + Default>() -> App {
    let mut app = create_test_app();
    app.add_plugins(bevy::state::app::StatesPlugin);
    app.init_state::<S>();
    app
}

/// Test app with a registry over the default map and a seeded rng.
pub fn create_world_test_app() -> App {
    let mut app = create_test_app();
    app.insert_resource(WorldRegistry::default());
    app.insert_resource(GameRng::seeded(7));
    crate::gameplay::registry::add_registry_observers(&mut app);
    app
}

/// Makes every frame after the first advance time by exactly `step`.
/// The first `update()` still has a zero delta.
pub fn use_fixed_time_step(app: &mut App, step: Duration) {
    app.insert_resource(TimeUpdateStrategy::ManualDuration(step));
}

/// Sets a timer so that any positive delta finishes it.
pub fn nearly_expire_timer(timer: &mut Timer) {
    let duration = timer.duration();
    timer.set_elapsed(duration - Duration::from_nanos(1));
}

/// Asserts how many entities match the filter `F`.
pub fn assert_entity_count<F: QueryFilter>(app: &mut App, expected: usize) {
    let mut query = app.world_mut().query_filtered::<(), F>();
    let count = query.iter(app.world()).count();
    assert_eq!(count, expected, "unexpected entity count");
}

/// Every message of type `M` seen since the app was built.
#[derive(Resource)]
pub struct Collected<M: Message>(pub Vec<M>);

impl<M: Message> Default for Collected<M> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

fn collect_messages<M: Message + Clone>(
    mut reader: MessageReader<M>,
    mut collected: ResMut<Collected<M>>,
) {
    collected.0.extend(reader.read().cloned());
}

/// Records every `M` written during `Update` into [`Collected<M>`].
pub fn track_messages<M: Message + Clone>(app: &mut App) {
    app.init_resource::<Collected<M>>();
    app.add_systems(PostUpdate, collect_messages::<M>);
}

/// Runs [`spawn_sheep`] against the app's registry and applies its commands.
pub fn spawn_sheep_in(app: &mut App, options: SheepOptions) -> Result<Entity, SpawnError> {
    app.world_mut()
        .run_system_once(
            move |mut commands: Commands, mut registry: ResMut<WorldRegistry>| {
                spawn_sheep(&mut commands, &mut registry, options.clone())
            },
        )
        .expect("spawn system should run")
}

/// Runs [`spawn_dog`] against the app's registry and applies its commands.
pub fn spawn_dog_in(app: &mut App, options: DogOptions) -> Result<Entity, SpawnError> {
    app.world_mut()
        .run_system_once(
            move |mut commands: Commands, mut registry: ResMut<WorldRegistry>| {
                spawn_dog(&mut commands, &mut registry, options.clone())
            },
        )
        .expect("spawn system should run")
}
