//! Development tools, only built with the `dev` feature.
//!
//! Press D to drop an extra dog under the cursor.

use bevy::prelude::*;

use crate::gameplay::dog::{DogOptions, spawn_dog};
use crate::gameplay::input::CursorWorld;
use crate::gameplay::registry::WorldRegistry;
use crate::{GameSet, gameplay_running};

/// Where debug dogs land when the cursor is off the window.
const FALLBACK_SPAWN: Vec2 = Vec2::new(1150.0, -200.0);

/// Counter for debug dog names.
#[derive(Resource, Debug, Default)]
struct StrayCount(usize);

fn debug_spawn_dog(
    keyboard: Res<ButtonInput<KeyCode>>,
    cursor: Res<CursorWorld>,
    mut strays: ResMut<StrayCount>,
    mut registry: ResMut<WorldRegistry>,
    mut commands: Commands,
) {
    if !keyboard.just_pressed(KeyCode::KeyD) {
        return;
    }

    strays.0 += 1;
    let name = format!("stray{}", strays.0);
    let position = cursor.0.unwrap_or(FALLBACK_SPAWN);
    match spawn_dog(&mut commands, &mut registry, DogOptions::new(&name, position)) {
        Ok(_) => info!("debug dog {name} dropped at {position}"),
        Err(error) => warn!("{error}"),
    }
}

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<StrayCount>();
    app.add_systems(
        Update,
        debug_spawn_dog
            .in_set(GameSet::Input)
            .run_if(gameplay_running),
    );
}
