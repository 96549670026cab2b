//! Scene lifecycle: on entering the game, generate a map, draw it, and
//! populate a fresh registry with the flock and the dogs.

#![allow(clippy::cast_precision_loss)] // Flock grid indices are tiny.

use bevy::prelude::*;

use super::GameRng;
use super::dog::{DogOptions, spawn_dog};
use super::map::{TILE_SIZE, TileMap, generate_corridor_map};
use super::registry::WorldRegistry;
use super::render::spawn_map_tiles;
use super::sheep::{SheepOptions, spawn_sheep};
use crate::GameState;

/// Generated map size in tiles.
pub const MAP_COLS: usize = 26;
pub const MAP_ROWS: usize = 15;

/// The flock is a `FLOCK_SIDE` x `FLOCK_SIDE` grid in the pasture.
pub const FLOCK_SIDE: usize = 5;
const FLOCK_ORIGIN: Vec2 = Vec2::new(940.0, -80.0);
const FLOCK_SPACING: f32 = 40.0;

/// Dogs start on the far side of the pasture.
const DOGS: [(&str, Vec2); 2] = [
    ("rex", Vec2::new(1150.0, -120.0)),
    ("fang", Vec2::new(1150.0, -280.0)),
];

/// Name and position of every sheep in the starting flock, row by row.
#[must_use]
pub fn flock_layout() -> Vec<(String, Vec2)> {
    (0..FLOCK_SIDE)
        .flat_map(|y| (0..FLOCK_SIDE).map(move |x| (x, y)))
        .map(|(x, y)| {
            let offset = Vec2::new(x as f32, -(y as f32)) * FLOCK_SPACING;
            (format!("sheep{x}{y}"), FLOCK_ORIGIN + offset)
        })
        .collect()
}

fn build_map(rng: &mut GameRng) -> TileMap {
    match generate_corridor_map(MAP_COLS, MAP_ROWS, &mut rng.0) {
        Ok(map) => map,
        Err(error) => {
            warn!("map generation failed ({error}), using the default layout");
            TileMap::default_layout()
        }
    }
}

fn spawn_scene(mut commands: Commands, mut rng: ResMut<GameRng>) {
    let map = build_map(&mut rng);
    spawn_map_tiles(&mut commands, &map);
    let mut registry = WorldRegistry::new(map);

    for (name, position) in flock_layout() {
        if let Err(error) = spawn_sheep(
            &mut commands,
            &mut registry,
            SheepOptions::new(name, position),
        ) {
            warn!("{error}");
        }
    }
    for (name, position) in DOGS {
        if let Err(error) = spawn_dog(&mut commands, &mut registry, DogOptions::new(name, position))
        {
            warn!("{error}");
        }
    }

    info!(
        "scene ready: {} sheep, {} dogs",
        registry.sheep_count(),
        registry.dog_count()
    );
    commands.insert_resource(registry);
}

pub(super) fn plugin(app: &mut App) {
    app.add_systems(OnEnter(GameState::InGame), spawn_scene);
}
