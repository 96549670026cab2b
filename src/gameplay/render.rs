//! Flat-colour presentation driven by component state.

use bevy::prelude::*;

use super::animation::Facing;
use super::combat::Health;
use super::dog::{DOG_COLOR, Dog};
use super::map::{TILE_SIZE, Tile, TileMap, tile_center};
use super::selection::Selectable;
use super::sheep::Sheep;
use crate::{GameSet, GameState, Z_TILE, gameplay_running};

/// Colour a hurt agent flashes toward.
const FLASH_COLOR: Color = Color::srgb(1.0, 0.15, 0.15);

const WALL_COLOR: Color = Color::srgb(0.35, 0.25, 0.2);
const PATH_COLOR: Color = Color::srgb(0.8, 0.7, 0.45);
const START_COLOR: Color = Color::srgb(0.3, 0.75, 0.35);
const GOAL_COLOR: Color = Color::srgb(0.85, 0.3, 0.3);

/// Marker: the outline child shown while a sheep is selected.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct SelectionOutline;

/// Marker for map tile sprites.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct MapTile {
    pub col: usize,
    pub row: usize,
}

#[must_use]
pub const fn tile_color(tile: Tile) -> Option<Color> {
    match tile {
        Tile::Empty => None,
        Tile::Wall => Some(WALL_COLOR),
        Tile::Path => Some(PATH_COLOR),
        Tile::Start => Some(START_COLOR),
        Tile::Goal => Some(GOAL_COLOR),
    }
}

/// `base` blended toward the flash colour by `t` in `0..=1`.
#[must_use]
pub fn flash_tint(base: Color, t: f32) -> Color {
    if t <= 0.0 {
        return base;
    }
    if t >= 1.0 {
        return FLASH_COLOR;
    }
    let from = base.to_srgba();
    let to = FLASH_COLOR.to_srgba();
    Color::srgba(
        (to.red - from.red).mul_add(t, from.red),
        (to.green - from.green).mul_add(t, from.green),
        (to.blue - from.blue).mul_add(t, from.blue),
        from.alpha,
    )
}

/// Spawns one sprite per non-empty tile. Tiles live as long as the scene.
pub fn spawn_map_tiles(commands: &mut Commands, map: &TileMap) {
    for ((col, row), glyph) in map.glyphs() {
        let Some(color) = Tile::from_glyph(glyph).and_then(tile_color) else {
            continue;
        };
        commands.spawn((
            Name::new(format!("Tile {col},{row}")),
            MapTile { col, row },
            Sprite::from_color(color, Vec2::splat(TILE_SIZE - 1.0)),
            Transform::from_translation(tile_center((col, row)).extend(Z_TILE)),
            DespawnOnExit(GameState::InGame),
        ));
    }
}

/// Kind colour for sheep, brown for dogs, tinted by the damage flash.
fn paint_agents(
    mut agents: Query<(&mut Sprite, Option<&Sheep>, Option<&Health>), Or<(With<Sheep>, With<Dog>)>>,
) {
    for (mut sprite, sheep, health) in &mut agents {
        let base = sheep.map_or(DOG_COLOR, |sheep| sheep.kind.color());
        let flash = health.map_or(0.0, Health::damage_time);
        let color = if flash > 0.0 {
            flash_tint(base, flash)
        } else {
            base
        };
        if sprite.color != color {
            sprite.color = color;
        }
    }
}

fn apply_facing(mut agents: Query<(&Facing, &mut Sprite), Changed<Facing>>) {
    for (facing, mut sprite) in &mut agents {
        sprite.flip_x = facing.flip_x();
    }
}

fn show_selection_outlines(
    selectables: Query<(&Selectable, &Children), Changed<Selectable>>,
    mut outlines: Query<&mut Visibility, With<SelectionOutline>>,
) {
    for (selectable, children) in &selectables {
        let visibility = if selectable.is_selected() {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
        for child in children.iter() {
            if let Ok(mut outline) = outlines.get_mut(child) {
                outline.set_if_neq(visibility);
            }
        }
    }
}

pub(super) fn plugin(app: &mut App) {
    app.register_type::<SelectionOutline>()
        .register_type::<MapTile>();

    app.add_systems(
        Update,
        (paint_agents, apply_facing, show_selection_outlines)
            .in_set(GameSet::Ui)
            .run_if(gameplay_running),
    );
}
