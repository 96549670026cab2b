//! Random corridor generation.

use bevy::prelude::*;
use rand::Rng;

use super::{
    Cell, GOAL_GLYPH, MapError, MapTraverser, Move, PATH_GLYPH, START_GLYPH, Tile, TileMap,
    find_start,
};

/// Directions the carver may extend the corridor in.
const CARVE_DIRECTIONS: [Move; 3] = [Move::Right, Move::Left, Move::Down];

/// Attempts before [`generate_corridor_map`] gives up.
const MAX_GENERATION_ATTEMPTS: usize = 64;

/// Base outline, top to bottom. The opening is replaced by the start or goal glyph.
const BASE_ROWS: [[char; 3]; 3] = [['┌', '─', '┐'], ['│', ' ', '│'], ['└', '─', '┘']];

/// Carves a corridor of path tiles from the start tile until it touches the goal.
///
/// Each step paints one empty neighbour (right, left or down, chosen
/// uniformly), so the corridor never runs upward.
pub fn carve_random_walk(map: &mut TileMap, rng: &mut impl Rng) -> Result<(), MapError> {
    carve_with(map, rng, |_| true)
}

fn carve_with(
    map: &mut TileMap,
    rng: &mut impl Rng,
    can_carve: impl Fn(Cell) -> bool,
) -> Result<(), MapError> {
    let mut current = find_start(map).ok_or(MapError::NoStart)?;

    loop {
        let neighbours = CARVE_DIRECTIONS.iter().filter_map(|mv| mv.apply(current));
        if neighbours
            .clone()
            .any(|cell| map.tile(cell) == Some(Tile::Goal))
        {
            return Ok(());
        }

        let open: Vec<Cell> = neighbours
            .filter(|&cell| map.tile(cell) == Some(Tile::Empty) && can_carve(cell))
            .collect();
        if open.is_empty() {
            let (col, row) = current;
            return Err(MapError::Stuck { col, row });
        }

        current = open[rng.random_range(0..open.len())];
        map.set_glyph(current, PATH_GLYPH);
    }
}

/// Builds a `width` x `height` map with a start base in the top-left corner,
/// a goal base in the bottom-right corner and a random corridor between them.
///
/// The corridor stays out of both bases and off the bottom row, which keeps
/// the goal reachable from the start by right, left and down steps.
pub fn generate_corridor_map(
    width: usize,
    height: usize,
    rng: &mut impl Rng,
) -> Result<TileMap, MapError> {
    // Two bases side by side plus one column of corridor between them.
    if width < 7 || height < 6 {
        return Err(MapError::Unreachable);
    }

    let goal_corner = (width - 3, height - 3);
    let in_base = |(col, row): Cell| {
        (col < 3 && row < 3) || (col >= goal_corner.0 && row >= goal_corner.1)
    };
    let carvable = |cell: Cell| !in_base(cell) && cell.1 < height - 1;

    retry(MAX_GENERATION_ATTEMPTS, || {
        let mut map = TileMap::blank(width, height);
        stamp_base(&mut map, (0, 0), (2, 1), START_GLYPH);
        stamp_base(&mut map, goal_corner, (goal_corner.0, goal_corner.1 + 1), GOAL_GLYPH);

        carve_with(&mut map, &mut *rng, &carvable)?;
        MapTraverser::new(&map).traverse()?;
        Ok(map)
    })
}

/// Runs `attempt` up to `attempts` times and returns the first map it builds,
/// or the last error.
fn retry(
    attempts: usize,
    mut attempt: impl FnMut() -> Result<TileMap, MapError>,
) -> Result<TileMap, MapError> {
    let mut last_error = MapError::Unreachable;
    for n in 1..=attempts {
        match attempt() {
            Ok(map) => {
                debug!("corridor carved after {n} attempt(s)");
                return Ok(map);
            }
            Err(error) => last_error = error,
        }
    }
    Err(last_error)
}

fn stamp_base(map: &mut TileMap, (left, top): Cell, opening: Cell, opening_glyph: char) {
    for (dy, row) in BASE_ROWS.iter().enumerate() {
        for (dx, &glyph) in row.iter().enumerate() {
            map.set_glyph((left + dx, top + dy), glyph);
        }
    }
    map.set_glyph(opening, opening_glyph);
}
