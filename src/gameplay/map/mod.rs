//! Tile maps: a rectangular grid of glyphs with a start base and a goal base.
//!
//! Row 0 is the top of the map. World space has y pointing up, so row `r`
//! sits at `-r * TILE_SIZE`.

mod generate;
mod traversal;

pub use generate::{carve_random_walk, generate_corridor_map};
pub use traversal::{MapTraverser, Move, Traversal};

use std::fmt;

use bevy::prelude::*;
use thiserror::Error;

// === Constants ===

/// Edge length of one tile in world pixels.
pub const TILE_SIZE: f32 = 32.0;

/// Glyph of the start tile.
pub const START_GLYPH: char = 'x';
/// Glyph of the goal tile.
pub const GOAL_GLYPH: char = 'o';
/// Glyph written by the corridor carver.
pub const PATH_GLYPH: char = 'p';
/// Glyph of an empty tile.
pub const EMPTY_GLYPH: char = ' ';

/// Hand-drawn corridor used when generation is not wanted.
const DEFAULT_LAYOUT: [&str; 15] = [
    "┌─┐                       ",
    "│ xpppppppppppp           ",
    "└─┘           p           ",
    "              p           ",
    "         pppppp           ",
    "         p                ",
    "         pppppppppppppp   ",
    "                      p   ",
    "                      p   ",
    "                 pppppp   ",
    "                 p        ",
    "            pppppp        ",
    "            p          ┌─┐",
    "            pppppppppppo │",
    "                       └─┘",
];

// === Tiles ===

/// What a glyph means to agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tile {
    Empty,
    Wall,
    Path,
    Start,
    Goal,
}

impl Tile {
    /// Classifies a glyph. `-` and `|` are older path glyphs and read as paths.
    #[must_use]
    pub const fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            EMPTY_GLYPH => Some(Self::Empty),
            '┌' | '─' | '┐' | '│' | '└' | '┘' => Some(Self::Wall),
            PATH_GLYPH | '-' | '|' => Some(Self::Path),
            START_GLYPH => Some(Self::Start),
            GOAL_GLYPH => Some(Self::Goal),
            _ => None,
        }
    }

    /// Tiles a traversal may step onto.
    #[must_use]
    pub const fn is_traversable(self) -> bool {
        matches!(self, Self::Path | Self::Goal)
    }

    /// Tiles an agent may stand on while following a path.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        matches!(self, Self::Path | Self::Goal | Self::Start)
    }
}

/// A `(col, row)` grid position.
pub type Cell = (usize, usize);

// === Errors ===

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MapError {
    #[error("map has no rows")]
    Empty,
    #[error("map has no start tile")]
    NoStart,
    #[error("goal is unreachable from the start tile")]
    Unreachable,
    #[error("corridor carver got stuck at ({col}, {row})")]
    Stuck { col: usize, row: usize },
    #[error("row {row} is {found} tiles wide, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown glyph {glyph:?} at ({col}, {row})")]
    UnknownGlyph { glyph: char, col: usize, row: usize },
}

// === Map ===

/// Rectangular glyph grid. Every row has the same width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileMap {
    rows: Vec<Vec<char>>,
    width: usize,
}

impl TileMap {
    /// Parses rows of glyphs, rejecting ragged rows and unknown glyphs.
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> Result<Self, MapError> {
        let rows: Vec<Vec<char>> = rows.iter().map(|row| row.as_ref().chars().collect()).collect();
        let Some(width) = rows.first().map(Vec::len) else {
            return Err(MapError::Empty);
        };

        for (row, glyphs) in rows.iter().enumerate() {
            if glyphs.len() != width {
                return Err(MapError::RaggedRow {
                    row,
                    expected: width,
                    found: glyphs.len(),
                });
            }
            if let Some((col, &glyph)) = glyphs
                .iter()
                .enumerate()
                .find(|(_, glyph)| Tile::from_glyph(**glyph).is_none())
            {
                return Err(MapError::UnknownGlyph { glyph, col, row });
            }
        }

        Ok(Self { rows, width })
    }

    /// A `width` x `height` map of empty tiles.
    #[must_use]
    pub fn blank(width: usize, height: usize) -> Self {
        Self {
            rows: vec![vec![EMPTY_GLYPH; width]; height],
            width,
        }
    }

    /// The hand-drawn corridor layout.
    #[must_use]
    pub fn default_layout() -> Self {
        let rows: Vec<Vec<char>> = DEFAULT_LAYOUT
            .iter()
            .map(|row| row.chars().collect())
            .collect();
        let width = rows.first().map_or(0, Vec::len);
        Self { rows, width }
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn glyph(&self, (col, row): Cell) -> Option<char> {
        self.rows.get(row)?.get(col).copied()
    }

    #[must_use]
    pub fn tile(&self, cell: Cell) -> Option<Tile> {
        self.glyph(cell).and_then(Tile::from_glyph)
    }

    /// Overwrites one glyph. Returns false when the cell is off the map.
    pub fn set_glyph(&mut self, (col, row): Cell, glyph: char) -> bool {
        match self.rows.get_mut(row).and_then(|glyphs| glyphs.get_mut(col)) {
            Some(slot) => {
                *slot = glyph;
                true
            }
            None => false,
        }
    }

    /// Every cell holding `glyph`, in row-major order.
    pub fn positions_of(&self, glyph: char) -> impl Iterator<Item = Cell> + '_ {
        self.rows.iter().enumerate().flat_map(move |(row, glyphs)| {
            glyphs
                .iter()
                .enumerate()
                .filter(move |(_, g)| **g == glyph)
                .map(move |(col, _)| (col, row))
        })
    }

    /// Every non-empty cell with its glyph.
    pub fn glyphs(&self) -> impl Iterator<Item = (Cell, char)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, glyphs)| {
            glyphs
                .iter()
                .enumerate()
                .filter(|(_, glyph)| **glyph != EMPTY_GLYPH)
                .map(move |(col, glyph)| ((col, row), *glyph))
        })
    }

    /// True if the tile under `point` can be walked on.
    #[must_use]
    pub fn is_walkable_at(&self, point: Vec2) -> bool {
        world_to_tile(point)
            .and_then(|cell| self.tile(cell))
            .is_some_and(Tile::is_walkable)
    }
}

impl Default for TileMap {
    fn default() -> Self {
        Self::default_layout()
    }
}

impl fmt::Display for TileMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, row) in self.rows.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            for glyph in row {
                write!(f, "{glyph}")?;
            }
        }
        Ok(())
    }
}

// === Lookups ===

/// First start tile in row-major order.
#[must_use]
pub fn find_start(map: &TileMap) -> Option<Cell> {
    map.positions_of(START_GLYPH).next()
}

/// World position of a tile's centre.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn tile_center((col, row): Cell) -> Vec2 {
    Vec2::new(
        (col as f32).mul_add(TILE_SIZE, TILE_SIZE / 2.0),
        -(row as f32).mul_add(TILE_SIZE, TILE_SIZE / 2.0),
    )
}

/// Tile under a world position, if the position is not left of or above the map.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn world_to_tile(point: Vec2) -> Option<Cell> {
    let col = (point.x / TILE_SIZE).floor();
    let row = (-point.y / TILE_SIZE).floor();
    (col >= 0.0 && row >= 0.0 && col.is_finite() && row.is_finite())
        .then(|| (col as usize, row as usize))
}
