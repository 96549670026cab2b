//! Depth-first route search from the start tile to the goal tile.

use std::collections::HashSet;

use bevy::prelude::*;

use super::{Cell, MapError, Tile, TileMap, find_start};

/// One grid step. Corridors only ever run sideways or downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum Move {
    Left,
    Right,
    Down,
}

/// Order in which neighbours are tried from each cell.
const SEARCH_ORDER: [Move; 3] = [Move::Right, Move::Left, Move::Down];

impl Move {
    /// Unit direction in world space (y up).
    #[must_use]
    pub const fn direction(self) -> Vec2 {
        match self {
            Self::Left => Vec2::NEG_X,
            Self::Right => Vec2::X,
            Self::Down => Vec2::NEG_Y,
        }
    }

    /// Neighbouring cell, or `None` when it would leave the grid's top-left edge.
    #[must_use]
    pub fn apply(self, (col, row): Cell) -> Option<Cell> {
        match self {
            Self::Left => col.checked_sub(1).map(|col| (col, row)),
            Self::Right => Some((col + 1, row)),
            Self::Down => Some((col, row + 1)),
        }
    }
}

/// Result of a successful traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Traversal {
    start: Cell,
    goal: Cell,
    steps: Vec<Move>,
    moves: Vec<Move>,
}

impl Traversal {
    #[must_use]
    pub const fn start(&self) -> Cell {
        self.start
    }

    #[must_use]
    pub const fn goal(&self) -> Cell {
        self.goal
    }

    /// Every single-tile step from start to goal.
    #[must_use]
    pub fn steps(&self) -> &[Move] {
        &self.steps
    }

    /// Direction changes only. A follower starts heading right, so a
    /// leading run of `Right` steps is dropped too.
    #[must_use]
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }
}

/// Searches a map for a route from `x` to `o` that only moves right, left or down.
///
/// The search backtracks out of dead ends, so it either reaches the goal or
/// reports [`MapError::Unreachable`].
#[derive(Debug)]
pub struct MapTraverser<'a> {
    map: &'a TileMap,
    visited: HashSet<Cell>,
}

impl<'a> MapTraverser<'a> {
    #[must_use]
    pub fn new(map: &'a TileMap) -> Self {
        Self {
            map,
            visited: HashSet::new(),
        }
    }

    pub fn traverse(mut self) -> Result<Traversal, MapError> {
        let start = find_start(self.map).ok_or(MapError::NoStart)?;
        self.visited.insert(start);

        // Each frame holds a cell and the index of the next neighbour to try.
        let mut stack: Vec<(Cell, usize)> = vec![(start, 0)];
        let mut steps: Vec<Move> = Vec::new();

        loop {
            let Some(&(cell, tried)) = stack.last() else {
                return Err(MapError::Unreachable);
            };
            if self.map.tile(cell) == Some(Tile::Goal) {
                let moves = collapse(&steps);
                return Ok(Traversal {
                    start,
                    goal: cell,
                    steps,
                    moves,
                });
            }

            let next = SEARCH_ORDER
                .iter()
                .enumerate()
                .skip(tried)
                .find_map(|(index, &mv)| self.open_neighbour(cell, mv).map(|to| (index, mv, to)));

            match next {
                Some((index, mv, to)) => {
                    if let Some(frame) = stack.last_mut() {
                        frame.1 = index + 1;
                    }
                    self.visited.insert(to);
                    steps.push(mv);
                    stack.push((to, 0));
                }
                None => {
                    stack.pop();
                    steps.pop();
                }
            }
        }
    }

    fn open_neighbour(&self, cell: Cell, mv: Move) -> Option<Cell> {
        let to = mv.apply(cell)?;
        let open = !self.visited.contains(&to)
            && self.map.tile(to).is_some_and(Tile::is_traversable);
        open.then_some(to)
    }
}

/// Drops steps that repeat the previous direction, starting from `Right`.
fn collapse(steps: &[Move]) -> Vec<Move> {
    let mut previous = Move::Right;
    steps
        .iter()
        .copied()
        .filter(|&mv| {
            let changed = mv != previous;
            previous = mv;
            changed
        })
        .collect()
}
