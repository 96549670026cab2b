//! Following a precomputed traversal: go until blocked, then take the next move.

use bevy::prelude::*;

use crate::gameplay::map::{Cell, MapError, MapTraverser, Move, TileMap};

/// How far ahead of the sheep's centre the next tile is sampled (pixels).
pub const LOOKAHEAD: f32 = 5.0;

/// What the follower wants this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStep {
    /// Keep moving this way.
    Advance(Move),
    /// The way ahead was blocked, switched to this move.
    Turn(Move),
    /// Ran out of moves this tick.
    Arrived,
    /// Already arrived earlier.
    Stopped,
}

/// The collapsed move list of a traversal and the position in it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Reflect)]
pub struct PathFollower {
    moves: Vec<Move>,
    next: usize,
    heading: Option<Move>,
}

impl PathFollower {
    /// Traverses `map` and returns a follower heading right, plus the start
    /// tile it should be placed on.
    pub fn plan(map: &TileMap) -> Result<(Self, Cell), MapError> {
        let traversal = MapTraverser::new(map).traverse()?;
        let follower = Self {
            moves: traversal.moves().to_vec(),
            next: 0,
            heading: Some(Move::Right),
        };
        Ok((follower, traversal.start()))
    }

    #[must_use]
    pub const fn heading(&self) -> Option<Move> {
        self.heading
    }

    /// Moves not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> &[Move] {
        self.moves.get(self.next..).unwrap_or_default()
    }

    /// Samples the tile [`LOOKAHEAD`] pixels ahead of `position`. A walkable
    /// tile keeps the heading, anything else consumes the next move.
    pub fn step(&mut self, map: &TileMap, position: Vec2) -> PathStep {
        let Some(heading) = self.heading else {
            return PathStep::Stopped;
        };
        let ahead = position + heading.direction() * LOOKAHEAD;
        if map.is_walkable_at(ahead) {
            return PathStep::Advance(heading);
        }

        match self.moves.get(self.next).copied() {
            Some(turn) => {
                self.next += 1;
                self.heading = Some(turn);
                PathStep::Turn(turn)
            }
            None => {
                self.heading = None;
                PathStep::Arrived
            }
        }
    }
}
