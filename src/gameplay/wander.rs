//! Random idle/left/right cycling used by grazing sheep and patrolling dogs.

use bevy::prelude::*;
use rand::Rng;

use super::animation::Facing;

/// The cycle limit is `rand[0, CYCLE_STEPS) * CYCLE_STEP_SECS`, so at most 2s.
const CYCLE_STEPS: f32 = 10.0;
const CYCLE_STEP_SECS: f32 = 0.2;

/// Horizontal heading of a wandering agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum Heading {
    Left,
    Right,
    #[default]
    Idle,
}

impl Heading {
    /// -1, 1 or 0.
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
            Self::Idle => 0.0,
        }
    }

    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::Idle => Self::Idle,
        }
    }

    /// Facing for a moving heading. Idle looks right.
    #[must_use]
    pub const fn facing(self) -> Facing {
        match self {
            Self::Left => Facing::Left,
            Self::Right | Self::Idle => Facing::Right,
        }
    }

    #[must_use]
    pub const fn is_moving(self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// What a cycle boundary did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WanderChange {
    Started(Heading),
    Stopped,
}

/// One wander cycle: a heading held until the elapsed time passes a random limit.
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct Wander {
    heading: Heading,
    last_heading: Heading,
    elapsed: f32,
    limit: f32,
}

impl Default for Wander {
    fn default() -> Self {
        Self {
            heading: Heading::Idle,
            last_heading: Heading::Right,
            elapsed: 0.0,
            limit: 0.0,
        }
    }
}

/// A fresh cycle limit in `[0, 2)` seconds.
pub fn random_cycle_limit(rng: &mut impl Rng) -> f32 {
    rng.random_range(0.0..CYCLE_STEPS) * CYCLE_STEP_SECS
}

impl Wander {
    /// Random heading in {left, right, idle}, random limit, last heading right.
    pub fn reset(rng: &mut impl Rng) -> Self {
        let heading = match rng.random_range(0..3) {
            0 => Heading::Left,
            1 => Heading::Right,
            _ => Heading::Idle,
        };
        Self {
            heading,
            last_heading: Heading::Right,
            elapsed: 0.0,
            limit: random_cycle_limit(rng),
        }
    }

    #[must_use]
    pub const fn heading(&self) -> Heading {
        self.heading
    }

    #[must_use]
    pub const fn limit(&self) -> f32 {
        self.limit
    }

    /// Velocity for this tick: `heading * speed * dt`.
    #[must_use]
    pub fn velocity(&self, speed: f32, dt: f32) -> Vec2 {
        Vec2::new(self.heading.sign() * speed * dt, 0.0)
    }

    /// Accumulates `dt`. Past the limit the cycle restarts with a new limit:
    /// an idle agent starts moving opposite to its last heading, a moving
    /// agent goes idle.
    pub fn advance(&mut self, dt: f32, rng: &mut impl Rng) -> Option<WanderChange> {
        self.elapsed += dt;
        if self.elapsed <= self.limit {
            return None;
        }
        self.elapsed = 0.0;
        self.limit = random_cycle_limit(rng);

        if self.heading.is_moving() {
            self.last_heading = self.heading;
            self.heading = Heading::Idle;
            Some(WanderChange::Stopped)
        } else {
            self.heading = self.last_heading.opposite();
            self.last_heading = self.heading;
            Some(WanderChange::Started(self.heading))
        }
    }

    /// Forces idle with a fresh limit.
    pub fn interrupt(&mut self, rng: &mut impl Rng) {
        if self.heading.is_moving() {
            self.last_heading = self.heading;
        }
        self.heading = Heading::Idle;
        self.elapsed = 0.0;
        self.limit = random_cycle_limit(rng);
    }
}
