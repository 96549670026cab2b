//! Sheep state machine: grazing, walking and pathing.
//!
//! The brain is plain data. Each tick it takes a [`SheepInput`] and returns a
//! [`SheepOutput`] describing what the sheep's body, sprite and animation
//! should do; `run_sheep_brains` applies it.

use bevy::prelude::*;
use rand::Rng;

use super::pathing::{PathFollower, PathStep};
use crate::gameplay::animation::{AnimationClip, AnimationCommand, Facing};
use crate::gameplay::map::{MapError, Move, TileMap, tile_center};
use crate::gameplay::wander::{Heading, Wander, WanderChange};

/// Speed factor for every sheep mode. The applied velocity is `SHEEP_SPEED * dt`.
pub const SHEEP_SPEED: f32 = 3000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum SheepMode {
    #[default]
    Grazing,
    Walking,
    Pathing,
}

/// Requests that change a sheep's mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheepEvent {
    Graze,
    Walk(Heading),
    StartPathing,
}

/// Mode a sheep moves to on `event`. Every event is accepted from every mode
/// except a walk without a heading.
#[must_use]
pub const fn transition(_mode: SheepMode, event: SheepEvent) -> Option<SheepMode> {
    match event {
        SheepEvent::Graze => Some(SheepMode::Grazing),
        SheepEvent::Walk(Heading::Idle) => None,
        SheepEvent::Walk(_) => Some(SheepMode::Walking),
        SheepEvent::StartPathing => Some(SheepMode::Pathing),
    }
}

/// What the brain sees this tick.
#[derive(Debug, Clone, Copy)]
pub struct SheepInput<'a> {
    pub dt: f32,
    pub position: Vec2,
    /// Started touching another sheep since the last tick.
    pub bumped: bool,
    pub map: Option<&'a TileMap>,
}

/// What the brain wants done this tick.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheepOutput {
    pub velocity: Vec2,
    pub facing: Option<Facing>,
    pub animation: Option<AnimationCommand>,
    pub teleport: Option<Vec2>,
    /// The mode entered this tick, if any.
    pub entered: Option<SheepMode>,
    /// Why pathing could not start.
    pub path_error: Option<MapError>,
}

#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct SheepBrain {
    mode: SheepMode,
    pending: Option<SheepMode>,
    wander: Wander,
    walk_heading: Heading,
    path: Option<PathFollower>,
}

impl Default for SheepBrain {
    fn default() -> Self {
        Self::new(SheepMode::Grazing)
    }
}

impl SheepBrain {
    /// A brain that enters `initial` on its first tick.
    #[must_use]
    pub fn new(initial: SheepMode) -> Self {
        Self {
            mode: initial,
            pending: Some(initial),
            wander: Wander::default(),
            walk_heading: Heading::Idle,
            path: None,
        }
    }

    #[must_use]
    pub const fn mode(&self) -> SheepMode {
        self.mode
    }

    #[must_use]
    pub const fn wander(&self) -> &Wander {
        &self.wander
    }

    #[must_use]
    pub const fn path(&self) -> Option<&PathFollower> {
        self.path.as_ref()
    }

    /// Queues the transition for `event`. It takes effect on the next tick.
    /// Returns false when the event is refused.
    pub fn handle(&mut self, event: SheepEvent) -> bool {
        let Some(next) = transition(self.pending.unwrap_or(self.mode), event) else {
            return false;
        };
        if let SheepEvent::Walk(heading) = event {
            self.walk_heading = heading;
        }
        self.pending = Some(next);
        true
    }

    pub fn tick(&mut self, input: &SheepInput, rng: &mut impl Rng) -> SheepOutput {
        let mut out = SheepOutput::default();

        if let Some(next) = self.pending.take() {
            self.exit();
            self.enter(next, input, rng, &mut out);
        }

        match self.mode {
            SheepMode::Grazing => self.graze(input, rng, &mut out),
            SheepMode::Walking => {
                out.velocity = Vec2::new(self.walk_heading.sign() * SHEEP_SPEED * input.dt, 0.0);
            }
            SheepMode::Pathing => self.follow_path(input, &mut out),
        }
        out
    }

    fn exit(&mut self) {
        if self.mode == SheepMode::Pathing {
            self.path = None;
        }
    }

    fn enter(
        &mut self,
        mode: SheepMode,
        input: &SheepInput,
        rng: &mut impl Rng,
        out: &mut SheepOutput,
    ) {
        self.mode = mode;
        out.entered = Some(mode);

        match mode {
            SheepMode::Grazing => {
                self.wander = Wander::reset(rng);
                let heading = self.wander.heading();
                if heading.is_moving() {
                    out.facing = Some(heading.facing());
                }
                out.animation = Some(AnimationCommand::Play(AnimationClip::Graze));
            }
            SheepMode::Walking => {
                out.facing = Some(self.walk_heading.facing());
                out.animation = Some(AnimationCommand::Play(AnimationClip::Graze));
            }
            SheepMode::Pathing => {
                let planned = input
                    .map
                    .ok_or(MapError::Empty)
                    .and_then(PathFollower::plan);
                match planned {
                    Ok((follower, start)) => {
                        self.path = Some(follower);
                        out.teleport = Some(tile_center(start));
                        out.facing = Some(Facing::Right);
                        out.animation = Some(AnimationCommand::Play(AnimationClip::Graze));
                    }
                    Err(error) => {
                        self.path = None;
                        out.path_error = Some(error);
                        out.animation = Some(AnimationCommand::Stop);
                    }
                }
            }
        }
    }

    fn graze(&mut self, input: &SheepInput, rng: &mut impl Rng, out: &mut SheepOutput) {
        if input.bumped {
            if self.wander.heading().is_moving() {
                out.animation = Some(AnimationCommand::Stop);
            }
            self.wander.interrupt(rng);
        } else {
            match self.wander.advance(input.dt, rng) {
                Some(WanderChange::Started(heading)) => {
                    out.facing = Some(heading.facing());
                    out.animation = Some(AnimationCommand::Play(AnimationClip::Graze));
                }
                Some(WanderChange::Stopped) => out.animation = Some(AnimationCommand::Stop),
                None => {}
            }
        }
        out.velocity = self.wander.velocity(SHEEP_SPEED, input.dt);
    }

    fn follow_path(&mut self, input: &SheepInput, out: &mut SheepOutput) {
        let (Some(path), Some(map)) = (self.path.as_mut(), input.map) else {
            return;
        };
        let position = out.teleport.unwrap_or(input.position);

        match path.step(map, position) {
            PathStep::Advance(mv) => out.velocity = mv.direction() * SHEEP_SPEED * input.dt,
            PathStep::Turn(mv) => {
                match mv {
                    Move::Left => out.facing = Some(Facing::Left),
                    Move::Right => out.facing = Some(Facing::Right),
                    Move::Down => {}
                }
                out.velocity = mv.direction() * SHEEP_SPEED * input.dt;
            }
            PathStep::Arrived => out.animation = Some(AnimationCommand::Stop),
            PathStep::Stopped => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use pretty_assertions::assert_eq;

    const DT: f32 = 1.0 / 60.0;

    fn input(map: Option<&TileMap>) -> SheepInput<'_> {
        SheepInput {
            dt: DT,
            position: Vec2::ZERO,
            bumped: false,
            map,
        }
    }

    #[test]
    fn transition_refuses_only_idle_walks() {
        for mode in [SheepMode::Grazing, SheepMode::Walking, SheepMode::Pathing] {
            assert_eq!(transition(mode, SheepEvent::Graze), Some(SheepMode::Grazing));
            assert_eq!(
                transition(mode, SheepEvent::Walk(Heading::Left)),
                Some(SheepMode::Walking)
            );
            assert_eq!(transition(mode, SheepEvent::Walk(Heading::Idle)), None);
            assert_eq!(
                transition(mode, SheepEvent::StartPathing),
                Some(SheepMode::Pathing)
            );
        }
    }

    #[test]
    fn first_tick_enters_grazing_and_plays_graze() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut brain = SheepBrain::default();
        let paused = SheepInput {
            dt: 0.0,
            ..input(None)
        };

        let out = brain.tick(&paused, &mut rng);

        assert_eq!(out.entered, Some(SheepMode::Grazing));
        assert_eq!(
            out.animation,
            Some(AnimationCommand::Play(AnimationClip::Graze))
        );
        assert_eq!(out.velocity, Vec2::ZERO);
        assert_eq!(brain.wander().heading().is_moving(), out.facing.is_some());

        let second = brain.tick(&input(None), &mut rng);
        assert_eq!(second.entered, None);
    }

    #[test]
    fn events_take_effect_on_the_next_tick() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut brain = SheepBrain::default();
        brain.tick(&input(None), &mut rng);

        assert!(brain.handle(SheepEvent::Walk(Heading::Left)));
        assert_eq!(brain.mode(), SheepMode::Grazing);

        let out = brain.tick(&input(None), &mut rng);
        assert_eq!(brain.mode(), SheepMode::Walking);
        assert_eq!(out.facing, Some(Facing::Left));
        assert_eq!(out.velocity, Vec2::new(-SHEEP_SPEED * DT, 0.0));
    }

    #[test]
    fn idle_walk_is_ignored() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut brain = SheepBrain::default();
        brain.tick(&input(None), &mut rng);

        assert!(!brain.handle(SheepEvent::Walk(Heading::Idle)));
        let out = brain.tick(&input(None), &mut rng);
        assert_eq!(out.entered, None);
        assert_eq!(brain.mode(), SheepMode::Grazing);
    }

    #[test]
    fn bumping_while_moving_goes_idle() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut brain = SheepBrain::new(SheepMode::Grazing);
        brain.tick(&input(None), &mut rng);
        // Walk until the wander cycle has the sheep moving.
        for _ in 0..1_000 {
            if brain.wander().heading().is_moving() {
                break;
            }
            brain.tick(&input(None), &mut rng);
        }
        assert!(brain.wander().heading().is_moving());

        let bumped = SheepInput {
            bumped: true,
            ..input(None)
        };
        let out = brain.tick(&bumped, &mut rng);

        assert_eq!(brain.wander().heading(), Heading::Idle);
        assert_eq!(out.velocity, Vec2::ZERO);
        assert_eq!(out.animation, Some(AnimationCommand::Stop));
    }

    #[test]
    fn bumping_while_idle_restarts_the_idle_cycle() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut brain = SheepBrain::new(SheepMode::Grazing);
        brain.tick(&input(None), &mut rng);
        for _ in 0..1_000 {
            if !brain.wander().heading().is_moving() {
                break;
            }
            brain.tick(&input(None), &mut rng);
        }
        assert_eq!(brain.wander().heading(), Heading::Idle);

        let bumped = SheepInput {
            bumped: true,
            ..input(None)
        };
        let out = brain.tick(&bumped, &mut rng);

        assert_eq!(brain.wander().heading(), Heading::Idle);
        assert_eq!(out.velocity, Vec2::ZERO);
        assert_eq!(out.animation, None);
    }

    #[test]
    fn pathing_teleports_to_start_and_heads_right() {
        let mut rng = StdRng::seed_from_u64(3);
        let map = TileMap::parse(&["xpp", "  p", "  o"]).unwrap();
        let mut brain = SheepBrain::new(SheepMode::Pathing);

        let out = brain.tick(&input(Some(&map)), &mut rng);

        assert_eq!(out.teleport, Some(tile_center((0, 0))));
        assert_eq!(out.facing, Some(Facing::Right));
        assert_eq!(out.velocity, Vec2::new(SHEEP_SPEED * DT, 0.0));
    }

    #[test]
    fn pathing_without_start_stands_still() {
        let mut rng = StdRng::seed_from_u64(3);
        let map = TileMap::parse(&["pp", "po"]).unwrap();
        let mut brain = SheepBrain::default();
        brain.tick(&input(Some(&map)), &mut rng);
        brain.handle(SheepEvent::StartPathing);

        let out = brain.tick(&input(Some(&map)), &mut rng);

        assert_eq!(brain.mode(), SheepMode::Pathing);
        assert_eq!(out.path_error, Some(MapError::NoStart));
        assert_eq!(out.velocity, Vec2::ZERO);
        assert_eq!(out.teleport, None);
        assert!(brain.path().is_none());
    }

    #[test]
    fn leaving_pathing_drops_the_path() {
        let mut rng = StdRng::seed_from_u64(3);
        let map = TileMap::default_layout();
        let mut brain = SheepBrain::new(SheepMode::Pathing);
        brain.tick(&input(Some(&map)), &mut rng);
        assert!(brain.path().is_some());

        brain.handle(SheepEvent::Graze);
        brain.tick(&input(Some(&map)), &mut rng);

        assert_eq!(brain.mode(), SheepMode::Grazing);
        assert!(brain.path().is_none());
    }
}
