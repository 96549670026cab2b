//! Dog state machine: patrolling, hunting and attacking.

use bevy::prelude::*;
use rand::Rng;

use crate::gameplay::animation::{AnimationClip, AnimationCommand, Facing};
use crate::gameplay::wander::{Wander, WanderChange};

// === Tuning ===

/// Patrol speed factor. The applied velocity is `PATROL_SPEED * dt`.
pub const PATROL_SPEED: f32 = 4000.0;

/// Hunting speed factor. The applied velocity is `HUNT_SPEED * dt`.
pub const HUNT_SPEED: f32 = 8000.0;

/// A target this close (pixels, centre to centre) can be bitten.
pub const ATTACK_RANGE: f32 = 60.0;

/// Frame of the attack clip on which the bite lands.
pub const BITE_FRAME: usize = 3;

/// Damage of one bite.
pub const BITE_DAMAGE: f32 = 10.0;

// === States ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum DogMode {
    Patrolling,
    Hunting,
    Attacking,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DogEvent {
    SheepSighted(String),
    TargetLost,
    InRange,
    AttackFinished { in_range: bool },
}

/// Mode a dog moves to on `event`, or `None` if the event means nothing in `mode`.
#[must_use]
pub fn transition(mode: DogMode, event: &DogEvent) -> Option<DogMode> {
    match (mode, event) {
        (DogMode::Patrolling, DogEvent::SheepSighted(_))
        | (DogMode::Attacking, DogEvent::AttackFinished { in_range: false }) => {
            Some(DogMode::Hunting)
        }
        (DogMode::Hunting | DogMode::Attacking, DogEvent::TargetLost) => {
            Some(DogMode::Patrolling)
        }
        (DogMode::Hunting, DogEvent::InRange)
        | (DogMode::Attacking, DogEvent::AttackFinished { in_range: true }) => {
            Some(DogMode::Attacking)
        }
        _ => None,
    }
}

/// Distance from `from` to `to` and the unit direction toward it.
/// Coincident points give a zero direction.
#[must_use]
pub fn vector_info(from: Vec2, to: Vec2) -> (f32, Vec2) {
    let delta = to - from;
    (delta.length(), delta.normalize_or_zero())
}

// === Input / output ===

/// Where the hunted sheep is, as seen this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetView {
    pub position: Vec2,
    pub alive: bool,
}

/// The bits of the dog's animation the brain reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationView {
    pub clip: AnimationClip,
    pub frame: usize,
    pub finished: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct DogInput<'a> {
    pub dt: f32,
    pub position: Vec2,
    /// Nearest live sheep inside the detection sensor.
    pub sighted: Option<&'a str>,
    /// The current target, resolved by name. `None` when it no longer exists.
    pub target: Option<TargetView>,
    pub animation: AnimationView,
}

/// Side effects the dog's systems carry out.
#[derive(Debug, Clone, PartialEq)]
pub enum DogEffect {
    SpawnSensor,
    DespawnSensor(Entity),
    Bite { target: String, damage: f32 },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DogOutput {
    pub velocity: Vec2,
    pub facing: Option<Facing>,
    pub animation: Option<AnimationCommand>,
    pub effects: Vec<DogEffect>,
    /// The mode entered this tick, if any.
    pub entered: Option<DogMode>,
}

// === Brain ===

#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct DogBrain {
    /// `None` until the first tick enters patrolling.
    mode: Option<DogMode>,
    wander: Wander,
    target: Option<String>,
    bite_landed: bool,
    sensor: Option<Entity>,
}

impl DogBrain {
    #[must_use]
    pub const fn mode(&self) -> Option<DogMode> {
        self.mode
    }

    /// Name of the sheep being hunted or attacked.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    #[must_use]
    pub const fn sensor(&self) -> Option<Entity> {
        self.sensor
    }

    /// Records the sensor spawned for a [`DogEffect::SpawnSensor`].
    pub const fn set_sensor(&mut self, sensor: Entity) {
        self.sensor = Some(sensor);
    }

    #[must_use]
    pub const fn bite_landed(&self) -> bool {
        self.bite_landed
    }

    pub fn tick(&mut self, input: &DogInput, rng: &mut impl Rng) -> DogOutput {
        let mut out = DogOutput::default();

        let Some(mode) = self.mode else {
            self.enter(DogMode::Patrolling, rng, &mut out);
            return out;
        };

        let event = match mode {
            DogMode::Patrolling => self.patrol(input, rng, &mut out),
            DogMode::Hunting => self.hunt(input, &mut out),
            DogMode::Attacking => self.attack(input, &mut out),
        };

        let Some(event) = event else {
            return out;
        };
        if let Some(next) = transition(mode, &event) {
            match event {
                DogEvent::SheepSighted(name) => self.target = Some(name),
                DogEvent::TargetLost => self.target = None,
                DogEvent::InRange | DogEvent::AttackFinished { .. } => {}
            }
            self.exit(mode, &mut out);
            self.enter(next, rng, &mut out);
        }
        out
    }

    fn exit(&mut self, mode: DogMode, out: &mut DogOutput) {
        if mode != DogMode::Patrolling {
            return;
        }
        if let Some(sensor) = self.sensor.take() {
            out.effects.push(DogEffect::DespawnSensor(sensor));
        }
    }

    fn enter(&mut self, mode: DogMode, rng: &mut impl Rng, out: &mut DogOutput) {
        self.mode = Some(mode);
        out.entered = Some(mode);
        out.velocity = Vec2::ZERO;

        match mode {
            DogMode::Patrolling => {
                out.effects.push(DogEffect::SpawnSensor);
                self.wander = Wander::reset(rng);
                let heading = self.wander.heading();
                let clip = if heading.is_moving() {
                    out.facing = Some(heading.facing());
                    AnimationClip::Run
                } else {
                    AnimationClip::Idle
                };
                out.animation = Some(AnimationCommand::Play(clip));
            }
            DogMode::Hunting => {
                out.animation = Some(AnimationCommand::Play(AnimationClip::Run));
            }
            DogMode::Attacking => {
                self.bite_landed = false;
                out.animation = Some(AnimationCommand::Restart(AnimationClip::Attack));
            }
        }
    }

    fn patrol(
        &mut self,
        input: &DogInput,
        rng: &mut impl Rng,
        out: &mut DogOutput,
    ) -> Option<DogEvent> {
        match self.wander.advance(input.dt, rng) {
            Some(WanderChange::Started(heading)) => {
                out.facing = Some(heading.facing());
                out.animation = Some(AnimationCommand::Play(AnimationClip::Run));
            }
            Some(WanderChange::Stopped) => {
                out.animation = Some(AnimationCommand::Play(AnimationClip::Idle));
            }
            None => {}
        }
        out.velocity = self.wander.velocity(PATROL_SPEED, input.dt);

        input
            .sighted
            .map(|name| DogEvent::SheepSighted(name.to_owned()))
    }

    fn hunt(&self, input: &DogInput, out: &mut DogOutput) -> Option<DogEvent> {
        let Some(target) = input.target.filter(|target| target.alive) else {
            return Some(DogEvent::TargetLost);
        };
        out.facing = Some(Facing::toward(input.position, target.position));

        let (distance, direction) = vector_info(input.position, target.position);
        if distance <= ATTACK_RANGE {
            return Some(DogEvent::InRange);
        }
        out.velocity = direction * HUNT_SPEED * input.dt;
        out.animation = Some(AnimationCommand::Play(AnimationClip::Run));
        None
    }

    fn attack(&mut self, input: &DogInput, out: &mut DogOutput) -> Option<DogEvent> {
        let Some(target) = input.target.filter(|target| target.alive) else {
            return Some(DogEvent::TargetLost);
        };
        out.facing = Some(Facing::toward(input.position, target.position));

        let animation = input.animation;
        if animation.clip != AnimationClip::Attack {
            return None;
        }
        if animation.frame >= BITE_FRAME && !self.bite_landed {
            self.bite_landed = true;
            if let Some(name) = &self.target {
                out.effects.push(DogEffect::Bite {
                    target: name.clone(),
                    damage: BITE_DAMAGE,
                });
            }
        }
        if animation.finished {
            let (distance, _) = vector_info(input.position, target.position);
            return Some(DogEvent::AttackFinished {
                in_range: distance <= ATTACK_RANGE,
            });
        }
        None
    }
}
