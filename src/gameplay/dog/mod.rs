//! Dogs: predators that patrol, hunt the nearest sheep and bite it.

mod brain;
mod sensor;

pub use brain::{
    ATTACK_RANGE, AnimationView, BITE_DAMAGE, BITE_FRAME, DogBrain, DogEffect, DogEvent, DogInput,
    DogMode, DogOutput, HUNT_SPEED, PATROL_SPEED, TargetView, transition, vector_info,
};
pub use sensor::{PatrolSensor, SENSOR_RADIUS, Sighting, nearest_sighting};

use avian2d::prelude::*;
use bevy::prelude::*;

use super::GameRng;
use super::animation::{AnimationClip, Facing, SpriteAnimation};
use super::combat::{DEFAULT_MAX_HEALTH, DamageRequest, DeathBehavior, Health, HealthBarConfig};
use super::registry::{AgentKind, SpawnError, WorldRegistry};
use super::sheep::Sheep;
use crate::third_party::CollisionLayer;
use crate::{GameSet, GameState, Z_AGENT, gameplay_running};

// === Constants ===

/// Collision radius of a dog body.
pub const DOG_RADIUS: f32 = 14.0;

/// Side of the square dog sprite.
const DOG_SIZE: f32 = 28.0;

/// Dog sprite colour.
pub const DOG_COLOR: Color = Color::srgb(0.45, 0.3, 0.2);

// === Components ===

#[derive(Component, Debug, Clone, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct Dog {
    pub name: String,
}

// === Spawning ===

#[derive(Debug, Clone)]
pub struct DogOptions {
    pub name: String,
    pub position: Vec2,
    /// `None` spawns a dog that cannot be hurt.
    pub max_health: Option<f32>,
    pub death: DeathBehavior,
}

impl DogOptions {
    #[must_use]
    pub fn new(name: impl Into<String>, position: Vec2) -> Self {
        Self {
            name: name.into(),
            position,
            max_health: Some(DEFAULT_MAX_HEALTH),
            death: DeathBehavior::Despawn,
        }
    }

    #[must_use]
    pub const fn with_max_health(mut self, max_health: Option<f32>) -> Self {
        self.max_health = max_health;
        self
    }
}

/// Spawns a dog and registers it under its name. The patrol sensor is
/// spawned by the brain on its first tick.
pub fn spawn_dog(
    commands: &mut Commands,
    registry: &mut WorldRegistry,
    options: DogOptions,
) -> Result<Entity, SpawnError> {
    registry.check_dog_name(&options.name)?;
    if !options.position.is_finite() {
        return Err(SpawnError::InvalidPosition {
            kind: AgentKind::Dog,
            name: options.name,
        });
    }

    let mut dog = commands.spawn((
        Name::new(format!("Dog {}", options.name)),
        Dog {
            name: options.name.clone(),
        },
        DogBrain::default(),
        Facing::default(),
        SpriteAnimation::new(AnimationClip::Idle),
        Sprite::from_color(DOG_COLOR, Vec2::splat(DOG_SIZE)),
        Transform::from_translation(options.position.extend(Z_AGENT)),
        DespawnOnExit(GameState::InGame),
        RigidBody::Kinematic,
        Collider::circle(DOG_RADIUS),
        CollisionLayers::new(CollisionLayer::Body, CollisionLayer::Body),
        LockedAxes::ROTATION_LOCKED,
        LinearVelocity::ZERO,
    ));
    if let Some(max) = options.max_health {
        dog.insert((Health::new(max), HealthBarConfig::default(), options.death));
    }

    let entity = dog.id();
    registry.register_dog(&options.name, entity)?;
    Ok(entity)
}

fn spawn_sensor(commands: &mut Commands, dog: Entity) -> Entity {
    commands
        .spawn((
            Name::new("Patrol Sensor"),
            PatrolSensor,
            Collider::circle(SENSOR_RADIUS),
            Sensor,
            CollisionLayers::new(CollisionLayer::Sensor, CollisionLayer::Body),
            CollidingEntities::default(),
            Transform::default(),
            ChildOf(dog),
        ))
        .id()
}

// === Brains ===

/// Ticks every dog brain: feeds it what its sensor sees and where its target
/// is, then applies movement, facing, animation and side effects.
fn run_dog_brains(
    time: Res<Time>,
    registry: Res<WorldRegistry>,
    mut rng: ResMut<GameRng>,
    mut dogs: Query<(
        Entity,
        &Dog,
        &mut DogBrain,
        &Transform,
        &mut LinearVelocity,
        &mut Facing,
        &mut SpriteAnimation,
    )>,
    sensors: Query<&CollidingEntities, With<PatrolSensor>>,
    flock: Query<(&Sheep, &Transform, Option<&Health>), Without<Dog>>,
    mut bites: MessageWriter<DamageRequest>,
    mut commands: Commands,
) {
    let dt = time.delta_secs();
    let rng = &mut rng.0;

    for (entity, dog, mut brain, transform, mut velocity, mut facing, mut animation) in &mut dogs {
        let position = transform.translation.truncate();

        let overlapping = brain
            .sensor()
            .and_then(|sensor| sensors.get(sensor).ok())
            .into_iter()
            .flat_map(|touching| touching.0.iter())
            .filter_map(|&other| flock.get(other).ok());
        let sighted = nearest_sighting(
            position,
            overlapping.map(|(sheep, sheep_transform, health)| Sighting {
                name: &sheep.name,
                position: sheep_transform.translation.truncate(),
                alive: health.is_none_or(Health::is_alive),
            }),
        );

        let target = brain
            .target()
            .and_then(|name| registry.sheep(name))
            .and_then(|sheep| flock.get(sheep).ok())
            .map(|(_, sheep_transform, health)| TargetView {
                position: sheep_transform.translation.truncate(),
                alive: health.is_none_or(Health::is_alive),
            });

        let input = DogInput {
            dt,
            position,
            sighted,
            target,
            animation: AnimationView {
                clip: animation.clip(),
                frame: animation.frame(),
                finished: animation.is_finished(),
            },
        };
        let out = brain.tick(&input, &mut *rng);

        if let Some(mode) = out.entered {
            debug!("dog {} is now {mode:?}", dog.name);
        }
        velocity.0 = out.velocity;
        if let Some(new_facing) = out.facing {
            facing.set_if_neq(new_facing);
        }
        if let Some(command) = out.animation {
            command.apply(&mut animation);
        }

        for effect in out.effects {
            match effect {
                DogEffect::SpawnSensor => {
                    let sensor = spawn_sensor(&mut commands, entity);
                    brain.set_sensor(sensor);
                }
                DogEffect::DespawnSensor(sensor) => {
                    commands.entity(sensor).try_despawn();
                }
                DogEffect::Bite { target, damage } => {
                    let Some(victim) = registry.sheep(&target) else {
                        continue;
                    };
                    debug!("dog {} bites {target}", dog.name);
                    bites.write(DamageRequest {
                        target: victim,
                        amount: damage,
                        source: Some(entity),
                    });
                }
            }
        }
    }
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Dog>()
        .register_type::<DogBrain>()
        .register_type::<PatrolSensor>();

    app.add_systems(
        Update,
        run_dog_brains
            .in_set(GameSet::Ai)
            .run_if(gameplay_running),
    );
}
