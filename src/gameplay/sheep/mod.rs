//! Sheep: the player's flock.

mod brain;
mod pathing;

pub use brain::{
    SHEEP_SPEED, SheepBrain, SheepEvent, SheepInput, SheepMode, SheepOutput, transition,
};
pub use pathing::{LOOKAHEAD, PathFollower, PathStep};

use std::collections::HashSet;

use avian2d::prelude::*;
use bevy::ecs::entity::EntityHashSet;
use bevy::prelude::*;

use super::GameRng;
use super::animation::{AnimationClip, Facing, SpriteAnimation};
use super::combat::{DEFAULT_MAX_HEALTH, DamageRequest, DeathBehavior, Health, HealthBarConfig};
use super::registry::{AgentKind, SpawnError, WorldRegistry};
use super::render::SelectionOutline;
use super::selection::{Selectable, SelectionChanged};
use super::wander::Heading;
use crate::third_party::CollisionLayer;
use crate::{GameSet, GameState, Z_AGENT, gameplay_running};

// === Constants ===

/// Collision radius of a sheep body.
pub const SHEEP_RADIUS: f32 = 12.0;

/// Side of the square sheep sprite.
const SHEEP_SIZE: f32 = 24.0;

/// Colour of the selection outline drawn behind a selected sheep.
const OUTLINE_COLOR: Color = Color::srgb(1.0, 0.95, 0.3);

// === Components ===

/// A named member of the flock.
#[derive(Component, Debug, Clone, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct Sheep {
    pub name: String,
    pub kind: SheepKind,
}

/// Other sheep this one touched on the previous brain tick. A bump is a
/// neighbour that is not in here yet.
#[derive(Component, Debug, Clone, Default)]
pub struct SheepContacts(EntityHashSet);

impl SheepContacts {
    /// Replaces the remembered contacts and reports whether any are new.
    pub fn refresh(&mut self, current: EntityHashSet) -> bool {
        let bumped = current.iter().any(|other| !self.0.contains(other));
        self.0 = current;
        bumped
    }
}

/// Role of a sheep. Changing it only changes the sprite colour and, for
/// bombers, what happens when the sheep is hurt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum SheepKind {
    #[default]
    Standard,
    Bomber,
    Shielder,
    Commando,
}

impl SheepKind {
    /// All kinds, for iteration.
    pub const ALL: &[Self] = &[Self::Standard, Self::Bomber, Self::Shielder, Self::Commando];

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::Bomber => "Bomber",
            Self::Shielder => "Shielder",
            Self::Commando => "Commando",
        }
    }

    /// Bombers explode every time they take damage.
    #[must_use]
    pub const fn explodes_on_damage(self) -> bool {
        matches!(self, Self::Bomber)
    }

    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            Self::Standard => Color::srgb(0.95, 0.95, 0.92),
            Self::Bomber => Color::srgb(0.9, 0.35, 0.2),
            Self::Shielder => Color::srgb(0.35, 0.55, 0.95),
            Self::Commando => Color::srgb(0.3, 0.6, 0.3),
        }
    }
}

// === Spawning ===

/// Everything needed to create a sheep.
#[derive(Debug, Clone)]
pub struct SheepOptions {
    pub name: String,
    pub position: Vec2,
    pub kind: SheepKind,
    pub initial_mode: SheepMode,
    /// `None` spawns a sheep that cannot be hurt.
    pub max_health: Option<f32>,
    pub selectable: bool,
    pub death: DeathBehavior,
}

impl SheepOptions {
    #[must_use]
    pub fn new(name: impl Into<String>, position: Vec2) -> Self {
        Self {
            name: name.into(),
            position,
            kind: SheepKind::Standard,
            initial_mode: SheepMode::Grazing,
            max_health: Some(DEFAULT_MAX_HEALTH),
            selectable: true,
            death: DeathBehavior::Despawn,
        }
    }

    #[must_use]
    pub const fn with_kind(mut self, kind: SheepKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub const fn with_mode(mut self, mode: SheepMode) -> Self {
        self.initial_mode = mode;
        self
    }

    #[must_use]
    pub const fn with_max_health(mut self, max_health: Option<f32>) -> Self {
        self.max_health = max_health;
        self
    }

    #[must_use]
    pub const fn with_selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    #[must_use]
    pub const fn with_death(mut self, death: DeathBehavior) -> Self {
        self.death = death;
        self
    }
}

/// Spawns a sheep and registers it under its name.
/// Single source of truth for the sheep archetype.
///
/// Fails without touching the registry when the name is blank or taken, or
/// the position is not finite.
pub fn spawn_sheep(
    commands: &mut Commands,
    registry: &mut WorldRegistry,
    options: SheepOptions,
) -> Result<Entity, SpawnError> {
    registry.check_sheep_name(&options.name)?;
    if !options.position.is_finite() {
        return Err(SpawnError::InvalidPosition {
            kind: AgentKind::Sheep,
            name: options.name,
        });
    }

    let mut sheep = commands.spawn((
        Name::new(format!("Sheep {}", options.name)),
        Sheep {
            name: options.name.clone(),
            kind: options.kind,
        },
        SheepBrain::new(options.initial_mode),
        Facing::default(),
        SpriteAnimation::new(AnimationClip::Graze),
        Sprite::from_color(options.kind.color(), Vec2::splat(SHEEP_SIZE)),
        Transform::from_translation(options.position.extend(Z_AGENT)),
        DespawnOnExit(GameState::InGame),
    ));
    sheep.insert((
        RigidBody::Dynamic,
        Collider::circle(SHEEP_RADIUS),
        CollisionLayers::new(
            CollisionLayer::Body,
            [CollisionLayer::Body, CollisionLayer::Sensor],
        ),
        LockedAxes::ROTATION_LOCKED,
        LinearVelocity::ZERO,
        CollidingEntities::default(),
        SheepContacts::default(),
    ));

    if let Some(max) = options.max_health {
        sheep.insert((Health::new(max), HealthBarConfig::default(), options.death));
    }
    if options.selectable {
        sheep.insert(Selectable::default()).with_children(|parent| {
            parent.spawn((
                Name::new("Selection Outline"),
                SelectionOutline,
                Sprite::from_color(OUTLINE_COLOR, Vec2::splat(SHEEP_SIZE + 6.0)),
                Transform::from_xyz(0.0, 0.0, -0.5),
                Visibility::Hidden,
            ));
        });
    }

    let entity = sheep.id();
    registry.register_sheep(&options.name, entity)?;
    Ok(entity)
}

// === Orders ===

/// Something to do to one sheep, addressed by name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Order {
    Damage(f32),
    SetKind(SheepKind),
    ToggleSelected,
    StartPathing,
    Graze,
    Walk(Heading),
    Destroy,
}

#[derive(Message, Debug, Clone, PartialEq)]
pub struct SheepOrder {
    pub sheep: String,
    pub order: Order,
}

impl SheepOrder {
    #[must_use]
    pub fn new(sheep: impl Into<String>, order: Order) -> Self {
        Self {
            sheep: sheep.into(),
            order,
        }
    }
}

/// Resolves each order's name through the registry and applies it.
/// Orders for unknown names are logged and dropped.
fn apply_sheep_orders(
    mut orders: MessageReader<SheepOrder>,
    mut registry: ResMut<WorldRegistry>,
    mut flock: Query<(&mut Sheep, &mut SheepBrain, Option<&mut Selectable>)>,
    mut damage: MessageWriter<DamageRequest>,
    mut selection: MessageWriter<SelectionChanged>,
    mut commands: Commands,
) {
    let mut destroyed = HashSet::new();

    for SheepOrder { sheep: name, order } in orders.read() {
        let Some(entity) = registry.sheep(name).filter(|e| !destroyed.contains(e)) else {
            warn!("ignoring {order:?} for unknown sheep {name:?}");
            continue;
        };
        let Ok((mut sheep, mut brain, selectable)) = flock.get_mut(entity) else {
            warn!("ignoring {order:?} for sheep {name:?}: entity is gone");
            continue;
        };

        match *order {
            Order::Damage(amount) => {
                damage.write(DamageRequest {
                    target: entity,
                    amount,
                    source: None,
                });
            }
            Order::SetKind(kind) => sheep.kind = kind,
            Order::ToggleSelected => {
                let Some(mut selectable) = selectable else {
                    warn!("sheep {name:?} cannot be selected");
                    continue;
                };
                let selected = registry.toggle_selection(name, &mut selectable);
                selection.write(SelectionChanged {
                    entity,
                    name: name.clone(),
                    selected,
                });
            }
            Order::StartPathing => {
                brain.handle(SheepEvent::StartPathing);
            }
            Order::Graze => {
                brain.handle(SheepEvent::Graze);
            }
            Order::Walk(heading) => {
                if !brain.handle(SheepEvent::Walk(heading)) {
                    warn!("sheep {name:?} cannot walk without a heading");
                }
            }
            Order::Destroy => {
                commands.entity(entity).despawn();
                destroyed.insert(entity);
            }
        }
    }
}

// === Brains ===

/// Ticks every sheep brain and applies its output to the body and sprite.
fn run_sheep_brains(
    time: Res<Time>,
    registry: Res<WorldRegistry>,
    mut rng: ResMut<GameRng>,
    mut flock: Query<(
        Entity,
        &Sheep,
        &mut SheepBrain,
        &mut Transform,
        &mut LinearVelocity,
        &mut Facing,
        &mut SpriteAnimation,
        &mut SheepContacts,
        Option<&CollidingEntities>,
    )>,
    bodies: Query<(), With<Sheep>>,
) {
    let dt = time.delta_secs();
    let rng = &mut rng.0;

    for (
        entity,
        sheep,
        mut brain,
        mut transform,
        mut velocity,
        mut facing,
        mut animation,
        mut contacts,
        touching,
    ) in &mut flock
    {
        let neighbours = touching
            .map(|touching| {
                touching
                    .0
                    .iter()
                    .copied()
                    .filter(|&other| other != entity && bodies.contains(other))
                    .collect()
            })
            .unwrap_or_default();
        let bumped = contacts.refresh(neighbours);
        let input = SheepInput {
            dt,
            position: transform.translation.truncate(),
            bumped,
            map: Some(registry.map()),
        };

        let out = brain.tick(&input, &mut *rng);

        if let Some(mode) = out.entered {
            debug!("sheep {} is now {mode:?}", sheep.name);
        }
        if let Some(error) = &out.path_error {
            warn!("sheep {} cannot follow a path: {error}", sheep.name);
        }
        if let Some(position) = out.teleport {
            transform.translation.x = position.x;
            transform.translation.y = position.y;
        }
        velocity.0 = out.velocity;
        if let Some(new_facing) = out.facing {
            facing.set_if_neq(new_facing);
        }
        if let Some(command) = out.animation {
            command.apply(&mut animation);
        }
    }
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Sheep>()
        .register_type::<SheepBrain>()
        .add_message::<SheepOrder>();

    app.add_systems(
        Update,
        (
            apply_sheep_orders
                .in_set(GameSet::Input)
                .after(super::input::InputCommands),
            run_sheep_brains.in_set(GameSet::Ai),
        )
            .run_if(gameplay_running),
    );
}
