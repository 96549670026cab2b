//! Combat resolution: damage requests, death handling, bomber explosions and health bars.
//!
//! Anything that wants to hurt an entity sends a [`DamageRequest`]. Requests
//! are applied in `GameSet::Combat`, re-validated against the live world: a
//! request for an entity that is gone or has no [`Health`] is dropped.

mod explosion;
mod health;
mod health_bar;

pub use explosion::{
    EXPLOSION_DAMAGE, EXPLOSION_LIFETIME_SECS, EXPLOSION_RADIUS, Explosion, ExplosionRequested,
};
pub use health::{
    DAMAGE_FLASH_SECS, DEFAULT_MAX_HEALTH, DamageReport, DeathBehavior, FlashPhase,
    HEALTH_BAR_LINGER_SECS, Health,
};
pub use health_bar::{
    AGENT_HEALTH_BAR_HEIGHT, AGENT_HEALTH_BAR_WIDTH, AGENT_HEALTH_BAR_Y_OFFSET,
    HealthBarConfig, HealthBarPart,
};

use bevy::prelude::*;

use crate::{GameSet, gameplay_running};

// === Messages ===

/// Asks for `amount` damage to be applied to `target`.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct DamageRequest {
    pub target: Entity,
    pub amount: f32,
    /// Who caused it, if anyone. Explosions never splash their source.
    pub source: Option<Entity>,
}

/// Damage landed on a living entity.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct Damaged {
    pub entity: Entity,
    pub amount: f32,
    pub remaining: f32,
}

/// An entity's health reached zero. Sent once per entity.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Died {
    pub entity: Entity,
}

// === Systems ===

/// Applies queued damage and reports hits and deaths.
pub(crate) fn resolve_damage(
    mut requests: MessageReader<DamageRequest>,
    mut healths: Query<&mut Health>,
    mut damaged: MessageWriter<Damaged>,
    mut died: MessageWriter<Died>,
) {
    for request in requests.read() {
        let Ok(mut health) = healths.get_mut(request.target) else {
            continue;
        };

        let report = health.damage(request.amount);
        if !report.dealt {
            continue;
        }
        damaged.write(Damaged {
            entity: request.target,
            amount: request.amount.max(0.0),
            remaining: report.remaining,
        });
        if report.died {
            died.write(Died {
                entity: request.target,
            });
        }
    }
}

/// Logs every death and despawns the dead whose [`DeathBehavior`] is
/// `Despawn` (the default).
pub(crate) fn remove_the_dead(
    mut died: MessageReader<Died>,
    dead: Query<(Option<&Name>, Option<&DeathBehavior>)>,
    mut commands: Commands,
) {
    for death in died.read() {
        let Ok((name, behavior)) = dead.get(death.entity) else {
            continue;
        };
        match name {
            Some(name) => info!("{name} died"),
            None => info!("entity {} died", death.entity),
        }
        if behavior.copied().unwrap_or_default() == DeathBehavior::Despawn {
            commands.entity(death.entity).try_despawn();
        }
    }
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Health>()
        .register_type::<DeathBehavior>()
        .add_message::<DamageRequest>()
        .add_message::<Damaged>()
        .add_message::<Died>();

    app.add_plugins((explosion::plugin, health_bar::plugin));

    // The dead are removed in `GameSet::Death`, so a bomber killed by a hit
    // still has a position when its explosion is requested.
    app.add_systems(
        Update,
        (
            resolve_damage,
            explosion::trigger_bomber_explosions,
            explosion::detonate_explosions,
        )
            .chain_ignore_deferred()
            .in_set(GameSet::Combat)
            .run_if(gameplay_running),
    );
    app.add_systems(
        Update,
        (
            remove_the_dead.in_set(GameSet::Death),
            health::tick_health.in_set(GameSet::Ui),
        )
            .run_if(gameplay_running),
    );
}
