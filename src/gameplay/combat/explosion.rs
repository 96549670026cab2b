//! Bomber explosions: a short-lived burst that splashes damage around it.

use bevy::prelude::*;

use super::{DamageRequest, Damaged, Health};
use crate::gameplay::sheep::Sheep;
use crate::{GameSet, GameState, Z_EFFECT, gameplay_running};

// === Constants ===

/// Splash radius around the explosion centre (pixels).
pub const EXPLOSION_RADIUS: f32 = 80.0;

/// Damage dealt to each entity inside the radius.
pub const EXPLOSION_DAMAGE: f32 = 20.0;

/// How long the burst stays on screen (seconds).
pub const EXPLOSION_LIFETIME_SECS: f32 = 0.5;

const EXPLOSION_COLOR: Color = Color::srgba(1.0, 0.6, 0.1, 0.7);

// === Messages & Components ===

/// Asks for an explosion at `position`. `source` is spared from the splash.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct ExplosionRequested {
    pub position: Vec2,
    pub source: Entity,
}

/// The visible burst. Despawned when its lifetime runs out.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Explosion {
    pub lifetime: Timer,
}

// === Systems ===

/// Every damage application on a bomber requests one explosion at its position.
pub(super) fn trigger_bomber_explosions(
    mut damaged: MessageReader<Damaged>,
    flock: Query<(&Sheep, &Transform)>,
    mut explosions: MessageWriter<ExplosionRequested>,
) {
    for hit in damaged.read() {
        let Ok((sheep, transform)) = flock.get(hit.entity) else {
            continue;
        };
        if !sheep.kind.explodes_on_damage() {
            continue;
        }
        debug!("bomber {} explodes", sheep.name);
        explosions.write(ExplosionRequested {
            position: transform.translation.truncate(),
            source: hit.entity,
        });
    }
}

/// Spawns the burst and queues splash damage for everything with health in range.
pub(super) fn detonate_explosions(
    mut requests: MessageReader<ExplosionRequested>,
    targets: Query<(Entity, &Transform), With<Health>>,
    mut damage: MessageWriter<DamageRequest>,
    mut commands: Commands,
) {
    for request in requests.read() {
        commands.spawn((
            Name::new("Explosion"),
            Explosion {
                lifetime: Timer::from_seconds(EXPLOSION_LIFETIME_SECS, TimerMode::Once),
            },
            Sprite::from_color(EXPLOSION_COLOR, Vec2::splat(EXPLOSION_RADIUS * 2.0)),
            Transform::from_translation(request.position.extend(Z_EFFECT)),
            DespawnOnExit(GameState::InGame),
        ));

        for (entity, transform) in &targets {
            if entity == request.source {
                continue;
            }
            if transform.translation.truncate().distance(request.position) <= EXPLOSION_RADIUS {
                damage.write(DamageRequest {
                    target: entity,
                    amount: EXPLOSION_DAMAGE,
                    source: Some(request.source),
                });
            }
        }
    }
}

fn expire_explosions(
    time: Res<Time>,
    mut explosions: Query<(Entity, &mut Explosion)>,
    mut commands: Commands,
) {
    for (entity, mut explosion) in &mut explosions {
        explosion.lifetime.tick(time.delta());
        if explosion.lifetime.just_finished() {
            commands.entity(entity).despawn();
        }
    }
}

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Explosion>()
        .add_message::<ExplosionRequested>();

    app.add_systems(
        Update,
        expire_explosions
            .in_set(GameSet::Ui)
            .run_if(gameplay_running),
    );
}
