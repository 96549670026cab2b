//! Health bars: a two-part sprite over each hurt agent, shown only while
//! its [`Health`] says so.

use bevy::prelude::*;

use super::Health;
use crate::{GameSet, gameplay_running};

// === Constants ===

const MISSING_COLOR: Color = Color::srgb(0.8, 0.1, 0.1);
const REMAINING_COLOR: Color = Color::srgb(0.1, 0.9, 0.1);

/// Bar size over a sheep or dog (pixels).
pub const AGENT_HEALTH_BAR_WIDTH: f32 = 28.0;
pub const AGENT_HEALTH_BAR_HEIGHT: f32 = 4.0;

/// Height of the bar above the agent's centre (pixels).
pub const AGENT_HEALTH_BAR_Y_OFFSET: f32 = 22.0;

// === Components ===

/// One sprite of a health bar, as a child of the agent.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub enum HealthBarPart {
    /// Full width, shows what is missing.
    Missing,
    /// Left-aligned, as wide as the health fraction.
    Remaining,
}

impl HealthBarPart {
    const fn color(self) -> Color {
        match self {
            Self::Missing => MISSING_COLOR,
            Self::Remaining => REMAINING_COLOR,
        }
    }

    /// Drawn just in front of the agent, remaining in front of missing.
    const fn depth(self) -> f32 {
        match self {
            Self::Missing => 1.0,
            Self::Remaining => 1.1,
        }
    }
}

/// Bar geometry. Agents with `Health` but no config get no bar.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct HealthBarConfig {
    pub width: f32,
    pub height: f32,
    pub y_offset: f32,
}

impl Default for HealthBarConfig {
    fn default() -> Self {
        Self {
            width: AGENT_HEALTH_BAR_WIDTH,
            height: AGENT_HEALTH_BAR_HEIGHT,
            y_offset: AGENT_HEALTH_BAR_Y_OFFSET,
        }
    }
}

impl HealthBarConfig {
    /// Width and x offset of the remaining part at `fraction` health.
    #[must_use]
    pub fn remaining_span(&self, fraction: f32) -> (f32, f32) {
        let width = self.width * fraction.clamp(0.0, 1.0);
        (width, (width - self.width) / 2.0)
    }
}

// === Systems ===

fn attach_health_bar(add: On<Add, Health>, configs: Query<&HealthBarConfig>, mut commands: Commands) {
    let Ok(config) = configs.get(add.entity).copied() else {
        return;
    };
    commands.entity(add.entity).with_children(|parent| {
        for part in [HealthBarPart::Missing, HealthBarPart::Remaining] {
            parent.spawn((
                Name::new(format!("Health Bar {part:?}")),
                part,
                Sprite::from_color(part.color(), Vec2::new(config.width, config.height)),
                Transform::from_xyz(0.0, config.y_offset, part.depth()),
                Visibility::Hidden,
            ));
        }
    });
}

fn sync_health_bars(
    agents: Query<(&Health, &HealthBarConfig, &Children), Changed<Health>>,
    mut parts: Query<(&HealthBarPart, &mut Sprite, &mut Transform, &mut Visibility)>,
) {
    for (health, config, children) in &agents {
        let visibility = if health.is_visible() {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
        let (width, offset) = config.remaining_span(health.fraction());

        for child in children.iter() {
            let Ok((part, mut sprite, mut transform, mut part_visibility)) = parts.get_mut(child)
            else {
                continue;
            };
            part_visibility.set_if_neq(visibility);
            if *part == HealthBarPart::Remaining {
                sprite.custom_size = Some(Vec2::new(width, config.height));
                transform.translation.x = offset;
            }
        }
    }
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<HealthBarPart>()
        .register_type::<HealthBarConfig>();

    app.add_observer(attach_health_bar);

    app.add_systems(
        Update,
        sync_health_bars
            .in_set(GameSet::Ui)
            .after(super::health::tick_health)
            .run_if(gameplay_running),
    );
}


#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::gameplay::combat::{DAMAGE_FLASH_SECS, HEALTH_BAR_LINGER_SECS};
    use crate::testing::{assert_entity_count, create_test_app};
    use pretty_assertions::assert_eq;

    fn create_health_bar_test_app() -> App {
        let mut app = create_test_app();
        app.add_observer(attach_health_bar);
        app.add_systems(Update, sync_health_bars);
        app
    }

    fn part_visibility(app: &mut App, wanted: HealthBarPart) -> Visibility {
        let mut query = app.world_mut().query::<(&HealthBarPart, &Visibility)>();
        query
            .iter(app.world())
            .find_map(|(part, visibility)| (*part == wanted).then_some(*visibility))
            .unwrap()
    }

    fn remaining_sprite(app: &mut App) -> (Vec2, f32) {
        let mut query = app
            .world_mut()
            .query::<(&HealthBarPart, &Sprite, &Transform)>();
        query
            .iter(app.world())
            .find_map(|(part, sprite, transform)| {
                (*part == HealthBarPart::Remaining)
                    .then(|| (sprite.custom_size.unwrap(), transform.translation.x))
            })
            .unwrap()
    }

    #[test]
    fn agents_with_config_get_two_hidden_parts() {
        let mut app = create_health_bar_test_app();

        app.world_mut()
            .spawn((Health::new(100.0), HealthBarConfig::default()));
        app.world_mut().spawn(Health::new(100.0));
        app.update();

        assert_entity_count::<With<HealthBarPart>>(&mut app, 2);
        assert_eq!(part_visibility(&mut app, HealthBarPart::Missing), Visibility::Hidden);
        assert_eq!(part_visibility(&mut app, HealthBarPart::Remaining), Visibility::Hidden);
    }

    #[test]
    fn damage_shows_the_bar_and_shrinks_the_remaining_part() {
        let mut app = create_health_bar_test_app();
        let config = HealthBarConfig {
            width: 50.0,
            height: 8.0,
            y_offset: 40.0,
        };
        let entity = app.world_mut().spawn((Health::new(100.0), config)).id();
        app.update();

        app.world_mut().get_mut::<Health>(entity).unwrap().damage(50.0);
        app.update();

        assert_eq!(part_visibility(&mut app, HealthBarPart::Missing), Visibility::Inherited);
        assert_eq!(remaining_sprite(&mut app), (Vec2::new(25.0, 8.0), -12.5));
    }

    #[test]
    fn bar_hides_once_the_linger_runs_out() {
        let mut app = create_health_bar_test_app();
        let entity = app
            .world_mut()
            .spawn((Health::new(100.0), HealthBarConfig::default()))
            .id();
        app.update();

        let mut health = app.world_mut().get_mut::<Health>(entity).unwrap();
        health.damage(10.0);
        // Rise, peak, fall, bottom out, then the linger.
        health.tick(DAMAGE_FLASH_SECS);
        health.tick(0.0);
        health.tick(DAMAGE_FLASH_SECS);
        health.tick(0.0);
        health.tick(HEALTH_BAR_LINGER_SECS - 0.01);
        app.update();
        assert_eq!(part_visibility(&mut app, HealthBarPart::Remaining), Visibility::Inherited);

        app.world_mut().get_mut::<Health>(entity).unwrap().tick(0.02);
        app.update();

        assert_eq!(part_visibility(&mut app, HealthBarPart::Remaining), Visibility::Hidden);
    }

    #[test]
    fn bar_goes_with_its_agent() {
        let mut app = create_health_bar_test_app();
        let entity = app
            .world_mut()
            .spawn((Health::new(100.0), HealthBarConfig::default()))
            .id();
        app.update();

        app.world_mut().despawn(entity);

        assert_entity_count::<With<HealthBarPart>>(&mut app, 0);
    }
}
