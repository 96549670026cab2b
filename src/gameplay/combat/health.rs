//! Health capability: hit points, damage flash and health-bar visibility.

use std::time::Duration;

use bevy::prelude::*;

// === Constants ===

/// Max health when none is given.
pub const DEFAULT_MAX_HEALTH: f32 = 100.0;

/// Length of each half of the damage flash (seconds).
pub const DAMAGE_FLASH_SECS: f32 = 0.2;

/// How long the health bar stays up after the flash ends (seconds).
pub const HEALTH_BAR_LINGER_SECS: f32 = 3.0;

// === Components ===

/// Where the damage flash is in its rise-and-fall cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum FlashPhase {
    #[default]
    Idle,
    Ascending,
    Descending,
}

/// What a single [`Health::damage`] call did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageReport {
    /// Health left after the call.
    pub remaining: f32,
    /// False when the entity was already dead.
    pub dealt: bool,
    /// True only on the call that took health to zero.
    pub died: bool,
}

/// Hit points of an agent. `0 <= current <= max` always holds.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Health {
    current: f32,
    max: f32,
    visible: bool,
    flash: FlashPhase,
    flash_elapsed: f32,
    hide_timer: Option<Timer>,
}

/// What happens to an entity whose health reaches zero.
///
/// A [`Died`](super::Died) message is sent either way.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
#[reflect(Component)]
pub enum DeathBehavior {
    #[default]
    Despawn,
    /// Keep the entity; listeners react to `Died`.
    Notify,
}

impl Health {
    #[must_use]
    pub fn new(max: f32) -> Self {
        Self::with_current(max, max)
    }

    /// Starts partially damaged. `current` is clamped to `0..=max`.
    #[must_use]
    pub fn with_current(current: f32, max: f32) -> Self {
        let max = max.max(0.0);
        Self {
            current: current.clamp(0.0, max),
            max,
            visible: false,
            flash: FlashPhase::Idle,
            flash_elapsed: 0.0,
            hide_timer: None,
        }
    }

    #[must_use]
    pub const fn current(&self) -> f32 {
        self.current
    }

    #[must_use]
    pub const fn max(&self) -> f32 {
        self.max
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    /// Whether the health bar should be drawn.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub const fn flash_phase(&self) -> FlashPhase {
        self.flash
    }

    /// Current / max in `0..=1`.
    #[must_use]
    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            (self.current / self.max).clamp(0.0, 1.0)
        }
    }

    /// Flash intensity in `0..=1`.
    #[must_use]
    pub fn damage_time(&self) -> f32 {
        (self.flash_elapsed / DAMAGE_FLASH_SECS).clamp(0.0, 1.0)
    }

    /// Applies damage. Negative amounts count as zero. Once dead, further
    /// calls change nothing.
    pub fn damage(&mut self, amount: f32) -> DamageReport {
        if !self.is_alive() {
            return DamageReport {
                remaining: 0.0,
                dealt: false,
                died: false,
            };
        }

        self.visible = true;
        self.flash = FlashPhase::Ascending;
        self.flash_elapsed = 0.0;
        self.hide_timer = None;

        self.current = (self.current - amount.max(0.0)).max(0.0);
        DamageReport {
            remaining: self.current,
            dealt: true,
            died: self.current <= 0.0,
        }
    }

    /// Advances the flash and the hide timer by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        if let Some(timer) = &mut self.hide_timer {
            timer.tick(Duration::from_secs_f32(dt.max(0.0)));
            if timer.just_finished() {
                self.visible = false;
                self.hide_timer = None;
            }
        }

        match self.flash {
            FlashPhase::Idle => {}
            FlashPhase::Ascending => {
                if self.flash_elapsed >= DAMAGE_FLASH_SECS {
                    self.flash = FlashPhase::Descending;
                } else {
                    self.flash_elapsed += dt;
                }
            }
            FlashPhase::Descending => {
                if self.flash_elapsed <= 0.0 {
                    self.flash = FlashPhase::Idle;
                    self.flash_elapsed = 0.0;
                    self.hide_timer = Some(Timer::from_seconds(
                        HEALTH_BAR_LINGER_SECS,
                        TimerMode::Once,
                    ));
                } else {
                    self.flash_elapsed -= dt;
                }
            }
        }
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HEALTH)
    }
}

/// Advances every health flash by the frame delta.
pub(super) fn tick_health(time: Res<Time>, mut healths: Query<&mut Health>) {
    let dt = time.delta_secs();
    for mut health in &mut healths {
        if health.flash != FlashPhase::Idle || health.hide_timer.is_some() {
            health.tick(dt);
        }
    }
}
