//! Third-party plugin isolation.

mod avian;

pub use avian::CollisionLayer;

/// Physics for the windowed game. Kept out of [`crate::plugin`] so headless
/// apps and tests run the simulation without a physics world.
pub fn plugin(app: &mut bevy::prelude::App) {
    app.add_plugins(avian::plugin);
}
