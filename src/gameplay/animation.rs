//! Frame-based sprite animation state and facing.
//!
//! Brains read the clip and frame (a dog bites on frame 3 of `Attack`) and
//! hand back [`AnimationCommand`]s; nothing here draws anything.

use bevy::prelude::*;

use crate::{GameSet, gameplay_running};

/// Animation clips shared by sheep and dogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum AnimationClip {
    Graze,
    Idle,
    Run,
    Attack,
}

impl AnimationClip {
    #[must_use]
    pub const fn frame_count(self) -> usize {
        match self {
            Self::Graze | Self::Run | Self::Attack => 6,
            Self::Idle => 4,
        }
    }

    #[must_use]
    pub const fn frames_per_second(self) -> f32 {
        match self {
            Self::Graze | Self::Idle => 6.0,
            Self::Run | Self::Attack => 15.0,
        }
    }

    /// Non-looping clips hold their last frame and then report finished.
    #[must_use]
    pub const fn looping(self) -> bool {
        !matches!(self, Self::Attack)
    }
}

/// Playback state of one sprite.
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct SpriteAnimation {
    clip: AnimationClip,
    frame: usize,
    playing: bool,
    finished: bool,
    elapsed: f32,
}

impl SpriteAnimation {
    #[must_use]
    pub const fn new(clip: AnimationClip) -> Self {
        Self {
            clip,
            frame: 0,
            playing: true,
            finished: false,
            elapsed: 0.0,
        }
    }

    #[must_use]
    pub const fn clip(&self) -> AnimationClip {
        self.clip
    }

    #[must_use]
    pub const fn frame(&self) -> usize {
        self.frame
    }

    #[must_use]
    pub const fn is_playing(&self) -> bool {
        self.playing
    }

    /// True once a non-looping clip has shown its last frame for a full frame.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Switches to `clip` unless it is already playing.
    pub fn play(&mut self, clip: AnimationClip) {
        if self.clip == clip && self.playing {
            return;
        }
        self.restart(clip);
    }

    /// Starts `clip` from frame 0 even if it is the current clip.
    pub fn restart(&mut self, clip: AnimationClip) {
        *self = Self::new(clip);
    }

    /// Stops on frame 0.
    pub fn stop(&mut self) {
        self.playing = false;
        self.finished = false;
        self.frame = 0;
        self.elapsed = 0.0;
    }

    pub fn advance(&mut self, dt: f32) {
        if !self.playing {
            return;
        }
        let frame_secs = 1.0 / self.clip.frames_per_second();
        self.elapsed += dt;
        while self.elapsed >= frame_secs {
            self.elapsed -= frame_secs;
            if self.frame + 1 < self.clip.frame_count() {
                self.frame += 1;
            } else if self.clip.looping() {
                self.frame = 0;
            } else {
                self.playing = false;
                self.finished = true;
                self.elapsed = 0.0;
                break;
            }
        }
    }

    #[cfg(test)]
    pub(crate) const fn set_frame(&mut self, frame: usize) {
        self.frame = frame;
    }
}

/// What a brain wants done to its sprite animation this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationCommand {
    Play(AnimationClip),
    Restart(AnimationClip),
    Stop,
}

impl AnimationCommand {
    pub fn apply(self, animation: &mut SpriteAnimation) {
        match self {
            Self::Play(clip) => animation.play(clip),
            Self::Restart(clip) => animation.restart(clip),
            Self::Stop => animation.stop(),
        }
    }
}

/// Which way the sprite looks. Drives `Sprite::flip_x`.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// Facing from `from` toward `to` along x. Ties face right.
    #[must_use]
    pub fn toward(from: Vec2, to: Vec2) -> Self {
        if to.x < from.x { Self::Left } else { Self::Right }
    }

    #[must_use]
    pub const fn flip_x(self) -> bool {
        matches!(self, Self::Left)
    }
}

fn advance_animations(time: Res<Time>, mut animations: Query<&mut SpriteAnimation>) {
    let dt = time.delta_secs();
    for mut animation in &mut animations {
        if animation.is_playing() {
            animation.advance(dt);
        }
    }
}

pub(super) fn plugin(app: &mut App) {
    app.register_type::<SpriteAnimation>()
        .register_type::<Facing>();

    app.add_systems(
        Update,
        advance_animations
            .in_set(GameSet::Ui)
            .run_if(gameplay_running),
    );
}
