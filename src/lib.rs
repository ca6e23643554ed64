//! Brickfall - a classic block-breaking arcade game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (clock, timed effects, game state)
//! - `audio`: Audio collaborator interface (command queue, no playback here)
//! - `levels`: Level layout library
//! - `settings`: Player preferences

pub mod audio;
pub mod levels;
pub mod settings;
pub mod sim;

pub use levels::{LevelError, LevelLibrary, LevelSource};
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Arena dimensions (origin top-left, y grows downward)
    pub const ARENA_WIDTH: f32 = 800.0;
    pub const ARENA_HEIGHT: f32 = 600.0;

    /// Paddle defaults - paddle slides along the bottom edge
    pub const PADDLE_WIDTH: f32 = 100.0;
    pub const PADDLE_HEIGHT: f32 = 16.0;
    pub const PADDLE_Y: f32 = ARENA_HEIGHT - 40.0;
    pub const PADDLE_SPEED: f32 = 600.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 8.0;
    pub const BALL_START_SPEED: f32 = 300.0;
    pub const BALL_MIN_SPEED: f32 = 120.0;
    pub const BALL_MAX_SPEED: f32 = 650.0;

    /// Block grid
    pub const BLOCK_WIDTH: f32 = 50.0;
    pub const BLOCK_HEIGHT: f32 = 24.0;
    /// Empty band above the block grid for the HUD
    pub const BLOCK_TOP_MARGIN: f32 = 60.0;

    /// Pickup defaults
    pub const PICKUP_RADIUS: f32 = 10.0;
    pub const PICKUP_FALL_ACCEL: f32 = 220.0;
    pub const PICKUP_MAX_FALL_SPEED: f32 = 260.0;
    /// Chance for a destroyed block to drop an item
    pub const ITEM_DROP_CHANCE: f32 = 0.2;

    /// Item effect tuning
    pub const ITEM_SIZE_SCALE: f32 = 1.25;
    pub const ITEM_SPEED_SCALE: f32 = 1.25;
    /// Simulation speed goal while a slow-motion stopwatch is active
    pub const SLOMO_SPEED_GOAL: f32 = 0.4;

    /// Speed easing rate (multiplier units per second)
    pub const SPEED_EASE_RATE: f32 = 1.2;
    /// Snap-to-goal threshold for the speed easing
    pub const SPEED_SNAP_EPSILON: f32 = 0.01;
}

/// Clamp a velocity's magnitude to [min, max], preserving direction
#[inline]
pub fn clamp_speed(vel: Vec2, min: f32, max: f32) -> Vec2 {
    let speed = vel.length();
    if speed <= f32::EPSILON {
        return vel;
    }
    vel * (speed.clamp(min, max) / speed)
}
