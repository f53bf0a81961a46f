//! Brick Session - run-time session core for a block-breaking arcade game
//!
//! Core modules:
//! - `sim`: Session state machine, level lifecycle, countdowns, ball attachment
//! - `settings`: Level configuration and session tuning (JSON, validated)
//! - `progression`: Level unlock sequence collaborator

pub mod progression;
pub mod settings;
pub mod sim;

pub use progression::{LevelProgression, LevelUnlocks};
pub use settings::{ConfigError, LevelConfiguration, PlayField, SessionTuning};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed step used by the demo host loop (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Play field bounds (walls sit on these lines)
    pub const FIELD_LEFT: f32 = -4.5;
    pub const FIELD_RIGHT: f32 = 4.5;
    pub const FIELD_TOP: f32 = 5.0;
    pub const FIELD_BOTTOM: f32 = -5.0;

    /// Paddle spawn point
    pub const PADDLE_SPAWN_X: f32 = 0.0;
    pub const PADDLE_SPAWN_Y: f32 = -4.0;

    /// Ball sits this far above the paddle while attached
    pub const BALL_UP_OFFSET: f32 = 0.5;
    /// Launch impulse magnitude
    pub const LAUNCH_FORCE: f32 = 10.0;
    /// Launch direction jitter (degrees either side of straight up)
    pub const LAUNCH_ANGLE_VARIANCE_DEG: f32 = 15.0;
    /// Speed the ball is renormalized to on every paddle bounce
    pub const BALL_NOMINAL_SPEED: f32 = 10.0;

    /// Block cell size when the world can't report block bounds
    pub const BLOCK_FALLBACK_WIDTH: f32 = 1.0;
    pub const BLOCK_FALLBACK_HEIGHT: f32 = 0.4;

    /// Level defaults
    pub const DEFAULT_ROWS: u32 = 4;
    pub const DEFAULT_COLUMNS: u32 = 6;
    pub const DEFAULT_SPACING: f32 = 0.1;
    pub const DEFAULT_TIME_LIMIT: f32 = 60.0;
    pub const DEFAULT_BLOCK_SCORE: i64 = 10;

    /// Seconds between losing the ball and the replacement spawning
    pub const RESPAWN_DELAY: f32 = 3.0;
}

/// Rotate `v` counter-clockwise by `degrees`
#[inline]
pub fn rotate_degrees(v: Vec2, degrees: f32) -> Vec2 {
    Vec2::from_angle(degrees.to_radians()).rotate(v)
}
