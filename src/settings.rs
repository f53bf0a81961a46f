//! Level configuration and session tuning
//!
//! Both load from JSON. Missing fields fall back to the defaults in `consts`,
//! so a config file only has to name what it changes.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors from loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid level config `{field}`: {reason}")]
    InvalidLevel {
        field: &'static str,
        reason: &'static str,
    },
}

/// One level's layout and rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfiguration {
    /// Level number, passed to the progression collaborator on completion
    pub id: u32,
    pub rows: u32,
    pub columns: u32,
    pub spacing_x: f32,
    pub spacing_y: f32,
    /// Shifts the whole block grid
    pub spawn_offset: Vec2,
    /// Seconds allowed for the level
    pub time_limit: f32,
    /// Base points per destroyed block (before multiplier)
    pub default_block_score: i64,
    pub score_multiplier: f32,
}

impl Default for LevelConfiguration {
    fn default() -> Self {
        Self {
            id: 1,
            rows: DEFAULT_ROWS,
            columns: DEFAULT_COLUMNS,
            spacing_x: DEFAULT_SPACING,
            spacing_y: DEFAULT_SPACING,
            spawn_offset: Vec2::ZERO,
            time_limit: DEFAULT_TIME_LIMIT,
            default_block_score: DEFAULT_BLOCK_SCORE,
            score_multiplier: 1.0,
        }
    }
}

impl LevelConfiguration {
    /// Parse and validate a level from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a level from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Producer-side checks. The session assumes these already hold.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason| Err(ConfigError::InvalidLevel { field, reason });

        if self.rows < 1 {
            return invalid("rows", "must be at least 1");
        }
        if self.columns < 1 {
            return invalid("columns", "must be at least 1");
        }
        if !non_negative(self.spacing_x) {
            return invalid("spacing_x", "must be non-negative");
        }
        if !non_negative(self.spacing_y) {
            return invalid("spacing_y", "must be non-negative");
        }
        if self.time_limit.is_nan() || self.time_limit <= 0.0 {
            return invalid("time_limit", "must be positive");
        }
        if self.default_block_score < 0 {
            return invalid("default_block_score", "must be non-negative");
        }
        if !non_negative(self.score_multiplier) {
            return invalid("score_multiplier", "must be non-negative");
        }
        Ok(())
    }

    /// Number of blocks the grid holds
    pub fn block_count(&self) -> usize {
        self.rows as usize * self.columns as usize
    }
}

/// NaN-rejecting `>= 0`
fn non_negative(v: f32) -> bool {
    v >= 0.0
}

/// Wall lines bounding the play field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayField {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Default for PlayField {
    fn default() -> Self {
        Self {
            left: FIELD_LEFT,
            right: FIELD_RIGHT,
            top: FIELD_TOP,
            bottom: FIELD_BOTTOM,
        }
    }
}

impl PlayField {
    pub fn center_x(&self) -> f32 {
        (self.left + self.right) / 2.0
    }
}

/// Session-wide tuning, fixed for the process lifetime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionTuning {
    pub field: PlayField,
    pub paddle_spawn: Vec2,
    /// Ball position relative to the paddle while attached
    pub ball_offset: Vec2,
    pub launch_force: f32,
    pub launch_angle_variance_deg: f32,
    /// Ball speed after every paddle bounce
    pub nominal_speed: f32,
    pub respawn_delay: f32,
    /// Balls the player may lose before game over (`None` = unlimited)
    pub lives: Option<u8>,
    /// Skip a pending respawn if the round ended during the countdown
    pub respawn_requires_playing: bool,
    /// Seed for launch-angle variance
    pub seed: u64,
}

impl Default for SessionTuning {
    fn default() -> Self {
        Self {
            field: PlayField::default(),
            paddle_spawn: Vec2::new(PADDLE_SPAWN_X, PADDLE_SPAWN_Y),
            ball_offset: Vec2::new(0.0, BALL_UP_OFFSET),
            launch_force: LAUNCH_FORCE,
            launch_angle_variance_deg: LAUNCH_ANGLE_VARIANCE_DEG,
            nominal_speed: BALL_NOMINAL_SPEED,
            respawn_delay: RESPAWN_DELAY,
            lives: None,
            respawn_requires_playing: false,
            seed: 0,
        }
    }
}

impl SessionTuning {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded session tuning from {}", path.display());
        Ok(tuning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = LevelConfiguration::from_json(r#"{ "rows": 2, "columns": 3 }"#).unwrap();
        assert_eq!(config.rows, 2);
        assert_eq!(config.columns, 3);
        assert_eq!(config.time_limit, DEFAULT_TIME_LIMIT);
        assert_eq!(config.block_count(), 6);
    }

    #[test]
    fn test_spawn_offset_parses_as_array() {
        let config =
            LevelConfiguration::from_json(r#"{ "spawn_offset": [0.5, -1.0] }"#).unwrap();
        assert_eq!(config.spawn_offset, Vec2::new(0.5, -1.0));
    }

    #[test]
    fn test_validation_rejects_zero_columns() {
        let err = LevelConfiguration::from_json(r#"{ "columns": 0 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidLevel {
                field: "columns",
                ..
            }
        ));
    }

    #[test]
    fn test_validation_rejects_negative_multiplier() {
        let config = LevelConfiguration {
            score_multiplier: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = SessionTuning::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_tuning_lives_override() {
        let tuning = SessionTuning::from_json(r#"{ "lives": 3, "seed": 7 }"#).unwrap();
        assert_eq!(tuning.lives, Some(3));
        assert_eq!(tuning.seed, 7);
        assert_eq!(tuning.field, PlayField::default());
    }
}
