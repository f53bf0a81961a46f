//! Session state
//!
//! Created once per process and reset between runs, never rebuilt.

use serde::{Deserialize, Serialize};

/// Top-level phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for a round to start
    #[default]
    Start,
    /// Round in progress
    Playing,
    /// Run ended
    GameOver,
}

/// Score and phase bookkeeping, owned by `Session`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub phase: GamePhase,
    pub score: i64,
    /// Always >= 0
    pub score_multiplier: f32,
    /// Balls left before game over (`None` = unlimited)
    pub lives: Option<u8>,
    /// Level currently loaded
    pub level_id: u32,
}

impl SessionState {
    pub fn new(lives: Option<u8>) -> Self {
        Self {
            phase: GamePhase::Start,
            score: 0,
            score_multiplier: 1.0,
            lives,
            level_id: 1,
        }
    }

    /// Points a raw `amount` is worth after the multiplier
    pub fn scaled(&self, amount: i64) -> i64 {
        (amount as f64 * self.score_multiplier as f64).round() as i64
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_starts_in_start() {
        let state = SessionState::default();
        assert_eq!(state.phase, GamePhase::Start);
        assert_eq!(state.score, 0);
        assert_eq!(state.score_multiplier, 1.0);
    }

    #[test]
    fn test_scaled_rounds() {
        let mut state = SessionState::default();
        state.score_multiplier = 1.5;
        assert_eq!(state.scaled(5), 8); // 7.5 rounds away from zero
        state.score_multiplier = 0.0;
        assert_eq!(state.scaled(100), 0);
    }
}
