//! Level unlock sequence
//!
//! The session only calls `unlock_next` when a level is cleared. `LevelUnlocks`
//! is the in-memory implementation; where unlocks are stored is the host's
//! business.

use serde::{Deserialize, Serialize};

/// Collaborator told about cleared levels
pub trait LevelProgression {
    /// `current_level` was cleared; make the one after it available
    fn unlock_next(&mut self, current_level: u32);

    fn is_unlocked(&self, level: u32) -> bool;
}

/// Highest unlocked level plus the clear history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelUnlocks {
    /// Levels 1..=highest are playable
    pub highest: u32,
    /// Last level, if the sequence is finite
    pub max_level: Option<u32>,
    /// Cleared levels in the order they were cleared
    pub cleared: Vec<u32>,
}

impl Default for LevelUnlocks {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelUnlocks {
    /// Only level 1 unlocked, no upper bound
    pub fn new() -> Self {
        Self {
            highest: 1,
            max_level: None,
            cleared: Vec::new(),
        }
    }

    pub fn with_max_level(mut self, max_level: u32) -> Self {
        self.max_level = Some(max_level);
        self
    }

    /// Whether every level in a finite sequence has been cleared
    pub fn is_finished(&self) -> bool {
        self.max_level
            .map(|max| self.cleared.contains(&max))
            .unwrap_or(false)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl LevelProgression for LevelUnlocks {
    fn unlock_next(&mut self, current_level: u32) {
        if !self.cleared.contains(&current_level) {
            self.cleared.push(current_level);
        }

        let next = current_level.saturating_add(1);
        if self.max_level.is_some_and(|max| next > max) {
            log::info!("Level {} was the last level", current_level);
            return;
        }
        if next > self.highest {
            self.highest = next;
            log::info!("Unlocked level {}", next);
        }
    }

    fn is_unlocked(&self, level: u32) -> bool {
        level >= 1 && level <= self.highest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlock_sequence() {
        let mut unlocks = LevelUnlocks::new();
        assert!(unlocks.is_unlocked(1));
        assert!(!unlocks.is_unlocked(2));

        unlocks.unlock_next(1);
        assert!(unlocks.is_unlocked(2));
        assert!(!unlocks.is_unlocked(3));
    }

    #[test]
    fn test_replaying_old_level_does_not_regress() {
        let mut unlocks = LevelUnlocks::new();
        unlocks.unlock_next(1);
        unlocks.unlock_next(2);
        unlocks.unlock_next(1);
        assert_eq!(unlocks.highest, 3);
        assert_eq!(unlocks.cleared, vec![1, 2]);
    }

    #[test]
    fn test_max_level_caps_unlocks() {
        let mut unlocks = LevelUnlocks::new().with_max_level(2);
        unlocks.unlock_next(1);
        unlocks.unlock_next(2);
        assert_eq!(unlocks.highest, 2);
        assert!(unlocks.is_finished());
    }

    #[test]
    fn test_level_zero_is_never_unlocked() {
        assert!(!LevelUnlocks::new().is_unlocked(0));
    }

    #[test]
    fn test_json_round_trip_keeps_history() {
        let mut unlocks = LevelUnlocks::new();
        unlocks.unlock_next(1);
        let restored = LevelUnlocks::from_json(&unlocks.to_json().unwrap()).unwrap();
        assert_eq!(restored.highest, 2);
        assert_eq!(restored.cleared, vec![1]);
    }
}
