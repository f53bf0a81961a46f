//! Remaining-block counter for level completion

use serde::{Deserialize, Serialize};

use super::state::GamePhase;

/// Counter value meaning no level is being tracked
pub const NOT_TRACKING: i32 = -1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockCompletionTracker {
    remaining: i32,
    /// A total was set and not cleared since. Kept apart from `remaining`,
    /// which may legitimately pass through -1 when over-decremented.
    tracking: bool,
    /// Completion already reported for the current total
    completed: bool,
}

impl Default for BlockCompletionTracker {
    fn default() -> Self {
        Self {
            remaining: NOT_TRACKING,
            tracking: false,
            completed: false,
        }
    }
}

impl BlockCompletionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remaining(&self) -> i32 {
        self.remaining
    }

    pub fn set_total(&mut self, total: i32) {
        self.remaining = total;
        self.tracking = true;
        self.completed = false;
    }

    /// Stop tracking (back to the -1 sentinel)
    pub fn clear(&mut self) {
        self.remaining = NOT_TRACKING;
        self.tracking = false;
        self.completed = false;
    }

    /// Count one destroyed block. Returns true exactly once: the first time the
    /// counter reaches zero while `Playing`.
    pub fn decrement(&mut self, phase: GamePhase) -> bool {
        if !self.tracking {
            log::debug!("Block destroyed with no level tracked");
            return false;
        }
        self.remaining -= 1;
        if self.remaining == 0 && phase == GamePhase::Playing && !self.completed {
            self.completed = true;
            return true;
        }
        false
    }

    pub fn is_complete(&self) -> bool {
        self.remaining == 0
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completes_exactly_once() {
        let mut tracker = BlockCompletionTracker::new();
        tracker.set_total(3);
        let fired: Vec<bool> = (0..6).map(|_| tracker.decrement(GamePhase::Playing)).collect();
        assert_eq!(fired, vec![false, false, true, false, false, false]);
        assert_eq!(tracker.remaining(), -3);
    }

    #[test]
    fn test_sentinel_is_not_complete() {
        let tracker = BlockCompletionTracker::new();
        assert_eq!(tracker.remaining(), NOT_TRACKING);
        assert!(!tracker.is_complete());
        assert!(!tracker.is_tracking());
    }

    #[test]
    fn test_zero_outside_playing_does_not_complete() {
        let mut tracker = BlockCompletionTracker::new();
        tracker.set_total(1);
        assert!(!tracker.decrement(GamePhase::Start));
        assert!(tracker.is_complete());
    }

    #[test]
    fn test_untracked_decrement_ignored() {
        let mut tracker = BlockCompletionTracker::new();
        assert!(!tracker.decrement(GamePhase::Playing));
        assert_eq!(tracker.remaining(), NOT_TRACKING);
    }

    #[test]
    fn test_over_decrement_keeps_counting_past_sentinel() {
        let mut tracker = BlockCompletionTracker::new();
        tracker.set_total(1);
        let fired: Vec<bool> = (0..3).map(|_| tracker.decrement(GamePhase::Start)).collect();
        assert_eq!(fired, vec![false, false, false]);
        assert_eq!(tracker.remaining(), -2);
        assert!(tracker.is_tracking());
    }

    #[test]
    fn test_clear_stops_tracking() {
        let mut tracker = BlockCompletionTracker::new();
        tracker.set_total(2);
        tracker.clear();
        assert!(!tracker.is_tracking());
        assert!(!tracker.decrement(GamePhase::Playing));
        assert_eq!(tracker.remaining(), NOT_TRACKING);
    }

    #[test]
    fn test_new_total_rearms_completion() {
        let mut tracker = BlockCompletionTracker::new();
        tracker.set_total(1);
        assert!(tracker.decrement(GamePhase::Playing));
        tracker.set_total(1);
        assert!(tracker.decrement(GamePhase::Playing));
    }
}
