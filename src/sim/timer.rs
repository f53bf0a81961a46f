//! Level countdown
//!
//! Counts down only while active and the session is `Playing`. Expiry is
//! reported once; the caller decides what to tear down.

use serde::{Deserialize, Serialize};

use super::events::{EventQueue, GameEvent};
use super::state::GamePhase;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelTimer {
    limit: f32,
    remaining: f32,
    active: bool,
}

impl LevelTimer {
    pub fn new(limit: f32) -> Self {
        Self {
            limit,
            remaining: limit,
            active: false,
        }
    }

    pub fn limit(&self) -> f32 {
        self.limit
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Begin counting down from `limit`. Observers get the starting value now.
    pub fn start(&mut self, limit: f32, events: &mut EventQueue) {
        self.limit = limit;
        self.remaining = limit;
        self.active = true;
        events.emit(GameEvent::TimerTick {
            remaining: self.remaining,
        });
    }

    /// Advance by `dt`. Returns true on the tick the countdown expires.
    pub fn tick(&mut self, dt: f32, phase: GamePhase, events: &mut EventQueue) -> bool {
        if !self.active || phase != GamePhase::Playing {
            return false;
        }

        self.remaining -= dt;
        let expired = self.remaining <= 0.0;
        if expired {
            self.remaining = 0.0;
            self.active = false;
        }

        events.emit(GameEvent::TimerTick {
            remaining: self.remaining,
        });
        if expired {
            log::info!("Level timer expired");
            events.emit(GameEvent::TimerExpired);
        }
        expired
    }

    /// Pause the countdown; `remaining` is kept
    pub fn stop(&mut self) {
        self.active = false;
    }

    /// Change the limit. A running countdown keeps its current `remaining`.
    pub fn set_limit(&mut self, limit: f32) {
        self.limit = limit;
        if !self.active {
            self.remaining = limit;
        }
    }

    /// Stop and rewind to the full limit
    pub fn reset(&mut self) {
        self.active = false;
        self.remaining = self.limit;
    }
}
