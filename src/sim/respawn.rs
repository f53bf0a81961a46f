//! Ball respawn countdown
//!
//! Independent of the level timer: both may run in the same tick. The
//! scheduler only reports expiry, the session performs the spawn.

use serde::{Deserialize, Serialize};

use super::state::GamePhase;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RespawnScheduler {
    delay: f32,
    remaining: f32,
    active: bool,
}

impl RespawnScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    pub fn delay(&self) -> f32 {
        self.delay
    }

    /// Schedule a respawn in `delay` seconds. Ignored unless `Playing`.
    pub fn start(&mut self, delay: f32, phase: GamePhase) -> bool {
        if phase != GamePhase::Playing {
            log::debug!("Respawn not scheduled: phase is {:?}", phase);
            return false;
        }
        self.delay = delay;
        self.remaining = delay;
        self.active = true;
        true
    }

    /// Advance by `dt`. Returns true on the tick the respawn is due.
    pub fn tick(&mut self, dt: f32) -> bool {
        if !self.active {
            return false;
        }
        self.remaining -= dt;
        if self.remaining <= 0.0 {
            self.remaining = 0.0;
            self.active = false;
            return true;
        }
        false
    }

    pub fn cancel(&mut self) {
        self.active = false;
        self.remaining = 0.0;
    }
}
