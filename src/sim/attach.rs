//! Ball attachment protocol
//!
//! A ball is either riding on the paddle (`Attached`: kinematic, zero velocity,
//! repositioned on every paddle move) or flying (`Free`: dynamic). Launching is
//! the only way from Attached to Free.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::world::{EntityHandle, EntityWorld};
use crate::rotate_degrees;

/// Ball coupling to the paddle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BallState {
    #[default]
    Free,
    Attached,
}

/// Tracks which ball rides which paddle (at most one per paddle)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BallAttachment {
    state: BallState,
    ball: Option<EntityHandle>,
    owner_paddle: Option<EntityHandle>,
}

impl BallAttachment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> BallState {
        self.state
    }

    pub fn is_attached(&self) -> bool {
        self.state == BallState::Attached
    }

    /// Ball currently tracked (attached or flying)
    pub fn ball(&self) -> Option<EntityHandle> {
        self.ball
    }

    pub fn owner_paddle(&self) -> Option<EntityHandle> {
        self.owner_paddle
    }

    /// Attach `ball` to `paddle`, placing it at `paddle + offset`.
    ///
    /// Returns false (and changes nothing) if the paddle has no position.
    /// Any ball tracked before is forgotten, not despawned: the caller that
    /// spawned it releases it first.
    pub fn attach(
        &mut self,
        world: &mut dyn EntityWorld,
        ball: EntityHandle,
        paddle: EntityHandle,
        offset: Vec2,
    ) -> bool {
        let Some(paddle_pos) = world.position(paddle) else {
            log::warn!("Cannot attach ball {:?}: paddle {:?} not found", ball, paddle);
            return false;
        };

        world.set_velocity(ball, Vec2::ZERO);
        world.set_kinematic(ball, true);
        world.set_position(ball, paddle_pos + offset);

        self.state = BallState::Attached;
        self.ball = Some(ball);
        self.owner_paddle = Some(paddle);
        true
    }

    /// Keep an attached ball glued to its paddle. Call after every paddle move.
    pub fn follow(&self, world: &mut dyn EntityWorld, offset: Vec2) {
        if !self.is_attached() {
            return;
        }
        let (Some(ball), Some(paddle)) = (self.ball, self.owner_paddle) else {
            return;
        };
        if let Some(paddle_pos) = world.position(paddle) {
            world.set_position(ball, paddle_pos + offset);
        }
    }

    /// Launch the attached ball. No-op (returns `None`) while Free.
    pub fn launch(
        &mut self,
        world: &mut dyn EntityWorld,
        force: f32,
        angle_variance_deg: f32,
        rng: &mut impl Rng,
    ) -> Option<Vec2> {
        if !self.is_attached() {
            log::debug!("Launch ignored: no attached ball");
            return None;
        }
        let ball = self.ball?;

        let spread = angle_variance_deg.abs();
        let variance = rng.random_range(-spread..=spread);
        let vel = launch_velocity(force, variance);

        self.state = BallState::Free;
        world.set_kinematic(ball, false);
        world.set_velocity(ball, vel);
        Some(vel)
    }

    /// Apply the paddle bounce to a free ball. Attached balls are left alone.
    pub fn bounce_off_paddle(&self, world: &mut dyn EntityWorld, nominal_speed: f32) -> Option<Vec2> {
        if self.is_attached() {
            return None;
        }
        let ball = self.ball?;
        let vel = paddle_bounce(world.velocity(ball)?, nominal_speed);
        world.set_velocity(ball, vel);
        Some(vel)
    }

    /// Stop tracking the ball (it was destroyed)
    pub fn forget(&mut self) {
        self.state = BallState::Free;
        self.ball = None;
        self.owner_paddle = None;
    }
}

/// Velocity for a launch `variance_deg` off straight up
pub fn launch_velocity(force: f32, variance_deg: f32) -> Vec2 {
    rotate_degrees(Vec2::Y, variance_deg).normalize() * force
}

/// Paddle contact always sends the ball upward at the nominal speed
pub fn paddle_bounce(vel: Vec2, nominal_speed: f32) -> Vec2 {
    Vec2::new(vel.x, vel.y.abs()).normalize_or(Vec2::Y) * nominal_speed
}
