//! Session state machine
//!
//! `Session` owns every per-session component and is the only entry point the
//! host talks to: one `tick(dt)` per frame, plus collision and input callbacks.
//! Nothing here returns an error; bad calls are ignored and logged.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::attach::BallAttachment;
use super::blocks::BlockCompletionTracker;
use super::events::{EventQueue, GameEvent};
use super::level::LevelLifecycle;
use super::respawn::RespawnScheduler;
use super::state::{GamePhase, SessionState};
use super::timer::LevelTimer;
use super::world::{EntityHandle, EntityKind, EntityWorld, WallKind};
use crate::progression::LevelProgression;
use crate::settings::{LevelConfiguration, SessionTuning};

/// Point-in-time view of the session, for HUDs and diagnostics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub time_remaining: f32,
    pub timer_active: bool,
    pub blocks_remaining: i32,
    pub respawn_pending: bool,
    pub ball_attached: bool,
}

/// The game session
pub struct Session<W: EntityWorld> {
    state: SessionState,
    tuning: SessionTuning,
    config: LevelConfiguration,
    timer: LevelTimer,
    respawn: RespawnScheduler,
    blocks: BlockCompletionTracker,
    /// `None` when the host spawns the level itself
    level: Option<LevelLifecycle>,
    attachment: BallAttachment,
    /// Paddle registered by a host running without a level coordinator
    registered_paddle: Option<EntityHandle>,
    /// Ball spawned without a level coordinator
    loose_ball: Option<EntityHandle>,
    progression: Option<Box<dyn LevelProgression>>,
    world: W,
    events: EventQueue,
    rng: Pcg32,
}

impl<W: EntityWorld> Session<W> {
    /// Session that spawns and tears down levels itself
    pub fn new(world: W, tuning: SessionTuning, config: LevelConfiguration) -> Self {
        let mut session = Self::without_levels(world, tuning, config);
        session.level = Some(LevelLifecycle::new(&session.tuning));
        session
    }

    /// Session whose level entities are owned by the host. The host must
    /// `register_paddle` before a ball can be spawned.
    pub fn without_levels(world: W, tuning: SessionTuning, config: LevelConfiguration) -> Self {
        let mut state = SessionState::new(tuning.lives);
        state.score_multiplier = config.score_multiplier.max(0.0);
        state.level_id = config.id;
        Self {
            state,
            timer: LevelTimer::new(config.time_limit),
            respawn: RespawnScheduler::new(),
            blocks: BlockCompletionTracker::new(),
            level: None,
            attachment: BallAttachment::new(),
            registered_paddle: None,
            loose_ball: None,
            progression: None,
            world,
            events: EventQueue::new(),
            rng: Pcg32::seed_from_u64(tuning.seed),
            tuning,
            config,
        }
    }

    /// Attach the level-unlock collaborator
    pub fn with_progression(mut self, progression: impl LevelProgression + 'static) -> Self {
        self.progression = Some(Box::new(progression));
        self
    }

    // === Accessors ===

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn score(&self) -> i64 {
        self.state.score
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn tuning(&self) -> &SessionTuning {
        &self.tuning
    }

    pub fn config(&self) -> &LevelConfiguration {
        &self.config
    }

    pub fn timer(&self) -> &LevelTimer {
        &self.timer
    }

    pub fn respawn(&self) -> &RespawnScheduler {
        &self.respawn
    }

    pub fn blocks(&self) -> &BlockCompletionTracker {
        &self.blocks
    }

    pub fn level(&self) -> Option<&LevelLifecycle> {
        self.level.as_ref()
    }

    pub fn attachment(&self) -> &BallAttachment {
        &self.attachment
    }

    pub fn progression(&self) -> Option<&dyn LevelProgression> {
        self.progression.as_deref()
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    /// Direct world access for the host's physics step
    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    /// The paddle balls attach to: the level's, or the host-registered one
    pub fn paddle(&self) -> Option<EntityHandle> {
        match &self.level {
            Some(level) => level.paddle(),
            None => self.registered_paddle,
        }
    }

    /// Ball currently in play, if any
    pub fn ball(&self) -> Option<EntityHandle> {
        match &self.level {
            Some(level) => level.ball(),
            None => self.loose_ball,
        }
    }

    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&GameEvent) + 'static) {
        self.events.subscribe(listener);
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state.clone(),
            time_remaining: self.timer.remaining(),
            timer_active: self.timer.is_active(),
            blocks_remaining: self.blocks.remaining(),
            respawn_pending: self.respawn.is_active(),
            ball_attached: self.attachment.is_attached(),
        }
    }

    // === Phase control ===

    /// Begin a round. Ignored unless in `Start`.
    pub fn start_game(&mut self, config: Option<LevelConfiguration>) {
        if self.state.phase != GamePhase::Start {
            log::debug!("start_game ignored in phase {:?}", self.state.phase);
            return;
        }

        if let Some(config) = config {
            self.timer.set_limit(config.time_limit);
            self.state.score_multiplier = config.score_multiplier.max(0.0);
            self.state.level_id = config.id;
            self.config = config;
        }

        self.set_phase(GamePhase::Playing);
        self.timer.start(self.timer.limit(), &mut self.events);

        if self.level.is_some() {
            self.spawn_level();
        } else {
            log::debug!("No level coordinator, spawning fallback ball");
            self.spawn_ball_on_paddle();
        }
        log::info!("Level {} started", self.state.level_id);
    }

    /// Commit `phase`, then notify. Entering `GameOver` also fires `GameOver`
    /// once per transition.
    pub fn set_phase(&mut self, phase: GamePhase) {
        let previous = self.state.phase;
        self.state.phase = phase;
        self.events.emit(GameEvent::PhaseChanged(phase));

        if phase == GamePhase::GameOver && previous != GamePhase::GameOver {
            log::info!("Game over (score {})", self.state.score);
            self.events.emit(GameEvent::GameOver);
        }
    }

    /// Back to `Start` with score, blocks, timers and lives reset
    pub fn reset_game(&mut self) {
        self.state.score = 0;
        self.state.lives = self.tuning.lives;
        self.events.emit(GameEvent::ScoreChanged { score: 0 });
        self.blocks.clear();
        self.respawn.cancel();
        self.timer.reset();
        self.set_phase(GamePhase::Start);
    }

    pub fn restart_game(&mut self) {
        self.reset_game();
        self.start_game(None);
    }

    // === Scoring ===

    pub fn add_score(&mut self, amount: i64) {
        let delta = self.state.scaled(amount);
        self.state.score += delta;
        let score = self.state.score;
        self.events.emit(GameEvent::ScoreChanged { score });
        self.events.emit(GameEvent::ScoreAdded { delta, score });
    }

    /// Upgrade hook. Negative values clamp to zero.
    pub fn set_score_multiplier(&mut self, multiplier: f32) {
        self.state.score_multiplier = multiplier.max(0.0);
    }

    /// Change the level time limit (a running countdown is not rewound)
    pub fn set_time_limit(&mut self, limit: f32) {
        self.timer.set_limit(limit);
    }

    // === Frame driver ===

    /// Advance both countdowns by `dt` seconds
    pub fn tick(&mut self, dt: f32) {
        if self.timer.tick(dt, self.state.phase, &mut self.events) {
            self.teardown_level();
            self.set_phase(GamePhase::Start);
        }

        if self.respawn.tick(dt) {
            if self.tuning.respawn_requires_playing && self.state.phase != GamePhase::Playing {
                log::debug!("Respawn skipped: phase is {:?}", self.state.phase);
            } else {
                self.spawn_ball_on_paddle();
            }
        }
    }

    // === Collision callbacks ===

    pub fn on_ball_lost(&mut self) {
        if self.state.phase != GamePhase::Playing {
            log::debug!("Ball loss ignored in phase {:?}", self.state.phase);
            return;
        }

        self.release_ball();
        self.events.emit(GameEvent::BallLost);

        if let Some(lives) = self.state.lives {
            let lives = lives.saturating_sub(1);
            self.state.lives = Some(lives);
            self.events.emit(GameEvent::LivesChanged { lives });
            if lives == 0 {
                self.timer.stop();
                self.set_phase(GamePhase::GameOver);
                return;
            }
        }

        self.respawn.start(self.tuning.respawn_delay, self.state.phase);
    }

    /// A block was destroyed. Repeated hits on the same handle count once.
    pub fn on_block_hit(&mut self, block: EntityHandle) {
        let counted = match self.level.as_mut() {
            Some(level) => level.remove_block(&mut self.world, block),
            // Host owns the blocks; trust the callback
            None => self.blocks.is_tracking(),
        };
        if !counted {
            log::debug!("Ignoring hit on unknown block {:?}", block);
            return;
        }

        self.add_score(self.config.default_block_score);
        let complete = self.blocks.decrement(self.state.phase);
        self.events.emit(GameEvent::BlockDestroyed {
            remaining: self.blocks.remaining(),
        });

        if complete {
            self.complete_level();
        }
    }

    pub fn on_paddle_hit(&mut self) {
        self.events.emit(GameEvent::PaddleHit);
        self.attachment
            .bounce_off_paddle(&mut self.world, self.tuning.nominal_speed);
    }

    pub fn on_wall_hit(&mut self, wall: WallKind) {
        self.events.emit(GameEvent::WallHit(wall));
    }

    // === Input ===

    /// Launch the attached ball. Ignored while it is free.
    pub fn request_launch(&mut self) {
        let launched = self.attachment.launch(
            &mut self.world,
            self.tuning.launch_force,
            self.tuning.launch_angle_variance_deg,
            &mut self.rng,
        );
        if launched.is_some() {
            self.events.emit(GameEvent::BallLaunched);
        }
    }

    /// Move the paddle; an attached ball follows
    pub fn move_paddle(&mut self, pos: Vec2) {
        let Some(paddle) = self.paddle() else {
            log::debug!("move_paddle ignored: no paddle");
            return;
        };
        self.world.set_position(paddle, pos);
        self.attachment.follow(&mut self.world, self.tuning.ball_offset);
    }

    // === Host-owned levels ===

    /// Register the paddle used when no level coordinator is present
    pub fn register_paddle(&mut self, paddle: EntityHandle) {
        self.registered_paddle = Some(paddle);
    }

    /// Start counting host-spawned blocks
    pub fn track_blocks(&mut self, total: i32) {
        self.blocks.set_total(total);
        self.events.emit(GameEvent::BlocksSpawned { total });
    }

    // === Internals ===

    fn spawn_level(&mut self) {
        let Some(level) = self.level.as_mut() else {
            return;
        };
        self.attachment.forget();
        // A countdown left over from the previous level must not replace this level's ball
        self.respawn.cancel();
        let spawn = level.spawn_level(&mut self.world, &self.config);

        self.track_blocks(spawn.blocks);
        if spawn.blocks == 0 {
            log::warn!("Level {} spawned no blocks", self.config.id);
        }

        if let (Some(ball), Some(paddle)) = (spawn.ball, spawn.paddle) {
            self.attach_ball(ball, paddle);
        }
    }

    fn spawn_ball_on_paddle(&mut self) {
        let Some(paddle) = self.paddle() else {
            log::warn!("No paddle registered, cannot spawn ball");
            return;
        };

        let ball = match self.level.as_mut() {
            Some(level) => level.spawn_ball(&mut self.world),
            None => {
                if let Some(old) = self.loose_ball.take() {
                    self.world.despawn(old);
                }
                let pos = self
                    .world
                    .position(paddle)
                    .map(|p| p + self.tuning.ball_offset);
                self.loose_ball = pos.and_then(|pos| self.world.spawn(EntityKind::Ball, pos));
                self.loose_ball
            }
        };

        match ball {
            Some(ball) => self.attach_ball(ball, paddle),
            None => log::warn!("Ball spawn failed"),
        }
    }

    fn attach_ball(&mut self, ball: EntityHandle, paddle: EntityHandle) {
        if self
            .attachment
            .attach(&mut self.world, ball, paddle, self.tuning.ball_offset)
        {
            self.events.emit(GameEvent::BallSpawned);
        }
    }

    fn release_ball(&mut self) {
        match self.level.as_mut() {
            Some(level) => level.release_ball(&mut self.world),
            None => {
                if let Some(ball) = self.loose_ball.take() {
                    self.world.despawn(ball);
                }
            }
        }
        self.attachment.forget();
    }

    fn teardown_level(&mut self) {
        if let Some(level) = self.level.as_mut() {
            if level.destroy_level(&mut self.world) {
                self.events.emit(GameEvent::LevelDestroyed);
            }
            self.attachment.forget();
        }
        self.blocks.clear();
    }

    fn complete_level(&mut self) {
        let level_id = self.state.level_id;
        log::info!("Level {} complete", level_id);

        self.timer.stop();
        self.set_phase(GamePhase::Start);
        self.teardown_level();
        self.events.emit(GameEvent::LevelComplete { level: level_id });

        match self.progression.as_mut() {
            Some(progression) => progression.unlock_next(level_id),
            None => log::warn!(
                "No level progression registered, level {} not unlocked",
                level_id + 1
            ),
        }
    }
}
