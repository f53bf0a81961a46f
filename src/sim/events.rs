//! Session events
//!
//! Every event is pushed only after the state it reports has been committed,
//! so a listener (or a host draining the queue) always sees post-transition
//! values.

use serde::{Deserialize, Serialize};

use super::state::GamePhase;
use super::world::WallKind;

/// Something observable happened in the session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PhaseChanged(GamePhase),
    /// Fired once per transition into `GameOver`
    GameOver,
    ScoreChanged { score: i64 },
    ScoreAdded { delta: i64, score: i64 },
    /// Level countdown value (never negative)
    TimerTick { remaining: f32 },
    TimerExpired,
    /// Blocks were spawned for a new level
    BlocksSpawned { total: i32 },
    BlockDestroyed { remaining: i32 },
    /// Fired once per level
    LevelComplete { level: u32 },
    LevelDestroyed,
    BallSpawned,
    BallLaunched,
    BallLost,
    LivesChanged { lives: u8 },
    PaddleHit,
    WallHit(WallKind),
}

type Listener = Box<dyn FnMut(&GameEvent)>;

/// Event queue with synchronous listeners
#[derive(Default)]
pub struct EventQueue {
    pending: Vec<GameEvent>,
    listeners: Vec<Listener>,
}

impl std::fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventQueue")
            .field("pending", &self.pending)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener, called for every event as it is emitted
    pub fn subscribe(&mut self, listener: impl FnMut(&GameEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn emit(&mut self, event: GameEvent) {
        log::debug!("event: {:?}", event);
        for listener in &mut self.listeners {
            listener(&event);
        }
        self.pending.push(event);
    }

    /// Events emitted since the last drain
    pub fn pending(&self) -> &[GameEvent] {
        &self.pending
    }

    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending)
    }

    /// How many pending events match `pred`
    pub fn count(&self, pred: impl Fn(&GameEvent) -> bool) -> usize {
        self.pending.iter().filter(|e| pred(*e)).count()
    }
}
