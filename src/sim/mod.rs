//! Session simulation module
//!
//! All session logic lives here. It is single-threaded and frame-driven:
//! - The host calls `Session::tick(dt)` once per frame
//! - Collision and input arrive as method calls on `Session`
//! - Entities live in an `EntityWorld` the host provides

pub mod attach;
pub mod blocks;
pub mod events;
pub mod level;
pub mod respawn;
pub mod session;
pub mod state;
pub mod timer;
pub mod world;

pub use attach::{BallAttachment, BallState, launch_velocity, paddle_bounce};
pub use blocks::{BlockCompletionTracker, NOT_TRACKING};
pub use events::{EventQueue, GameEvent};
pub use level::{LevelLifecycle, LevelSpawn, SpawnedEntities, block_grid};
pub use respawn::RespawnScheduler;
pub use session::{Session, SessionSnapshot};
pub use state::{GamePhase, SessionState};
pub use timer::LevelTimer;
pub use world::{Arena, Body, EntityHandle, EntityKind, EntityWorld, WallKind};
