//! Entity world boundary
//!
//! The session never owns rendering or physics bodies directly. It talks to
//! whatever hosts them through `EntityWorld`, holding only opaque handles.
//! `Arena` is a plain in-memory world for headless runs and tests.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Opaque handle to a spawned entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityHandle(pub u32);

/// Which wall of the play field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WallKind {
    Left,
    Right,
    Top,
}

/// What to spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Wall(WallKind),
    Paddle,
    Block,
    Ball,
}

/// Host-side entity storage and body control
pub trait EntityWorld {
    /// Spawn an entity at `pos`. `None` means the host couldn't create it.
    fn spawn(&mut self, kind: EntityKind, pos: Vec2) -> Option<EntityHandle>;

    /// Remove an entity. Unknown handles are ignored.
    fn despawn(&mut self, handle: EntityHandle);

    fn position(&self, handle: EntityHandle) -> Option<Vec2>;

    fn set_position(&mut self, handle: EntityHandle, pos: Vec2);

    fn velocity(&self, handle: EntityHandle) -> Option<Vec2>;

    fn set_velocity(&mut self, handle: EntityHandle, vel: Vec2);

    /// Kinematic bodies ignore forces and collisions responses
    fn set_kinematic(&mut self, handle: EntityHandle, kinematic: bool);

    /// Size of one block, if the host knows it from the block asset
    fn block_size(&self) -> Option<Vec2> {
        None
    }
}

/// An entity stored in the arena
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub handle: EntityHandle,
    pub kind: EntityKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub kinematic: bool,
}

/// In-memory world (sorted by handle for deterministic iteration)
#[derive(Debug, Clone, Default)]
pub struct Arena {
    bodies: Vec<Body>,
    next_id: u32,
    block_size: Option<Vec2>,
    /// Remaining forced spawn failures per kind
    failures: Vec<(EntityKind, u32)>,
}

impl Arena {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    /// Report a block size, as if measured from the block asset
    pub fn with_block_size(mut self, size: Vec2) -> Self {
        self.block_size = Some(size);
        self
    }

    /// Make the next `count` spawns of `kind` fail
    pub fn fail_spawns(&mut self, kind: EntityKind, count: u32) {
        self.failures.retain(|(k, _)| *k != kind);
        if count > 0 {
            self.failures.push((kind, count));
        }
    }

    pub fn get(&self, handle: EntityHandle) -> Option<&Body> {
        self.bodies
            .binary_search_by_key(&handle, |b| b.handle)
            .ok()
            .map(|i| &self.bodies[i])
    }

    fn get_mut(&mut self, handle: EntityHandle) -> Option<&mut Body> {
        self.bodies
            .binary_search_by_key(&handle, |b| b.handle)
            .ok()
            .map(|i| &mut self.bodies[i])
    }

    pub fn contains(&self, handle: EntityHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Number of live entities of `kind`
    pub fn count(&self, kind: EntityKind) -> usize {
        self.bodies.iter().filter(|b| b.kind == kind).count()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn bodies(&self) -> impl Iterator<Item = &Body> {
        self.bodies.iter()
    }

    /// Advance free (non-kinematic) bodies by their velocity
    pub fn integrate(&mut self, dt: f32) {
        for body in self.bodies.iter_mut().filter(|b| !b.kinematic) {
            body.pos += body.vel * dt;
        }
    }

    fn take_failure(&mut self, kind: EntityKind) -> bool {
        let Some(slot) = self.failures.iter_mut().find(|(k, _)| *k == kind) else {
            return false;
        };
        slot.1 -= 1;
        if slot.1 == 0 {
            self.failures.retain(|(k, _)| *k != kind);
        }
        true
    }
}

impl EntityWorld for Arena {
    fn spawn(&mut self, kind: EntityKind, pos: Vec2) -> Option<EntityHandle> {
        if self.take_failure(kind) {
            return None;
        }
        let handle = EntityHandle(self.next_id.max(1));
        self.next_id = handle.0 + 1;
        // Walls, paddles and blocks don't move on their own
        let kinematic = kind != EntityKind::Ball;
        self.bodies.push(Body {
            handle,
            kind,
            pos,
            vel: Vec2::ZERO,
            kinematic,
        });
        Some(handle)
    }

    fn despawn(&mut self, handle: EntityHandle) {
        self.bodies.retain(|b| b.handle != handle);
    }

    fn position(&self, handle: EntityHandle) -> Option<Vec2> {
        self.get(handle).map(|b| b.pos)
    }

    fn set_position(&mut self, handle: EntityHandle, pos: Vec2) {
        if let Some(body) = self.get_mut(handle) {
            body.pos = pos;
        }
    }

    fn velocity(&self, handle: EntityHandle) -> Option<Vec2> {
        self.get(handle).map(|b| b.vel)
    }

    fn set_velocity(&mut self, handle: EntityHandle, vel: Vec2) {
        if let Some(body) = self.get_mut(handle) {
            body.vel = vel;
        }
    }

    fn set_kinematic(&mut self, handle: EntityHandle, kinematic: bool) {
        if let Some(body) = self.get_mut(handle) {
            body.kinematic = kinematic;
        }
    }

    fn block_size(&self) -> Option<Vec2> {
        self.block_size
    }
}
