//! Level lifecycle: ordered spawn and teardown of per-level entities
//!
//! Spawn order is walls -> paddle -> blocks -> ball. The ball needs the paddle
//! to exist, so a missing paddle skips the ball (with a warning) rather than
//! failing the level. This module is the only place that despawns these
//! entities.

use glam::Vec2;

use super::world::{EntityHandle, EntityKind, EntityWorld, WallKind};
use crate::consts::{BLOCK_FALLBACK_HEIGHT, BLOCK_FALLBACK_WIDTH};
use crate::settings::{LevelConfiguration, PlayField, SessionTuning};

/// Handles for everything a level spawned
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpawnedEntities {
    pub walls: Vec<(WallKind, EntityHandle)>,
    pub paddle: Option<EntityHandle>,
    pub blocks: Vec<EntityHandle>,
    pub ball: Option<EntityHandle>,
}

impl SpawnedEntities {
    pub fn is_empty(&self) -> bool {
        self.walls.is_empty() && self.paddle.is_none() && self.blocks.is_empty() && self.ball.is_none()
    }
}

/// Outcome of `spawn_level`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelSpawn {
    /// Blocks actually spawned (grid size minus failures)
    pub blocks: i32,
    pub paddle: Option<EntityHandle>,
    pub ball: Option<EntityHandle>,
}

/// Block centers for a `rows x columns` grid, row-major from the top-left.
///
/// The grid is centered between the side walls and hangs below the top wall.
pub fn block_grid(field: &PlayField, config: &LevelConfiguration, cell: Vec2) -> Vec<Vec2> {
    let step_x = cell.x + config.spacing_x;
    let step_y = cell.y + config.spacing_y;
    let grid_width = config.columns.saturating_sub(1) as f32 * step_x;
    let start_x = field.center_x() - grid_width / 2.0 + config.spawn_offset.x;
    let start_y = field.top + config.spawn_offset.y - cell.y / 2.0;

    (0..config.rows)
        .flat_map(|r| {
            (0..config.columns)
                .map(move |c| Vec2::new(start_x + c as f32 * step_x, start_y - r as f32 * step_y))
        })
        .collect()
}

/// Owns the per-level entity set
#[derive(Debug, Clone)]
pub struct LevelLifecycle {
    field: PlayField,
    paddle_spawn: Vec2,
    ball_offset: Vec2,
    spawned: SpawnedEntities,
    block_positions: Vec<Vec2>,
}

impl LevelLifecycle {
    pub fn new(tuning: &SessionTuning) -> Self {
        Self {
            field: tuning.field,
            paddle_spawn: tuning.paddle_spawn,
            ball_offset: tuning.ball_offset,
            spawned: SpawnedEntities::default(),
            block_positions: Vec::new(),
        }
    }

    pub fn spawned(&self) -> &SpawnedEntities {
        &self.spawned
    }

    pub fn paddle(&self) -> Option<EntityHandle> {
        self.spawned.paddle
    }

    pub fn ball(&self) -> Option<EntityHandle> {
        self.spawned.ball
    }

    pub fn block_count(&self) -> usize {
        self.spawned.blocks.len()
    }

    /// Positions the current level's blocks were placed at (spawned or not)
    pub fn block_positions(&self) -> &[Vec2] {
        &self.block_positions
    }

    pub fn is_spawned(&self) -> bool {
        !self.spawned.is_empty()
    }

    /// Tear down whatever is left, then spawn a fresh level
    pub fn spawn_level(
        &mut self,
        world: &mut dyn EntityWorld,
        config: &LevelConfiguration,
    ) -> LevelSpawn {
        self.destroy_level(world);

        self.spawn_walls(world);
        self.spawn_paddle(world);
        let blocks = self.spawn_blocks(world, config);
        let ball = self.spawn_ball(world);

        log::info!(
            "Level {}: {}x{} grid, {} blocks spawned",
            config.id,
            config.rows,
            config.columns,
            blocks
        );

        LevelSpawn {
            blocks,
            paddle: self.spawned.paddle,
            ball,
        }
    }

    fn spawn_walls(&mut self, world: &mut dyn EntityWorld) {
        let mid_y = (self.field.top + self.field.bottom) / 2.0;
        let walls = [
            (WallKind::Left, Vec2::new(self.field.left, mid_y)),
            (WallKind::Right, Vec2::new(self.field.right, mid_y)),
            (WallKind::Top, Vec2::new(self.field.center_x(), self.field.top)),
        ];
        for (kind, pos) in walls {
            match world.spawn(EntityKind::Wall(kind), pos) {
                Some(handle) => self.spawned.walls.push((kind, handle)),
                None => log::warn!("Failed to spawn {:?} wall", kind),
            }
        }
    }

    fn spawn_paddle(&mut self, world: &mut dyn EntityWorld) {
        self.spawned.paddle = world.spawn(EntityKind::Paddle, self.paddle_spawn);
        if self.spawned.paddle.is_none() {
            log::warn!("Failed to spawn paddle");
        }
    }

    fn spawn_blocks(&mut self, world: &mut dyn EntityWorld, config: &LevelConfiguration) -> i32 {
        let cell = world
            .block_size()
            .unwrap_or(Vec2::new(BLOCK_FALLBACK_WIDTH, BLOCK_FALLBACK_HEIGHT));
        self.block_positions = block_grid(&self.field, config, cell);

        for &pos in &self.block_positions {
            match world.spawn(EntityKind::Block, pos) {
                Some(handle) => self.spawned.blocks.push(handle),
                None => log::warn!("Failed to spawn block at {:?}", pos),
            }
        }
        self.spawned.blocks.len() as i32
    }

    /// Spawn a ball above the paddle, replacing any existing ball.
    ///
    /// Returns `None` if there is no paddle to spawn on.
    pub fn spawn_ball(&mut self, world: &mut dyn EntityWorld) -> Option<EntityHandle> {
        self.release_ball(world);

        let Some(paddle_pos) = self.spawned.paddle.and_then(|p| world.position(p)) else {
            log::warn!("No paddle available, skipping ball spawn");
            return None;
        };
        self.spawned.ball = world.spawn(EntityKind::Ball, paddle_pos + self.ball_offset);
        if self.spawned.ball.is_none() {
            log::warn!("Failed to spawn ball");
        }
        self.spawned.ball
    }

    /// Despawn the ball, if any
    pub fn release_ball(&mut self, world: &mut dyn EntityWorld) {
        if let Some(ball) = self.spawned.ball.take() {
            world.despawn(ball);
        }
    }

    /// Despawn one block. Returns false if it isn't (or is no longer) ours.
    pub fn remove_block(&mut self, world: &mut dyn EntityWorld, handle: EntityHandle) -> bool {
        let Some(index) = self.spawned.blocks.iter().position(|&b| b == handle) else {
            return false;
        };
        self.spawned.blocks.swap_remove(index);
        world.despawn(handle);
        true
    }

    /// Release walls, paddle, blocks and ball. Safe to call when empty.
    pub fn destroy_level(&mut self, world: &mut dyn EntityWorld) -> bool {
        if !self.is_spawned() {
            return false;
        }
        let spawned = std::mem::take(&mut self.spawned);
        for (_, wall) in spawned.walls {
            world.despawn(wall);
        }
        for block in spawned.blocks {
            world.despawn(block);
        }
        if let Some(ball) = spawned.ball {
            world.despawn(ball);
        }
        if let Some(paddle) = spawned.paddle {
            world.despawn(paddle);
        }
        self.block_positions.clear();
        log::debug!("Level destroyed");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::world::Arena;

    fn small_level() -> LevelConfiguration {
        LevelConfiguration {
            rows: 2,
            columns: 3,
            spacing_x: 0.1,
            spacing_y: 0.1,
            ..Default::default()
        }
    }

    #[test]
    fn test_grid_positions_inside_walls() {
        let field = PlayField::default();
        let cell = Vec2::new(BLOCK_FALLBACK_WIDTH, BLOCK_FALLBACK_HEIGHT);
        let positions = block_grid(&field, &small_level(), cell);

        assert_eq!(positions.len(), 6);
        for p in &positions {
            assert!(p.x > field.left && p.x < field.right, "x out of field: {p:?}");
            assert!(p.y < field.top, "y above top wall: {p:?}");
        }
    }

    #[test]
    fn test_grid_layout_math() {
        let field = PlayField {
            left: -5.0,
            right: 5.0,
            top: 5.0,
            bottom: -5.0,
        };
        let config = LevelConfiguration {
            spawn_offset: Vec2::new(1.0, -1.0),
            ..small_level()
        };
        let positions = block_grid(&field, &config, Vec2::new(1.0, 0.5));

        // grid width = 2 * 1.1 = 2.2, start x = 0 - 1.1 + 1 = -0.1
        // start y = 5 - 1 - 0.25 = 3.75
        let expect = |x: f32, y: f32, p: Vec2| (p - Vec2::new(x, y)).length() < 1e-5;
        assert!(expect(-0.1, 3.75, positions[0]));
        assert!(expect(1.0, 3.75, positions[1]));
        assert!(expect(2.1, 3.75, positions[2]));
        assert!(expect(-0.1, 3.15, positions[3]));
    }

    #[test]
    fn test_single_column_is_centered() {
        let field = PlayField::default();
        let config = LevelConfiguration {
            rows: 1,
            columns: 1,
            ..Default::default()
        };
        let positions = block_grid(&field, &config, Vec2::ONE);
        assert_eq!(positions[0].x, field.center_x());
    }

    #[test]
    fn test_spawn_order_and_counts() {
        let mut arena = Arena::new();
        let mut level = LevelLifecycle::new(&SessionTuning::default());
        let spawn = level.spawn_level(&mut arena, &small_level());

        assert_eq!(spawn.blocks, 6);
        assert_eq!(arena.count(EntityKind::Block), 6);
        assert_eq!(arena.count(EntityKind::Paddle), 1);
        assert_eq!(arena.count(EntityKind::Ball), 1);

        // Handles are allocated in spawn order
        let spawned = level.spawned();
        let last_wall = spawned.walls.iter().map(|(_, h)| *h).max().unwrap();
        let paddle = spawned.paddle.unwrap();
        let first_block = *spawned.blocks.iter().min().unwrap();
        let ball = spawned.ball.unwrap();
        assert!(last_wall < paddle && paddle < first_block && first_block < ball);
    }

    #[test]
    fn test_ball_spawns_above_paddle() {
        let mut arena = Arena::new();
        let tuning = SessionTuning::default();
        let mut level = LevelLifecycle::new(&tuning);
        let spawn = level.spawn_level(&mut arena, &small_level());
        let ball_pos = arena.position(spawn.ball.unwrap()).unwrap();
        assert_eq!(ball_pos, tuning.paddle_spawn + tuning.ball_offset);
    }

    #[test]
    fn test_missing_paddle_skips_ball_only() {
        let mut arena = Arena::new();
        arena.fail_spawns(EntityKind::Paddle, 1);
        let mut level = LevelLifecycle::new(&SessionTuning::default());
        let spawn = level.spawn_level(&mut arena, &small_level());

        assert!(spawn.paddle.is_none());
        assert!(spawn.ball.is_none());
        assert_eq!(spawn.blocks, 6);
        assert_eq!(level.spawned().walls.len(), 3);
    }

    #[test]
    fn test_block_failures_reduce_count() {
        let mut arena = Arena::new();
        arena.fail_spawns(EntityKind::Block, 2);
        let mut level = LevelLifecycle::new(&SessionTuning::default());
        let spawn = level.spawn_level(&mut arena, &small_level());
        assert_eq!(spawn.blocks, 4);
        assert_eq!(level.block_positions().len(), 6);
    }

    #[test]
    fn test_block_size_from_world() {
        let mut arena = Arena::new().with_block_size(Vec2::new(2.0, 1.0));
        let mut level = LevelLifecycle::new(&SessionTuning::default());
        level.spawn_level(&mut arena, &small_level());
        let p = level.block_positions();
        assert!((p[1].x - p[0].x - 2.1).abs() < 1e-5);
    }

    #[test]
    fn test_destroy_releases_everything() {
        let mut arena = Arena::new();
        let mut level = LevelLifecycle::new(&SessionTuning::default());
        level.spawn_level(&mut arena, &small_level());

        assert!(level.destroy_level(&mut arena));
        assert!(arena.is_empty());
        assert!(!level.is_spawned());

        // Second destroy is a no-op
        assert!(!level.destroy_level(&mut arena));
    }

    #[test]
    fn test_respawn_replaces_entities() {
        let mut arena = Arena::new();
        let mut level = LevelLifecycle::new(&SessionTuning::default());
        level.spawn_level(&mut arena, &small_level());
        level.spawn_level(&mut arena, &small_level());
        assert_eq!(arena.count(EntityKind::Block), 6);
        assert_eq!(arena.count(EntityKind::Paddle), 1);
        assert_eq!(arena.len(), 3 + 1 + 6 + 1);
    }

    #[test]
    fn test_remove_block_at_most_once() {
        let mut arena = Arena::new();
        let mut level = LevelLifecycle::new(&SessionTuning::default());
        level.spawn_level(&mut arena, &small_level());
        let block = level.spawned().blocks[0];

        assert!(level.remove_block(&mut arena, block));
        assert!(!level.remove_block(&mut arena, block));
        assert_eq!(level.block_count(), 5);
        assert!(!arena.contains(block));
    }

    #[test]
    fn test_spawn_ball_replaces_existing() {
        let mut arena = Arena::new();
        let mut level = LevelLifecycle::new(&SessionTuning::default());
        let first = level.spawn_level(&mut arena, &small_level()).ball.unwrap();
        let second = level.spawn_ball(&mut arena).unwrap();
        assert_ne!(first, second);
        assert_eq!(arena.count(EntityKind::Ball), 1);
    }
}
