//! Brick Session demo entry point
//!
//! Runs a headless session against the in-memory arena with a crude host-side
//! collision pass, logging every session event.
//!
//! Usage: `brick-session [level.json] [tuning.json]`

use glam::Vec2;

use brick_session::consts::*;
use brick_session::sim::{Arena, EntityKind, EntityWorld, GamePhase, Session, WallKind};
use brick_session::{ConfigError, LevelConfiguration, LevelUnlocks, SessionTuning};

/// Give up after this many simulated seconds
const MAX_SECONDS: f32 = 120.0;
/// Ball-vs-block hit distance
const HIT_RADIUS: f32 = 0.45;

fn load_configs() -> Result<(LevelConfiguration, SessionTuning), ConfigError> {
    let mut args = std::env::args().skip(1);
    let level = match args.next() {
        Some(path) => LevelConfiguration::load(path)?,
        None => LevelConfiguration {
            rows: 2,
            columns: 4,
            ..Default::default()
        },
    };
    let tuning = match args.next() {
        Some(path) => SessionTuning::load(path)?,
        None => SessionTuning {
            lives: Some(3),
            seed: 7,
            ..Default::default()
        },
    };
    Ok((level, tuning))
}

/// Host-side collision pass: reports contacts to the session
fn collide(session: &mut Session<Arena>) {
    let Some(ball) = session.ball() else {
        return;
    };
    let Some(body) = session.world().get(ball).cloned() else {
        return;
    };
    if body.kinematic {
        return;
    }
    let field = session.tuning().field;
    let mut vel = body.vel;

    if body.pos.x <= field.left && vel.x < 0.0 {
        vel.x = -vel.x;
        session.on_wall_hit(WallKind::Left);
    } else if body.pos.x >= field.right && vel.x > 0.0 {
        vel.x = -vel.x;
        session.on_wall_hit(WallKind::Right);
    }
    if body.pos.y >= field.top && vel.y > 0.0 {
        vel.y = -vel.y;
        session.on_wall_hit(WallKind::Top);
    }
    session.world_mut().set_velocity(ball, vel);

    let hit_block = session
        .world()
        .bodies()
        .find(|b| b.kind == EntityKind::Block && b.pos.distance(body.pos) < HIT_RADIUS)
        .map(|b| b.handle);
    if let Some(block) = hit_block {
        session.world_mut().set_velocity(ball, Vec2::new(vel.x, -vel.y));
        session.on_block_hit(block);
        return;
    }

    if let Some(paddle_pos) = session.paddle().and_then(|p| session.world().position(p)) {
        let offset = body.pos - paddle_pos;
        let near = offset.x.abs() < 0.8 && offset.y.abs() < 0.2;
        if near && vel.y < 0.0 {
            session.on_paddle_hit();
            return;
        }
    }

    if body.pos.y < field.bottom {
        session.on_ball_lost();
    }
}

fn main() {
    env_logger::init();
    log::info!("Brick Session (headless) starting...");

    let (level, tuning) = match load_configs() {
        Ok(configs) => configs,
        Err(e) => {
            log::error!("Config error: {}", e);
            std::process::exit(1);
        }
    };

    let mut session = Session::new(Arena::new(), tuning, level)
        .with_progression(LevelUnlocks::new());
    session.subscribe(|event| log::info!("{:?}", event));
    session.start_game(None);

    let mut elapsed = 0.0;
    while elapsed < MAX_SECONDS && session.phase() == GamePhase::Playing {
        // Track the ball with the paddle, launch whenever it's attached
        if let Some(ball_pos) = session.ball().and_then(|b| session.world().position(b)) {
            let x = ball_pos.x.clamp(FIELD_LEFT + 0.5, FIELD_RIGHT - 0.5);
            session.move_paddle(Vec2::new(x, PADDLE_SPAWN_Y));
        }
        session.request_launch();

        session.world_mut().integrate(SIM_DT);
        collide(&mut session);
        session.tick(SIM_DT);
        session.drain_events();
        elapsed += SIM_DT;
    }

    match serde_json::to_string_pretty(&session.snapshot()) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to serialize snapshot: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing_session() -> Session<Arena> {
        let level = LevelConfiguration {
            rows: 1,
            columns: 2,
            ..Default::default()
        };
        let mut session = Session::new(Arena::new(), SessionTuning::default(), level);
        session.start_game(None);
        session.request_launch();
        session
    }

    #[test]
    fn test_collide_reports_ball_below_field() {
        let mut session = playing_session();
        let ball = session.ball().unwrap();
        session
            .world_mut()
            .set_position(ball, Vec2::new(0.0, FIELD_BOTTOM - 1.0));
        session.world_mut().set_velocity(ball, Vec2::new(0.0, -5.0));

        collide(&mut session);

        assert_eq!(session.ball(), None);
        assert!(session.respawn().is_active());
    }

    #[test]
    fn test_collide_reflects_off_left_wall() {
        let mut session = playing_session();
        let ball = session.ball().unwrap();
        session
            .world_mut()
            .set_position(ball, Vec2::new(FIELD_LEFT - 0.1, 0.0));
        session.world_mut().set_velocity(ball, Vec2::new(-3.0, -1.0));

        collide(&mut session);

        assert_eq!(session.world().velocity(ball), Some(Vec2::new(3.0, -1.0)));
    }
}
