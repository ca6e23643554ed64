//! Fixed timestep simulation tick
//!
//! One tick runs the whole pipeline in a fixed order: clock advance, due
//! wake-ups (item reverts), speed easing, entity integration, collision
//! response, then pickup activations. Reverts always run before the same
//! frame's activations, so a freshly caught item can never be expired by a
//! stale wake-up from the same frame.

use glam::Vec2;

use super::collision::{
    ball_rect_collision, circle_rect_overlap, paddle_bounce_dir, CollisionEvent, EntityRef,
};
use super::items::{self, ItemKind};
use super::state::{BallState, GameEvent, GamePhase, Pickup, Session};
use crate::audio::{AudioSink, SoundEffect};
use crate::clamp_speed;
use crate::consts::*;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Target paddle x (from mouse/keyboard position)
    pub target_x: Option<f32>,
    /// Launch ball (click/space)
    pub launch: bool,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the session by one fixed timestep
pub fn tick(session: &mut Session, input: &TickInput, dt: f32, audio: &mut dyn AudioSink) {
    // Handle pause toggle
    if input.pause {
        match session.phase {
            GamePhase::Playing | GamePhase::Serve => {
                session.phase = GamePhase::Paused;
                session.clock.pause();
                return;
            }
            GamePhase::Paused => {
                session.phase = if session
                    .balls
                    .iter()
                    .any(|b| matches!(b.state, BallState::Attached { .. }))
                {
                    GamePhase::Serve
                } else {
                    GamePhase::Playing
                };
                session.clock.resume();
            }
            _ => {}
        }
    }

    // Don't tick if paused or in a terminal phase
    match session.phase {
        GamePhase::Paused | GamePhase::GameOver | GamePhase::GameWon => return,
        _ => {}
    }

    // Clock first, scaled by the multiplier as it stands this frame
    session.clock.advance(dt, session.speed.current());
    let now = session.clock.elapsed_seconds();

    // Fire every due wake-up, oldest first, and apply the reverts. The
    // payloads are drained before applying so the queue borrow ends here.
    let mut due: Vec<(f32, ItemKind)> = Vec::new();
    session.timeouts.fire_due(now, |at, kind| due.push((at, kind)));
    for (_, kind) in due {
        items::revert(session, kind);
    }

    // Ease the speed multiplier; music pitch follows while it moves
    if session.speed.tick(dt) {
        audio.set_music_pitch(session.speed.current());
    }

    // Update paddle position (player input runs at real-time rate)
    if let Some(target) = input.target_x {
        session.paddle.move_toward(target, dt, PADDLE_SPEED);
    } else {
        session.paddle.vel_x = 0.0;
    }

    // Entity motion runs on slow-motion time
    let sim_dt = dt * session.speed.current();

    match session.phase {
        GamePhase::Serve => {
            for ball in &mut session.balls {
                ball.update_attached(&session.paddle);
            }

            if input.launch {
                for ball in &mut session.balls {
                    if matches!(ball.state, BallState::Attached { .. }) {
                        ball.launch(&session.paddle, BALL_START_SPEED, 0.5);
                    }
                }
                session.phase = GamePhase::Playing;
                audio.play_effect(SoundEffect::Launch);
            }

            update_pickups(session, sim_dt, audio);
        }

        GamePhase::Playing => {
            update_balls(session, sim_dt, audio);
            update_pickups(session, sim_dt, audio);
            handle_ball_loss(session, audio);
        }

        _ => {}
    }
}

/// Integrate free balls and resolve wall, block, and paddle contacts
fn update_balls(session: &mut Session, sim_dt: f32, audio: &mut dyn AudioSink) {
    let mut destroyed: Vec<(u32, Vec2, u32)> = Vec::new();

    {
        let s = &mut *session;
        for ball in &mut s.balls {
            if !matches!(ball.state, BallState::Free) {
                continue;
            }

            ball.pos += ball.vel * sim_dt;

            // Arena walls: left, right, top
            if ball.pos.x - ball.radius < 0.0 && ball.vel.x < 0.0 {
                ball.pos.x = ball.radius;
                ball.vel.x = -ball.vel.x;
                audio.play_effect(SoundEffect::WallHit);
            } else if ball.pos.x + ball.radius > ARENA_WIDTH && ball.vel.x > 0.0 {
                ball.pos.x = ARENA_WIDTH - ball.radius;
                ball.vel.x = -ball.vel.x;
                audio.play_effect(SoundEffect::WallHit);
            }
            if ball.pos.y - ball.radius < 0.0 && ball.vel.y < 0.0 {
                ball.pos.y = ball.radius;
                ball.vel.y = -ball.vel.y;
                audio.play_effect(SoundEffect::WallHit);
            }

            // Blocks: resolve at most one contact per ball per tick
            for block in &mut s.blocks {
                if block.hp == 0 {
                    continue;
                }
                if ball.smash {
                    // Smash mode: destroy and keep flying
                    if circle_rect_overlap(ball.pos, ball.radius, block.pos, block.half) {
                        block.hp = 0;
                        destroyed.push((block.id, block.pos, block.score_value));
                        break;
                    }
                } else if let Some(hit) =
                    ball_rect_collision(ball.pos, ball.radius, ball.vel, block.pos, block.half)
                {
                    ball.pos = hit.pos;
                    ball.vel = hit.vel;
                    block.hp -= 1;
                    if block.hp == 0 {
                        destroyed.push((block.id, block.pos, block.score_value));
                    } else {
                        audio.play_effect(SoundEffect::BlockHit);
                    }
                    break;
                }
            }

            // Paddle: bounce angle depends on where the ball lands
            if ball.vel.y > 0.0
                && circle_rect_overlap(
                    ball.pos,
                    ball.radius,
                    s.paddle.pos,
                    s.paddle.half_extents(),
                )
            {
                let offset = (ball.pos.x - s.paddle.pos.x) / (s.paddle.width / 2.0);
                ball.vel = clamp_speed(
                    paddle_bounce_dir(offset) * ball.vel.length(),
                    BALL_MIN_SPEED,
                    BALL_MAX_SPEED,
                );
                ball.pos.y = s.paddle.pos.y - s.paddle.half_extents().y - ball.radius - 0.01;
                audio.play_effect(SoundEffect::PaddleHit);
            }
        }
    }

    if destroyed.is_empty() {
        return;
    }

    session.blocks.retain(|b| b.hp > 0);
    for (id, pos, score) in destroyed {
        session.player.score += score as u64;
        session.events.push(GameEvent::BlockDestroyed { id });
        audio.play_effect(SoundEffect::BlockBreak);

        if let Some(kind) = items::roll_drop(&mut session.rng_state) {
            let pickup_id = session.next_entity_id();
            session.pickups.push(Pickup {
                id: pickup_id,
                kind,
                pos,
                vel: Vec2::ZERO,
            });
            log::info!("Block {id} dropped {kind:?}");
        }
    }

    if session.blocks.is_empty() {
        session.events.push(GameEvent::LevelCleared);
        audio.play_effect(SoundEffect::LevelClear);
        log::info!("Level {} cleared", session.level_id);
    }
}

/// Integrate falling pickups, despawn the missed ones, and feed paddle
/// contacts to the item lifecycle
fn update_pickups(session: &mut Session, sim_dt: f32, audio: &mut dyn AudioSink) {
    for pickup in &mut session.pickups {
        pickup.vel.y = (pickup.vel.y + PICKUP_FALL_ACCEL * sim_dt).min(PICKUP_MAX_FALL_SPEED);
        pickup.pos += pickup.vel * sim_dt;
    }
    session
        .pickups
        .retain(|p| p.pos.y - PICKUP_RADIUS < ARENA_HEIGHT);

    // Collision source: pickups overlapping the paddle
    let paddle_pos = session.paddle.pos;
    let paddle_half = session.paddle.half_extents();
    let caught: Vec<CollisionEvent> = session
        .pickups
        .iter()
        .filter(|p| circle_rect_overlap(p.pos, PICKUP_RADIUS, paddle_pos, paddle_half))
        .map(|p| CollisionEvent {
            subject: EntityRef::Pickup(p.id),
            collided: EntityRef::Paddle,
        })
        .collect();

    for event in caught {
        items::on_pickup_collision(session, event, audio);
    }
}

/// Remove balls that fell past the bottom edge; deduct a life and re-serve
/// when the last one goes
fn handle_ball_loss(session: &mut Session, audio: &mut dyn AudioSink) {
    let mut lost: Vec<u32> = Vec::new();
    session.balls.retain(|ball| {
        if ball.pos.y - ball.radius > ARENA_HEIGHT {
            lost.push(ball.id);
            false
        } else {
            true
        }
    });

    for id in lost {
        session.events.push(GameEvent::BallLost { id });
        audio.play_effect(SoundEffect::BallLost);
    }

    if session.balls.is_empty() && session.phase == GamePhase::Playing {
        session.player.lives = session.player.lives.saturating_sub(1);
        session.events.push(GameEvent::LifeLost);
        log::info!("Ball lost - {} lives left", session.player.lives);

        if session.player.lives == 0 {
            session.phase = GamePhase::GameOver;
            session.events.push(GameEvent::GameOver);
            audio.play_effect(SoundEffect::GameOver);
        } else {
            session.spawn_ball_attached();
            session.phase = GamePhase::Serve;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioCommand, NullAudio, QueuedAudio};
    use crate::levels::LevelLibrary;
    use crate::sim::level::load_level;
    use crate::sim::state::Block;

    fn playing_session() -> Session {
        let mut session = Session::new(12345);
        let levels = LevelLibrary::default_campaign();
        load_level(&mut session, &levels, 1).unwrap();
        let input = TickInput {
            launch: true,
            ..Default::default()
        };
        tick(&mut session, &input, SIM_DT, &mut NullAudio);
        session
    }

    #[test]
    fn test_tick_serve_to_playing() {
        let mut session = Session::new(12345);
        let levels = LevelLibrary::default_campaign();
        load_level(&mut session, &levels, 1).unwrap();
        assert_eq!(session.phase, GamePhase::Serve);
        assert_eq!(session.balls.len(), 1);

        // Tick without launch - should stay in Serve
        let input = TickInput::default();
        tick(&mut session, &input, SIM_DT, &mut NullAudio);
        assert_eq!(session.phase, GamePhase::Serve);

        // Launch
        let input = TickInput {
            launch: true,
            ..Default::default()
        };
        tick(&mut session, &input, SIM_DT, &mut NullAudio);
        assert_eq!(session.phase, GamePhase::Playing);
        assert!(matches!(session.balls[0].state, BallState::Free));
    }

    #[test]
    fn test_tick_pause_freezes_clock() {
        let mut session = playing_session();

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut session, &pause, SIM_DT, &mut NullAudio);
        assert_eq!(session.phase, GamePhase::Paused);

        let frozen = session.clock.elapsed_seconds();
        for _ in 0..100 {
            tick(&mut session, &TickInput::default(), SIM_DT, &mut NullAudio);
        }
        assert_eq!(session.clock.elapsed_seconds(), frozen);

        // Unpause resumes the clock
        tick(&mut session, &pause, SIM_DT, &mut NullAudio);
        tick(&mut session, &TickInput::default(), SIM_DT, &mut NullAudio);
        assert!(session.clock.elapsed_seconds() > frozen);
    }

    #[test]
    fn test_timed_effect_reverts_at_wakeup() {
        let mut session = playing_session();

        // Catch a smash item right now
        let pickup_id = session.next_entity_id();
        session.pickups.push(Pickup {
            id: pickup_id,
            kind: ItemKind::SmashBall,
            pos: session.paddle.pos,
            vel: Vec2::ZERO,
        });
        tick(&mut session, &TickInput::default(), SIM_DT, &mut NullAudio);
        assert!(session.balls.iter().all(|b| b.smash));

        let wakeup = session.timeouts.next_wakeup().expect("revert scheduled");

        // Park the ball where nothing can interfere, then run the clock out
        let mut ticks = 0;
        while session.clock.elapsed_seconds() < wakeup {
            session.balls[0].pos = Vec2::new(ARENA_WIDTH / 2.0, ARENA_HEIGHT / 2.0);
            session.balls[0].vel = Vec2::ZERO;
            assert!(
                session.balls.iter().all(|b| b.smash),
                "reverted before its wake-up time"
            );
            tick(&mut session, &TickInput::default(), SIM_DT, &mut NullAudio);
            ticks += 1;
            assert!(ticks < 100_000, "wake-up never fired");
        }
        assert!(session.balls.iter().all(|b| !b.smash));
        assert!(session.timeouts.is_empty());
    }

    #[test]
    fn test_block_destruction_scores_and_clears() {
        let mut session = playing_session();

        // Strip the board down to one brittle block right above the ball
        session.blocks.clear();
        let id = session.next_entity_id();
        session.blocks.push(Block {
            id,
            pos: Vec2::new(400.0, 300.0),
            half: Vec2::new(BLOCK_WIDTH / 2.0, BLOCK_HEIGHT / 2.0),
            hp: 1,
            score_value: 50,
        });
        session.balls[0].pos = Vec2::new(400.0, 330.0);
        session.balls[0].vel = Vec2::new(0.0, -BALL_START_SPEED);

        let mut ticks = 0;
        while !session.blocks.is_empty() {
            tick(&mut session, &TickInput::default(), SIM_DT, &mut NullAudio);
            ticks += 1;
            assert!(ticks < 1000, "ball never reached the block");
        }
        assert_eq!(session.player.score, 50);
        assert!(session.events.contains(&GameEvent::BlockDestroyed { id }));
        assert!(session.events.contains(&GameEvent::LevelCleared));
        // Ball bounced off, not through
        assert!(session.balls[0].vel.y > 0.0);
    }

    #[test]
    fn test_smash_ball_breaks_through() {
        let mut session = playing_session();

        session.blocks.clear();
        let id = session.next_entity_id();
        session.blocks.push(Block {
            id,
            pos: Vec2::new(400.0, 300.0),
            half: Vec2::new(BLOCK_WIDTH / 2.0, BLOCK_HEIGHT / 2.0),
            hp: 3,
            score_value: 150,
        });
        session.balls[0].pos = Vec2::new(400.0, 330.0);
        session.balls[0].vel = Vec2::new(0.0, -BALL_START_SPEED);
        session.balls[0].smash = true;

        let mut ticks = 0;
        while !session.blocks.is_empty() {
            tick(&mut session, &TickInput::default(), SIM_DT, &mut NullAudio);
            ticks += 1;
            assert!(ticks < 1000, "smash ball never reached the block");
        }
        // One touch destroyed a 3 hp block, and the ball kept rising
        assert!(session.balls[0].vel.y < 0.0);
    }

    #[test]
    fn test_ball_loss_costs_life_and_reserves() {
        let mut session = playing_session();
        session.balls[0].pos = Vec2::new(400.0, ARENA_HEIGHT + 50.0);
        session.balls[0].vel = Vec2::new(0.0, 100.0);

        tick(&mut session, &TickInput::default(), SIM_DT, &mut NullAudio);
        assert_eq!(session.player.lives, 2);
        assert_eq!(session.phase, GamePhase::Serve);
        assert_eq!(session.balls.len(), 1);
        assert!(matches!(session.balls[0].state, BallState::Attached { .. }));
    }

    #[test]
    fn test_last_life_ends_game() {
        let mut session = playing_session();
        session.player.lives = 1;
        session.balls[0].pos = Vec2::new(400.0, ARENA_HEIGHT + 50.0);

        tick(&mut session, &TickInput::default(), SIM_DT, &mut NullAudio);
        assert_eq!(session.phase, GamePhase::GameOver);
        assert!(session.events.contains(&GameEvent::GameOver));

        // Terminal - further ticks change nothing
        let clock = session.clock.elapsed_seconds();
        tick(&mut session, &TickInput::default(), SIM_DT, &mut NullAudio);
        assert_eq!(session.clock.elapsed_seconds(), clock);
    }

    #[test]
    fn test_speed_easing_drives_music_pitch() {
        let mut session = playing_session();
        session.speed.set_goal(SLOMO_SPEED_GOAL);

        let mut audio = QueuedAudio::new();
        tick(&mut session, &TickInput::default(), SIM_DT, &mut audio);

        let pitched = audio.drain().into_iter().any(|c| match c {
            AudioCommand::MusicPitch(p) => p < 1.0,
            _ => false,
        });
        assert!(pitched, "easing tick should push the new pitch");
    }

    #[test]
    fn test_determinism() {
        // Two sessions with the same seed and inputs stay identical
        let levels = LevelLibrary::default_campaign();
        let mut s1 = Session::new(99999);
        let mut s2 = Session::new(99999);
        load_level(&mut s1, &levels, 1).unwrap();
        load_level(&mut s2, &levels, 1).unwrap();

        let script = [
            TickInput {
                target_x: Some(100.0),
                ..Default::default()
            },
            TickInput {
                launch: true,
                ..Default::default()
            },
            TickInput {
                target_x: Some(700.0),
                ..Default::default()
            },
            TickInput::default(),
        ];

        for _ in 0..600 {
            for input in &script {
                tick(&mut s1, input, SIM_DT, &mut NullAudio);
                tick(&mut s2, input, SIM_DT, &mut NullAudio);
            }
        }

        assert_eq!(s1.clock.elapsed_seconds(), s2.clock.elapsed_seconds());
        assert_eq!(s1.balls.len(), s2.balls.len());
        assert_eq!(s1.blocks.len(), s2.blocks.len());
        assert_eq!(s1.pickups.len(), s2.pickups.len());
        assert_eq!(s1.player.score, s2.player.score);
        assert_eq!(s1.paddle.pos.x, s2.paddle.pos.x);
    }
}
