//! Pickup items and their timed, reversible effects
//!
//! An item goes through a small state machine: it exists in the world as a
//! falling pickup, activates exactly once when the paddle catches it, and -
//! if it has a nonzero duration - is reverted exactly once when its timeout
//! fires. Permanent items (duration 0) are done at activation. Effect kinds
//! are a closed data-selected set; activation and reversion are a matched
//! pair of mutations per kind.

use glam::Vec2;

use serde::{Deserialize, Serialize};

use super::collision::{CollisionEvent, EntityRef};
use super::state::{BallState, GameEvent, RngState, Session};
use crate::audio::{AudioSink, SoundEffect};
use crate::consts::*;

/// The closed set of item effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    GrowPaddle,
    ShrinkPaddle,
    FastBall,
    SlowBall,
    /// Balls smash through blocks without reflecting
    SmashBall,
    /// Stopwatch - eases the whole simulation into slow motion
    SlowMotion,
    ExtraBall,
    ExtraLife,
}

/// Drop weights for destroyed-block rolls
const DROP_TABLE: &[(ItemKind, u32)] = &[
    (ItemKind::GrowPaddle, 18),
    (ItemKind::ShrinkPaddle, 14),
    (ItemKind::FastBall, 14),
    (ItemKind::SlowBall, 18),
    (ItemKind::SmashBall, 12),
    (ItemKind::SlowMotion, 12),
    (ItemKind::ExtraBall, 9),
    (ItemKind::ExtraLife, 3),
];

impl ItemKind {
    /// Effect duration in simulated seconds; 0 means permanent (never
    /// reverted)
    pub fn duration_seconds(self) -> f32 {
        match self {
            ItemKind::GrowPaddle | ItemKind::ShrinkPaddle => 10.0,
            ItemKind::FastBall | ItemKind::SlowBall => 8.0,
            ItemKind::SmashBall => 5.0,
            ItemKind::SlowMotion => 6.0,
            ItemKind::ExtraBall | ItemKind::ExtraLife => 0.0,
        }
    }

    pub fn is_permanent(self) -> bool {
        self.duration_seconds() == 0.0
    }
}

/// Roll whether a destroyed block drops an item, and which
pub fn roll_drop(rng: &mut RngState) -> Option<ItemKind> {
    if rng.next_unit() >= ITEM_DROP_CHANCE {
        return None;
    }

    let total: u32 = DROP_TABLE.iter().map(|(_, w)| w).sum();
    let mut pick = (rng.next_unit() * total as f32) as u32;
    for &(kind, weight) in DROP_TABLE {
        if pick < weight {
            return Some(kind);
        }
        pick -= weight;
    }
    // next_unit() < 1.0 keeps pick < total, but don't let a rounding edge
    // drop the roll entirely
    Some(DROP_TABLE[DROP_TABLE.len() - 1].0)
}

/// Handle a collision event raised for a pickup entity.
///
/// Only paddle contacts activate; anything else is ignored. The pickup is
/// resolved by id and removed from the world in the same step, so a
/// duplicate event for an already-consumed pickup finds nothing and is a
/// no-op. Temporary effects register exactly one revert wake-up; permanent
/// effects are terminal here.
pub fn on_pickup_collision(
    session: &mut Session,
    event: CollisionEvent,
    audio: &mut dyn AudioSink,
) {
    if event.collided != EntityRef::Paddle {
        return;
    }
    let EntityRef::Pickup(pickup_id) = event.subject else {
        return;
    };

    let Some(idx) = session.pickups.iter().position(|p| p.id == pickup_id) else {
        // Already consumed (duplicate event) - nothing to do
        return;
    };
    let kind = session.pickups.remove(idx).kind;

    log::info!("Item pickup: {kind:?} (pickup {pickup_id})");
    audio.play_effect(SoundEffect::ItemPickup);

    activate(session, kind);
    session.events.push(GameEvent::ItemPickedUp { kind });

    let duration = kind.duration_seconds();
    if duration > 0.0 {
        let now = session.clock.elapsed_seconds();
        session.timeouts.schedule(now, duration, kind);
    }
}

/// Apply a kind's activation mutation
fn activate(session: &mut Session, kind: ItemKind) {
    match kind {
        ItemKind::GrowPaddle => session.paddle.width *= ITEM_SIZE_SCALE,
        ItemKind::ShrinkPaddle => session.paddle.width /= ITEM_SIZE_SCALE,
        ItemKind::FastBall => {
            for ball in &mut session.balls {
                ball.vel *= ITEM_SPEED_SCALE;
            }
        }
        ItemKind::SlowBall => {
            for ball in &mut session.balls {
                ball.vel /= ITEM_SPEED_SCALE;
            }
        }
        ItemKind::SmashBall => {
            for ball in &mut session.balls {
                ball.smash = true;
            }
        }
        ItemKind::SlowMotion => session.speed.set_goal(SLOMO_SPEED_GOAL),
        ItemKind::ExtraBall => {
            let id = session.next_entity_id();
            let mut ball = super::state::Ball::new(id);
            ball.state = BallState::Free;
            ball.pos = Vec2::new(
                session.paddle.pos.x,
                session.paddle.pos.y - session.paddle.height / 2.0 - ball.radius - 1.0,
            );
            ball.vel = Vec2::new(0.3, -1.0).normalize() * BALL_START_SPEED;
            session.balls.push(ball);
        }
        ItemKind::ExtraLife => session.player.lives = session.player.lives.saturating_add(1),
    }
}

/// Apply a kind's revert mutation - the exact inverse of [`activate`].
///
/// Ball-targeting reverts derive their target set now, at fire time: balls
/// spawned since activation are included, balls lost since are not.
pub fn revert(session: &mut Session, kind: ItemKind) {
    debug_assert!(!kind.is_permanent(), "permanent items are never reverted");
    match kind {
        ItemKind::GrowPaddle => session.paddle.width /= ITEM_SIZE_SCALE,
        ItemKind::ShrinkPaddle => session.paddle.width *= ITEM_SIZE_SCALE,
        ItemKind::FastBall => {
            for ball in &mut session.balls {
                ball.vel /= ITEM_SPEED_SCALE;
            }
        }
        ItemKind::SlowBall => {
            for ball in &mut session.balls {
                ball.vel *= ITEM_SPEED_SCALE;
            }
        }
        ItemKind::SmashBall => {
            for ball in &mut session.balls {
                ball.smash = false;
            }
        }
        ItemKind::SlowMotion => session.speed.set_goal(1.0),
        ItemKind::ExtraBall | ItemKind::ExtraLife => {}
    }
    session.events.push(GameEvent::ItemExpired { kind });
}
