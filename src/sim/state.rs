//! Game state and core simulation types
//!
//! All state that must be persisted for Continue/determinism lives here. The
//! session owns its entities directly (paddle, balls, blocks, pickups,
//! player) - there is no global entity registry; collaborators that need
//! numeric state for display read it through plain accessors.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::clock::{SimClock, TimeoutQueue};
use super::items::ItemKind;
use super::speed::SpeedState;
use crate::consts::*;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Ball attached to paddle, waiting for launch input
    Serve,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Out of lives
    GameOver,
    /// Final level cleared, nothing left to load
    GameWon,
}

/// Ball state - attached to paddle or free-moving
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BallState {
    /// Ball rides the paddle at the given x offset from paddle center
    Attached { offset: f32 },
    /// Ball is free-moving
    Free,
}

/// A ball entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub state: BallState,
    /// Smash mode (destroys blocks without reflecting)
    pub smash: bool,
}

impl Ball {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            radius: BALL_RADIUS,
            state: BallState::Attached { offset: 0.0 },
            smash: false,
        }
    }

    /// Update attached ball position based on paddle
    pub fn update_attached(&mut self, paddle: &Paddle) {
        if let BallState::Attached { offset } = self.state {
            self.pos = Vec2::new(
                paddle.pos.x + offset,
                paddle.pos.y - paddle.height / 2.0 - self.radius - 1.0,
            );
        }
    }

    /// Launch the ball from attached state
    pub fn launch(&mut self, paddle: &Paddle, base_speed: f32, english_factor: f32) {
        if let BallState::Attached { .. } = self.state {
            // Base direction: straight up, with a small sideways component
            // from paddle movement
            let english = (paddle.vel_x / PADDLE_SPEED * english_factor).clamp(-0.4, 0.4);
            self.vel = Vec2::new(english, -1.0).normalize() * base_speed;
            self.state = BallState::Free;
        }
    }
}

/// The player's paddle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    /// Center position (y is fixed near the bottom edge)
    pub pos: Vec2,
    /// Current width (mutated by size items)
    pub width: f32,
    pub height: f32,
    /// Horizontal velocity (for "english" on ball launch/bounce)
    pub vel_x: f32,
}

impl Default for Paddle {
    fn default() -> Self {
        Self {
            pos: Vec2::new(ARENA_WIDTH / 2.0, PADDLE_Y),
            width: PADDLE_WIDTH,
            height: PADDLE_HEIGHT,
            vel_x: 0.0,
        }
    }
}

impl Paddle {
    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Slide toward a target x, clamped to max speed and arena bounds
    pub fn move_toward(&mut self, target_x: f32, dt: f32, max_speed: f32) {
        let half_w = self.width / 2.0;
        let target = target_x.clamp(half_w, ARENA_WIDTH - half_w);
        let delta = target - self.pos.x;

        let max_delta = max_speed * dt;
        let clamped_delta = delta.clamp(-max_delta, max_delta);

        self.vel_x = if dt > 0.0 { clamped_delta / dt } else { 0.0 };
        self.pos.x += clamped_delta;
    }
}

/// A block entity (axis-aligned brick)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub id: u32,
    pub pos: Vec2,
    pub half: Vec2,
    /// Hits remaining before the block breaks
    pub hp: u8,
    pub score_value: u32,
}

/// A falling pickup entity; caught by the paddle, gone past the bottom edge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub id: u32,
    pub kind: ItemKind,
    pub pos: Vec2,
    pub vel: Vec2,
}

/// Player identity - the only state that survives level loads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub score: u64,
    pub lives: u8,
}

impl Default for Player {
    fn default() -> Self {
        Self { score: 0, lives: 3 }
    }
}

impl Player {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Events emitted by the simulation for the shell (audio cues already went
/// through the audio sink; these drive orchestration and logging)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    BlockDestroyed { id: u32 },
    ItemPickedUp { kind: ItemKind },
    ItemExpired { kind: ItemKind },
    BallLost { id: u32 },
    LifeLost,
    LevelCleared,
    GameOver,
}

/// RNG state wrapper for serialization
///
/// Each draw seeds a fresh Pcg32 from the run seed and a draw counter, so a
/// restored session continues the exact same drop sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub draws: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, draws: 0 }
    }

    /// Next value in [0, 1)
    pub fn next_unit(&mut self) -> f32 {
        let mixed = self
            .seed
            .wrapping_add(self.draws.wrapping_mul(0x9E3779B97F4A7C15));
        self.draws += 1;
        Pcg32::seed_from_u64(mixed).random::<f32>()
    }
}

/// Complete game session (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Run seed for reproducibility
    pub seed: u64,
    /// RNG state for pickup drops
    pub rng_state: RngState,
    /// Currently loaded level (1-based; 0 until the first load)
    pub level_id: u32,
    /// Current phase
    pub phase: GamePhase,
    /// Level-scoped simulated clock
    pub clock: SimClock,
    /// Pending item reverts, keyed by absolute clock time
    pub timeouts: TimeoutQueue<ItemKind>,
    /// Simulation speed easing (slow-motion)
    pub speed: SpeedState,
    /// Player paddle
    pub paddle: Paddle,
    /// Active balls (sorted by id for determinism)
    pub balls: Vec<Ball>,
    /// Active blocks (sorted by id for determinism)
    pub blocks: Vec<Block>,
    /// Falling pickups (sorted by id for determinism)
    pub pickups: Vec<Pickup>,
    /// Player stats, preserved across level loads
    pub player: Player,
    /// Events since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl Session {
    /// Create a fresh session with the given seed. No level is loaded yet;
    /// the sequencer's `load_level` brings in blocks and the serve ball.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng_state: RngState::new(seed),
            level_id: 0,
            phase: GamePhase::Serve,
            clock: SimClock::new(),
            timeouts: TimeoutQueue::new(),
            speed: SpeedState::new(),
            paddle: Paddle::default(),
            balls: Vec::new(),
            blocks: Vec::new(),
            pickups: Vec::new(),
            player: Player::default(),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Spawn a ball attached to the paddle
    pub fn spawn_ball_attached(&mut self) -> u32 {
        let id = self.next_entity_id();
        let mut ball = Ball::new(id);
        ball.update_attached(&self.paddle);
        self.balls.push(ball);
        id
    }

    /// Ensure entity sets are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.balls.sort_by_key(|b| b.id);
        self.blocks.sort_by_key(|b| b.id);
        self.pickups.sort_by_key(|p| p.id);
    }

    /// Clock readout for the HUD, in whole seconds
    pub fn clock_readout(&self) -> u32 {
        self.clock.elapsed_seconds() as u32
    }

    /// Take the events accumulated since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
