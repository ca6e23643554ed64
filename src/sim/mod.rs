//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Simulated clock time, never wall time
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies
//!
//! Everything runs synchronously on the caller's thread; delayed behavior is
//! data in the timeout queue, not suspended control flow.

pub mod clock;
pub mod collision;
pub mod items;
pub mod level;
pub mod speed;
pub mod state;
pub mod tick;

pub use clock::{SimClock, TimeoutEntry, TimeoutQueue};
pub use collision::{CollisionEvent, EntityRef, ball_rect_collision, circle_rect_overlap};
pub use items::{ItemKind, on_pickup_collision, roll_drop};
pub use level::{LevelAdvance, load_level, new_game, next_level};
pub use speed::SpeedState;
pub use state::{
    Ball, BallState, Block, GameEvent, GamePhase, Paddle, Pickup, Player, RngState, Session,
};
pub use tick::{TickInput, tick};
