//! Level sequencing
//!
//! `load_level` tears down everything level-scoped (balls, blocks, pickups,
//! the clock and its pending timeouts) and rebuilds the board; the player's
//! score and lives ride across. The layout fetch happens before any
//! teardown, so a failed load leaves the running level fully intact.

use glam::Vec2;

use super::state::{GamePhase, Paddle, Session};
use crate::consts::*;
use crate::levels::{LevelError, LevelSource};

/// Outcome of a `next_level` request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelAdvance {
    Loaded(u32),
    /// No levels left - the campaign is complete
    Finished,
}

/// World-space center of a grid placement
fn placement_center(col: u32, row: u32) -> Vec2 {
    Vec2::new(
        col as f32 * BLOCK_WIDTH + BLOCK_WIDTH / 2.0,
        BLOCK_TOP_MARGIN + row as f32 * BLOCK_HEIGHT + BLOCK_HEIGHT / 2.0,
    )
}

/// Load the level with the given id and rebuild all level-scoped state
pub fn load_level(
    session: &mut Session,
    levels: &dyn LevelSource,
    level_id: u32,
) -> Result<(), LevelError> {
    // Fetch first - this is the only step that can fail, and on failure the
    // session must stay on the level it already has.
    let layout = match levels.load_block_layout(level_id) {
        Ok(layout) => layout,
        Err(err) => {
            log::error!("Failed to load level {level_id}: {err}");
            return Err(err);
        }
    };

    session.clock.pause();

    // Stale wake-ups from the torn-down level must never fire into this one
    session.timeouts.clear();
    session.clock.reset();
    session.speed.reset();

    session.balls.clear();
    session.pickups.clear();
    session.blocks.clear();
    session.paddle = Paddle::default();

    for placement in &layout.blocks {
        let id = session.next_entity_id();
        session.blocks.push(super::state::Block {
            id,
            pos: placement_center(placement.col, placement.row),
            half: Vec2::new(BLOCK_WIDTH / 2.0, BLOCK_HEIGHT / 2.0),
            hp: placement.hp.max(1),
            score_value: placement.score_value(),
        });
    }

    session.spawn_ball_attached();
    session.normalize_order();

    session.level_id = level_id;
    session.phase = GamePhase::Serve;
    session.clock.resume();

    log::info!(
        "Loaded level {level_id} \"{}\" with {} blocks",
        layout.name,
        session.blocks.len()
    );
    Ok(())
}

/// Advance to the next level, or signal the end of the campaign.
///
/// A failed load is reported and the sequencer stays on the current level.
pub fn next_level(
    session: &mut Session,
    levels: &dyn LevelSource,
) -> Result<LevelAdvance, LevelError> {
    if session.level_id >= levels.level_count() {
        log::info!("No more levels after {} - campaign complete", session.level_id);
        session.phase = GamePhase::GameWon;
        return Ok(LevelAdvance::Finished);
    }

    let next = session.level_id + 1;
    load_level(session, levels, next)?;
    Ok(LevelAdvance::Loaded(next))
}

/// Start a fresh run: reset the player and load the first level
pub fn new_game(session: &mut Session, levels: &dyn LevelSource) -> Result<(), LevelError> {
    session.player.reset();
    load_level(session, levels, 1)
}
