//! Level layout library
//!
//! Layouts are plain data: grid placements of blocks, loaded from JSON or
//! built in code. The simulation consumes them through the [`LevelSource`]
//! trait and turns placements into world-space blocks at load time. Load
//! failures are reportable and non-fatal - the sequencer stays on the level
//! it already has.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{ARENA_WIDTH, BLOCK_WIDTH};

/// Number of grid columns across the arena
pub const GRID_COLS: u32 = (ARENA_WIDTH / BLOCK_WIDTH) as u32;
/// Maximum usable grid rows below the HUD band
pub const GRID_ROWS: u32 = 12;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("unknown level id {0}")]
    UnknownLevel(u32),
    #[error("malformed level data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("level {level} has block outside the grid at col {col}, row {row}")]
    InvalidPlacement { level: u32, col: u32, row: u32 },
    #[error("failed to read level file: {0}")]
    Io(#[from] std::io::Error),
}

fn default_hp() -> u8 {
    1
}

/// A single block position in the level grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockPlacement {
    pub col: u32,
    pub row: u32,
    /// Hits to break; tougher blocks score more
    #[serde(default = "default_hp")]
    pub hp: u8,
}

impl BlockPlacement {
    pub fn new(col: u32, row: u32, hp: u8) -> Self {
        Self { col, row, hp }
    }

    /// Points awarded when this block breaks
    pub fn score_value(&self) -> u32 {
        50 * self.hp as u32
    }
}

/// One level's worth of block placements
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelLayout {
    pub name: String,
    pub blocks: Vec<BlockPlacement>,
}

/// What the sequencer asks of the level-data collaborator
pub trait LevelSource {
    fn level_count(&self) -> u32;
    /// Fetch the layout for a 1-based level id
    fn load_block_layout(&self, level_id: u32) -> Result<LevelLayout, LevelError>;
}

/// In-memory level collection, loadable from JSON
#[derive(Debug, Clone)]
pub struct LevelLibrary {
    layouts: Vec<LevelLayout>,
}

impl LevelLibrary {
    pub fn new(layouts: Vec<LevelLayout>) -> Self {
        Self { layouts }
    }

    /// Parse a library from a JSON array of layouts, validating placements
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let layouts: Vec<LevelLayout> = serde_json::from_str(json)?;
        let library = Self { layouts };
        library.validate()?;
        Ok(library)
    }

    /// Load a library from a JSON file on disk
    pub fn from_file(path: &std::path::Path) -> Result<Self, LevelError> {
        let json = std::fs::read_to_string(path)?;
        let library = Self::from_json(&json)?;
        log::info!(
            "Loaded {} levels from {}",
            library.layouts.len(),
            path.display()
        );
        Ok(library)
    }

    fn validate(&self) -> Result<(), LevelError> {
        for (idx, layout) in self.layouts.iter().enumerate() {
            for placement in &layout.blocks {
                if placement.col >= GRID_COLS || placement.row >= GRID_ROWS {
                    return Err(LevelError::InvalidPlacement {
                        level: idx as u32 + 1,
                        col: placement.col,
                        row: placement.row,
                    });
                }
            }
        }
        Ok(())
    }

    /// The built-in campaign used when no level file is supplied
    pub fn default_campaign() -> Self {
        let mut layouts = Vec::new();

        // Level 1: three solid rows
        let mut blocks = Vec::new();
        for row in 0..3 {
            for col in 0..GRID_COLS {
                blocks.push(BlockPlacement::new(col, row, 1));
            }
        }
        layouts.push(LevelLayout {
            name: "Warmup".into(),
            blocks,
        });

        // Level 2: checkerboard with a tougher top row
        let mut blocks = Vec::new();
        for col in 0..GRID_COLS {
            blocks.push(BlockPlacement::new(col, 0, 2));
        }
        for row in 1..5 {
            for col in 0..GRID_COLS {
                if (col + row) % 2 == 0 {
                    blocks.push(BlockPlacement::new(col, row, 1));
                }
            }
        }
        layouts.push(LevelLayout {
            name: "Checkers".into(),
            blocks,
        });

        // Level 3: pyramid, hp growing toward the core
        let mut blocks = Vec::new();
        for row in 0..6 {
            let inset = row;
            for col in inset..GRID_COLS - inset {
                let hp = 1 + (row / 2) as u8;
                blocks.push(BlockPlacement::new(col, row, hp));
            }
        }
        layouts.push(LevelLayout {
            name: "Pyramid".into(),
            blocks,
        });

        Self { layouts }
    }
}

impl LevelSource for LevelLibrary {
    fn level_count(&self) -> u32 {
        self.layouts.len() as u32
    }

    fn load_block_layout(&self, level_id: u32) -> Result<LevelLayout, LevelError> {
        if level_id == 0 || level_id > self.level_count() {
            return Err(LevelError::UnknownLevel(level_id));
        }
        Ok(self.layouts[(level_id - 1) as usize].clone())
    }
}
