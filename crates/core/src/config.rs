//! Session configuration
//!
//! Every rule knob lives in one value handed to the session at construction.
//! JSON documents may name only the fields they change; the rest fall back to
//! the console defaults from the types crate.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::catalog::PieceCatalog;
use crate::piece::GridPos;
use crate::scoring::ScoringRules;
use crate::types::*;

/// Largest field side the engine accepts (coordinates are `i8`)
pub const MAX_FIELD_SIDE: u8 = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub width: u8,
    pub height: u8,
    pub spawn_column: i8,
    pub spawn_row: i8,
    pub start_level: u32,
    /// Upper clamp for the debug level selector
    pub max_start_level: u32,
    /// Frames per row, indexed by level
    pub fall_frames_per_row: Vec<u32>,
    pub reference_fps: u32,
    pub soft_drop_interval_ms: u32,
    pub soft_drop_bonus: u32,
    pub line_scores: [u32; MAX_CLEAR_ROWS],
    pub level_up_base: u32,
    pub level_up_step: u32,
    pub blink_interval_ms: u32,
    pub blink_cycles: u32,
    pub debug_blink_cycles: u32,
    pub collapse_delay_ms: u32,
    /// Left/Right hold time before auto-repeat
    pub das_ms: u32,
    /// Left/Right auto-repeat interval (0 disables auto-repeat)
    pub arr_ms: u32,
    pub catalog: PieceCatalog,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            width: FIELD_WIDTH,
            height: FIELD_HEIGHT,
            spawn_column: SPAWN_COLUMN,
            spawn_row: SPAWN_ROW,
            start_level: 0,
            max_start_level: MAX_START_LEVEL,
            fall_frames_per_row: FALL_FRAMES_PER_ROW.to_vec(),
            reference_fps: REFERENCE_FPS,
            soft_drop_interval_ms: SOFT_DROP_INTERVAL_MS,
            soft_drop_bonus: SOFT_DROP_BONUS,
            line_scores: LINE_SCORES,
            level_up_base: LEVEL_UP_BASE,
            level_up_step: LEVEL_UP_STEP,
            blink_interval_ms: BLINK_INTERVAL_MS,
            blink_cycles: BLINK_CYCLES,
            debug_blink_cycles: DEBUG_BLINK_CYCLES,
            collapse_delay_ms: COLLAPSE_DELAY_MS,
            das_ms: DEFAULT_DAS_MS,
            arr_ms: DEFAULT_ARR_MS,
            catalog: PieceCatalog::standard(),
        }
    }
}

impl SessionConfig {
    /// Parse a (possibly partial) JSON document and validate it
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("parse session config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn spawn_position(&self) -> GridPos {
        GridPos::new(self.spawn_column, self.spawn_row)
    }

    pub fn scoring_rules(&self) -> ScoringRules {
        ScoringRules {
            line_scores: self.line_scores,
            level_up_base: self.level_up_base,
            level_up_step: self.level_up_step,
        }
    }

    /// Reject configurations the engine cannot run
    pub fn validate(&self) -> Result<()> {
        if self.width < 4 || self.width > MAX_FIELD_SIDE {
            return Err(anyhow!("width {} outside 4..={}", self.width, MAX_FIELD_SIDE));
        }
        if self.height < 4 || self.height > MAX_FIELD_SIDE {
            return Err(anyhow!("height {} outside 4..={}", self.height, MAX_FIELD_SIDE));
        }
        if self.fall_frames_per_row.is_empty() {
            return Err(anyhow!("fall table is empty"));
        }
        if self.fall_frames_per_row.iter().any(|&f| f == 0) {
            return Err(anyhow!("fall table entries must be at least one frame"));
        }
        if self.reference_fps == 0 {
            return Err(anyhow!("reference fps must be positive"));
        }
        if self.soft_drop_interval_ms == 0 {
            return Err(anyhow!("soft drop interval must be positive"));
        }
        if self.blink_interval_ms == 0 {
            return Err(anyhow!("blink interval must be positive"));
        }
        if self.start_level > self.max_start_level {
            return Err(anyhow!(
                "start level {} above max start level {}",
                self.start_level,
                self.max_start_level
            ));
        }

        self.catalog.validate().context("piece catalog")?;

        let spawn = self.spawn_position();
        for kind in PieceType::ALL {
            let def = self.catalog.get(kind);
            for (x, y) in def.blocks.occupied() {
                let gx = spawn.x - def.pivot.x + x;
                let gy = spawn.y - def.pivot.y + y;
                if gx < 0 || gx >= self.width as i8 || gy >= self.height as i8 {
                    return Err(anyhow!(
                        "{:?} spawns outside the {}x{} field at ({}, {})",
                        kind,
                        self.width,
                        self.height,
                        gx,
                        gy
                    ));
                }
            }
        }

        Ok(())
    }
}
