//! Read-only view of a session for hosts, scripts, and tests

use arrayvec::ArrayVec;
use serde::Serialize;

use crate::line_clear::{ClearPhase, RowOverlay};
use crate::piece::Piece;
use crate::session::SessionState;
use crate::types::{Cell, Orientation, PieceType, MAX_CLEAR_ROWS};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveSnapshot {
    pub kind: PieceType,
    pub orientation: Orientation,
    pub x: i8,
    pub y: i8,
    /// Occupied grid cells (may include rows above the field)
    pub cells: ArrayVec<(i8, i8), 16>,
}

impl From<&Piece> for ActiveSnapshot {
    fn from(value: &Piece) -> Self {
        Self {
            kind: value.kind(),
            orientation: value.orientation(),
            x: value.position().x,
            y: value.position().y,
            cells: value.cells().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub width: u8,
    pub height: u8,
    /// Row-major locked cells
    pub cells: Vec<Cell>,
    pub active: Option<ActiveSnapshot>,
    pub overlays: [RowOverlay; MAX_CLEAR_ROWS],
    pub clear_phase: ClearPhase,
    pub next: PieceType,
    pub state: SessionState,
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    pub lines_this_level: u32,
    pub fall_interval_ms: u32,
    pub falling_enabled: bool,
    pub music_muted: bool,
    pub episode_id: u32,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            cells: Vec::new(),
            active: None,
            overlays: [RowOverlay::default(); MAX_CLEAR_ROWS],
            clear_phase: ClearPhase::Idle,
            next: PieceType::I,
            state: SessionState::NotStarted,
            score: 0,
            level: 0,
            lines: 0,
            lines_this_level: 0,
            fall_interval_ms: 0,
            falling_enabled: true,
            music_muted: false,
            episode_id: 0,
        }
    }
}

impl SessionSnapshot {
    pub fn playable(&self) -> bool {
        self.state == SessionState::Playing
    }

    /// Locked cell at (x, y), `None` when empty or out of bounds
    pub fn cell(&self, x: usize, y: usize) -> Cell {
        if x >= self.width as usize || y >= self.height as usize {
            return None;
        }
        self.cells[y * self.width as usize + x]
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
