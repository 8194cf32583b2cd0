//! Shared types and default tables for the falling-block engine.
//!
//! Everything here is plain data with no dependencies beyond serde, so the
//! same vocabulary can be used by the engine core, by hosts that render the
//! field, and by tooling that replays button scripts.
//!
//! # Field
//!
//! The default field is the handheld-console size:
//!
//! - **Width**: 10 columns (indexed 0-9, left to right)
//! - **Height**: 18 rows (indexed 0-17, top to bottom)
//! - **Spawn**: pivot lands on column 4, row 0
//!
//! # Timing
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Host frame length used by scripted runs |
//! | `REFERENCE_FPS` | 60 | Frame rate the fall table is expressed in |
//! | `SOFT_DROP_INTERVAL_MS` | 50 | Fall interval while Down is held |
//! | `BLINK_INTERVAL_MS` | 100 | Full-row overlay blink cadence |
//! | `BLINK_CYCLES` | 3 | Blink cycles before a normal clear collapses |
//! | `DEBUG_BLINK_CYCLES` | 1 | Blink cycles for the debug bottom-row clear |
//! | `DEFAULT_DAS_MS` | 400 | Hold time before Left/Right auto-repeats |
//! | `DEFAULT_ARR_MS` | 150 | Interval between Left/Right auto-repeats |
//!
//! # Examples
//!
//! ```
//! use blockfall_types::{Orientation, PieceType, RotateDirection};
//!
//! assert_eq!(PieceType::from_str("t"), Some(PieceType::T));
//! assert_eq!(Orientation::Up.step(RotateDirection::Clockwise), Orientation::Right);
//! assert_eq!(Orientation::Up.step(RotateDirection::CounterClockwise), Orientation::Left);
//! ```

use serde::{Deserialize, Serialize};

/// Field width in cells (10 columns)
pub const FIELD_WIDTH: u8 = 10;

/// Field height in cells (18 rows)
pub const FIELD_HEIGHT: u8 = 18;

/// Column the pivot of a freshly spawned piece lands on
pub const SPAWN_COLUMN: i8 = 4;

/// Row the pivot of a freshly spawned piece lands on
pub const SPAWN_ROW: i8 = 0;

/// Highest level accepted by the debug level selector
pub const MAX_START_LEVEL: u32 = 20;

/// Default host frame length in milliseconds (~60 FPS)
pub const TICK_MS: u32 = 16;

/// Frame rate the fall table is written against
pub const REFERENCE_FPS: u32 = 60;

/// Frames per row for each level (handheld-console curve).
///
/// Index 0 = level 0, levels past the end use the last entry.
pub const FALL_FRAMES_PER_ROW: [u32; 21] = [
    53, 49, 45, 41, 37, 33, 28, 22, 17, 11, 10, 9, 8, 7, 6, 6, 5, 5, 4, 4, 3,
];

/// Fall interval while the Down button is held
pub const SOFT_DROP_INTERVAL_MS: u32 = 50;

/// Points accrued per soft-dropped row
pub const SOFT_DROP_BONUS: u32 = 1;

/// Line clear scoring table, indexed by `lines - 1`.
///
/// Points are multiplied by `(level + 1)`.
pub const LINE_SCORES: [u32; 4] = [40, 100, 300, 1200];

/// Full-row overlay blink cadence
pub const BLINK_INTERVAL_MS: u32 = 100;

/// Number of hide/show cycles before a normal clear collapses
pub const BLINK_CYCLES: u32 = 3;

/// Number of hide/show cycles for the debug bottom-row clear
pub const DEBUG_BLINK_CYCLES: u32 = 1;

/// Delay between the last blink and the row collapse
pub const COLLAPSE_DELAY_MS: u32 = 100;

/// Lines needed at level 0 to level up
pub const LEVEL_UP_BASE: u32 = 10;

/// Extra lines needed per level (`threshold = level * STEP + BASE`)
pub const LEVEL_UP_STEP: u32 = 10;

/// Maximum rows that can clear at once (one tetromino spans four rows)
pub const MAX_CLEAR_ROWS: usize = 4;

/// Delay before a held Left/Right starts repeating
pub const DEFAULT_DAS_MS: u32 = 400;

/// Interval between Left/Right repeats once repeating
pub const DEFAULT_ARR_MS: u32 = 150;

/// Piece types: the seven tetrominoes plus the pass-through cheat block.
///
/// - **Invisible**: a single block that ignores locked cells and only
///   collides with the field edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceType {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
    Invisible,
}

impl PieceType {
    /// The seven pieces the randomizer draws from
    pub const STANDARD: [PieceType; 7] = [
        PieceType::I,
        PieceType::J,
        PieceType::L,
        PieceType::O,
        PieceType::S,
        PieceType::T,
        PieceType::Z,
    ];

    /// Every piece type, in catalog order
    pub const ALL: [PieceType; 8] = [
        PieceType::I,
        PieceType::J,
        PieceType::L,
        PieceType::O,
        PieceType::S,
        PieceType::T,
        PieceType::Z,
        PieceType::Invisible,
    ];

    /// Position in [`PieceType::ALL`]
    pub fn index(self) -> usize {
        match self {
            PieceType::I => 0,
            PieceType::J => 1,
            PieceType::L => 2,
            PieceType::O => 3,
            PieceType::S => 4,
            PieceType::T => 5,
            PieceType::Z => 6,
            PieceType::Invisible => 7,
        }
    }

    /// Whether this piece ignores locked cells when colliding
    pub fn passes_through(self) -> bool {
        self == PieceType::Invisible
    }

    /// Parse piece type from string (case-insensitive)
    ///
    /// ```
    /// use blockfall_types::PieceType;
    ///
    /// assert_eq!(PieceType::from_str("O"), Some(PieceType::O));
    /// assert_eq!(PieceType::from_str("invisible"), Some(PieceType::Invisible));
    /// assert_eq!(PieceType::from_str("x"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i" => Some(PieceType::I),
            "j" => Some(PieceType::J),
            "l" => Some(PieceType::L),
            "o" => Some(PieceType::O),
            "s" => Some(PieceType::S),
            "t" => Some(PieceType::T),
            "z" => Some(PieceType::Z),
            "invisible" => Some(PieceType::Invisible),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PieceType::I => "i",
            PieceType::J => "j",
            PieceType::L => "l",
            PieceType::O => "o",
            PieceType::S => "s",
            PieceType::T => "t",
            PieceType::Z => "z",
            PieceType::Invisible => "invisible",
        }
    }
}

/// Facing of a piece.
///
/// The cycle goes: Up → Right → Down → Left → Up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    Up,
    Right,
    Down,
    Left,
}

impl Orientation {
    /// Cyclic order, clockwise
    pub const CYCLE: [Orientation; 4] = [
        Orientation::Up,
        Orientation::Right,
        Orientation::Down,
        Orientation::Left,
    ];

    fn index(self) -> usize {
        match self {
            Orientation::Up => 0,
            Orientation::Right => 1,
            Orientation::Down => 2,
            Orientation::Left => 3,
        }
    }

    /// Single-bit mask used by orientation sets
    pub fn bit(self) -> u8 {
        1 << self.index()
    }

    /// Advance one step along the cycle in the given direction
    pub fn step(self, direction: RotateDirection) -> Self {
        let i = self.index();
        let next = match direction {
            RotateDirection::Clockwise => (i + 1) % 4,
            RotateDirection::CounterClockwise => (i + 3) % 4,
        };
        Self::CYCLE[next]
    }
}

/// Rotation direction requested by the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RotateDirection {
    Clockwise,
    CounterClockwise,
}

impl RotateDirection {
    pub fn opposite(self) -> Self {
        match self {
            RotateDirection::Clockwise => RotateDirection::CounterClockwise,
            RotateDirection::CounterClockwise => RotateDirection::Clockwise,
        }
    }
}

/// Abstract console buttons delivered by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Button {
    Left,
    Right,
    Down,
    Up,
    A,
    B,
    Start,
    Select,
}

impl Button {
    pub const ALL: [Button; 8] = [
        Button::Left,
        Button::Right,
        Button::Down,
        Button::Up,
        Button::A,
        Button::B,
        Button::Start,
        Button::Select,
    ];

    /// Single-bit mask used by the held-button set
    pub fn bit(self) -> u8 {
        match self {
            Button::Left => 1 << 0,
            Button::Right => 1 << 1,
            Button::Down => 1 << 2,
            Button::Up => 1 << 3,
            Button::A => 1 << 4,
            Button::B => 1 << 5,
            Button::Start => 1 << 6,
            Button::Select => 1 << 7,
        }
    }

    /// Parse button from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "left" => Some(Button::Left),
            "right" => Some(Button::Right),
            "down" => Some(Button::Down),
            "up" => Some(Button::Up),
            "a" => Some(Button::A),
            "b" => Some(Button::B),
            "start" => Some(Button::Start),
            "select" => Some(Button::Select),
            _ => None,
        }
    }
}

/// A locked block on the field.
///
/// Carries only what a renderer needs to recreate the block's look.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LockedBlock {
    pub kind: PieceType,
    pub orientation: Orientation,
}

/// A cell on the field
///
/// - `None`: Empty cell
/// - `Some(LockedBlock)`: Cell holding one locked block
pub type Cell = Option<LockedBlock>;

/// Events produced by the engine for the host.
///
/// The first five are the presentation contract; the rest are side-effect
/// cues (sound, animation) the host may ignore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    NextPieceChanged(PieceType),
    GameOver,
    LinesClearedCountChanged(u32),
    LevelChanged(u32),
    ScoreChanged(u32),
    /// Active piece shifted one column
    PieceMoved,
    /// Active piece rotated to a legal orientation
    PieceRotated,
    /// Active piece was committed into the field
    PieceLocked,
    /// Full rows started blinking
    RowsBlinking { count: u8 },
    /// Blinking rows were removed and the stack collapsed
    RowsCollapsed { count: u8 },
    Paused(bool),
    /// Cosmetic flag toggled by Select
    MusicMuted(bool),
}
