//! Core game logic - pure, deterministic, and testable
//!
//! This crate contains the falling-block rules, the clear animation timing,
//! and the session state machine. It does no I/O and draws nothing; hosts
//! feed it button edges and elapsed time and read back events and snapshots.
//!
//! # Module Structure
//!
//! - [`catalog`]: piece shapes, pivots, and allowed orientations
//! - [`piece`]: the active piece and its pivot rotation
//! - [`grid`]: placed blocks, collision, locking, and row removal
//! - [`fall_clock`]: gravity and soft drop timing
//! - [`scheduler`]: cancellable delayed steps on a virtual clock
//! - [`line_clear`]: blink and collapse animation for full rows
//! - [`scoring`]: line scores, soft drop bonus, and level-ups
//! - [`rng`]: seeded next-piece selection with a one-piece preview
//! - [`input`]: held buttons and Left/Right auto-repeat
//! - [`config`]: session configuration and validation
//! - [`session`]: the [`GameSession`] state machine
//! - [`snapshot`]: serializable view of a session
//!
//! # Game Rules
//!
//! Classic handheld rules:
//!
//! - **No wall kicks**: a rotation that collides is undone
//! - **No lock delay**: a piece that cannot fall locks on the next step
//! - **Top out**: a piece that cannot leave the spawn row ends the game
//! - **Scoring**: 40/100/300/1200 times (level + 1), plus one point per
//!   soft-dropped row
//!
//! # Example
//!
//! ```
//! use blockfall_core::{GameSession, SessionConfig};
//! use blockfall_core::types::{Button, GameEvent};
//!
//! let mut session = GameSession::new(SessionConfig::default(), 12345).unwrap();
//! let events = session.on_button_press(Button::Start);
//! assert_eq!(events[0], GameEvent::LevelChanged(0));
//!
//! session.on_button_up(Button::Start);
//! session.on_button_press(Button::Left);
//! session.update(16);
//! assert!(session.grid().active().is_some());
//! ```
//!
//! # Timing
//!
//! Call [`GameSession::update`] every frame with the elapsed milliseconds.
//! At most one gravity step happens per call.

pub mod catalog;
pub mod config;
pub mod fall_clock;
pub mod grid;
pub mod input;
pub mod line_clear;
pub mod piece;
pub mod rng;
pub mod scheduler;
pub mod scoring;
pub mod session;
pub mod snapshot;

pub use blockfall_types as types;

// Re-export commonly used types for convenience
pub use catalog::{BlockMatrix, OrientationSet, PieceCatalog, PieceDefinition, Pivot};
pub use config::SessionConfig;
pub use fall_clock::{FallClock, FallTrigger};
pub use grid::{FullRows, Grid, StepOutcome};
pub use line_clear::{ClearPhase, LineClearAnimator, RowOverlay};
pub use piece::{GridPos, Piece};
pub use rng::{PieceQueue, SimpleRng};
pub use scheduler::{Scheduler, TaskId};
pub use scoring::{ScoreAndLevel, ScoringRules};
pub use session::{GameSession, SessionState};
pub use snapshot::{ActiveSnapshot, SessionSnapshot};
