//! Property tests for field and scoring invariants.
//!
//! Random button/update rollouts from random seeds must keep:
//! - the active piece inside the side walls and above the floor,
//! - solid active pieces off locked cells once they leave the spawn row,
//! - no full row left on the field outside a clear animation,
//! - score, rows, and level monotonic within one game.
//!
//! Rotation sequences must also be undone by the reversed opposite sequence,
//! and no run of moves may push a piece through a side wall.

use proptest::prelude::*;

use blockfall::core::{GameSession, Grid, GridPos, Piece, PieceCatalog, SessionConfig, SessionState};
use blockfall::types::{Button, PieceType, RotateDirection};

const PLAY_BUTTONS: [Button; 6] = [Button::Left, Button::Right, Button::Down, Button::Up, Button::A, Button::B];

#[derive(Debug, Clone, Copy)]
enum Action {
    Press(usize),
    Release(usize),
    Update(u32),
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        (0..PLAY_BUTTONS.len()).prop_map(Action::Press),
        (0..PLAY_BUTTONS.len()).prop_map(Action::Release),
        (1u32..400).prop_map(Action::Update),
    ]
}

fn assert_field_consistent(s: &GameSession) {
    let grid = s.grid();
    if let Some(piece) = grid.active() {
        for (x, y) in piece.cells() {
            assert!(x >= 0 && x < grid.width() as i8, "column {} outside field", x);
            assert!(y < grid.height() as i8, "row {} below floor", y);
            // A fresh piece may appear on top of the stack; it tops out on
            // its first step.
            let at_spawn = piece.position() == grid.spawn_position();
            if !piece.passes_through() && !at_spawn {
                assert!(!grid.is_occupied(x, y), "active cell ({}, {}) overlaps stack", x, y);
            }
        }
    }
    if !s.is_clearing() {
        assert!(grid.full_rows().is_empty(), "full row left on the field");
    }
}

proptest! {
    #[test]
    fn rollout_respects_core_invariants(
        seed in any::<u32>(),
        start_level in 0u32..=20,
        actions in prop::collection::vec(action(), 1..400),
    ) {
        let config = SessionConfig { start_level, ..SessionConfig::default() };
        let mut s = GameSession::new(config, seed).unwrap();
        s.start();

        let (mut score, mut lines, mut level) = (s.score(), s.lines(), s.level());
        for action in actions {
            match action {
                Action::Press(i) => { s.on_button_press(PLAY_BUTTONS[i]); }
                Action::Release(i) => { s.on_button_up(PLAY_BUTTONS[i]); }
                Action::Update(ms) => { s.update(ms); }
            }

            assert_field_consistent(&s);
            prop_assert!(s.score() >= score);
            prop_assert!(s.lines() >= lines);
            prop_assert!(s.level() >= level);
            prop_assert!(s.level() >= start_level);
            score = s.score();
            lines = s.lines();
            level = s.level();

            if s.state() == SessionState::GameOver {
                break;
            }
        }

        let snap = s.snapshot();
        prop_assert_eq!(snap.score, s.score());
        prop_assert_eq!(snap.lines, s.lines());
        prop_assert_eq!(snap.cells.len(), 180);
    }

    #[test]
    fn fall_interval_never_increases_with_level(level in 0u32..40) {
        let low = GameSession::new(
            SessionConfig { start_level: level.min(20), ..SessionConfig::default() },
            1,
        ).unwrap();
        let high = GameSession::new(
            SessionConfig { start_level: (level + 1).min(20), ..SessionConfig::default() },
            1,
        ).unwrap();
        prop_assert!(high.fall_interval_ms() <= low.fall_interval_ms());
    }

    #[test]
    fn rotation_sequence_is_undone_by_its_reverse(
        kind_idx in 0usize..7,
        turns in prop::collection::vec(any::<bool>(), 0..16),
    ) {
        let kind = PieceType::STANDARD[kind_idx];
        let catalog = PieceCatalog::standard();
        let start = Piece::new(kind, catalog.get(kind), GridPos::new(4, 8));
        let dir = |cw: bool| if cw { RotateDirection::Clockwise } else { RotateDirection::CounterClockwise };

        let mut p = start;
        for &cw in &turns {
            p.rotate(dir(cw));
        }
        for &cw in turns.iter().rev() {
            p.rotate(dir(cw).opposite());
        }
        prop_assert_eq!(p, start);
    }

    #[test]
    fn moves_never_cross_side_walls(
        kind_idx in 0usize..8,
        moves in prop::collection::vec(any::<bool>(), 0..30),
        rotate_first in any::<bool>(),
    ) {
        let kind = PieceType::ALL[kind_idx];
        let catalog = PieceCatalog::standard();
        let mut grid = Grid::new(10, 18, GridPos::new(4, 0));
        grid.spawn(kind, catalog.get(kind));
        if rotate_first {
            grid.try_rotate(RotateDirection::Clockwise);
        }

        for right in moves {
            let before = *grid.active().unwrap();
            let moved = if right { grid.try_move_right() } else { grid.try_move_left() };
            let after = *grid.active().unwrap();
            prop_assert!(after.cells().all(|(x, _)| (0..10).contains(&x)));
            if !moved {
                prop_assert_eq!(before, after);
            }
        }
    }
}
