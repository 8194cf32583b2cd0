//! Piece tests - shapes, pivots, and rotation

use blockfall::core::{BlockMatrix, GridPos, OrientationSet, Piece, PieceCatalog, PieceDefinition, Pivot};
use blockfall::types::{Orientation, PieceType, RotateDirection};

fn piece(kind: PieceType) -> Piece {
    let catalog = PieceCatalog::standard();
    Piece::new(kind, catalog.get(kind), GridPos::new(4, 8))
}

fn sorted_cells(p: &Piece) -> Vec<(i8, i8)> {
    let mut cells: Vec<_> = p.cells().collect();
    cells.sort();
    cells
}

#[test]
fn test_every_piece_has_four_blocks_except_pass_through() {
    let catalog = PieceCatalog::standard();
    for kind in PieceType::STANDARD {
        assert_eq!(catalog.get(kind).blocks.block_count(), 4, "{:?}", kind);
    }
    assert_eq!(catalog.get(PieceType::Invisible).blocks.block_count(), 1);
}

#[test]
fn test_four_turns_restore_matrix_and_pivot() {
    for kind in [PieceType::J, PieceType::L, PieceType::T] {
        let start = piece(kind);
        let mut p = start;
        for _ in 0..4 {
            assert!(p.rotate(RotateDirection::Clockwise));
        }
        assert_eq!(p, start, "{:?}", kind);

        for _ in 0..4 {
            assert!(p.rotate(RotateDirection::CounterClockwise));
        }
        assert_eq!(p, start, "{:?}", kind);
    }
}

#[test]
fn test_rotation_keeps_pivot_cell_fixed() {
    let mut p = piece(PieceType::T);
    let anchor = p.position();
    assert!(sorted_cells(&p).contains(&(anchor.x, anchor.y)));

    for _ in 0..4 {
        p.rotate(RotateDirection::Clockwise);
        assert!(sorted_cells(&p).contains(&(anchor.x, anchor.y)));
    }
}

#[test]
fn test_t_clockwise_cells() {
    let mut p = piece(PieceType::T);
    assert_eq!(sorted_cells(&p), vec![(3, 8), (4, 8), (4, 9), (5, 8)]);

    assert!(p.rotate(RotateDirection::Clockwise));
    assert_eq!(p.orientation(), Orientation::Right);
    assert_eq!(sorted_cells(&p), vec![(3, 8), (4, 7), (4, 8), (4, 9)]);
}

#[test]
fn test_clockwise_and_counter_clockwise_cancel() {
    for kind in PieceType::STANDARD {
        let start = piece(kind);
        let mut p = start;
        if p.rotate(RotateDirection::Clockwise) {
            assert!(p.rotate(RotateDirection::CounterClockwise));
        }
        assert_eq!(p, start, "{:?}", kind);
    }
}

#[test]
fn test_o_piece_never_rotates() {
    let start = piece(PieceType::O);
    let mut p = start;
    assert!(!p.rotate(RotateDirection::Clockwise));
    assert!(!p.rotate(RotateDirection::CounterClockwise));
    assert_eq!(p, start);
}

#[test]
fn test_two_state_pieces_flip_between_up_and_right() {
    for kind in [PieceType::I, PieceType::S, PieceType::Z] {
        let start = piece(kind);
        let mut p = start;

        assert!(p.rotate(RotateDirection::Clockwise));
        assert_eq!(p.orientation(), Orientation::Right);
        assert!(p.rotate(RotateDirection::Clockwise));
        assert_eq!(p.orientation(), Orientation::Up);
        assert_eq!(p, start, "{:?}", kind);

        assert!(p.rotate(RotateDirection::CounterClockwise));
        assert_eq!(p.orientation(), Orientation::Right);
    }
}

#[test]
fn test_vertical_i_occupies_one_column() {
    let mut p = piece(PieceType::I);
    assert!(p.rotate(RotateDirection::Clockwise));
    assert_eq!(sorted_cells(&p), vec![(4, 7), (4, 8), (4, 9), (4, 10)]);
}

#[test]
fn test_custom_definition_from_rows() {
    let blocks = BlockMatrix::from_rows(&["#.", "##"]).unwrap();
    let def = PieceDefinition {
        blocks,
        pivot: Pivot::new(0, 1),
        allowed: OrientationSet::ALL,
    };
    let catalog = PieceCatalog::standard().with_definition(PieceType::O, def);
    assert!(catalog.validate().is_ok());

    let mut p = Piece::new(PieceType::O, catalog.get(PieceType::O), GridPos::new(2, 2));
    assert_eq!(sorted_cells(&p), vec![(2, 1), (2, 2), (3, 2)]);
    assert!(p.rotate(RotateDirection::Clockwise));
    assert_eq!(p.blocks().to_rows(), vec!["##".to_string(), "#.".to_string()]);
}

#[test]
fn test_bad_definitions_are_rejected() {
    assert!(BlockMatrix::from_rows(&["###", "#"]).is_err());
    assert!(BlockMatrix::from_rows(&["#####"; 5]).is_err());

    let def = PieceDefinition {
        blocks: BlockMatrix::from_rows(&["##", "##"]).unwrap(),
        pivot: Pivot::new(2, 0),
        allowed: OrientationSet::EMPTY,
    };
    let catalog = PieceCatalog::standard().with_definition(PieceType::O, def);
    assert!(catalog.validate().is_err());
}
