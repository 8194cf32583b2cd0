//! Piece module - the live falling piece and its rotation system
//!
//! Rotation is a plain matrix turn around the pivot cell with no wall kicks.
//! A turn that lands on an orientation the piece may not rest in keeps
//! turning in the same direction until it reaches an allowed one, so
//! two-state pieces flip back and forth.

use crate::catalog::{BlockMatrix, OrientationSet, PieceDefinition, Pivot};
use crate::types::{Orientation, PieceType, RotateDirection};

/// A position on the grid (column `x`, row `y`, row 0 on top)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub struct GridPos {
    pub x: i8,
    pub y: i8,
}

impl GridPos {
    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }
}

/// Active falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    kind: PieceType,
    blocks: BlockMatrix,
    pivot: Pivot,
    allowed: OrientationSet,
    orientation: Orientation,
    /// Grid cell the pivot sits on
    position: GridPos,
    /// Rows descended by soft drop since spawn
    fallen_distance: u32,
}

impl Piece {
    /// Create a piece facing Up with its pivot on `position`
    pub fn new(kind: PieceType, definition: &PieceDefinition, position: GridPos) -> Self {
        Self {
            kind,
            blocks: definition.blocks,
            pivot: definition.pivot,
            allowed: definition.allowed,
            orientation: Orientation::Up,
            position,
            fallen_distance: 0,
        }
    }

    pub fn kind(&self) -> PieceType {
        self.kind
    }

    pub fn blocks(&self) -> &BlockMatrix {
        &self.blocks
    }

    pub fn pivot(&self) -> Pivot {
        self.pivot
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn allowed(&self) -> OrientationSet {
        self.allowed
    }

    pub fn position(&self) -> GridPos {
        self.position
    }

    pub fn fallen_distance(&self) -> u32 {
        self.fallen_distance
    }

    pub fn passes_through(&self) -> bool {
        self.kind.passes_through()
    }

    /// Grid cells covered by the piece, offset by `(dx, dy)`
    pub fn cells_offset(&self, dx: i8, dy: i8) -> impl Iterator<Item = (i8, i8)> + '_ {
        let ox = self.position.x - self.pivot.x + dx;
        let oy = self.position.y - self.pivot.y + dy;
        self.blocks.occupied().map(move |(x, y)| (ox + x, oy + y))
    }

    /// Grid cells covered by the piece
    pub fn cells(&self) -> impl Iterator<Item = (i8, i8)> + '_ {
        self.cells_offset(0, 0)
    }

    pub(crate) fn shift(&mut self, dx: i8, dy: i8) {
        self.position.x += dx;
        self.position.y += dy;
    }

    pub(crate) fn record_soft_drop(&mut self) {
        self.fallen_distance += 1;
    }

    /// One matrix turn plus one orientation step, legal or not
    fn turn(&mut self, direction: RotateDirection) {
        let size = self.blocks.size();
        match direction {
            RotateDirection::Clockwise => {
                self.blocks = self.blocks.rotated_cw();
                self.pivot = self.pivot.rotated_cw(size);
            }
            RotateDirection::CounterClockwise => {
                self.blocks = self.blocks.rotated_ccw();
                self.pivot = self.pivot.rotated_ccw(size);
            }
        }
        self.orientation = self.orientation.step(direction);
    }

    /// Rotate to the next allowed orientation in `direction`.
    ///
    /// Returns false (and changes nothing) for pieces that never rotate.
    /// The grid is not consulted; callers check the result and roll back.
    pub fn rotate(&mut self, direction: RotateDirection) -> bool {
        if self.allowed.is_empty() {
            return false;
        }

        // The first turn plus at most three retries closes the cycle.
        for _ in 0..Orientation::CYCLE.len() {
            self.turn(direction);
            if self.allowed.contains(self.orientation) {
                return true;
            }
        }

        debug_assert!(false, "{:?} has no reachable allowed orientation", self.kind);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PieceCatalog;

    fn piece(kind: PieceType) -> Piece {
        let catalog = PieceCatalog::standard();
        Piece::new(kind, catalog.get(kind), GridPos::new(4, 5))
    }

    #[test]
    fn new_piece_faces_up() {
        let p = piece(PieceType::T);
        assert_eq!(p.orientation(), Orientation::Up);
        assert_eq!(p.position(), GridPos::new(4, 5));
        assert_eq!(p.fallen_distance(), 0);
    }

    #[test]
    fn cells_are_relative_to_pivot() {
        let p = piece(PieceType::T);
        let cells: Vec<_> = p.cells().collect();
        assert_eq!(cells, vec![(3, 5), (4, 5), (5, 5), (4, 6)]);
    }

    #[test]
    fn pivot_cell_stays_put_through_rotation() {
        let mut p = piece(PieceType::T);
        assert!(p.rotate(RotateDirection::Clockwise));
        let cells: Vec<_> = p.cells().collect();
        assert!(cells.contains(&(4, 5)));
        assert_eq!(cells.len(), 4);
    }

    #[test]
    fn two_state_piece_flips_back() {
        let mut p = piece(PieceType::S);
        let start = p;
        assert!(p.rotate(RotateDirection::Clockwise));
        assert_eq!(p.orientation(), Orientation::Right);
        assert!(p.rotate(RotateDirection::Clockwise));
        assert_eq!(p.orientation(), Orientation::Up);
        assert_eq!(p.blocks(), start.blocks());
        assert_eq!(p.pivot(), start.pivot());
    }

    #[test]
    fn counter_clockwise_on_two_state_piece_lands_on_other_state() {
        let mut p = piece(PieceType::I);
        assert!(p.rotate(RotateDirection::CounterClockwise));
        assert_eq!(p.orientation(), Orientation::Right);
    }

    #[test]
    fn o_piece_never_rotates() {
        let mut p = piece(PieceType::O);
        let start = p;
        assert!(!p.rotate(RotateDirection::Clockwise));
        assert!(!p.rotate(RotateDirection::CounterClockwise));
        assert_eq!(p, start);
    }

    #[test]
    fn soft_drop_counter_accumulates() {
        let mut p = piece(PieceType::L);
        p.record_soft_drop();
        p.record_soft_drop();
        assert_eq!(p.fallen_distance(), 2);
    }
}
