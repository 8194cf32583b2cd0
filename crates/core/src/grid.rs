//! Grid module - the placed-block field plus the active piece
//!
//! The field is a `width x height` grid stored as a flat row-major vector.
//! Coordinates: (x, y) where x runs left to right and y runs top to bottom.
//!
//! Collision rules:
//! - Columns outside `0..width` and rows below `height - 1` always block.
//! - Rows above the top edge are open air.
//! - Locked cells block every piece except the pass-through block, which
//!   only respects the edges.

use arrayvec::ArrayVec;

use crate::catalog::PieceDefinition;
use crate::piece::{GridPos, Piece};
use crate::types::{Cell, LockedBlock, PieceType, RotateDirection, MAX_CLEAR_ROWS};

/// Full rows found after a lock, sorted top to bottom
pub type FullRows = ArrayVec<usize, MAX_CLEAR_ROWS>;

/// Result of one downward step of the active piece
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// No active piece to move
    Idle,
    /// Piece moved down one row
    Moved,
    /// Piece could not move and was committed to the field
    Locked {
        full_rows: FullRows,
        /// Soft-dropped rows the piece accumulated before locking
        fallen_distance: u32,
    },
    /// Piece could not move from the spawn row (or sticks out the top);
    /// the field is left untouched
    ToppedOut,
}

/// The field
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: u8,
    height: u8,
    /// Flat array of cells, row-major order (y * width + x)
    cells: Vec<Cell>,
    active: Option<Piece>,
    spawn: GridPos,
}

impl Grid {
    /// Create an empty field
    pub fn new(width: u8, height: u8, spawn: GridPos) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
            active: None,
            spawn,
        }
    }

    #[inline(always)]
    fn index(&self, x: i8, y: i8) -> Option<usize> {
        if x < 0 || x >= self.width as i8 || y < 0 || y >= self.height as i8 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    pub fn spawn_position(&self) -> GridPos {
        self.spawn
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i8, y: i8) -> Option<Cell> {
        self.index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i8, y: i8, cell: Cell) -> bool {
        match self.index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Check if position is occupied (within bounds and filled)
    pub fn is_occupied(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(Some(_)))
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn active(&self) -> Option<&Piece> {
        self.active.as_ref()
    }

    /// Whether a piece cell may sit at (x, y)
    fn blocks(&self, x: i8, y: i8, passes_through: bool) -> bool {
        if x < 0 || x >= self.width as i8 || y >= self.height as i8 {
            return true;
        }
        if y < 0 {
            return false;
        }
        !passes_through && self.is_occupied(x, y)
    }

    /// Whether `piece` fits after shifting by `(dx, dy)`
    pub fn fits(&self, piece: &Piece, dx: i8, dy: i8) -> bool {
        let passes = piece.passes_through();
        piece
            .cells_offset(dx, dy)
            .all(|(x, y)| !self.blocks(x, y, passes))
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= self.height as usize {
            return false;
        }
        let width = self.width as usize;
        let start = y * width;
        self.cells[start..start + width].iter().all(|cell| cell.is_some())
    }

    /// Put a new piece on the spawn position, replacing any active piece
    pub fn spawn(&mut self, kind: PieceType, definition: &PieceDefinition) -> &Piece {
        self.active.insert(Piece::new(kind, definition, self.spawn))
    }

    fn try_shift(&mut self, dx: i8) -> bool {
        let Some(piece) = self.active else {
            return false;
        };
        if !self.fits(&piece, dx, 0) {
            return false;
        }
        if let Some(active) = self.active.as_mut() {
            active.shift(dx, 0);
        }
        true
    }

    pub fn try_move_left(&mut self) -> bool {
        self.try_shift(-1)
    }

    pub fn try_move_right(&mut self) -> bool {
        self.try_shift(1)
    }

    /// Rotate the active piece, rolling back if the result collides
    pub fn try_rotate(&mut self, direction: RotateDirection) -> bool {
        let Some(mut piece) = self.active else {
            return false;
        };
        if !piece.rotate(direction) {
            return false;
        }
        if !self.fits(&piece, 0, 0) {
            // Turning back the other way always lands on the previous state.
            piece.rotate(direction.opposite());
            debug_assert_eq!(Some(piece), self.active);
            return false;
        }
        self.active = Some(piece);
        true
    }

    /// Move the active piece down one row, locking it when it cannot move
    pub fn step_down(&mut self, soft_drop: bool) -> StepOutcome {
        let Some(piece) = self.active else {
            return StepOutcome::Idle;
        };

        if self.fits(&piece, 0, 1) {
            if let Some(active) = self.active.as_mut() {
                active.shift(0, 1);
                if soft_drop {
                    active.record_soft_drop();
                }
            }
            return StepOutcome::Moved;
        }

        let sticks_out = piece.cells().any(|(_, y)| y < 0);
        if piece.position().y == self.spawn.y || sticks_out {
            return StepOutcome::ToppedOut;
        }

        let fallen_distance = piece.fallen_distance();
        let full_rows = self.lock_active();
        StepOutcome::Locked {
            full_rows,
            fallen_distance,
        }
    }

    /// Commit the active piece into the field and report full rows
    pub fn lock_active(&mut self) -> FullRows {
        let Some(piece) = self.active.take() else {
            return FullRows::new();
        };

        let block = LockedBlock {
            kind: piece.kind(),
            orientation: piece.orientation(),
        };
        for (x, y) in piece.cells() {
            if self.is_occupied(x, y) {
                // Pass-through blocks only fill empty cells.
                debug_assert!(piece.passes_through(), "locking {:?} into occupied ({}, {})", piece.kind(), x, y);
                continue;
            }
            self.set(x, y, Some(block));
        }

        self.full_rows()
    }

    /// Every full row, sorted top to bottom
    pub fn full_rows(&self) -> FullRows {
        let mut rows = FullRows::new();
        for y in 0..self.height as usize {
            if self.is_row_full(y) && rows.try_push(y).is_err() {
                debug_assert!(false, "more than {} full rows", MAX_CLEAR_ROWS);
                break;
            }
        }
        rows
    }

    /// Remove the given rows and shift everything above them down
    /// Uses a two-pointer pass from the bottom with no allocation
    pub fn remove_rows(&mut self, rows: &[usize]) {
        let width = self.width as usize;
        let mut write_y = self.height as usize;

        for read_y in (0..self.height as usize).rev() {
            if rows.contains(&read_y) {
                continue;
            }
            write_y -= 1;
            if write_y != read_y {
                let src = read_y * width;
                self.cells.copy_within(src..src + width, write_y * width);
            }
        }

        for cell in &mut self.cells[..write_y * width] {
            *cell = None;
        }
    }

    /// Whether any cell of the active piece lies on row `y`
    pub fn active_covers_row(&self, y: i8) -> bool {
        self.active
            .as_ref()
            .is_some_and(|piece| piece.cells().any(|(_, py)| py == y))
    }

    /// Move the active piece down with a stack that just lost its bottom row
    pub(crate) fn sink_active(&mut self) {
        if let Some(active) = self.active.as_mut() {
            active.shift(0, 1);
        }
    }

    /// Empty the field and drop the active piece
    pub fn clear(&mut self) {
        self.cells.fill(None);
        self.active = None;
    }

    /// Render rows as strings (`#` locked, `@` active, `.` empty) for tests
    /// and debugging
    pub fn to_rows(&self) -> Vec<String> {
        let active: ArrayVec<(i8, i8), 16> = self
            .active
            .as_ref()
            .map(|p| p.cells().collect())
            .unwrap_or_default();
        (0..self.height as i8)
            .map(|y| {
                (0..self.width as i8)
                    .map(|x| {
                        if active.contains(&(x, y)) {
                            '@'
                        } else if self.is_occupied(x, y) {
                            '#'
                        } else {
                            '.'
                        }
                    })
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PieceCatalog;
    use crate::types::Orientation;

    const BLOCK: Cell = Some(LockedBlock {
        kind: PieceType::O,
        orientation: Orientation::Up,
    });

    fn grid() -> Grid {
        Grid::new(10, 18, GridPos::new(4, 0))
    }

    #[test]
    fn index_calculation() {
        let g = grid();
        assert_eq!(g.index(0, 0), Some(0));
        assert_eq!(g.index(9, 0), Some(9));
        assert_eq!(g.index(0, 1), Some(10));
        assert_eq!(g.index(9, 17), Some(179));
        assert_eq!(g.index(-1, 0), None);
        assert_eq!(g.index(10, 0), None);
        assert_eq!(g.index(0, 18), None);
    }

    #[test]
    fn rows_above_field_are_open() {
        let g = grid();
        assert!(!g.blocks(3, -2, false));
        assert!(g.blocks(-1, -2, false));
        assert!(g.blocks(3, 18, true));
    }

    #[test]
    fn remove_rows_compacts_non_adjacent_rows() {
        let mut g = grid();
        for x in 0..10 {
            g.set(x, 17, BLOCK);
            g.set(x, 15, BLOCK);
        }
        g.set(2, 16, BLOCK);
        g.set(7, 14, BLOCK);

        g.remove_rows(&[15, 17]);

        assert!(g.is_occupied(2, 17));
        assert!(g.is_occupied(7, 16));
        assert_eq!(g.cells().iter().filter(|c| c.is_some()).count(), 2);
    }

    #[test]
    fn full_rows_sorted_top_down() {
        let mut g = grid();
        for x in 0..10 {
            g.set(x, 16, BLOCK);
            g.set(x, 12, BLOCK);
        }
        assert_eq!(g.full_rows().as_slice(), &[12, 16]);
    }

    #[test]
    fn lock_writes_piece_cells() {
        let catalog = PieceCatalog::standard();
        let mut g = grid();
        g.spawn(PieceType::O, catalog.get(PieceType::O));
        assert_eq!(g.step_down(false), StepOutcome::Moved);
        assert!(g.lock_active().is_empty());
        assert!(g.active().is_none());
        assert!(g.is_occupied(4, 1));
        assert!(g.is_occupied(5, 2));
    }

    #[test]
    fn to_rows_marks_active_piece() {
        let catalog = PieceCatalog::standard();
        let mut g = grid();
        g.spawn(PieceType::O, catalog.get(PieceType::O));
        let rows = g.to_rows();
        assert_eq!(rows[0], "....@@....");
        assert_eq!(rows[1], "....@@....");
    }
}
