//! Catalog module - static piece definitions
//!
//! Each piece type has a square occupancy matrix, a pivot cell the piece
//! rotates around, and the subset of orientations it may rest in. The subset
//! is what gives the handheld-era feel: I, S and Z only flip between two
//! states, O and the pass-through block never rotate.
//!
//! Coordinates inside a matrix are `(x, y)` = (column, row), row 0 on top.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::types::{Orientation, PieceType};

/// Largest matrix side length (the I piece needs 4x4)
pub const MAX_MATRIX_SIZE: usize = 4;

/// Square block-occupancy matrix, stored in a fixed 4x4 array.
///
/// Only the top-left `size x size` corner is meaningful. Serialized as a list
/// of row strings where `#` is a block and `.` is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct BlockMatrix {
    size: u8,
    cells: [[bool; MAX_MATRIX_SIZE]; MAX_MATRIX_SIZE],
}

impl BlockMatrix {
    /// Build a matrix from 0/1 rows (usable in const context)
    pub const fn from_bits(size: u8, rows: [[u8; MAX_MATRIX_SIZE]; MAX_MATRIX_SIZE]) -> Self {
        let mut cells = [[false; MAX_MATRIX_SIZE]; MAX_MATRIX_SIZE];
        let mut r = 0;
        while r < MAX_MATRIX_SIZE {
            let mut c = 0;
            while c < MAX_MATRIX_SIZE {
                cells[r][c] = rows[r][c] != 0;
                c += 1;
            }
            r += 1;
        }
        Self { size, cells }
    }

    /// Parse a matrix from row strings (`#` = block, `.` = empty)
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self> {
        let size = rows.len();
        if size == 0 || size > MAX_MATRIX_SIZE {
            return Err(anyhow!(
                "block matrix must have 1..={} rows, got {}",
                MAX_MATRIX_SIZE,
                size
            ));
        }

        let mut cells = [[false; MAX_MATRIX_SIZE]; MAX_MATRIX_SIZE];
        for (r, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.chars().count() != size {
                return Err(anyhow!(
                    "block matrix row {} is {:?}, expected {} columns",
                    r,
                    row,
                    size
                ));
            }
            for (c, ch) in row.chars().enumerate() {
                cells[r][c] = match ch {
                    '#' => true,
                    '.' => false,
                    other => return Err(anyhow!("unexpected block matrix character {:?}", other)),
                };
            }
        }

        Ok(Self {
            size: size as u8,
            cells,
        })
    }

    /// Row strings (`#` = block, `.` = empty)
    pub fn to_rows(&self) -> Vec<String> {
        (0..self.size as usize)
            .map(|r| {
                (0..self.size as usize)
                    .map(|c| if self.cells[r][c] { '#' } else { '.' })
                    .collect()
            })
            .collect()
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    /// Whether the cell at column `x`, row `y` holds a block
    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.size as usize && y < self.size as usize && self.cells[y][x]
    }

    /// Iterate occupied cells as `(x, y)`
    pub fn occupied(&self) -> impl Iterator<Item = (i8, i8)> + '_ {
        let n = self.size as usize;
        (0..n).flat_map(move |y| {
            (0..n).filter_map(move |x| self.cells[y][x].then_some((x as i8, y as i8)))
        })
    }

    pub fn block_count(&self) -> usize {
        self.occupied().count()
    }

    /// Rotate 90° clockwise: `new[r][c] = old[n-1-c][r]`
    pub fn rotated_cw(&self) -> Self {
        let n = self.size as usize;
        let mut cells = [[false; MAX_MATRIX_SIZE]; MAX_MATRIX_SIZE];
        for (r, row) in cells.iter_mut().enumerate().take(n) {
            for (c, cell) in row.iter_mut().enumerate().take(n) {
                *cell = self.cells[n - 1 - c][r];
            }
        }
        Self {
            size: self.size,
            cells,
        }
    }

    /// Rotate 90° counter-clockwise: `new[r][c] = old[c][n-1-r]`
    pub fn rotated_ccw(&self) -> Self {
        let n = self.size as usize;
        let mut cells = [[false; MAX_MATRIX_SIZE]; MAX_MATRIX_SIZE];
        for (r, row) in cells.iter_mut().enumerate().take(n) {
            for (c, cell) in row.iter_mut().enumerate().take(n) {
                *cell = self.cells[c][n - 1 - r];
            }
        }
        Self {
            size: self.size,
            cells,
        }
    }

    /// True when a block sits outside the `size x size` corner
    fn has_stray_blocks(&self) -> bool {
        let n = self.size as usize;
        (0..MAX_MATRIX_SIZE).any(|r| (0..MAX_MATRIX_SIZE).any(|c| (r >= n || c >= n) && self.cells[r][c]))
    }
}

impl TryFrom<Vec<String>> for BlockMatrix {
    type Error = String;

    fn try_from(rows: Vec<String>) -> std::result::Result<Self, Self::Error> {
        Self::from_rows(&rows).map_err(|e| e.to_string())
    }
}

impl From<BlockMatrix> for Vec<String> {
    fn from(value: BlockMatrix) -> Self {
        value.to_rows()
    }
}

/// Rotation center in local matrix coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pivot {
    pub x: i8,
    pub y: i8,
}

impl Pivot {
    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }

    /// Follow a clockwise matrix rotation of side `size`
    pub fn rotated_cw(self, size: u8) -> Self {
        Self {
            x: size as i8 - self.y - 1,
            y: self.x,
        }
    }

    /// Follow a counter-clockwise matrix rotation of side `size`
    pub fn rotated_ccw(self, size: u8) -> Self {
        Self {
            x: self.y,
            y: size as i8 - self.x - 1,
        }
    }
}

/// Set of orientations, one bit per [`Orientation`].
///
/// Serialized as a list, e.g. `["Up", "Right"]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Orientation>", into = "Vec<Orientation>")]
pub struct OrientationSet(u8);

impl OrientationSet {
    pub const EMPTY: Self = Self(0);
    pub const ALL: Self = Self(0b1111);

    pub const fn of(orientations: &[Orientation]) -> Self {
        let mut bits = 0u8;
        let mut i = 0;
        while i < orientations.len() {
            bits |= match orientations[i] {
                Orientation::Up => 1,
                Orientation::Right => 2,
                Orientation::Down => 4,
                Orientation::Left => 8,
            };
            i += 1;
        }
        Self(bits)
    }

    pub fn contains(self, orientation: Orientation) -> bool {
        self.0 & orientation.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }
}

impl From<Vec<Orientation>> for OrientationSet {
    fn from(value: Vec<Orientation>) -> Self {
        Self::of(&value)
    }
}

impl From<OrientationSet> for Vec<Orientation> {
    fn from(value: OrientationSet) -> Self {
        Orientation::CYCLE
            .into_iter()
            .filter(|o| value.contains(*o))
            .collect()
    }
}

/// Definition of one piece type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PieceDefinition {
    pub blocks: BlockMatrix,
    pub pivot: Pivot,
    /// Orientations the piece may rest in; empty means it never rotates
    pub allowed: OrientationSet,
}

const I_PIECE: PieceDefinition = PieceDefinition {
    blocks: BlockMatrix::from_bits(4, [[0, 0, 0, 0], [1, 1, 1, 1], [0, 0, 0, 0], [0, 0, 0, 0]]),
    pivot: Pivot::new(1, 1),
    allowed: OrientationSet::of(&[Orientation::Up, Orientation::Right]),
};

const J_PIECE: PieceDefinition = PieceDefinition {
    blocks: BlockMatrix::from_bits(3, [[0, 0, 0, 0], [1, 1, 1, 0], [0, 0, 1, 0], [0, 0, 0, 0]]),
    pivot: Pivot::new(1, 1),
    allowed: OrientationSet::ALL,
};

const L_PIECE: PieceDefinition = PieceDefinition {
    blocks: BlockMatrix::from_bits(3, [[0, 0, 0, 0], [1, 1, 1, 0], [1, 0, 0, 0], [0, 0, 0, 0]]),
    pivot: Pivot::new(1, 1),
    allowed: OrientationSet::ALL,
};

const O_PIECE: PieceDefinition = PieceDefinition {
    blocks: BlockMatrix::from_bits(2, [[1, 1, 0, 0], [1, 1, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]),
    pivot: Pivot::new(0, 0),
    allowed: OrientationSet::EMPTY,
};

const S_PIECE: PieceDefinition = PieceDefinition {
    blocks: BlockMatrix::from_bits(3, [[0, 0, 0, 0], [0, 1, 1, 0], [1, 1, 0, 0], [0, 0, 0, 0]]),
    pivot: Pivot::new(1, 1),
    allowed: OrientationSet::of(&[Orientation::Up, Orientation::Right]),
};

const T_PIECE: PieceDefinition = PieceDefinition {
    blocks: BlockMatrix::from_bits(3, [[0, 0, 0, 0], [1, 1, 1, 0], [0, 1, 0, 0], [0, 0, 0, 0]]),
    pivot: Pivot::new(1, 1),
    allowed: OrientationSet::ALL,
};

const Z_PIECE: PieceDefinition = PieceDefinition {
    blocks: BlockMatrix::from_bits(3, [[0, 0, 0, 0], [1, 1, 0, 0], [0, 1, 1, 0], [0, 0, 0, 0]]),
    pivot: Pivot::new(1, 1),
    allowed: OrientationSet::of(&[Orientation::Up, Orientation::Right]),
};

const INVISIBLE_PIECE: PieceDefinition = PieceDefinition {
    blocks: BlockMatrix::from_bits(1, [[1, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]),
    pivot: Pivot::new(0, 0),
    allowed: OrientationSet::EMPTY,
};

/// Definitions for every [`PieceType`], serialized as an array in
/// [`PieceType::ALL`] order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceCatalog {
    definitions: [PieceDefinition; 8],
}

impl PieceCatalog {
    /// The handheld-console rotation catalog
    pub fn standard() -> Self {
        Self {
            definitions: [
                I_PIECE,
                J_PIECE,
                L_PIECE,
                O_PIECE,
                S_PIECE,
                T_PIECE,
                Z_PIECE,
                INVISIBLE_PIECE,
            ],
        }
    }

    pub fn get(&self, kind: PieceType) -> &PieceDefinition {
        &self.definitions[kind.index()]
    }

    /// Replace one definition (for custom rule sets)
    pub fn with_definition(mut self, kind: PieceType, definition: PieceDefinition) -> Self {
        self.definitions[kind.index()] = definition;
        self
    }

    /// Reject malformed definitions before a session is built
    pub fn validate(&self) -> Result<()> {
        for kind in PieceType::ALL {
            let def = self.get(kind);
            let size = def.blocks.size();
            if size == 0 || size as usize > MAX_MATRIX_SIZE {
                return Err(anyhow!("{:?}: matrix size {} out of range", kind, size));
            }
            if def.blocks.has_stray_blocks() {
                return Err(anyhow!("{:?}: block outside the {}x{} matrix", kind, size, size));
            }
            if def.blocks.block_count() == 0 {
                return Err(anyhow!("{:?}: matrix has no blocks", kind));
            }
            if def.pivot.x < 0 || def.pivot.y < 0 || def.pivot.x >= size as i8 || def.pivot.y >= size as i8 {
                return Err(anyhow!(
                    "{:?}: pivot ({}, {}) outside the {}x{} matrix",
                    kind,
                    def.pivot.x,
                    def.pivot.y,
                    size,
                    size
                ));
            }
            if !def.allowed.is_empty() && !def.allowed.contains(Orientation::Up) {
                return Err(anyhow!("{:?}: allowed orientations must include the spawn orientation Up", kind));
            }
        }
        Ok(())
    }
}

impl Default for PieceCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
