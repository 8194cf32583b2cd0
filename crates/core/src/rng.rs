//! RNG module - next-piece selection
//!
//! Pieces are drawn uniformly from the seven tetrominoes with one re-roll
//! when the draw repeats the piece that just went into play. The queue always
//! holds exactly one preview piece.
//!
//! Also provides a simple LCG for deterministic testing.

use crate::types::PieceType;

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        // Low bits of an LCG have short periods.
        (self.next_u32() >> 16) % max.max(1)
    }

    pub fn state(&self) -> u32 {
        self.state
    }
}

/// One-piece preview queue
#[derive(Debug, Clone)]
pub struct PieceQueue {
    rng: SimpleRng,
    next: PieceType,
}

impl PieceQueue {
    /// Create a new piece queue with the given seed
    pub fn new(seed: u32) -> Self {
        let mut rng = SimpleRng::new(seed);
        let next = Self::roll(&mut rng, None);
        Self { rng, next }
    }

    fn roll(rng: &mut SimpleRng, previous: Option<PieceType>) -> PieceType {
        let count = PieceType::STANDARD.len() as u32;
        let first = PieceType::STANDARD[rng.next_range(count) as usize];
        if Some(first) == previous {
            return PieceType::STANDARD[rng.next_range(count) as usize];
        }
        first
    }

    /// The preview piece
    pub fn peek(&self) -> PieceType {
        self.next
    }

    /// Take the preview piece and roll a new preview
    pub fn draw(&mut self) -> PieceType {
        let drawn = self.next;
        self.next = Self::roll(&mut self.rng, Some(drawn));
        drawn
    }

    /// Replace the preview (debug cheat)
    pub fn force_next(&mut self, kind: PieceType) {
        self.next = kind;
    }

    /// Current RNG state (for restarting with a fresh sequence)
    pub fn seed(&self) -> u32 {
        self.rng.state()
    }
}

impl Default for PieceQueue {
    fn default() -> Self {
        Self::new(1)
    }
}
