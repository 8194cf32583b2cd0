//! Input state - held buttons and Left/Right auto-repeat
//!
//! Design principles:
//! 1. A press of a button that is already held does nothing
//! 2. Each fresh Left/Right press moves exactly once immediately
//! 3. Holding keeps moving after the DAS delay, once per ARR interval,
//!    driven from `update` rather than by repeated press events

use crate::types::{Button, DEFAULT_ARR_MS, DEFAULT_DAS_MS};

/// Bit set of buttons currently held down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeldButtons(u8);

impl HeldButtons {
    /// Mark `button` held; returns false if it already was
    pub fn press(&mut self, button: Button) -> bool {
        let was_held = self.is_held(button);
        self.0 |= button.bit();
        !was_held
    }

    /// Mark `button` released; returns false if it was not held
    pub fn release(&mut self, button: Button) -> bool {
        let was_held = self.is_held(button);
        self.0 &= !button.bit();
        was_held
    }

    pub fn is_held(&self, button: Button) -> bool {
        self.0 & button.bit() != 0
    }
}

/// Horizontal direction of a held shift button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shift {
    Left,
    Right,
}

impl Shift {
    pub fn from_button(button: Button) -> Option<Self> {
        match button {
            Button::Left => Some(Shift::Left),
            Button::Right => Some(Shift::Right),
            _ => None,
        }
    }
}

/// Delayed auto shift for a held Left/Right button
#[derive(Debug, Clone)]
pub struct ShiftRepeat {
    /// Direction currently held, latest press wins
    direction: Option<Shift>,

    /// Time the current direction has been held
    das_timer: u32,

    /// Time banked towards the next repeat
    arr_accumulator: u32,

    /// DAS delay in milliseconds
    das_delay: u32,

    /// ARR rate in milliseconds (0 disables repeating)
    arr_rate: u32,
}

impl ShiftRepeat {
    /// Create with default DAS/ARR settings
    pub fn new() -> Self {
        Self::with_config(DEFAULT_DAS_MS, DEFAULT_ARR_MS)
    }

    pub fn with_config(das_delay: u32, arr_rate: u32) -> Self {
        Self {
            direction: None,
            das_timer: 0,
            arr_accumulator: 0,
            das_delay,
            arr_rate,
        }
    }

    pub fn direction(&self) -> Option<Shift> {
        self.direction
    }

    /// Start repeating `direction` from zero
    pub fn start(&mut self, direction: Shift) {
        self.direction = Some(direction);
        self.das_timer = 0;
        self.arr_accumulator = 0;
    }

    /// Stop repeating if `direction` is the one held
    pub fn stop(&mut self, direction: Shift) {
        if self.direction == Some(direction) {
            self.stop_all();
        }
    }

    pub fn stop_all(&mut self) {
        self.direction = None;
        self.das_timer = 0;
        self.arr_accumulator = 0;
    }

    /// Advance timers; returns the direction and how many repeats are due
    pub fn update(&mut self, elapsed_ms: u32) -> Option<(Shift, u32)> {
        let direction = self.direction?;
        if self.arr_rate == 0 {
            return None;
        }

        let prev_das = self.das_timer;
        self.das_timer = self.das_timer.saturating_add(elapsed_ms);
        if self.das_timer < self.das_delay {
            return None;
        }

        // Only the time past the DAS delay counts towards repeats.
        let excess = if prev_das < self.das_delay {
            self.das_timer - self.das_delay
        } else {
            elapsed_ms
        };
        self.arr_accumulator += excess;

        let repeats = self.arr_accumulator / self.arr_rate;
        self.arr_accumulator %= self.arr_rate;

        // The first repeat fires right at the DAS boundary.
        let first = u32::from(prev_das < self.das_delay);
        let total = repeats + first;
        (total > 0).then_some((direction, total))
    }
}

impl Default for ShiftRepeat {
    fn default() -> Self {
        Self::new()
    }
}
