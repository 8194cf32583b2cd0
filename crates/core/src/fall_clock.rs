//! Fall clock - gravity timing per level plus soft drop
//!
//! The level curve is written in frames per row at a reference frame rate
//! and converted to milliseconds once per level change.

/// Why the clock asked for a downward step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallTrigger {
    Gravity,
    SoftDrop,
}

/// Convert frames at `fps` to whole milliseconds
pub fn frames_to_ms(frames: u32, fps: u32) -> u32 {
    frames.saturating_mul(1000) / fps.max(1)
}

/// Fall interval for `level`, clamped to the last table entry
pub fn fall_interval_ms(frames_per_row: &[u32], fps: u32, level: u32) -> u32 {
    let idx = (level as usize).min(frames_per_row.len().saturating_sub(1));
    let frames = frames_per_row.get(idx).copied().unwrap_or(1);
    frames_to_ms(frames, fps)
}

#[derive(Debug, Clone)]
pub struct FallClock {
    frames_per_row: Vec<u32>,
    reference_fps: u32,
    soft_drop_interval_ms: u32,
    level_interval_ms: u32,
    soft_drop: bool,
    falling_enabled: bool,
    elapsed_ms: u32,
}

impl FallClock {
    pub fn new(frames_per_row: Vec<u32>, reference_fps: u32, soft_drop_interval_ms: u32, level: u32) -> Self {
        let level_interval_ms = fall_interval_ms(&frames_per_row, reference_fps, level);
        Self {
            frames_per_row,
            reference_fps,
            soft_drop_interval_ms,
            level_interval_ms,
            soft_drop: false,
            falling_enabled: true,
            elapsed_ms: 0,
        }
    }

    /// Recompute the gravity interval for a new level
    pub fn set_level(&mut self, level: u32) {
        self.level_interval_ms = fall_interval_ms(&self.frames_per_row, self.reference_fps, level);
    }

    /// Gravity interval for the current level (ignores soft drop)
    pub fn level_interval_ms(&self) -> u32 {
        self.level_interval_ms
    }

    /// Interval currently in effect
    pub fn interval_ms(&self) -> u32 {
        if self.soft_drop {
            self.soft_drop_interval_ms
        } else {
            self.level_interval_ms
        }
    }

    pub fn soft_drop(&self) -> bool {
        self.soft_drop
    }

    /// Switch soft drop on or off; the new speed applies from now
    pub fn set_soft_drop(&mut self, on: bool) {
        if self.soft_drop != on {
            self.soft_drop = on;
            self.elapsed_ms = 0;
        }
    }

    pub fn falling_enabled(&self) -> bool {
        self.falling_enabled
    }

    /// Debug switch; returns the new state
    pub fn toggle_falling(&mut self) -> bool {
        self.falling_enabled = !self.falling_enabled;
        self.elapsed_ms = 0;
        self.falling_enabled
    }

    /// Restart the interval (new piece, unpause)
    pub fn restart_interval(&mut self) {
        self.elapsed_ms = 0;
    }

    /// Advance by `elapsed_ms`; at most one step per call.
    ///
    /// Soft drop still steps while falling is disabled.
    pub fn advance(&mut self, elapsed_ms: u32) -> Option<FallTrigger> {
        if !self.falling_enabled && !self.soft_drop {
            return None;
        }

        self.elapsed_ms = self.elapsed_ms.saturating_add(elapsed_ms);
        if self.elapsed_ms < self.interval_ms() {
            return None;
        }

        self.elapsed_ms = 0;
        Some(if self.soft_drop {
            FallTrigger::SoftDrop
        } else {
            FallTrigger::Gravity
        })
    }
}
