//! Scoring module - line clear points, soft drop bonus, and leveling
//!
//! Classic console rules:
//! - Clearing `n` rows at once scores `table[n - 1] * (level + 1)`.
//! - Soft drop earns a flat bonus per row, paid when the turn ends.
//! - A level ends after `level * step + base` rows cleared within it.

use serde::{Deserialize, Serialize};

use crate::types::{LEVEL_UP_BASE, LEVEL_UP_STEP, LINE_SCORES, MAX_CLEAR_ROWS};

/// Score table and level-up thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRules {
    pub line_scores: [u32; MAX_CLEAR_ROWS],
    pub level_up_base: u32,
    pub level_up_step: u32,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            line_scores: LINE_SCORES,
            level_up_base: LEVEL_UP_BASE,
            level_up_step: LEVEL_UP_STEP,
        }
    }
}

impl ScoringRules {
    /// Points for clearing `lines` rows at `level`
    pub fn line_clear_score(&self, lines: usize, level: u32) -> u32 {
        if lines == 0 || lines > MAX_CLEAR_ROWS {
            return 0;
        }
        self.line_scores[lines - 1].saturating_mul(level + 1)
    }

    /// Rows needed within `level` to advance
    pub fn level_up_threshold(&self, level: u32) -> u32 {
        level
            .saturating_mul(self.level_up_step)
            .saturating_add(self.level_up_base)
    }
}

/// What a row clear changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClearScore {
    pub score_delta: u32,
    pub leveled_up: bool,
}

/// Cumulative score, rows, and level for one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreAndLevel {
    score: u32,
    level: u32,
    lines_total: u32,
    lines_this_level: u32,
}

impl ScoreAndLevel {
    pub fn new(start_level: u32) -> Self {
        Self {
            score: 0,
            level: start_level,
            lines_total: 0,
            lines_this_level: 0,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lines_total(&self) -> u32 {
        self.lines_total
    }

    pub fn lines_this_level(&self) -> u32 {
        self.lines_this_level
    }

    /// Add loose points (soft drop payout)
    pub fn add_points(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    /// Record `lines` rows cleared together.
    ///
    /// Points use the level the rows were cleared on; the level can rise by
    /// at most one per clear.
    pub fn record_clear(&mut self, lines: usize, rules: &ScoringRules) -> ClearScore {
        if lines == 0 {
            return ClearScore::default();
        }

        self.lines_total += lines as u32;

        let score_delta = rules.line_clear_score(lines, self.level);
        self.add_points(score_delta);

        self.lines_this_level += lines as u32;
        let leveled_up = self.lines_this_level >= rules.level_up_threshold(self.level);
        if leveled_up {
            self.level += 1;
            self.lines_this_level = 0;
        }

        ClearScore {
            score_delta,
            leveled_up,
        }
    }
}
