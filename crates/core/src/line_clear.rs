//! Line clear animation - blink full rows, then collapse them
//!
//! Phases: `Idle -> Blinking -> Collapsing -> Idle`.
//!
//! Every step of one clear is scheduled up front so each can be cancelled on
//! its own; `cancel` drops them all and releases the overlays.

use arrayvec::ArrayVec;
use serde::Serialize;

use crate::grid::FullRows;
use crate::scheduler::{Scheduler, TaskId};
use crate::types::MAX_CLEAR_ROWS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClearPhase {
    Idle,
    Blinking,
    Collapsing,
}

/// One of the reusable full-row highlight shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RowOverlay {
    /// Row the overlay covers; `None` while in the pool
    pub row: Option<u8>,
    pub visible: bool,
}

/// Scheduled animation steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearStep {
    Blink { visible: bool, last: bool },
    Collapse,
}

/// Timing for one clear
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlinkTiming {
    pub interval_ms: u32,
    pub cycles: u32,
    pub collapse_delay_ms: u32,
}

/// Handed back when the collapse step fires
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearDone {
    pub rows: FullRows,
    /// Started from the debug bottom-row clear
    pub debug: bool,
}

#[derive(Debug, Clone)]
pub struct LineClearAnimator {
    phase: ClearPhase,
    rows: FullRows,
    debug: bool,
    overlays: [RowOverlay; MAX_CLEAR_ROWS],
    tasks: Vec<TaskId>,
}

impl LineClearAnimator {
    pub fn new() -> Self {
        Self {
            phase: ClearPhase::Idle,
            rows: FullRows::new(),
            debug: false,
            overlays: [RowOverlay::default(); MAX_CLEAR_ROWS],
            tasks: Vec::new(),
        }
    }

    pub fn phase(&self) -> ClearPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase != ClearPhase::Idle
    }

    pub fn overlays(&self) -> &[RowOverlay; MAX_CLEAR_ROWS] {
        &self.overlays
    }

    /// Rows whose overlay is currently shown
    pub fn visible_rows(&self) -> ArrayVec<u8, MAX_CLEAR_ROWS> {
        self.overlays
            .iter()
            .filter(|o| o.visible)
            .filter_map(|o| o.row)
            .collect()
    }

    /// Reserve overlays for `rows` and schedule the blink/collapse steps
    pub fn begin(
        &mut self,
        rows: FullRows,
        debug: bool,
        timing: BlinkTiming,
        scheduler: &mut Scheduler<ClearStep>,
    ) {
        debug_assert!(!self.is_active(), "clear started while another is running");
        self.cancel(scheduler);

        for (overlay, &row) in self.overlays.iter_mut().zip(rows.iter()) {
            *overlay = RowOverlay {
                row: Some(row as u8),
                visible: true,
            };
        }

        let toggles = timing.cycles * 2;
        for i in 1..=toggles {
            let step = ClearStep::Blink {
                // Odd toggles hide, even toggles show again.
                visible: i % 2 == 0,
                last: i == toggles,
            };
            self.tasks.push(scheduler.schedule(timing.interval_ms * i, step));
        }
        let collapse_at = timing.interval_ms * toggles + timing.collapse_delay_ms;
        self.tasks.push(scheduler.schedule(collapse_at, ClearStep::Collapse));

        self.rows = rows;
        self.debug = debug;
        self.phase = if toggles == 0 {
            ClearPhase::Collapsing
        } else {
            ClearPhase::Blinking
        };
    }

    /// Apply a fired step; returns the finished clear on collapse
    pub fn apply(&mut self, step: ClearStep) -> Option<ClearDone> {
        if !self.is_active() {
            return None;
        }

        match step {
            ClearStep::Blink { visible, last } => {
                for overlay in self.overlays.iter_mut().filter(|o| o.row.is_some()) {
                    overlay.visible = visible;
                }
                if last {
                    self.phase = ClearPhase::Collapsing;
                }
                None
            }
            ClearStep::Collapse => {
                let done = ClearDone {
                    rows: std::mem::take(&mut self.rows),
                    debug: self.debug,
                };
                self.release();
                Some(done)
            }
        }
    }

    /// Cancel outstanding steps and return overlays to the pool
    pub fn cancel(&mut self, scheduler: &mut Scheduler<ClearStep>) {
        for id in self.tasks.drain(..) {
            scheduler.cancel(id);
        }
        self.rows.clear();
        self.release();
    }

    fn release(&mut self) {
        self.overlays = [RowOverlay::default(); MAX_CLEAR_ROWS];
        self.tasks.clear();
        self.debug = false;
        self.phase = ClearPhase::Idle;
    }
}

impl Default for LineClearAnimator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMING: BlinkTiming = BlinkTiming {
        interval_ms: 100,
        cycles: 2,
        collapse_delay_ms: 50,
    };

    fn rows(rs: &[usize]) -> FullRows {
        rs.iter().copied().collect()
    }

    fn run(anim: &mut LineClearAnimator, s: &mut Scheduler<ClearStep>, ms: u32) -> Option<ClearDone> {
        s.advance(ms);
        let mut done = None;
        while let Some(step) = s.pop_due() {
            if let Some(d) = anim.apply(step) {
                done = Some(d);
            }
        }
        done
    }

    #[test]
    fn blinks_then_collapses() {
        let mut s = Scheduler::new();
        let mut anim = LineClearAnimator::new();
        anim.begin(rows(&[16, 17]), false, TIMING, &mut s);

        assert_eq!(anim.phase(), ClearPhase::Blinking);
        assert_eq!(anim.visible_rows().as_slice(), &[16, 17]);
        assert_eq!(s.pending(), 5);

        assert!(run(&mut anim, &mut s, 100).is_none());
        assert!(anim.visible_rows().is_empty());

        assert!(run(&mut anim, &mut s, 100).is_none());
        assert_eq!(anim.visible_rows().len(), 2);

        assert!(run(&mut anim, &mut s, 200).is_none());
        assert_eq!(anim.phase(), ClearPhase::Collapsing);

        let done = run(&mut anim, &mut s, 50).expect("collapse fires");
        assert_eq!(done.rows.as_slice(), &[16, 17]);
        assert!(!done.debug);
        assert_eq!(anim.phase(), ClearPhase::Idle);
        assert!(anim.overlays().iter().all(|o| o.row.is_none()));
    }

    #[test]
    fn cancel_stops_every_step() {
        let mut s = Scheduler::new();
        let mut anim = LineClearAnimator::new();
        anim.begin(rows(&[17]), true, TIMING, &mut s);
        run(&mut anim, &mut s, 150);

        anim.cancel(&mut s);
        assert_eq!(s.pending(), 0);
        assert!(!anim.is_active());
        assert!(run(&mut anim, &mut s, 10_000).is_none());
    }

    #[test]
    fn each_row_gets_its_own_overlay() {
        let mut s = Scheduler::new();
        let mut anim = LineClearAnimator::new();
        anim.begin(rows(&[14, 15, 16, 17]), false, TIMING, &mut s);
        let reserved: Vec<_> = anim.overlays().iter().filter_map(|o| o.row).collect();
        assert_eq!(reserved, vec![14, 15, 16, 17]);
    }
}
