//! Game session - ties the grid, clocks, clear animation, and scoring
//! together behind the button/update contract.
//!
//! Lifecycle: `NotStarted -> Playing <-> Paused`, `Playing -> GameOver`,
//! and `GameOver -> Playing` on restart.
//!
//! Every entry point returns the events it produced, in order.

use anyhow::Result;
use serde::Serialize;

use crate::config::SessionConfig;
use crate::fall_clock::{FallClock, FallTrigger};
use crate::grid::{FullRows, Grid, StepOutcome};
use crate::input::{HeldButtons, Shift, ShiftRepeat};
use crate::line_clear::{BlinkTiming, ClearDone, ClearStep, LineClearAnimator};
use crate::rng::PieceQueue;
use crate::scheduler::Scheduler;
use crate::scoring::{ScoreAndLevel, ScoringRules};
use crate::snapshot::{ActiveSnapshot, SessionSnapshot};
use crate::types::{Button, GameEvent, PieceType, RotateDirection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    NotStarted,
    Playing,
    Paused,
    GameOver,
}

#[derive(Debug, Clone)]
pub struct GameSession {
    config: SessionConfig,
    rules: ScoringRules,
    grid: Grid,
    queue: PieceQueue,
    fall: FallClock,
    scheduler: Scheduler<ClearStep>,
    clear: LineClearAnimator,
    stats: ScoreAndLevel,
    held: HeldButtons,
    shift: ShiftRepeat,
    /// Soft drop points earned this turn, paid when the turn ends
    soft_drop_points: u32,
    start_level: u32,
    state: SessionState,
    music_muted: bool,
    /// Monotonic episode id (increments on restart)
    episode_id: u32,
    events: Vec<GameEvent>,
}

impl GameSession {
    /// Build a session; fails if the configuration is malformed
    pub fn new(config: SessionConfig, seed: u32) -> Result<Self> {
        config.validate()?;

        let start_level = config.start_level;
        Ok(Self {
            rules: config.scoring_rules(),
            grid: Grid::new(config.width, config.height, config.spawn_position()),
            queue: PieceQueue::new(seed),
            fall: FallClock::new(
                config.fall_frames_per_row.clone(),
                config.reference_fps,
                config.soft_drop_interval_ms,
                start_level,
            ),
            scheduler: Scheduler::new(),
            clear: LineClearAnimator::new(),
            stats: ScoreAndLevel::new(start_level),
            held: HeldButtons::default(),
            shift: ShiftRepeat::with_config(config.das_ms, config.arr_ms),
            soft_drop_points: 0,
            start_level,
            state: SessionState::NotStarted,
            music_muted: false,
            episode_id: 0,
            events: Vec::new(),
            config,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Mutable field access for setting up scenarios
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn stats(&self) -> &ScoreAndLevel {
        &self.stats
    }

    pub fn score(&self) -> u32 {
        self.stats.score()
    }

    pub fn level(&self) -> u32 {
        self.stats.level()
    }

    pub fn lines(&self) -> u32 {
        self.stats.lines_total()
    }

    pub fn next_piece(&self) -> PieceType {
        self.queue.peek()
    }

    pub fn fall_interval_ms(&self) -> u32 {
        self.fall.interval_ms()
    }

    pub fn falling_enabled(&self) -> bool {
        self.fall.falling_enabled()
    }

    pub fn soft_drop_active(&self) -> bool {
        self.fall.soft_drop()
    }

    pub fn is_clearing(&self) -> bool {
        self.clear.is_active()
    }

    pub fn line_clear(&self) -> &LineClearAnimator {
        &self.clear
    }

    pub fn music_muted(&self) -> bool {
        self.music_muted
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    /// Scheduled animation steps still waiting to fire
    pub fn pending_steps(&self) -> usize {
        self.scheduler.pending()
    }

    fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Start the game and spawn the first piece
    pub fn start(&mut self) -> Vec<GameEvent> {
        if self.state == SessionState::NotStarted {
            self.state = SessionState::Playing;
            // Hosts rebuild every counter display from these.
            self.emit(GameEvent::LevelChanged(self.stats.level()));
            self.emit(GameEvent::ScoreChanged(self.stats.score()));
            self.emit(GameEvent::LinesClearedCountChanged(self.stats.lines_total()));
            self.spawn_next();
        }
        self.take_events()
    }

    /// Stop every pending step and return to `NotStarted` with a fresh field.
    ///
    /// The debug falling switch survives the reset.
    pub fn reset(&mut self) -> Vec<GameEvent> {
        self.clear.cancel(&mut self.scheduler);
        self.scheduler.reset();
        self.grid.clear();
        self.stats = ScoreAndLevel::new(self.start_level);
        self.fall.set_level(self.start_level);
        self.fall.restart_interval();
        self.fall.set_soft_drop(self.held.is_held(Button::Down));
        self.shift.stop_all();
        self.queue = PieceQueue::new(self.queue.seed());
        self.soft_drop_points = 0;
        self.state = SessionState::NotStarted;
        self.take_events()
    }

    /// Reset and start again
    pub fn restart(&mut self) -> Vec<GameEvent> {
        self.reset();
        self.episode_id = self.episode_id.wrapping_add(1);
        self.start()
    }

    /// Debug entry: restart at an explicit level, clamped to the allowed range
    pub fn debug_start_at_level(&mut self, level: u32) -> Vec<GameEvent> {
        self.start_level = level.min(self.config.max_start_level);
        self.restart()
    }

    /// Debug entry: switch gravity on or off (soft drop keeps working)
    pub fn debug_toggle_falling(&mut self) -> bool {
        self.fall.toggle_falling()
    }

    /// Debug entry: blink and remove the bottom row.
    ///
    /// Does not score, count lines, or spawn. Refused while another clear
    /// runs or while the active piece covers the bottom row.
    pub fn debug_clear_bottom_row(&mut self) -> Vec<GameEvent> {
        let bottom = self.grid.height() as i8 - 1;
        if self.state == SessionState::Playing
            && !self.clear.is_active()
            && !self.grid.active_covers_row(bottom)
        {
            let mut rows = FullRows::new();
            rows.push(bottom as usize);
            self.begin_clear(rows, true);
        }
        self.take_events()
    }

    /// Debug entry: make the pass-through block the next piece
    pub fn queue_pass_through_piece(&mut self) -> Vec<GameEvent> {
        if self.queue.peek() != PieceType::Invisible {
            self.queue.force_next(PieceType::Invisible);
            self.emit(GameEvent::NextPieceChanged(PieceType::Invisible));
        }
        self.take_events()
    }

    /// Host button press; presses of an already-held button are ignored
    pub fn on_button_press(&mut self, button: Button) -> Vec<GameEvent> {
        if !self.held.press(button) {
            return self.take_events();
        }

        match button {
            Button::Start => self.on_start(),
            Button::Select => {
                self.music_muted = !self.music_muted;
                let muted = self.music_muted;
                self.emit(GameEvent::MusicMuted(muted));
            }
            Button::Down => self.fall.set_soft_drop(true),
            Button::Left | Button::Right => {
                if let Some(shift) = Shift::from_button(button) {
                    self.shift.start(shift);
                    if self.can_control() {
                        self.try_shift(shift);
                    }
                }
            }
            Button::Up | Button::A => {
                if self.can_control() {
                    self.try_rotate(RotateDirection::Clockwise);
                }
            }
            Button::B => {
                if self.can_control() {
                    self.try_rotate(RotateDirection::CounterClockwise);
                }
            }
        }

        self.take_events()
    }

    /// Host button release
    pub fn on_button_up(&mut self, button: Button) -> Vec<GameEvent> {
        if self.held.release(button) {
            match button {
                Button::Down => self.fall.set_soft_drop(false),
                Button::Left | Button::Right => {
                    if let Some(shift) = Shift::from_button(button) {
                        self.shift.stop(shift);
                    }
                }
                _ => {}
            }
        }
        self.take_events()
    }

    fn on_start(&mut self) {
        match self.state {
            SessionState::NotStarted => {
                let events = self.start();
                self.events.extend(events);
            }
            SessionState::Playing => {
                self.state = SessionState::Paused;
                self.emit(GameEvent::Paused(true));
            }
            SessionState::Paused => {
                self.state = SessionState::Playing;
                self.fall.restart_interval();
                self.emit(GameEvent::Paused(false));
            }
            SessionState::GameOver => {
                let events = self.restart();
                self.events.extend(events);
            }
        }
    }

    /// Whether buttons may move the active piece
    fn can_control(&self) -> bool {
        self.state == SessionState::Playing && !self.clear.is_active() && self.grid.active().is_some()
    }

    fn try_shift(&mut self, shift: Shift) -> bool {
        let moved = match shift {
            Shift::Left => self.grid.try_move_left(),
            Shift::Right => self.grid.try_move_right(),
        };
        if moved {
            self.emit(GameEvent::PieceMoved);
        }
        moved
    }

    fn try_rotate(&mut self, direction: RotateDirection) -> bool {
        let rotated = self.grid.try_rotate(direction);
        if rotated {
            self.emit(GameEvent::PieceRotated);
        }
        rotated
    }

    /// Advance the simulation by one host frame
    pub fn update(&mut self, elapsed_ms: u32) -> Vec<GameEvent> {
        if self.state != SessionState::Playing {
            return self.take_events();
        }

        self.scheduler.advance(elapsed_ms);
        let mut spawned = false;
        while let Some(step) = self.scheduler.pop_due() {
            if let Some(done) = self.clear.apply(step) {
                spawned |= !done.debug;
                self.complete_clear(done);
            }
            if self.state != SessionState::Playing {
                return self.take_events();
            }
        }

        // Gravity and shifting wait while rows blink. A piece spawned by this
        // frame's collapse starts its timers on the next frame.
        if spawned || self.clear.is_active() || self.grid.active().is_none() {
            return self.take_events();
        }

        if let Some((shift, repeats)) = self.shift.update(elapsed_ms) {
            for _ in 0..repeats {
                if !self.try_shift(shift) {
                    break;
                }
            }
        }

        if let Some(trigger) = self.fall.advance(elapsed_ms) {
            self.step_down(trigger);
        }

        self.take_events()
    }

    fn step_down(&mut self, trigger: FallTrigger) {
        match self.grid.step_down(trigger == FallTrigger::SoftDrop) {
            StepOutcome::Idle | StepOutcome::Moved => {}
            StepOutcome::Locked {
                full_rows,
                fallen_distance,
            } => {
                self.soft_drop_points += fallen_distance.saturating_mul(self.config.soft_drop_bonus);
                self.emit(GameEvent::PieceLocked);
                if full_rows.is_empty() {
                    self.finish_turn();
                } else {
                    self.begin_clear(full_rows, false);
                }
            }
            StepOutcome::ToppedOut => {
                self.state = SessionState::GameOver;
                self.shift.stop_all();
                self.emit(GameEvent::GameOver);
            }
        }
    }

    fn begin_clear(&mut self, rows: FullRows, debug: bool) {
        let cycles = if debug {
            self.config.debug_blink_cycles
        } else {
            self.config.blink_cycles
        };
        let timing = BlinkTiming {
            interval_ms: self.config.blink_interval_ms,
            cycles,
            collapse_delay_ms: self.config.collapse_delay_ms,
        };
        let count = rows.len() as u8;
        self.clear.begin(rows, debug, timing, &mut self.scheduler);
        self.emit(GameEvent::RowsBlinking { count });
    }

    fn complete_clear(&mut self, done: ClearDone) {
        let count = done.rows.len();
        self.grid.remove_rows(&done.rows);

        if done.debug {
            self.grid.sink_active();
            self.emit(GameEvent::RowsCollapsed { count: count as u8 });
            return;
        }

        let outcome = self.stats.record_clear(count, &self.rules);
        // Soft drop points ride along with the clear so the score moves once.
        let soft = std::mem::take(&mut self.soft_drop_points);
        self.stats.add_points(soft);
        self.emit(GameEvent::LinesClearedCountChanged(self.stats.lines_total()));
        self.emit(GameEvent::ScoreChanged(self.stats.score()));
        if outcome.leveled_up {
            let level = self.stats.level();
            self.fall.set_level(level);
            self.emit(GameEvent::LevelChanged(level));
        }
        self.emit(GameEvent::RowsCollapsed { count: count as u8 });
        self.finish_turn();
    }

    /// Pay out soft drop points and bring in the next piece
    fn finish_turn(&mut self) {
        if self.soft_drop_points > 0 {
            self.stats.add_points(self.soft_drop_points);
            self.soft_drop_points = 0;
            self.emit(GameEvent::ScoreChanged(self.stats.score()));
        }
        self.spawn_next();
    }

    fn spawn_next(&mut self) {
        let kind = self.queue.draw();
        let definition = *self.config.catalog.get(kind);
        self.grid.spawn(kind, &definition);
        self.fall.restart_interval();
        self.emit(GameEvent::NextPieceChanged(self.queue.peek()));
    }

    pub fn snapshot_into(&self, out: &mut SessionSnapshot) {
        out.width = self.grid.width();
        out.height = self.grid.height();
        out.cells.clear();
        out.cells.extend_from_slice(self.grid.cells());
        out.active = self.grid.active().map(ActiveSnapshot::from);
        out.overlays = *self.clear.overlays();
        out.clear_phase = self.clear.phase();
        out.next = self.queue.peek();
        out.state = self.state;
        out.score = self.stats.score();
        out.level = self.stats.level();
        out.lines = self.stats.lines_total();
        out.lines_this_level = self.stats.lines_this_level();
        out.fall_interval_ms = self.fall.interval_ms();
        out.falling_enabled = self.fall.falling_enabled();
        out.music_muted = self.music_muted;
        out.episode_id = self.episode_id;
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let mut s = SessionSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> GameSession {
        GameSession::new(SessionConfig::default(), 12345).unwrap()
    }

    #[test]
    fn new_session_waits_for_start() {
        let s = session();
        assert_eq!(s.state(), SessionState::NotStarted);
        assert!(s.grid().active().is_none());
        assert_eq!(s.score(), 0);
        assert_eq!(s.level(), 0);
    }

    #[test]
    fn start_spawns_and_announces_next_piece() {
        let mut s = session();
        let events = s.start();
        assert_eq!(s.state(), SessionState::Playing);
        assert!(s.grid().active().is_some());
        assert_eq!(
            events,
            vec![
                GameEvent::LevelChanged(0),
                GameEvent::ScoreChanged(0),
                GameEvent::LinesClearedCountChanged(0),
                GameEvent::NextPieceChanged(s.next_piece()),
            ]
        );
        assert!(s.start().is_empty());
    }

    #[test]
    fn start_button_toggles_pause() {
        let mut s = session();
        s.start();
        assert_eq!(s.on_button_press(Button::Start), vec![GameEvent::Paused(true)]);
        s.on_button_up(Button::Start);
        assert_eq!(s.state(), SessionState::Paused);

        let y = s.grid().active().unwrap().position().y;
        s.update(5_000);
        assert_eq!(s.grid().active().unwrap().position().y, y);

        assert_eq!(s.on_button_press(Button::Start), vec![GameEvent::Paused(false)]);
        assert_eq!(s.state(), SessionState::Playing);
    }

    #[test]
    fn select_toggles_mute_in_any_state() {
        let mut s = session();
        assert_eq!(s.on_button_press(Button::Select), vec![GameEvent::MusicMuted(true)]);
        s.on_button_up(Button::Select);
        assert_eq!(s.on_button_press(Button::Select), vec![GameEvent::MusicMuted(false)]);
    }

    #[test]
    fn held_button_press_is_ignored() {
        let mut s = session();
        s.start();
        let x = s.grid().active().unwrap().position().x;
        assert_eq!(s.on_button_press(Button::Left), vec![GameEvent::PieceMoved]);
        assert!(s.on_button_press(Button::Left).is_empty());
        assert_eq!(s.grid().active().unwrap().position().x, x - 1);
    }

    #[test]
    fn debug_level_is_clamped() {
        let mut s = session();
        s.debug_start_at_level(99);
        assert_eq!(s.level(), 20);
        assert_eq!(s.state(), SessionState::Playing);
    }

    #[test]
    fn restart_increments_episode_id() {
        let mut s = session();
        s.start();
        assert_eq!(s.episode_id(), 0);
        s.restart();
        assert_eq!(s.episode_id(), 1);
    }

    #[test]
    fn restart_keeps_falling_switch() {
        let mut s = session();
        s.start();
        assert!(!s.debug_toggle_falling());
        s.restart();
        assert!(!s.falling_enabled());

        let y = s.grid().active().unwrap().position().y;
        s.update(5_000);
        assert_eq!(s.grid().active().unwrap().position().y, y);
    }

    #[test]
    fn snapshot_reflects_session() {
        let mut s = session();
        s.start();
        let snap = s.snapshot();
        assert_eq!(snap.width, 10);
        assert_eq!(snap.height, 18);
        assert_eq!(snap.cells.len(), 180);
        assert_eq!(snap.state, SessionState::Playing);
        assert_eq!(snap.next, s.next_piece());
        assert!(snap.active.is_some());

        let json = snap.to_json().unwrap();
        assert!(json.contains("\"state\":\"Playing\""));
        assert!(json.contains("\"episode_id\":0"));
    }
}
