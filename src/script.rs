//! Scripted sessions
//!
//! A script is a JSON document with a seed, an optional configuration, and a
//! list of steps. Waits are split into fixed frames so a script replays the
//! same way a host loop would drive the session.
//!
//! ```json
//! {
//!   "seed": 7,
//!   "steps": [
//!     { "tap": "Start" },
//!     { "press": "Down" },
//!     { "wait": { "ms": 2000 } },
//!     { "debug": "clear_bottom_row" }
//!   ]
//! }
//! ```

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::{GameSession, SessionConfig, SessionSnapshot};
use crate::types::{Button, GameEvent, TICK_MS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebugCommand {
    ToggleFalling,
    ClearBottomRow,
    PassThrough,
    StartAtLevel(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptStep {
    Press(Button),
    Release(Button),
    /// Press and release in the same instant
    Tap(Button),
    Wait { ms: u32 },
    Debug(DebugCommand),
}

fn default_frame_ms() -> u32 {
    TICK_MS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub seed: u32,
    #[serde(default)]
    pub config: Option<SessionConfig>,
    /// Overrides `config.start_level`
    #[serde(default)]
    pub start_level: Option<u32>,
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u32,
    pub steps: Vec<ScriptStep>,
}

impl Script {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("parse script")
    }
}

/// One event with the virtual time it was produced at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimedEvent {
    pub at_ms: u64,
    pub event: GameEvent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptReport {
    pub seed: u32,
    pub elapsed_ms: u64,
    pub events: Vec<TimedEvent>,
    pub snapshot: SessionSnapshot,
}

impl ScriptReport {
    /// Events without timestamps, in order
    pub fn event_kinds(&self) -> Vec<GameEvent> {
        self.events.iter().map(|e| e.event).collect()
    }
}

struct Runner {
    session: GameSession,
    clock_ms: u64,
    frame_ms: u32,
    events: Vec<TimedEvent>,
}

impl Runner {
    fn record(&mut self, events: Vec<GameEvent>) {
        let at_ms = self.clock_ms;
        self.events
            .extend(events.into_iter().map(|event| TimedEvent { at_ms, event }));
    }

    fn wait(&mut self, ms: u32) {
        let mut remaining = ms;
        while remaining > 0 {
            let dt = remaining.min(self.frame_ms);
            let events = self.session.update(dt);
            self.clock_ms += u64::from(dt);
            self.record(events);
            remaining -= dt;
        }
    }

    fn step(&mut self, step: ScriptStep) {
        let events = match step {
            ScriptStep::Press(button) => self.session.on_button_press(button),
            ScriptStep::Release(button) => self.session.on_button_up(button),
            ScriptStep::Tap(button) => {
                let mut events = self.session.on_button_press(button);
                events.extend(self.session.on_button_up(button));
                events
            }
            ScriptStep::Wait { ms } => {
                self.wait(ms);
                Vec::new()
            }
            ScriptStep::Debug(DebugCommand::ToggleFalling) => {
                self.session.debug_toggle_falling();
                Vec::new()
            }
            ScriptStep::Debug(DebugCommand::ClearBottomRow) => self.session.debug_clear_bottom_row(),
            ScriptStep::Debug(DebugCommand::PassThrough) => self.session.queue_pass_through_piece(),
            ScriptStep::Debug(DebugCommand::StartAtLevel(level)) => self.session.debug_start_at_level(level),
        };
        self.record(events);
    }
}

/// Run a script from a fresh session
pub fn run_script(script: &Script) -> Result<ScriptReport> {
    if script.frame_ms == 0 {
        return Err(anyhow!("frame_ms must be positive"));
    }

    let mut config = script.config.clone().unwrap_or_default();
    if let Some(level) = script.start_level {
        config.start_level = level;
    }
    let session = GameSession::new(config, script.seed).context("build session")?;

    let mut runner = Runner {
        session,
        clock_ms: 0,
        frame_ms: script.frame_ms,
        events: Vec::new(),
    };
    for &step in &script.steps {
        runner.step(step);
    }

    Ok(ScriptReport {
        seed: script.seed,
        elapsed_ms: runner.clock_ms,
        snapshot: runner.session.snapshot(),
        events: runner.events,
    })
}
