//! Run lifecycle state machine.
//!
//! ```text
//!   Idle ──open──▶ Loading ──started──▶ Running ◀──resume── Paused
//!                    ▲                    │  └────pause────▶   │
//!   Done/Errored ─open/restart            └───stop──▶ Stopping ◀┘
//!                                                       │
//!                                         halted ──▶  Done
//! ```
//!
//! Requests that do not fit the current state are no-ops, not errors: they
//! return no effects and leave the state alone. Opening a program while one
//! runs stores a single continuation and stops the run; the continuation is
//! consumed exactly once, by the next `halted` event.

#[cfg(test)]
#[path = "lifecycle_test.rs"]
mod lifecycle_test;

use std::path::Path;

use serde::Serialize;

use crate::command::Request;
use crate::consts::{DONE_LABEL, NO_PROGRAM_LABEL};
use crate::engine::Effect;

/// Where the current run stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    #[default]
    Idle,
    Loading,
    Running,
    Paused,
    Stopping,
    Done,
    Errored,
}

impl RunState {
    /// A run exists that the engine may still be executing.
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Loading | Self::Running | Self::Paused | Self::Stopping)
    }
}

/// Who asked for a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCause {
    /// The user pressed stop; only valid while running or paused.
    User,
    /// The scene hit a protocol violation or resource failure; also valid
    /// while loading.
    Forced,
}

/// What an open request should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenDecision {
    /// Load immediately.
    Proceed,
    /// Stop the current run; the open resumes on `halted`.
    StopFirst,
    /// Ignore the request.
    Rejected,
}

/// Run lifecycle plus the bits of display state that follow it.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    state: RunState,
    current_file: Option<String>,
    pending_open: Option<String>,
    time_label: String,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self {
            state: RunState::Idle,
            current_file: None,
            pending_open: None,
            time_label: NO_PROGRAM_LABEL.to_owned(),
        }
    }
}

impl Lifecycle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Program most recently opened, if any.
    #[must_use]
    pub fn current_file(&self) -> Option<&str> {
        self.current_file.as_deref()
    }

    /// Run-time label for the status bar.
    #[must_use]
    pub fn time_label(&self) -> &str {
        &self.time_label
    }

    /// Whether an open is waiting for the current run to halt.
    #[must_use]
    pub fn has_pending_open(&self) -> bool {
        self.pending_open.is_some()
    }

    /// Pointer observations are only meaningful while the run is live.
    #[must_use]
    pub fn accepts_observations(&self) -> bool {
        self.state == RunState::Running
    }

    // --- User requests ---

    /// Decide how to handle opening `pathname`. On [`OpenDecision::StopFirst`]
    /// the path is stored as the continuation; the caller issues the stop.
    pub fn request_open(&mut self, pathname: &str) -> OpenDecision {
        match self.state {
            RunState::Stopping | RunState::Loading => OpenDecision::Rejected,
            RunState::Running | RunState::Paused => {
                self.pending_open = Some(pathname.to_owned());
                OpenDecision::StopFirst
            }
            RunState::Idle | RunState::Done | RunState::Errored => OpenDecision::Proceed,
        }
    }

    /// Program to reload on restart, if restarting is allowed now.
    #[must_use]
    pub fn restart_target(&self) -> Option<String> {
        if self.state.is_active() {
            return None;
        }
        self.current_file.clone()
    }

    /// Enter `Loading` for `pathname`. The caller must have cleared the
    /// scene in the same step.
    pub fn begin_load(&mut self, pathname: &str, restart: bool) -> Vec<Effect> {
        let name = display_name(pathname);
        self.state = RunState::Loading;
        self.current_file = Some(pathname.to_owned());
        self.time_label = format!("Loading {name}");
        let verb = if restart { "Restarting" } else { "Starting" };
        vec![
            Effect::Send(Request::Start { pathname: pathname.to_owned() }),
            Effect::Log(format!("{verb} {name}")),
        ]
    }

    pub fn pause(&mut self) -> Vec<Effect> {
        if self.state != RunState::Running {
            return Vec::new();
        }
        self.state = RunState::Paused;
        vec![
            Effect::Send(Request::Pause),
            Effect::Log("Pausing LPS program execution...".into()),
        ]
    }

    pub fn resume(&mut self) -> Vec<Effect> {
        if self.state != RunState::Paused {
            return Vec::new();
        }
        self.state = RunState::Running;
        vec![
            Effect::Send(Request::Unpause),
            Effect::Log("Resuming LPS program execution...".into()),
        ]
    }

    /// Ask the engine to halt. Repeated calls are harmless: once stopping,
    /// further stops do nothing.
    pub fn stop(&mut self, cause: StopCause) -> Vec<Effect> {
        let allowed = match cause {
            StopCause::User => matches!(self.state, RunState::Running | RunState::Paused),
            StopCause::Forced => matches!(self.state, RunState::Loading | RunState::Running | RunState::Paused),
        };
        if !allowed {
            return Vec::new();
        }
        self.state = RunState::Stopping;
        vec![
            Effect::Send(Request::Halt),
            Effect::Log("Stopping LPS program execution...".into()),
        ]
    }

    // --- Engine events ---

    /// The engine started the program. Returns whether the run went live.
    pub fn on_started(&mut self) -> bool {
        if self.state != RunState::Loading {
            return false;
        }
        self.state = RunState::Running;
        true
    }

    /// The engine halted. Returns the log effects and, if an open was
    /// waiting on this halt, the path to open now.
    pub fn on_halted(&mut self) -> (Vec<Effect>, Option<String>) {
        let continuation = self.pending_open.take();
        let effects = match self.state {
            RunState::Loading | RunState::Running | RunState::Paused | RunState::Stopping => {
                self.state = RunState::Done;
                self.time_label = DONE_LABEL.to_owned();
                vec![Effect::Log("LPS Program execution complete".into())]
            }
            RunState::Idle | RunState::Done | RunState::Errored => Vec::new(),
        };
        (effects, continuation)
    }

    /// The engine reported an error. An active run ends in `Errored`. The
    /// engine is told to halt unless a halt is already in flight.
    pub fn on_error(&mut self, message: &str) -> Vec<Effect> {
        let mut effects = vec![Effect::Log(format!("Error: {message}")), Effect::RevealConsole];
        if matches!(self.state, RunState::Loading | RunState::Running | RunState::Paused) {
            effects.push(Effect::Send(Request::Halt));
        }
        if self.state.is_active() {
            self.state = RunState::Errored;
        }
        effects
    }

    /// Record the engine's latest run time for display.
    pub fn set_time(&mut self, label: String) {
        self.time_label = label;
    }
}

/// Final path component, falling back to the whole path.
fn display_name(pathname: &str) -> String {
    Path::new(pathname)
        .file_name()
        .map_or_else(|| pathname.to_owned(), |n| n.to_string_lossy().into_owned())
}
