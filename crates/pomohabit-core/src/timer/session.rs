//! Work/break countdown.
//!
//! The session timer is a tick-driven state machine. It does not own a
//! thread or a subscription - whoever holds it calls `tick()` once per
//! elapsed second while it runs.
//!
//! ## State Transitions
//!
//! ```text
//! (Work | Break) x (Running | Paused)
//!
//! start/pause        flip Running
//! tick to zero, skip flip phase, refill, force Paused
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = SessionTimer::new();
//! timer.start();
//! // once per second:
//! if let Some(event) = timer.tick() { /* phase completed */ }
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::phase::Phase;
use crate::events::Event;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTimer {
    phase: Phase,
    /// Always within `0..=phase.duration_secs()`.
    remaining_secs: u64,
    running: bool,
}

impl SessionTimer {
    /// A paused timer at the start of a full work phase.
    pub fn new() -> Self {
        Self {
            phase: Phase::Work,
            remaining_secs: Phase::Work.duration_secs(),
            running: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn remaining(&self) -> Duration {
        Duration::from_secs(self.remaining_secs)
    }

    pub fn total_secs(&self) -> u64 {
        self.phase.duration_secs()
    }

    /// Remaining time as `MM:SS`.
    pub fn formatted_remaining(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.remaining_secs / 60,
            self.remaining_secs % 60
        )
    }

    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            phase: self.phase,
            running: self.running,
            remaining_secs: self.remaining_secs,
            total_secs: self.total_secs(),
            display: self.formatted_remaining(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        if self.running {
            return None;
        }
        self.running = true;
        Some(Event::TimerStarted {
            phase: self.phase,
            remaining_secs: self.remaining_secs,
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if !self.running {
            return None;
        }
        self.running = false;
        Some(Event::TimerPaused {
            remaining_secs: self.remaining_secs,
        })
    }

    pub fn reset(&mut self) -> Option<Event> {
        self.running = false;
        self.remaining_secs = self.phase.duration_secs();
        Some(Event::TimerReset {
            phase: self.phase,
            remaining_secs: self.remaining_secs,
        })
    }

    /// Finish the current phase now, exactly as if the countdown ran out.
    pub fn skip(&mut self) -> Option<Event> {
        Some(self.complete_phase())
    }

    /// One elapsed second. Returns `Some(Event::PhaseCompleted)` when the
    /// countdown reaches zero. Ignored while paused.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.running {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            return Some(self.complete_phase());
        }
        None
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete_phase(&mut self) -> Event {
        let from = self.phase;
        self.running = false;
        self.phase = from.toggled();
        self.remaining_secs = self.phase.duration_secs();
        Event::PhaseCompleted {
            from,
            to: self.phase,
        }
    }
}

impl Default for SessionTimer {
    fn default() -> Self {
        Self::new()
    }
}
