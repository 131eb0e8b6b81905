use serde::{Deserialize, Serialize};

use crate::timer::Phase;

/// Every timer command that changes state produces an Event.
/// The CLI prints them; the registry inspects them to credit sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        phase: Phase,
        remaining_secs: u64,
    },
    TimerPaused {
        remaining_secs: u64,
    },
    TimerReset {
        phase: Phase,
        remaining_secs: u64,
    },
    /// A phase ran out (or was skipped) and the timer flipped to the other one.
    PhaseCompleted {
        from: Phase,
        to: Phase,
    },
    /// The timer was removed from the registry; its progress is gone.
    TimerStopped {
        phase: Phase,
        remaining_secs: u64,
    },
    StateSnapshot {
        phase: Phase,
        running: bool,
        remaining_secs: u64,
        total_secs: u64,
        display: String,
    },
}

impl Event {
    /// True for the Work to Break edge, the only one that earns a session.
    pub fn credits_session(&self) -> bool {
        matches!(
            self,
            Event::PhaseCompleted {
                from: Phase::Work,
                to: Phase::Break,
            }
        )
    }
}
