use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Length of a work phase in seconds.
pub const WORK_SECS: u64 = 25 * 60;
/// Length of a break phase in seconds.
pub const BREAK_SECS: u64 = 5 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Work,
    Break,
}

impl Phase {
    pub fn duration_secs(self) -> u64 {
        match self {
            Phase::Work => WORK_SECS,
            Phase::Break => BREAK_SECS,
        }
    }

    pub fn duration(self) -> Duration {
        Duration::from_secs(self.duration_secs())
    }

    /// The phase that follows this one.
    pub fn toggled(self) -> Phase {
        match self {
            Phase::Work => Phase::Break,
            Phase::Break => Phase::Work,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Work => "Work Time",
            Phase::Break => "Break Time",
        }
    }
}
