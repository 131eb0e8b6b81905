mod phase;
mod registry;
mod session;
mod ticks;

pub use phase::{Phase, BREAK_SECS, WORK_SECS};
pub use registry::{TimerRegistry, TICK_INTERVAL};
pub use session::SessionTimer;
pub use ticks::{IntervalTicks, ManualTicks, TickSource, TickSubscription};
