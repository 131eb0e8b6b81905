//! # Pomohabit Core Library
//!
//! This library provides the core logic for Pomohabit, a Pomodoro timer
//! that logs finished work sessions and daily notes per habit. The CLI is a
//! thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Session timer**: A tick-driven work/break state machine; the caller
//!   delivers ticks, nothing runs in the background
//! - **Timer registry**: At most one timer per habit, tick subscriptions, and
//!   crediting finished work phases to today's record
//! - **Habit repository**: The habit collection, same-day aggregation, and
//!   write-through persistence of the whole collection as one blob
//! - **Storage**: SQLite key-value store and TOML configuration
//!
//! ## Key Components
//!
//! - [`SessionTimer`]: Core timer state machine
//! - [`TimerRegistry`]: Per-habit timer lifecycle
//! - [`HabitRepository`]: Habit records and daily statistics
//! - [`Database`]: SQLite-backed [`PersistenceGateway`]
//! - [`ChangeNotifier`]: Coalesced change signal for presentation layers

pub mod clock;
pub mod error;
pub mod events;
pub mod habits;
pub mod notify;
pub mod storage;
pub mod timer;

pub use clock::{same_day, Clock, DayCalendar, ManualClock, SystemClock};
pub use error::{ConfigError, StorageError};
pub use events::Event;
pub use habits::{DailyRecord, DailySummary, Habit, HabitId, HabitNote, HabitRepository, SessionLedger};
pub use notify::{ChangeNotifier, NotifyBatch};
pub use storage::{Config, Database, MemoryGateway, PersistenceGateway};
pub use timer::{IntervalTicks, ManualTicks, Phase, SessionTimer, TickSource, TickSubscription, TimerRegistry};
