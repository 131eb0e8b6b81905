mod codec;
mod model;
mod repository;

pub use codec::{decode_habits, encode_habits};
pub use model::{DailyRecord, DailySummary, Habit, HabitId, HabitNote};
pub use repository::{HabitRepository, SessionLedger};
