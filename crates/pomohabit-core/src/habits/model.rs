use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::{same_day, DayCalendar};

/// Unique identifier of a habit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HabitId(Uuid);

impl HabitId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for HabitId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for HabitId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Sessions and note for one habit on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRecord {
    /// Start of the day this record covers.
    pub date: DateTime<Utc>,
    pub completed_sessions: u32,
    /// Empty means "no note".
    #[serde(default)]
    pub notes: String,
}

impl DailyRecord {
    pub fn new(date: DateTime<Utc>) -> Self {
        Self {
            date,
            completed_sessions: 0,
            notes: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: HabitId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
    /// First-touch order, at most one entry per calendar day.
    #[serde(default)]
    pub daily_pomodoros: Vec<DailyRecord>,
}

impl Habit {
    pub fn new(title: impl Into<String>, description: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: HabitId::new(),
            title: title.into(),
            description: description.into(),
            created_at,
            daily_pomodoros: Vec::new(),
        }
    }

    /// The record for the day containing `at`, if any.
    pub fn record_on(&self, at: DateTime<Utc>, calendar: &DayCalendar) -> Option<&DailyRecord> {
        self.daily_pomodoros
            .iter()
            .find(|r| same_day(r.date, at, calendar))
    }

    pub fn record_on_mut(
        &mut self,
        at: DateTime<Utc>,
        calendar: &DayCalendar,
    ) -> Option<&mut DailyRecord> {
        self.daily_pomodoros
            .iter_mut()
            .find(|r| same_day(r.date, at, calendar))
    }

    /// The record for the day containing `at`, appended if missing.
    pub fn record_on_or_insert(
        &mut self,
        at: DateTime<Utc>,
        calendar: &DayCalendar,
    ) -> &mut DailyRecord {
        let index = match self
            .daily_pomodoros
            .iter()
            .position(|r| same_day(r.date, at, calendar))
        {
            Some(index) => index,
            None => {
                self.daily_pomodoros
                    .push(DailyRecord::new(calendar.start_of_day(at)));
                self.daily_pomodoros.len() - 1
            }
        };
        &mut self.daily_pomodoros[index]
    }

    /// Completed sessions on the day containing `at`.
    pub fn sessions_on(&self, at: DateTime<Utc>, calendar: &DayCalendar) -> u32 {
        self.record_on(at, calendar)
            .map(|r| r.completed_sessions)
            .unwrap_or(0)
    }
}

/// A non-empty note paired with the habit it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitNote {
    pub habit_id: HabitId,
    pub habit_title: String,
    pub note: String,
}

/// Same-day aggregate across all habits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySummary {
    pub total_sessions: u32,
    pub habits_touched: usize,
    pub notes: Vec<HabitNote>,
}
