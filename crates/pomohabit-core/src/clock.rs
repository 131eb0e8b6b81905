//! Wall-clock access and calendar-day arithmetic.
//!
//! Everything that asks "what is today?" goes through a [`Clock`] and an
//! explicit [`DayCalendar`]. Nothing here reads ambient locale state except
//! [`DayCalendar::Local`], which the caller has to opt into.

use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc};

use crate::error::ConfigError;

/// Source of the current wall-clock time.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same instant, so a test can keep one handle and hand
/// another to the repository.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        *self.lock() = at;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.lock();
        *now += by;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        // A poisoned clock still holds a valid instant.
        self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.lock()
    }
}

/// The calendar used to decide which day an instant belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayCalendar {
    /// The host's local timezone.
    #[default]
    Local,
    /// A fixed UTC offset.
    Fixed(FixedOffset),
}

impl DayCalendar {
    pub fn utc() -> Self {
        DayCalendar::Fixed(Utc.fix())
    }

    /// Parse `"local"`, `"utc"`, or an offset such as `"+09:00"` / `"-0530"`.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        let trimmed = value.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "local" => return Ok(DayCalendar::Local),
            "utc" | "z" => return Ok(DayCalendar::utc()),
            _ => {}
        }
        parse_offset(trimmed)
            .map(DayCalendar::Fixed)
            .ok_or_else(|| ConfigError::InvalidValue {
                key: "calendar.utc_offset".into(),
                message: format!("expected \"local\", \"utc\" or +HH:MM, got '{value}'"),
            })
    }

    /// The calendar day containing `at`.
    pub fn day_of(&self, at: DateTime<Utc>) -> NaiveDate {
        match self {
            DayCalendar::Local => at.with_timezone(&chrono::Local).date_naive(),
            DayCalendar::Fixed(offset) => at.with_timezone(offset).date_naive(),
        }
    }

    /// The first instant of the day containing `at`.
    pub fn start_of_day(&self, at: DateTime<Utc>) -> DateTime<Utc> {
        let midnight = self.day_of(at).and_time(NaiveTime::MIN);
        let start = match self {
            DayCalendar::Local => chrono::Local
                .from_local_datetime(&midnight)
                .earliest()
                .map(|d| d.with_timezone(&Utc)),
            DayCalendar::Fixed(offset) => offset
                .from_local_datetime(&midnight)
                .earliest()
                .map(|d| d.with_timezone(&Utc)),
        };
        // Midnight can fall inside a DST gap; the instant itself is then the best answer.
        start.unwrap_or(at)
    }
}

impl fmt::Display for DayCalendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayCalendar::Local => write!(f, "local"),
            DayCalendar::Fixed(offset) => write!(f, "{offset}"),
        }
    }
}

/// Whether two instants fall on the same calendar day.
pub fn same_day(a: DateTime<Utc>, b: DateTime<Utc>, calendar: &DayCalendar) -> bool {
    calendar.day_of(a) == calendar.day_of(b)
}

fn parse_offset(value: &str) -> Option<FixedOffset> {
    let (sign, rest) = match value.as_bytes().first().copied()? {
        b'+' => (1, &value[1..]),
        b'-' => (-1, &value[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
