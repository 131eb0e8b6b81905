//! In-memory habit collection with write-through persistence.
//!
//! Every mutation rewrites the whole collection through the
//! [`PersistenceGateway`] before returning, then emits one change
//! notification. Lookups by an unknown id are no-ops.

use chrono::{DateTime, Utc};
use tracing::{debug, error, warn};

use super::codec::{decode_habits, encode_habits};
use super::model::{DailySummary, Habit, HabitId, HabitNote};
use crate::clock::{Clock, DayCalendar};
use crate::error::StorageError;
use crate::notify::ChangeNotifier;
use crate::storage::PersistenceGateway;

/// Something that can be credited with a finished work session.
pub trait SessionLedger {
    fn record_completed_session(&mut self, habit_id: &HabitId);
}

pub struct HabitRepository {
    habits: Vec<Habit>,
    gateway: Box<dyn PersistenceGateway>,
    clock: Box<dyn Clock>,
    calendar: DayCalendar,
    notifier: ChangeNotifier,
    last_persist_error: Option<StorageError>,
}

impl HabitRepository {
    /// Load the collection from `gateway`.
    ///
    /// A missing blob gives an empty collection. An unreadable or
    /// undecodable blob also gives an empty collection; the error is
    /// returned alongside so the caller can report it.
    pub fn open(
        gateway: Box<dyn PersistenceGateway>,
        clock: Box<dyn Clock>,
        calendar: DayCalendar,
        notifier: ChangeNotifier,
    ) -> (Self, Option<StorageError>) {
        let (habits, load_error) = match gateway.load().and_then(|blob| match blob {
            Some(bytes) => decode_habits(&bytes),
            None => Ok(Vec::new()),
        }) {
            Ok(habits) => (habits, None),
            Err(e) => {
                warn!(error = %e, "could not load habits, starting empty");
                (Vec::new(), Some(e))
            }
        };
        debug!(count = habits.len(), "habit repository opened");

        let repository = Self {
            habits,
            gateway,
            clock,
            calendar,
            notifier,
            last_persist_error: None,
        };
        (repository, load_error)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn get(&self, id: &HabitId) -> Option<&Habit> {
        self.habits.iter().find(|h| &h.id == id)
    }

    pub fn calendar(&self) -> DayCalendar {
        self.calendar
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    /// The most recent write failure, if the last write failed.
    pub fn last_persist_error(&self) -> Option<&StorageError> {
        self.last_persist_error.as_ref()
    }

    pub fn todays_total_sessions(&self) -> u32 {
        let now = self.now();
        self.habits
            .iter()
            .map(|h| h.sessions_on(now, &self.calendar))
            .sum()
    }

    pub fn todays_habits_touched(&self) -> usize {
        let now = self.now();
        self.habits
            .iter()
            .filter(|h| h.record_on(now, &self.calendar).is_some())
            .count()
    }

    pub fn todays_notes(&self) -> Vec<String> {
        self.todays_notes_with_habit()
            .into_iter()
            .map(|n| n.note)
            .collect()
    }

    pub fn todays_notes_with_habit(&self) -> Vec<HabitNote> {
        let now = self.now();
        self.habits
            .iter()
            .filter_map(|habit| {
                let record = habit.record_on(now, &self.calendar)?;
                if record.notes.is_empty() {
                    return None;
                }
                Some(HabitNote {
                    habit_id: habit.id,
                    habit_title: habit.title.clone(),
                    note: record.notes.clone(),
                })
            })
            .collect()
    }

    pub fn todays_sessions_for(&self, id: &HabitId) -> u32 {
        let now = self.now();
        self.get(id)
            .map(|h| h.sessions_on(now, &self.calendar))
            .unwrap_or(0)
    }

    /// Today's note for one habit, empty when there is none.
    pub fn todays_note_for(&self, id: &HabitId) -> String {
        let now = self.now();
        self.get(id)
            .and_then(|h| h.record_on(now, &self.calendar))
            .map(|r| r.notes.clone())
            .unwrap_or_default()
    }

    pub fn todays_summary(&self) -> DailySummary {
        DailySummary {
            total_sessions: self.todays_total_sessions(),
            habits_touched: self.todays_habits_touched(),
            notes: self.todays_notes_with_habit(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn add(&mut self, title: impl Into<String>, description: impl Into<String>) -> HabitId {
        let habit = Habit::new(title, description, self.now());
        let id = habit.id;
        debug!(habit = %id, title = %habit.title, "adding habit");
        self.habits.push(habit);
        self.persist();
        self.notifier.notify();
        id
    }

    /// Replace the stored habit with the same id. Unknown ids are ignored.
    pub fn update(&mut self, habit: Habit) {
        let Some(slot) = self.habits.iter_mut().find(|h| h.id == habit.id) else {
            debug!(habit = %habit.id, "update for unknown habit ignored");
            return;
        };
        *slot = habit;
        self.persist();
        self.notifier.notify();
    }

    pub fn delete(&mut self, id: &HabitId) {
        let before = self.habits.len();
        self.habits.retain(|h| &h.id != id);
        if self.habits.len() == before {
            debug!(habit = %id, "delete for unknown habit ignored");
            return;
        }
        self.persist();
        self.notifier.notify();
    }

    pub fn record_completed_session(&mut self, id: &HabitId) {
        let now = self.now();
        let calendar = self.calendar;
        self.modify_habit(id, |habit| {
            habit.record_on_or_insert(now, &calendar).completed_sessions += 1;
        });
    }

    /// Overwrite today's note for a habit.
    pub fn set_note(&mut self, id: &HabitId, text: impl Into<String>) {
        let now = self.now();
        let calendar = self.calendar;
        let text = text.into();
        self.modify_habit(id, move |habit| {
            habit.record_on_or_insert(now, &calendar).notes = text;
        });
    }

    /// Empty today's note. Does nothing if the habit has no record today.
    pub fn clear_note(&mut self, id: &HabitId) {
        let now = self.now();
        let has_record = self
            .get(id)
            .is_some_and(|h| h.record_on(now, &self.calendar).is_some());
        if !has_record {
            debug!(habit = %id, "no record today, nothing to clear");
            return;
        }
        let calendar = self.calendar;
        self.modify_habit(id, |habit| {
            if let Some(record) = habit.record_on_mut(now, &calendar) {
                record.notes.clear();
            }
        });
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Edit a copy of the habit and store it back through `update`.
    fn modify_habit(&mut self, id: &HabitId, edit: impl FnOnce(&mut Habit)) {
        let Some(mut habit) = self.get(id).cloned() else {
            debug!(habit = %id, "unknown habit ignored");
            return;
        };
        edit(&mut habit);
        self.update(habit);
    }

    fn persist(&mut self) {
        let result = encode_habits(&self.habits).and_then(|bytes| self.gateway.save(&bytes));
        match result {
            Ok(()) => self.last_persist_error = None,
            Err(e) => {
                error!(error = %e, "failed to persist habits");
                self.last_persist_error = Some(e);
            }
        }
    }
}

impl SessionLedger for HabitRepository {
    fn record_completed_session(&mut self, habit_id: &HabitId) {
        HabitRepository::record_completed_session(self, habit_id);
    }
}
