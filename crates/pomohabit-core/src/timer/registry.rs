//! Per-habit timer lifecycle.
//!
//! The registry keeps at most one [`SessionTimer`] per habit, owns the tick
//! subscription behind each running timer, and credits a finished work phase
//! to the habit through a [`SessionLedger`]. Each public command emits exactly
//! one change notification, however many nested changes it caused.

use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

use super::session::SessionTimer;
use super::ticks::{IntervalTicks, TickSource, TickSubscription};
use crate::events::Event;
use crate::habits::{HabitId, SessionLedger};
use crate::notify::ChangeNotifier;

/// Tick period of a running timer.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug)]
struct LiveTimer {
    timer: SessionTimer,
    subscription: Option<TickSubscription>,
}

pub struct TimerRegistry<T: TickSource = IntervalTicks> {
    timers: HashMap<HabitId, LiveTimer>,
    routes: HashMap<TickSubscription, HabitId>,
    ticks: T,
    notifier: ChangeNotifier,
}

impl<T: TickSource> TimerRegistry<T> {
    pub fn new(ticks: T, notifier: ChangeNotifier) -> Self {
        Self {
            timers: HashMap::new(),
            routes: HashMap::new(),
            ticks,
            notifier,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn timer_for(&self, habit: &HabitId) -> Option<&SessionTimer> {
        self.timers.get(habit).map(|live| &live.timer)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn subscription_for(&self, habit: &HabitId) -> Option<TickSubscription> {
        self.timers.get(habit).and_then(|live| live.subscription)
    }

    pub fn ticks(&self) -> &T {
        &self.ticks
    }

    pub fn ticks_mut(&mut self) -> &mut T {
        &mut self.ticks
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start (or resume) the habit's timer, creating a fresh work phase if
    /// the habit has none.
    pub fn start_for(&mut self, habit: &HabitId) -> Option<Event> {
        let _batch = self.notifier.batch();
        let live = self.timers.entry(*habit).or_insert_with(|| {
            debug!(habit = %habit, "creating timer");
            LiveTimer {
                timer: SessionTimer::new(),
                subscription: None,
            }
        });
        let event = live.timer.start();
        if event.is_some() {
            // Never leave an older subscription behind: one timer, one tick stream.
            if let Some(old) = live.subscription.take() {
                self.ticks.cancel(old);
                self.routes.remove(&old);
            }
            let subscription = self.ticks.subscribe(TICK_INTERVAL);
            live.subscription = Some(subscription);
            self.routes.insert(subscription, *habit);
        }
        self.notifier.notify();
        event
    }

    pub fn pause_for(&mut self, habit: &HabitId) -> Option<Event> {
        let _batch = self.notifier.batch();
        let event = self.with_timer(habit, SessionTimer::pause)?;
        self.release(habit);
        self.notifier.notify();
        Some(event)
    }

    pub fn reset_for(&mut self, habit: &HabitId) -> Option<Event> {
        let _batch = self.notifier.batch();
        let event = self.with_timer(habit, SessionTimer::reset)?;
        self.release(habit);
        self.notifier.notify();
        Some(event)
    }

    /// Pause and forget the habit's timer. The next start begins a new
    /// work phase from the top.
    pub fn stop_for(&mut self, habit: &HabitId) -> Option<Event> {
        let _batch = self.notifier.batch();
        self.release(habit);
        let Some(mut live) = self.timers.remove(habit) else {
            debug!(habit = %habit, "stop for habit without timer ignored");
            return None;
        };
        live.timer.pause();
        self.notifier.notify();
        Some(Event::TimerStopped {
            phase: live.timer.phase(),
            remaining_secs: live.timer.remaining_secs(),
        })
    }

    /// Complete the current phase now. Skipping a work phase earns a
    /// session; skipping a break does not.
    pub fn skip_for(&mut self, habit: &HabitId, ledger: &mut impl SessionLedger) -> Option<Event> {
        let _batch = self.notifier.batch();
        let event = self.with_timer(habit, SessionTimer::skip)?;
        self.settle(habit, &event, ledger);
        self.notifier.notify();
        Some(event)
    }

    /// Deliver one tick to whichever timer owns `subscription`.
    /// Stale subscriptions are ignored.
    pub fn on_tick(
        &mut self,
        subscription: TickSubscription,
        ledger: &mut impl SessionLedger,
    ) -> Option<Event> {
        let habit = *self.routes.get(&subscription)?;
        self.tick_for(&habit, ledger)
    }

    /// Deliver one tick to the habit's timer. Returns the phase completion
    /// if this tick finished the phase.
    pub fn tick_for(&mut self, habit: &HabitId, ledger: &mut impl SessionLedger) -> Option<Event> {
        let live = self.timers.get_mut(habit)?;
        if !live.timer.is_running() {
            return None;
        }
        let _batch = self.notifier.batch();
        let event = live.timer.tick();
        if let Some(event) = &event {
            self.settle(habit, event, ledger);
        }
        self.notifier.notify();
        event
    }

    /// Route every due tick from the tick source. Returns the phase
    /// completions that happened, in delivery order.
    /// Observers see one notification per call, however many ticks were due.
    pub fn pump(&mut self, ledger: &mut impl SessionLedger) -> Vec<Event> {
        let _batch = self.notifier.batch();
        let due = self.ticks.due();
        due.into_iter()
            .filter_map(|subscription| self.on_tick(subscription, ledger))
            .collect()
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn with_timer(
        &mut self,
        habit: &HabitId,
        command: impl FnOnce(&mut SessionTimer) -> Option<Event>,
    ) -> Option<Event> {
        let Some(live) = self.timers.get_mut(habit) else {
            debug!(habit = %habit, "no timer for habit");
            return None;
        };
        command(&mut live.timer)
    }

    /// After a phase completion: the timer is paused, so drop its
    /// subscription, and credit the habit for a finished work phase.
    fn settle(&mut self, habit: &HabitId, event: &Event, ledger: &mut impl SessionLedger) {
        self.release(habit);
        if event.credits_session() {
            debug!(habit = %habit, "work phase finished, crediting session");
            ledger.record_completed_session(habit);
        }
    }

    fn release(&mut self, habit: &HabitId) {
        if let Some(subscription) = self
            .timers
            .get_mut(habit)
            .and_then(|live| live.subscription.take())
        {
            self.ticks.cancel(subscription);
            self.routes.remove(&subscription);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::phase::{Phase, BREAK_SECS, WORK_SECS};
    use crate::timer::ticks::ManualTicks;

    #[derive(Default)]
    struct CountingLedger {
        credits: Vec<HabitId>,
    }

    impl SessionLedger for CountingLedger {
        fn record_completed_session(&mut self, habit_id: &HabitId) {
            self.credits.push(*habit_id);
        }
    }

    fn registry() -> (TimerRegistry<ManualTicks>, ChangeNotifier) {
        let notifier = ChangeNotifier::new();
        (TimerRegistry::new(ManualTicks::new(), notifier.clone()), notifier)
    }

    #[test]
    fn start_creates_running_work_timer() {
        let (mut reg, notifier) = registry();
        let habit = HabitId::new();
        assert!(reg.timer_for(&habit).is_none());

        reg.start_for(&habit);
        let timer = reg.timer_for(&habit).unwrap();
        assert!(timer.is_running());
        assert_eq!(timer.phase(), Phase::Work);
        assert_eq!(timer.remaining_secs(), WORK_SECS);
        assert_eq!(notifier.version(), 1);
        assert_eq!(reg.ticks().live_count(), 1);
    }

    #[test]
    fn repeated_start_keeps_single_subscription() {
        let (mut reg, _) = registry();
        let mut ledger = CountingLedger::default();
        let habit = HabitId::new();
        reg.start_for(&habit);
        reg.start_for(&habit);
        reg.pause_for(&habit);
        reg.start_for(&habit);
        assert_eq!(reg.ticks().live_count(), 1);

        reg.ticks_mut().advance(Duration::from_secs(3));
        reg.pump(&mut ledger);
        assert_eq!(reg.timer_for(&habit).unwrap().remaining_secs(), WORK_SECS - 3);
    }

    #[test]
    fn pause_drops_subscription_and_freezes_countdown() {
        let (mut reg, _) = registry();
        let mut ledger = CountingLedger::default();
        let habit = HabitId::new();
        reg.start_for(&habit);
        reg.ticks_mut().advance(Duration::from_secs(5));
        reg.pump(&mut ledger);
        reg.pause_for(&habit);
        assert_eq!(reg.ticks().live_count(), 0);

        reg.ticks_mut().advance(Duration::from_secs(5));
        reg.pump(&mut ledger);
        assert!(reg.tick_for(&habit, &mut ledger).is_none());
        assert_eq!(reg.timer_for(&habit).unwrap().remaining_secs(), WORK_SECS - 5);
    }

    #[test]
    fn work_completion_credits_once() {
        let (mut reg, notifier) = registry();
        let mut ledger = CountingLedger::default();
        let habit = HabitId::new();
        reg.start_for(&habit);

        // Far more time than one phase: the timer pauses on completion,
        // so the surplus catch-up ticks must be dropped.
        reg.ticks_mut().advance(Duration::from_secs(WORK_SECS + 100));
        let before = notifier.version();
        let completions = reg.pump(&mut ledger);

        assert_eq!(completions.len(), 1);
        assert_eq!(ledger.credits, vec![habit]);
        let timer = reg.timer_for(&habit).unwrap();
        assert_eq!(timer.phase(), Phase::Break);
        assert_eq!(timer.remaining_secs(), BREAK_SECS);
        assert!(!timer.is_running());
        assert_eq!(reg.ticks().live_count(), 0);
        assert_eq!(notifier.version(), before + 1);
    }

    #[test]
    fn late_poll_notifies_once() {
        let (mut reg, notifier) = registry();
        let mut ledger = CountingLedger::default();
        let habit = HabitId::new();
        reg.start_for(&habit);

        reg.ticks_mut().advance(Duration::from_secs(10));
        let before = notifier.version();
        assert!(reg.pump(&mut ledger).is_empty());
        assert_eq!(notifier.version(), before + 1);
        assert_eq!(reg.timer_for(&habit).unwrap().remaining_secs(), WORK_SECS - 10);

        // Nothing due, nothing changed.
        reg.pump(&mut ledger);
        assert_eq!(notifier.version(), before + 1);
    }

    #[test]
    fn break_completion_does_not_credit() {
        let (mut reg, _) = registry();
        let mut ledger = CountingLedger::default();
        let habit = HabitId::new();
        reg.start_for(&habit);
        reg.skip_for(&habit, &mut ledger);
        assert_eq!(ledger.credits.len(), 1);

        reg.start_for(&habit);
        for _ in 0..BREAK_SECS {
            reg.tick_for(&habit, &mut ledger);
        }
        reg.start_for(&habit);
        reg.skip_for(&habit, &mut ledger);
        assert_eq!(ledger.credits.len(), 2);

        reg.skip_for(&habit, &mut ledger);
        assert_eq!(ledger.credits.len(), 2, "skipping a break earns nothing");
    }

    #[test]
    fn stop_discards_progress() {
        let (mut reg, _) = registry();
        let mut ledger = CountingLedger::default();
        let habit = HabitId::new();
        reg.start_for(&habit);
        for _ in 0..120 {
            reg.tick_for(&habit, &mut ledger);
        }
        let stopped = reg.stop_for(&habit).unwrap();
        assert_eq!(
            stopped,
            Event::TimerStopped {
                phase: Phase::Work,
                remaining_secs: WORK_SECS - 120
            }
        );
        assert!(reg.timer_for(&habit).is_none());
        assert_eq!(reg.ticks().live_count(), 0);

        reg.start_for(&habit);
        assert_eq!(reg.timer_for(&habit).unwrap().remaining_secs(), WORK_SECS);
    }

    #[test]
    fn stop_unknown_is_silent() {
        let (mut reg, notifier) = registry();
        assert!(reg.stop_for(&HabitId::new()).is_none());
        assert!(reg.pause_for(&HabitId::new()).is_none());
        assert!(reg.reset_for(&HabitId::new()).is_none());
        assert_eq!(notifier.version(), 0);
    }

    #[test]
    fn reset_refills_and_pauses() {
        let (mut reg, _) = registry();
        let mut ledger = CountingLedger::default();
        let habit = HabitId::new();
        reg.start_for(&habit);
        reg.tick_for(&habit, &mut ledger);
        reg.reset_for(&habit);
        let timer = reg.timer_for(&habit).unwrap();
        assert!(!timer.is_running());
        assert_eq!(timer.remaining_secs(), WORK_SECS);
        assert!(reg.subscription_for(&habit).is_none());
    }

    #[test]
    fn timers_are_independent() {
        let (mut reg, _) = registry();
        let mut ledger = CountingLedger::default();
        let a = HabitId::new();
        let b = HabitId::new();
        reg.start_for(&a);
        reg.start_for(&b);
        for _ in 0..30 {
            reg.tick_for(&a, &mut ledger);
        }
        assert_eq!(reg.timer_for(&a).unwrap().remaining_secs(), WORK_SECS - 30);
        assert_eq!(reg.timer_for(&b).unwrap().remaining_secs(), WORK_SECS);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn stale_subscription_is_ignored() {
        let (mut reg, _) = registry();
        let mut ledger = CountingLedger::default();
        let habit = HabitId::new();
        reg.start_for(&habit);
        let old = reg.subscription_for(&habit).unwrap();
        reg.pause_for(&habit);
        reg.start_for(&habit);
        assert_ne!(reg.subscription_for(&habit), Some(old));
        assert!(reg.on_tick(old, &mut ledger).is_none());
        assert_eq!(reg.timer_for(&habit).unwrap().remaining_secs(), WORK_SECS);
    }

    #[test]
    fn every_command_notifies_once() {
        let (mut reg, notifier) = registry();
        let mut ledger = CountingLedger::default();
        let habit = HabitId::new();

        let mut expect = 0;
        reg.start_for(&habit);
        expect += 1;
        assert_eq!(notifier.version(), expect);
        reg.tick_for(&habit, &mut ledger);
        expect += 1;
        assert_eq!(notifier.version(), expect);
        reg.skip_for(&habit, &mut ledger);
        expect += 1;
        assert_eq!(notifier.version(), expect);
        reg.stop_for(&habit);
        expect += 1;
        assert_eq!(notifier.version(), expect);
    }
}
