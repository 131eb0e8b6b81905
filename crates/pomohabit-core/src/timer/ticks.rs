//! Periodic tick subscriptions.
//!
//! A [`TickSource`] hands out subscriptions and reports which of them are due.
//! It never calls back into the timers itself; the registry polls `due()` and
//! routes each entry, so a cancelled subscription simply stops showing up.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Handle for one live tick subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TickSubscription(u64);

pub trait TickSource {
    fn subscribe(&mut self, interval: Duration) -> TickSubscription;

    fn cancel(&mut self, subscription: TickSubscription);

    /// Subscriptions whose interval elapsed since the previous call. A
    /// subscription appears once per elapsed interval, so a late poll
    /// catches up instead of dropping ticks.
    fn due(&mut self) -> Vec<TickSubscription>;

    fn is_live(&self, subscription: TickSubscription) -> bool;
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    interval: Duration,
    next_due: Duration,
}

/// Bookkeeping shared by the tick sources, keyed on time since an origin.
#[derive(Debug, Default)]
struct Slots {
    slots: BTreeMap<TickSubscription, Slot>,
    next_id: u64,
}

impl Slots {
    fn subscribe(&mut self, now: Duration, interval: Duration) -> TickSubscription {
        let interval = interval.max(Duration::from_millis(1));
        self.next_id += 1;
        let id = TickSubscription(self.next_id);
        self.slots.insert(
            id,
            Slot {
                interval,
                next_due: now + interval,
            },
        );
        id
    }

    fn cancel(&mut self, subscription: TickSubscription) {
        self.slots.remove(&subscription);
    }

    fn due(&mut self, now: Duration) -> Vec<TickSubscription> {
        let mut fired = Vec::new();
        for (id, slot) in self.slots.iter_mut() {
            while slot.next_due <= now {
                fired.push(*id);
                slot.next_due += slot.interval;
            }
        }
        fired
    }

    fn is_live(&self, subscription: TickSubscription) -> bool {
        self.slots.contains_key(&subscription)
    }
}

/// Ticks paced by the monotonic system clock.
#[derive(Debug)]
pub struct IntervalTicks {
    origin: Instant,
    slots: Slots,
}

impl IntervalTicks {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            slots: Slots::default(),
        }
    }
}

impl Default for IntervalTicks {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for IntervalTicks {
    fn subscribe(&mut self, interval: Duration) -> TickSubscription {
        let now = self.origin.elapsed();
        self.slots.subscribe(now, interval)
    }

    fn cancel(&mut self, subscription: TickSubscription) {
        self.slots.cancel(subscription);
    }

    fn due(&mut self) -> Vec<TickSubscription> {
        let now = self.origin.elapsed();
        self.slots.due(now)
    }

    fn is_live(&self, subscription: TickSubscription) -> bool {
        self.slots.is_live(subscription)
    }
}

/// Ticks paced by hand, for tests and simulations.
#[derive(Debug, Default)]
pub struct ManualTicks {
    now: Duration,
    slots: Slots,
}

impl ManualTicks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move simulated time forward.
    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }

    pub fn live_count(&self) -> usize {
        self.slots.slots.len()
    }
}

impl TickSource for ManualTicks {
    fn subscribe(&mut self, interval: Duration) -> TickSubscription {
        self.slots.subscribe(self.now, interval)
    }

    fn cancel(&mut self, subscription: TickSubscription) {
        self.slots.cancel(subscription);
    }

    fn due(&mut self) -> Vec<TickSubscription> {
        self.slots.due(self.now)
    }

    fn is_live(&self, subscription: TickSubscription) -> bool {
        self.slots.is_live(subscription)
    }
}
