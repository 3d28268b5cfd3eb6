//! Deterministic timer queue.
//!
//! Components never sleep. They schedule a tagged deadline here and get back
//! a `TimerId`; the driver asks for `next_deadline()`, sleeps until then,
//! and hands `now` back so due timers can be popped in deadline order.
//! Cancelling a timer or clearing the queue guarantees its tag is never
//! returned again.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

/// Handle for one scheduled action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug)]
pub struct TimerQueue<T> {
    next_id: u64,
    by_deadline: BTreeMap<(Instant, u64), T>,
    deadlines: HashMap<u64, Instant>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            by_deadline: BTreeMap::new(),
            deadlines: HashMap::new(),
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now: Instant, delay: Duration, tag: T) -> TimerId {
        self.schedule_at(now + delay, tag)
    }

    pub fn schedule_at(&mut self, deadline: Instant, tag: T) -> TimerId {
        let id = self.next_id;
        self.next_id += 1;
        self.by_deadline.insert((deadline, id), tag);
        self.deadlines.insert(id, deadline);
        TimerId(id)
    }

    /// Returns the tag if the timer was still pending.
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        let deadline = self.deadlines.remove(&id.0)?;
        self.by_deadline.remove(&(deadline, id.0))
    }

    pub fn clear(&mut self) {
        self.by_deadline.clear();
        self.deadlines.clear();
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id.0)
    }

    pub fn deadline(&self, id: TimerId) -> Option<Instant> {
        self.deadlines.get(&id.0).copied()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.by_deadline.keys().next().map(|(deadline, _)| *deadline)
    }

    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }

    /// Pops the earliest timer whose deadline is `<= now`.
    pub fn pop_expired(&mut self, now: Instant) -> Option<(TimerId, T)> {
        let (&(deadline, id), _) = self.by_deadline.iter().next()?;
        if deadline > now {
            return None;
        }
        let tag = self.by_deadline.remove(&(deadline, id))?;
        self.deadlines.remove(&id);
        Some((TimerId(id), tag))
    }
}
