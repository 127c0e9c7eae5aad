use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug)]
pub struct Fired<T> {
    pub handle: TimerHandle,
    pub deadline: Instant,
    pub payload: T,
}

/// One-shot timers ordered by deadline.
///
/// Nothing fires on its own: the owner polls `pop_next_due` from its tick,
/// so a canceled entry is gone for good and can never run late.
pub struct TimerQueue<T> {
    next_id: u64,
    by_deadline: BTreeMap<(Instant, u64), T>,
    deadlines: HashMap<u64, Instant>,
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            by_deadline: BTreeMap::new(),
            deadlines: HashMap::new(),
        }
    }

    pub fn schedule_at(&mut self, deadline: Instant, payload: T) -> TimerHandle {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.by_deadline.insert((deadline, id), payload);
        self.deadlines.insert(id, deadline);
        TimerHandle(id)
    }

    pub fn schedule_after(&mut self, now: Instant, delay: Duration, payload: T) -> TimerHandle {
        self.schedule_at(now + delay, payload)
    }

    pub fn cancel(&mut self, handle: TimerHandle) -> Option<T> {
        let deadline = self.deadlines.remove(&handle.0)?;
        self.by_deadline.remove(&(deadline, handle.0))
    }

    /// Drops every pending timer, returning payloads in deadline order.
    pub fn cancel_all(&mut self) -> Vec<T> {
        self.deadlines.clear();
        std::mem::take(&mut self.by_deadline).into_values().collect()
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.deadlines.contains_key(&handle.0)
    }

    /// Earliest timer whose deadline is at or before `now`. Call in a loop:
    /// timers scheduled by a handler that are already due fire in the same pass.
    pub fn pop_next_due(&mut self, now: Instant) -> Option<Fired<T>> {
        let (&(deadline, id), _) = self.by_deadline.iter().next()?;
        if deadline > now {
            return None;
        }
        let payload = self.by_deadline.remove(&(deadline, id))?;
        self.deadlines.remove(&id);
        Some(Fired {
            handle: TimerHandle(id),
            deadline,
            payload,
        })
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.by_deadline.keys().next().map(|(deadline, _)| *deadline)
    }

    pub fn len(&self) -> usize {
        self.by_deadline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_deadline.is_empty()
    }
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
