//! Timer service used by the TEI state machines.
//!
//! Each scheduled timer gets a never-reused [`TimerHandle`]. A handle fires at
//! most once, and cancelling it before its deadline guarantees it never fires.

use std::{
    collections::{BTreeMap, HashMap},
    time::{Duration, Instant},
};

use crate::handle::EntityHandle;

/// Identifies one scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    /// Raw handle value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Schedules expiry events for layer-2 entities.
pub trait TimerService {
    /// Arms a timer firing `delay` after `now` on behalf of `owner`.
    fn schedule(&mut self, owner: EntityHandle, delay: Duration, now: Instant) -> TimerHandle;

    /// Cancels a pending timer. Returns false if it already fired or was cancelled.
    fn cancel(&mut self, handle: TimerHandle) -> bool;

    /// Removes and returns every timer whose deadline is at or before `now`, earliest first.
    fn expire(&mut self, now: Instant) -> Vec<(TimerHandle, EntityHandle)>;

    /// Earliest pending deadline, if any.
    fn next_deadline(&self) -> Option<Instant>;

    /// Number of timers still pending.
    fn pending(&self) -> usize;
}

/// Deadline-ordered timer set driven by explicit polling.
#[derive(Debug, Default)]
pub struct DeadlineTimers {
    next_handle: u64,
    deadlines: BTreeMap<(Instant, TimerHandle), EntityHandle>,
    by_handle: HashMap<TimerHandle, Instant>,
}

impl DeadlineTimers {
    /// Creates an empty timer set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `handle` is scheduled and has not fired.
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.by_handle.contains_key(&handle)
    }
}

impl TimerService for DeadlineTimers {
    fn schedule(&mut self, owner: EntityHandle, delay: Duration, now: Instant) -> TimerHandle {
        self.next_handle += 1;
        let handle = TimerHandle(self.next_handle);
        let deadline = now + delay;
        self.deadlines.insert((deadline, handle), owner);
        self.by_handle.insert(handle, deadline);
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.by_handle.remove(&handle) {
            Some(deadline) => self.deadlines.remove(&(deadline, handle)).is_some(),
            None => false,
        }
    }

    fn expire(&mut self, now: Instant) -> Vec<(TimerHandle, EntityHandle)> {
        let mut fired = Vec::new();
        while let Some(entry) = self.deadlines.first_entry() {
            if entry.key().0 > now {
                break;
            }
            let ((_, handle), owner) = entry.remove_entry();
            self.by_handle.remove(&handle);
            fired.push((handle, owner));
        }
        fired
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.keys().next().map(|(deadline, _)| *deadline)
    }

    fn pending(&self) -> usize {
        self.by_handle.len()
    }
}
