//! Purpose-keyed one-shot timers.
//!
//! The queue only stores deadlines; whoever owns it decides when to look at
//! the clock. The async driver sleeps until [`TimerQueue::next_deadline`] and
//! then calls [`TimerQueue::pop_due`].

use std::collections::HashMap;
use std::time::Instant;

/// What a pending timer is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKey {
    /// Fires `on_load_failed` if the engine never prepares.
    LoadingTimeout,
    /// Announces a slow seek with `on_start_seek`.
    SeekStart,
    /// Reports `on_seek_complete` once seek completions stop arriving.
    SeekSettle,
}

/// At most one deadline per [`TimerKey`].
#[derive(Debug, Default)]
pub struct TimerQueue {
    deadlines: HashMap<TimerKey, Instant>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `key`, replacing any existing deadline for it.
    pub fn schedule(&mut self, key: TimerKey, deadline: Instant) {
        self.deadlines.insert(key, deadline);
    }

    /// Disarm `key`. Returns whether it was pending.
    pub fn cancel(&mut self, key: TimerKey) -> bool {
        self.deadlines.remove(&key).is_some()
    }

    pub fn cancel_all(&mut self) {
        self.deadlines.clear();
    }

    pub fn is_pending(&self, key: TimerKey) -> bool {
        self.deadlines.contains_key(&key)
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.values().min().copied()
    }

    /// Remove and return the earliest timer whose deadline is `<= now`.
    ///
    /// Ties resolve in the order the keys are declared so firing is
    /// deterministic.
    pub fn pop_due(&mut self, now: Instant) -> Option<TimerKey> {
        let key = [TimerKey::LoadingTimeout, TimerKey::SeekStart, TimerKey::SeekSettle]
            .into_iter()
            .filter_map(|key| self.deadlines.get(&key).map(|deadline| (key, *deadline)))
            .filter(|(_, deadline)| *deadline <= now)
            .min_by_key(|(_, deadline)| *deadline)
            .map(|(key, _)| key)?;
        self.deadlines.remove(&key);
        Some(key)
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }
}
