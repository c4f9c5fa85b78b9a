//! # Timer Queue
//!
//! Deadline queue for the scheduled delays the migration core needs
//! (reconnect backoff, initial wait). Deadlines are expressed on a
//! caller-supplied monotonic clock and popped from the coordinator's
//! `tick`, so there are no blocking sleeps and the whole core stays on one
//! cooperative execution context. Entries can be cancelled, which is what
//! tearing down a coordinator mid-wait relies on.

use std::time::Duration;

/// Handle for cancelling a scheduled timer.
pub type TimerId = u64;

/// What a due timer should trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Next client reconnect attempt is due
    ReconnectDelay,
}

#[derive(Debug)]
struct TimerEntry {
    id: TimerId,
    due: Duration,
    kind: TimerKind,
}

/// Pending timers ordered by deadline.
#[derive(Debug, Default)]
pub struct TimerQueue {
    next_id: TimerId,
    entries: Vec<TimerEntry>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `kind` to fire once `now` reaches `due`.
    pub fn schedule(&mut self, due: Duration, kind: TimerKind) -> TimerId {
        self.next_id += 1;
        let id = self.next_id;
        self.entries.push(TimerEntry { id, due, kind });
        id
    }

    /// Cancel one timer; `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.entries.clear();
    }

    /// Pop the earliest timer whose deadline has passed, if any. Called in
    /// a loop from `tick` so multiple due timers fire in deadline order.
    pub fn pop_due(&mut self, now: Duration) -> Option<(TimerId, TimerKind)> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= now)
            .min_by_key(|(_, e)| e.due)
            .map(|(i, _)| i)?;
        let entry = self.entries.swap_remove(idx);
        Some((entry.id, entry.kind))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn fires_in_deadline_order() {
        let mut queue = TimerQueue::new();
        let late = queue.schedule(secs(5), TimerKind::ReconnectDelay);
        let early = queue.schedule(secs(2), TimerKind::ReconnectDelay);

        assert!(queue.pop_due(secs(1)).is_none());
        assert_eq!(queue.pop_due(secs(5)).unwrap().0, early);
        assert_eq!(queue.pop_due(secs(5)).unwrap().0, late);
        assert!(queue.pop_due(secs(5)).is_none());
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut queue = TimerQueue::new();
        let id = queue.schedule(secs(1), TimerKind::ReconnectDelay);
        assert!(queue.cancel(id));
        assert!(!queue.cancel(id));
        assert!(queue.pop_due(secs(10)).is_none());
    }

    #[test]
    fn cancel_all_empties_the_queue() {
        let mut queue = TimerQueue::new();
        queue.schedule(secs(1), TimerKind::ReconnectDelay);
        queue.schedule(secs(2), TimerKind::ReconnectDelay);
        queue.cancel_all();
        assert!(queue.is_empty());
    }
}
