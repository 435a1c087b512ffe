//! Timer scheduler
//!
//! Holds pending one-shot timers and hands them back once they are due.

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle to a pending timer. Keys are versioned, so a handle from a
    /// cancelled or fired timer never matches a later one.
    pub struct TimerId;
}

struct Timer<T> {
    deadline_ms: u64,
    /// Insertion order, breaks ties between equal deadlines
    seq: u64,
    payload: T,
}

/// A timer handed back by [`TimerScheduler::pop_due`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fired<T> {
    pub id: TimerId,
    /// When the timer was due, which may be earlier than the poll time
    pub deadline_ms: u64,
    pub payload: T,
}

/// Pending one-shot timers, fired earliest deadline first
pub struct TimerScheduler<T> {
    timers: SlotMap<TimerId, Timer<T>>,
    next_seq: u64,
}

impl<T> TimerScheduler<T> {
    pub fn new() -> Self {
        Self {
            timers: SlotMap::with_key(),
            next_seq: 0,
        }
    }

    /// Schedule `payload` to become due at `deadline_ms`
    pub fn schedule(&mut self, deadline_ms: u64, payload: T) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        let id = self.timers.insert(Timer {
            deadline_ms,
            seq,
            payload,
        });
        tracing::trace!(?id, deadline_ms, "timer scheduled");
        id
    }

    /// Cancel a pending timer, returning its payload if it had not fired yet
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        let timer = self.timers.remove(id)?;
        tracing::trace!(?id, deadline_ms = timer.deadline_ms, "timer cancelled");
        Some(timer.payload)
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    pub fn deadline(&self, id: TimerId) -> Option<u64> {
        self.timers.get(id).map(|t| t.deadline_ms)
    }

    /// Earliest pending deadline, if any
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.values().map(|t| t.deadline_ms).min()
    }

    /// Remove and return the earliest timer due at or before `now_ms`
    pub fn pop_due(&mut self, now_ms: u64) -> Option<Fired<T>> {
        let id = self
            .timers
            .iter()
            .filter(|(_, t)| t.deadline_ms <= now_ms)
            .min_by_key(|(_, t)| (t.deadline_ms, t.seq))
            .map(|(id, _)| id)?;

        let timer = self.timers.remove(id)?;
        tracing::trace!(?id, deadline_ms = timer.deadline_ms, now_ms, "timer due");
        Some(Fired {
            id,
            deadline_ms: timer.deadline_ms,
            payload: timer.payload,
        })
    }

    /// Drop every pending timer
    pub fn clear(&mut self) {
        self.timers.clear();
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

impl<T> Default for TimerScheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_due_in_deadline_order() {
        let mut scheduler = TimerScheduler::new();
        scheduler.schedule(300, "late");
        scheduler.schedule(100, "early");
        scheduler.schedule(200, "middle");

        assert_eq!(scheduler.next_deadline(), Some(100));
        assert!(scheduler.pop_due(50).is_none());

        let fired: Vec<_> = std::iter::from_fn(|| scheduler.pop_due(250))
            .map(|fired| fired.payload)
            .collect();
        assert_eq!(fired, vec!["early", "middle"]);
        assert_eq!(scheduler.len(), 1);
        assert_eq!(scheduler.next_deadline(), Some(300));
    }

    #[test]
    fn test_equal_deadlines_fire_in_insertion_order() {
        let mut scheduler = TimerScheduler::new();
        scheduler.schedule(100, 1);
        scheduler.schedule(100, 2);
        scheduler.schedule(100, 3);

        let fired: Vec<_> = std::iter::from_fn(|| scheduler.pop_due(100))
            .map(|fired| fired.payload)
            .collect();
        assert_eq!(fired, vec![1, 2, 3]);
    }

    #[test]
    fn test_cancelled_timer_never_fires() {
        let mut scheduler = TimerScheduler::new();
        let id = scheduler.schedule(100, ());

        assert!(scheduler.is_pending(id));
        assert_eq!(scheduler.cancel(id), Some(()));
        assert!(!scheduler.is_pending(id));
        assert!(scheduler.pop_due(1_000).is_none());

        // Cancelling again is harmless
        assert_eq!(scheduler.cancel(id), None);
    }

    #[test]
    fn test_stale_handle_does_not_match_new_timer() {
        let mut scheduler = TimerScheduler::new();
        let old = scheduler.schedule(100, "old");
        scheduler.cancel(old);

        let new = scheduler.schedule(100, "new");
        assert_ne!(old, new);
        assert_eq!(scheduler.cancel(old), None);
        assert!(scheduler.is_pending(new));
        assert_eq!(scheduler.deadline(new), Some(100));
    }

    #[test]
    fn test_fired_reports_original_deadline() {
        let mut scheduler = TimerScheduler::new();
        let id = scheduler.schedule(100, "tick");

        let fired = scheduler.pop_due(450).unwrap();
        assert_eq!(
            fired,
            Fired {
                id,
                deadline_ms: 100,
                payload: "tick"
            }
        );
    }

    #[test]
    fn test_clear() {
        let mut scheduler = TimerScheduler::new();
        scheduler.schedule(1, ());
        scheduler.schedule(2, ());
        scheduler.clear();

        assert!(scheduler.is_empty());
        assert_eq!(scheduler.next_deadline(), None);
    }
}
