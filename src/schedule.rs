//! Deadline-ordered queue of scheduled actions.
//!
//! Test scripts can ask the engine to run an action at (or after) a point
//! in time. The queue keeps entries ordered by due time, with FIFO order
//! among entries sharing a due time, and hands them back one at a time so
//! the event loop can re-read the clock between callbacks.
//!
//! The engine never blocks past the earliest deadline: the loop asks
//! [`Scheduler::next_deadline`] before every wait and bounds its sleep by
//! it.
//!
//! # Key Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Scheduler`] | The ordered queue |
//! | [`Action`] | Shared handle to a scheduled callback |

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use tokio::time::Instant;

// ============================================================================
// Action Handle
// ============================================================================

/// Shared handle to a scheduled callback.
///
/// The same handle can be scheduled several times; [`Scheduler::unschedule`]
/// removes every entry holding a clone of it. The callback receives mutable
/// access to the engine context when it fires.
pub type Action<T> = Rc<dyn Fn(&mut T)>;

// ============================================================================
// Queue Entry
// ============================================================================

struct Entry<T> {
    due: Instant,
    action: Action<T>,
}

impl<T> fmt::Debug for Entry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("due", &self.due)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Scheduler
// ============================================================================

/// Deadline-ordered action queue.
///
/// Entries are kept sorted by due time; insertion places an entry after
/// every existing entry with an equal or earlier deadline, which makes
/// same-deadline ordering first-in-first-out.
pub struct Scheduler<T> {
    queue: VecDeque<Entry<T>>,
}

impl<T> Scheduler<T> {
    /// Creates an empty scheduler.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    /// Schedules `action` to fire at `due`.
    ///
    /// A deadline in the past is legal; the entry becomes due on the next
    /// loop step.
    pub fn schedule_at(&mut self, due: Instant, action: Action<T>) {
        let idx = self.queue.partition_point(|e| e.due <= due);
        self.queue.insert(idx, Entry { due, action });
    }

    /// Schedules `action` to fire `delay` from now.
    #[inline]
    pub fn schedule_in(&mut self, delay: Duration, action: Action<T>) {
        self.schedule_at(Instant::now() + delay, action);
    }

    /// Removes every entry holding a clone of `action`.
    ///
    /// Entries for other actions keep their relative order. Unscheduling
    /// an action that is not queued is a no-op.
    pub fn unschedule(&mut self, action: &Action<T>) {
        self.queue.retain(|e| !Rc::ptr_eq(&e.action, action));
    }

    /// Returns the earliest deadline, if any entry is queued.
    #[inline]
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.queue.front().map(|e| e.due)
    }

    /// Removes and returns the front action if it is due at `now`.
    ///
    /// Callers drain due work by calling this in a loop, re-reading the
    /// clock each iteration, so a callback that schedules new work is
    /// observed immediately.
    pub fn pop_due(&mut self, now: Instant) -> Option<Action<T>> {
        if self.queue.front().is_some_and(|e| e.due <= now) {
            self.queue.pop_front().map(|e| e.action)
        } else {
            None
        }
    }

    /// Returns the number of queued entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns `true` if no entries are queued.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl<T> Default for Scheduler<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Scheduler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("queued", &self.queue.len())
            .field("next_deadline", &self.next_deadline())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::RefCell;

    use proptest::prelude::*;

    fn push_label(label: u32) -> Action<Vec<u32>> {
        Rc::new(move |out: &mut Vec<u32>| out.push(label))
    }

    fn drain_all(sched: &mut Scheduler<Vec<u32>>, now: Instant, out: &mut Vec<u32>) {
        while let Some(action) = sched.pop_due(now) {
            action(out);
        }
    }

    #[test]
    fn test_fires_in_deadline_order() {
        let base = Instant::now();
        let mut sched = Scheduler::new();

        sched.schedule_at(base + Duration::from_millis(30), push_label(3));
        sched.schedule_at(base + Duration::from_millis(10), push_label(1));
        sched.schedule_at(base + Duration::from_millis(20), push_label(2));

        let mut out = Vec::new();
        drain_all(&mut sched, base + Duration::from_secs(1), &mut out);
        assert_eq!(out, vec![1, 2, 3]);
    }

    #[test]
    fn test_equal_deadlines_fire_fifo() {
        let base = Instant::now();
        let due = base + Duration::from_millis(5);
        let mut sched = Scheduler::new();

        for label in 0..8 {
            sched.schedule_at(due, push_label(label));
        }

        let mut out = Vec::new();
        drain_all(&mut sched, due, &mut out);
        assert_eq!(out, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn test_pop_due_respects_clock() {
        let base = Instant::now();
        let mut sched = Scheduler::new();
        sched.schedule_at(base + Duration::from_secs(60), push_label(9));

        assert!(sched.pop_due(base).is_none());
        assert_eq!(sched.len(), 1);
        assert!(sched.pop_due(base + Duration::from_secs(61)).is_some());
        assert!(sched.is_empty());
    }

    #[test]
    fn test_unschedule_removes_all_matches() {
        let base = Instant::now();
        let mut sched = Scheduler::new();
        let repeated = push_label(7);

        sched.schedule_at(base + Duration::from_millis(1), push_label(1));
        sched.schedule_at(base + Duration::from_millis(2), Rc::clone(&repeated));
        sched.schedule_at(base + Duration::from_millis(3), push_label(2));
        sched.schedule_at(base + Duration::from_millis(4), Rc::clone(&repeated));

        sched.unschedule(&repeated);
        assert_eq!(sched.len(), 2);

        let mut out = Vec::new();
        drain_all(&mut sched, base + Duration::from_secs(1), &mut out);
        assert_eq!(out, vec![1, 2]);
    }

    #[test]
    fn test_unschedule_unknown_is_noop() {
        let base = Instant::now();
        let mut sched = Scheduler::new();
        sched.schedule_at(base, push_label(1));

        sched.unschedule(&push_label(1));
        assert_eq!(sched.len(), 1);
    }

    #[test]
    fn test_next_deadline_tracks_front() {
        let base = Instant::now();
        let mut sched: Scheduler<Vec<u32>> = Scheduler::new();
        assert!(sched.next_deadline().is_none());

        sched.schedule_at(base + Duration::from_millis(50), push_label(1));
        sched.schedule_at(base + Duration::from_millis(10), push_label(2));
        assert_eq!(sched.next_deadline(), Some(base + Duration::from_millis(10)));
    }

    #[test]
    fn test_callback_may_reschedule() {
        // A firing action queues more work; the drain loop must see it.
        let base = Instant::now();
        let sched: Rc<RefCell<Scheduler<Vec<u32>>>> = Rc::new(RefCell::new(Scheduler::new()));

        let sched2 = Rc::clone(&sched);
        let chained: Action<Vec<u32>> = Rc::new(move |out: &mut Vec<u32>| {
            out.push(1);
            sched2.borrow_mut().schedule_at(base, push_label(2));
        });
        sched.borrow_mut().schedule_at(base, chained);

        let mut out = Vec::new();
        loop {
            let next = sched.borrow_mut().pop_due(base + Duration::from_secs(1));
            match next {
                Some(action) => action(&mut out),
                None => break,
            }
        }
        assert_eq!(out, vec![1, 2]);
    }

    proptest! {
        #[test]
        fn prop_drain_is_stable_sort(delays in prop::collection::vec(0u64..50, 0..40)) {
            let base = Instant::now();
            let mut sched = Scheduler::new();

            for (label, &delay) in delays.iter().enumerate() {
                sched.schedule_at(base + Duration::from_millis(delay), push_label(label as u32));
            }

            let mut got = Vec::new();
            drain_all(&mut sched, base + Duration::from_secs(1), &mut got);

            let mut expected: Vec<(u64, u32)> = delays
                .iter()
                .enumerate()
                .map(|(label, &delay)| (delay, label as u32))
                .collect();
            expected.sort_by_key(|&(delay, _)| delay);
            let expected: Vec<u32> = expected.into_iter().map(|(_, label)| label).collect();

            prop_assert_eq!(got, expected);
        }
    }
}
