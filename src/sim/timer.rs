//! Deferred task queue
//!
//! Everything that "happens later" (weapon cooldowns, enemy autofire, fade
//! completions, defeat re-checks) is a task entry keyed by its due time on the
//! simulated clock. The owner polls once per frame; tasks with equal due times
//! run in scheduling order.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::enemy::EnemyId;
use super::weapon::Shooter;

/// Deferred work a level schedules for itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelTask {
    /// Cooldown elapsed; the shooter's weapon may fire again
    ReopenGate(Shooter),
    /// Next self-scheduled enemy shot
    Autofire(Shooter),
    /// Death fade finished; structurally remove the enemy
    RemoveEnemy { formation: usize, enemy: EnemyId },
    /// Deferred "all formations empty" check
    DefeatCheck,
    /// Level fade-out finished; leave the level
    ExitLevel,
}

#[derive(Debug)]
struct Entry<T> {
    due_ms: f64,
    seq: u64,
    task: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    // Reversed so the max-heap pops the earliest (due, seq) first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due_ms
            .total_cmp(&self.due_ms)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Timer queue driven by simulated time
#[derive(Debug)]
pub struct TimerQueue<T> {
    now_ms: f64,
    next_seq: u64,
    heap: BinaryHeap<Entry<T>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            now_ms: 0.0,
            next_seq: 0,
            heap: BinaryHeap::new(),
        }
    }

    /// Current simulated time (ms)
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Schedule `task` to run `delay_ms` from now
    pub fn after(&mut self, delay_ms: f64, task: T) {
        let delay = if delay_ms.is_finite() { delay_ms.max(0.0) } else { 0.0 };
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry {
            due_ms: self.now_ms + delay,
            seq,
            task,
        });
    }

    /// Advance the clock by `dt_ms`
    pub fn advance(&mut self, dt_ms: f64) {
        if dt_ms.is_finite() && dt_ms > 0.0 {
            self.now_ms += dt_ms;
        }
    }

    /// Remove and return every task due at the current time, in order.
    ///
    /// Tasks scheduled while handling the returned batch wait for the next
    /// poll, even with a zero delay.
    pub fn drain_due(&mut self) -> Vec<T> {
        let mut due = Vec::new();
        while self
            .heap
            .peek()
            .is_some_and(|entry| entry.due_ms <= self.now_ms)
        {
            if let Some(entry) = self.heap.pop() {
                due.push(entry.task);
            }
        }
        due
    }

    /// Whether any pending task matches `pred`
    pub fn any_pending(&self, pred: impl Fn(&T) -> bool) -> bool {
        self.heap.iter().any(|entry| pred(&entry.task))
    }

    /// Drop every pending task matching `pred`
    pub fn cancel(&mut self, pred: impl Fn(&T) -> bool) {
        self.heap.retain(|entry| !pred(&entry.task));
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_due_order() {
        let mut timers = TimerQueue::new();
        timers.after(300.0, "c");
        timers.after(100.0, "a");
        timers.after(200.0, "b");

        timers.advance(150.0);
        assert_eq!(timers.drain_due(), vec!["a"]);
        timers.advance(200.0);
        assert_eq!(timers.drain_due(), vec!["b", "c"]);
        assert!(timers.is_empty());
    }

    #[test]
    fn test_ties_are_fifo() {
        let mut timers = TimerQueue::new();
        timers.after(50.0, 1);
        timers.after(50.0, 2);
        timers.after(50.0, 3);
        timers.advance(50.0);
        assert_eq!(timers.drain_due(), vec![1, 2, 3]);
    }

    #[test]
    fn test_not_due_before_deadline() {
        let mut timers = TimerQueue::new();
        timers.after(200.0, ());
        timers.advance(199.0);
        assert!(timers.drain_due().is_empty());
        timers.advance(1.0);
        assert_eq!(timers.drain_due().len(), 1);
    }

    #[test]
    fn test_zero_delay_waits_for_next_poll() {
        let mut timers = TimerQueue::new();
        timers.after(0.0, "first");
        let batch = timers.drain_due();
        assert_eq!(batch, vec!["first"]);
        timers.after(0.0, "second");
        assert_eq!(timers.len(), 1);
        assert_eq!(timers.drain_due(), vec!["second"]);
    }

    #[test]
    fn test_cancel_and_pending() {
        let mut timers = TimerQueue::new();
        timers.after(10.0, 1);
        timers.after(20.0, 2);
        assert!(timers.any_pending(|t| *t == 2));
        timers.cancel(|t| *t == 2);
        assert!(!timers.any_pending(|t| *t == 2));
        assert_eq!(timers.len(), 1);
    }
}
