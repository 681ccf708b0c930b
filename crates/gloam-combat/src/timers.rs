//! Delayed actions keyed by simulation time.

/// A queue of actions that become due at a given time (ms).
///
/// Actions due at the same time come out in scheduling order.
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    entries: Vec<Scheduled<T>>,
    next_seq: u64,
}

#[derive(Debug, Clone)]
struct Scheduled<T> {
    due_ms: f64,
    seq: u64,
    action: T,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_seq: 0,
        }
    }
}

impl<T> TimerQueue<T> {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `action` to become due at `due_ms`.
    pub fn schedule(&mut self, due_ms: f64, action: T) {
        self.entries.push(Scheduled {
            due_ms,
            seq: self.next_seq,
            action,
        });
        self.next_seq += 1;
    }

    /// Removes and returns every action due at or before `now_ms`.
    pub fn take_due(&mut self, now_ms: f64) -> Vec<T> {
        let (mut due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|entry| entry.due_ms <= now_ms);
        self.entries = pending;
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|entry| entry.action).collect()
    }

    /// Returns true if any pending action matches `predicate`.
    pub fn any(&self, predicate: impl Fn(&T) -> bool) -> bool {
        self.entries.iter().any(|entry| predicate(&entry.action))
    }

    /// Number of pending actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
