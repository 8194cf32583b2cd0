//! Scheduler module - delayed steps driven by the frame loop
//!
//! Nothing here runs on its own: the session advances the clock from
//! `update` and then pops due steps one at a time, earliest first (ties in
//! scheduling order). Cancelled entries never come back out.

/// Handle for a scheduled entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

#[derive(Debug, Clone)]
struct Entry<T> {
    id: TaskId,
    fire_at_ms: u64,
    task: T,
    cancelled: bool,
}

#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now_ms: u64,
    next_id: u64,
    entries: Vec<Entry<T>>,
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_id: 0,
            entries: Vec::new(),
        }
    }

    /// Schedule `task` to fire `delay_ms` from now
    pub fn schedule(&mut self, delay_ms: u32, task: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            fire_at_ms: self.now_ms + delay_ms as u64,
            task,
            cancelled: false,
        });
        id
    }

    /// Cancel one entry; returns false if it already fired or was cancelled
    pub fn cancel(&mut self, id: TaskId) -> bool {
        match self.entries.iter_mut().find(|e| e.id == id && !e.cancelled) {
            Some(entry) => {
                entry.cancelled = true;
                true
            }
            None => false,
        }
    }

    /// Cancel everything outstanding
    pub fn cancel_all(&mut self) {
        for entry in &mut self.entries {
            entry.cancelled = true;
        }
    }

    /// Number of live (not cancelled, not fired) entries
    pub fn pending(&self) -> usize {
        self.entries.iter().filter(|e| !e.cancelled).count()
    }

    pub fn advance(&mut self, elapsed_ms: u32) {
        self.now_ms += elapsed_ms as u64;
    }

    /// Take the earliest live entry that is due, dropping cancelled ones
    pub fn pop_due(&mut self) -> Option<T> {
        self.entries.retain(|e| !e.cancelled);

        let now = self.now_ms;
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.fire_at_ms <= now)
            .min_by_key(|(_, e)| (e.fire_at_ms, e.id.0))
            .map(|(i, _)| i)?;

        Some(self.entries.remove(idx).task)
    }

    /// Cancel everything and rewind the clock
    pub fn reset(&mut self) {
        self.entries.clear();
        self.now_ms = 0;
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}
