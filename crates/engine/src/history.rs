/// Bounded undo history of full-state snapshots.
///
/// Callers push a snapshot *before* each mutation; `undo` hands back the
/// most recent one for the caller to restore. When the stack is full the
/// oldest snapshot is dropped.
use std::collections::VecDeque;

pub const DEFAULT_CAPACITY: usize = 50;

#[derive(Debug, Clone)]
pub struct History<T> {
    undo_stack: VecDeque<T>,
    max_entries: usize,
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> History<T> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(max_entries: usize) -> Self {
        let max_entries = max_entries.max(1);
        Self {
            undo_stack: VecDeque::with_capacity(max_entries),
            max_entries,
        }
    }

    /// Push a snapshot. Returns true if the oldest entry was evicted.
    pub fn push(&mut self, snapshot: T) -> bool {
        self.undo_stack.push_back(snapshot);

        // Limit history size
        if self.undo_stack.len() > self.max_entries {
            self.undo_stack.pop_front();
            log::debug!("history full ({}), evicted oldest snapshot", self.max_entries);
            return true;
        }
        false
    }

    /// Pop the most recent snapshot. `None` on an empty stack.
    pub fn undo(&mut self) -> Option<T> {
        self.undo_stack.pop_back()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo_stack.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undo_is_lifo() {
        let mut h = History::new();
        h.push(1);
        h.push(2);
        assert_eq!(h.undo(), Some(2));
        assert_eq!(h.undo(), Some(1));
        assert_eq!(h.undo(), None);
        assert_eq!(h.undo(), None);
    }

    #[test]
    fn cap_evicts_oldest() {
        let mut h = History::new();
        for i in 0..DEFAULT_CAPACITY {
            assert!(!h.push(i));
        }
        assert!(h.push(DEFAULT_CAPACITY));
        assert_eq!(h.len(), DEFAULT_CAPACITY);

        let mut popped = Vec::new();
        while let Some(v) = h.undo() {
            popped.push(v);
        }
        assert_eq!(popped.len(), DEFAULT_CAPACITY);
        assert_eq!(popped.last(), Some(&1));
        assert!(!popped.contains(&0));
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let mut h = History::with_capacity(0);
        h.push("a");
        h.push("b");
        assert_eq!(h.capacity(), 1);
        assert_eq!(h.undo(), Some("b"));
        assert!(h.is_empty());
    }
}
