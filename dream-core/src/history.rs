//! Session Log
//!
//! Bounded, append-only record of recent results. Pushing beyond capacity
//! evicts the oldest entry.

use std::collections::VecDeque;

use crate::constants::DEFAULT_HISTORY_CAPACITY;

#[derive(Debug, Clone)]
pub struct SessionLog<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T> SessionLog<T> {
    /// A zero capacity is bumped to one so the newest entry is always kept.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append `entry`, returning the evicted oldest entry if any.
    pub fn push(&mut self, entry: T) -> Option<T> {
        let evicted = if self.entries.len() == self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(entry);
        evicted
    }

    /// Up to `limit` entries, newest first.
    pub fn recent(&self, limit: usize) -> impl Iterator<Item = &T> {
        self.entries.iter().rev().take(limit)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T> Default for SessionLog<T> {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evicts_oldest_beyond_capacity() {
        let mut log = SessionLog::with_capacity(3);
        assert_eq!(log.push(1), None);
        assert_eq!(log.push(2), None);
        assert_eq!(log.push(3), None);
        assert_eq!(log.push(4), Some(1));

        assert_eq!(log.len(), 3);
        assert_eq!(log.recent(10).copied().collect::<Vec<_>>(), vec![4, 3, 2]);
    }

    #[test]
    fn test_recent_respects_limit() {
        let mut log = SessionLog::default();
        for i in 0..40 {
            log.push(i);
        }
        assert_eq!(log.capacity(), 30);
        assert_eq!(log.len(), 30);
        assert_eq!(log.recent(2).copied().collect::<Vec<_>>(), vec![39, 38]);
    }

    #[test]
    fn test_zero_capacity_keeps_newest() {
        let mut log = SessionLog::with_capacity(0);
        log.push("a");
        log.push("b");
        assert_eq!(log.recent(5).copied().collect::<Vec<_>>(), vec!["b"]);
    }
}
