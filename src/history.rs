//! Tag history - bounded FIFO of formatted tag-change records

use std::collections::VecDeque;

pub const HISTORY_CAPACITY: usize = 20;

#[derive(Debug, Clone)]
pub struct TagHistory {
    records: VecDeque<String>,
    capacity: usize,
}

impl TagHistory {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Append to the back, evicting the oldest record when full
    pub fn push(&mut self, record: impl Into<String>) {
        if self.records.len() >= self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record.into());
    }

    /// Copy of the current records, oldest first
    pub fn snapshot(&self) -> Vec<String> {
        self.records.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl Default for TagHistory {
    fn default() -> Self {
        Self::new()
    }
}
