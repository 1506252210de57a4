//! Recently viewed herbs.

use serde::{Deserialize, Serialize};

pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

/// Most-recent-first list of ids, without repeats, bounded by `capacity`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViewHistory {
    ids: Vec<String>,
    capacity: usize,
}

impl Default for ViewHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl ViewHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: Vec::new(),
            capacity,
        }
    }

    /// Rebuild from stored ids, re-applying dedup and the bound.
    pub fn from_ids(ids: Vec<String>, capacity: usize) -> Self {
        let mut history = Self::with_capacity(capacity);
        for id in ids.into_iter().rev() {
            history.record(&id);
        }
        history
    }

    /// Move `id` to the front.
    pub fn record(&mut self, id: &str) {
        self.ids.retain(|existing| existing != id);
        self.ids.insert(0, id.to_string());
        self.ids.truncate(self.capacity);
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}
