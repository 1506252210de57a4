//! Side-by-side comparison selections.
//!
//! A selection holds at most [`COMPARE_CAPACITY`] distinct items in the order
//! they were added. Adding to a full selection or adding a duplicate id is a
//! no-op, as is removing an id that is not present.

mod summary;

pub use summary::*;

use crate::models::Identified;

/// Maximum number of items compared at once.
pub const COMPARE_CAPACITY: usize = 3;

/// Bounded, duplicate-free, insertion-ordered selection.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonSet<T> {
    items: Vec<T>,
}

impl<T> Default for ComparisonSet<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Identified + Clone> ComparisonSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `item` unless the set is full or already holds its id.
    ///
    /// Returns whether the item was added.
    pub fn add(&mut self, item: &T) -> bool {
        if self.is_full() || self.contains(item.id()) {
            return false;
        }
        self.items.push(item.clone());
        true
    }

    /// Remove the item with `id`. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id() != id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|i| i.id() == id)
    }

    /// Items, oldest selection first.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn ids(&self) -> Vec<String> {
        self.items.iter().map(|i| i.id().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= COMPARE_CAPACITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Herb;

    fn h(id: &str) -> Herb {
        Herb::new(id, id)
    }

    #[test]
    fn test_duplicate_add_is_noop() {
        let mut set = ComparisonSet::new();
        assert!(set.add(&h("h1")));
        assert!(set.add(&h("h2")));
        assert!(!set.add(&h("h1")));
        assert_eq!(set.ids(), vec!["h1", "h2"]);
    }

    #[test]
    fn test_add_at_capacity_is_noop() {
        let mut set = ComparisonSet::new();
        for id in ["h1", "h2", "h3"] {
            set.add(&h(id));
        }
        assert!(set.is_full());
        assert!(!set.add(&h("h4")));
        assert_eq!(set.ids(), vec!["h1", "h2", "h3"]);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut set = ComparisonSet::new();
        set.add(&h("h1"));
        set.add(&h("h2"));

        assert!(set.remove("h1"));
        assert!(!set.remove("h1"));
        assert!(!set.remove("missing"));
        assert_eq!(set.ids(), vec!["h2"]);
    }

    #[test]
    fn test_remove_then_add_restores_membership() {
        let mut set = ComparisonSet::new();
        for id in ["h1", "h2", "h3"] {
            set.add(&h(id));
        }
        set.remove("h2");
        assert!(set.add(&h("h2")));
        assert!(set.contains("h2"));
        // Re-added item goes to the end
        assert_eq!(set.ids(), vec!["h1", "h3", "h2"]);
    }

    #[test]
    fn test_clear() {
        let mut set = ComparisonSet::new();
        set.add(&h("h1"));
        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
    }
}
