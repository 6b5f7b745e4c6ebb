//! Insertion Order Module
//!
//! Tracks the order in which keys were first inserted into a namespace,
//! used for oldest-first eviction.

use std::collections::VecDeque;

// == Insertion Order ==
/// Tracks first-insertion order of keys for oldest-first eviction.
///
/// Keys are stored in a VecDeque where:
/// - Front = Earliest inserted
/// - Back = Most recently inserted
///
/// Reads never reorder keys, and re-inserting an existing key keeps its
/// original position.
#[derive(Debug, Default)]
pub struct InsertionOrder {
    order: VecDeque<String>,
}

impl InsertionOrder {
    // == Constructor ==
    /// Creates a new empty tracker.
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Record ==
    /// Appends a newly inserted key at the back.
    ///
    /// Callers must only record keys that are not already tracked.
    pub fn record(&mut self, key: &str) {
        self.order.push_back(key.to_string());
    }

    // == Remove ==
    /// Removes a key from the tracker.
    pub fn remove(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            self.order.remove(pos);
        }
    }

    // == Evict Oldest ==
    /// Returns and removes the earliest inserted key.
    ///
    /// Returns None if tracker is empty.
    pub fn evict_oldest(&mut self) -> Option<String> {
        self.order.pop_front()
    }

    /// Returns the earliest inserted key without removing it.
    #[cfg(test)]
    fn peek_oldest(&self) -> Option<&String> {
        self.order.front()
    }

    /// Returns the number of tracked keys.
    #[cfg(test)]
    fn len(&self) -> usize {
        self.order.len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterates keys from oldest to newest.
    #[cfg(test)]
    fn iter(&self) -> impl Iterator<Item = &String> {
        self.order.iter()
    }
}
