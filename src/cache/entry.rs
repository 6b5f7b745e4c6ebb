//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with age tracking.

// == Cache Entry ==
/// A stored value together with the time it was inserted.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Insertion timestamp (Unix milliseconds)
    pub inserted_at: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry inserted at `now_ms`.
    pub fn new(value: V, now_ms: u64) -> Self {
        Self {
            value,
            inserted_at: now_ms,
        }
    }

    // == Age ==
    /// Milliseconds elapsed since insertion. A clock reading earlier than
    /// the insertion time yields zero.
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.inserted_at)
    }

    // == Is Expired ==
    /// Checks if the entry is older than `max_age_ms`.
    ///
    /// Boundary condition: an entry whose age equals `max_age_ms` exactly is
    /// still fresh; it expires only once the age strictly exceeds it.
    pub fn is_expired(&self, now_ms: u64, max_age_ms: u64) -> bool {
        self.age_ms(now_ms) > max_age_ms
    }
}
