//! Cache Module
//!
//! Provides a namespaced in-memory cache with a maximum entry age and
//! oldest-first eviction.

mod clock;
mod entry;
mod namespace;
mod order;
mod stats;
mod store;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use namespace::Namespace;
pub use order::InsertionOrder;
pub use stats::CacheStats;
pub use store::CacheStore;
