//! pincache: in-memory LRU caches with pinning and weight-based bounds.
//!
//! Two policies share one recency structure and one listener contract:
//!
//! - [`PinnedLruCore`](policy::pinned_lru::PinnedLruCore) bounds the number of
//!   unpinned entries. Pinned entries are never evicted and do not count
//!   toward the size.
//! - [`WeightedLruCore`](policy::weighted_lru::WeightedLruCore) bounds the sum
//!   of per-entry weights and evicts as many entries as needed after each
//!   insert.
//!
//! With the default `concurrency` feature each policy also has a
//! mutex-wrapped, cloneable handle for use across threads.
//!
//! ```
//! use pincache::prelude::*;
//!
//! let mut cache = PinnedLruCore::new(2);
//! cache.insert("a", 1);
//! cache.insert("b", 2);
//! cache.pin(&"a");
//! cache.insert("c", 3);
//! cache.insert("d", 4);
//!
//! assert!(cache.contains(&"a"));
//! assert!(!cache.contains(&"b"));
//! assert_eq!(cache.len(), 3);
//! ```

pub mod builder;
pub mod ds;
pub mod error;
pub mod policy;
pub mod prelude;
pub mod stats;
pub mod traits;

#[cfg(test)]
mod test_log;
