//! # Cache Traits
//!
//! Shared surface of the two cache policies and the eviction listener
//! contract.
//!
//! ```text
//!   ┌─────────────────────────────────────────┐
//!   │            CoreCache<K, V>              │
//!   │                                         │
//!   │  get(&mut, &K) → Option<&V>             │
//!   │  peek(&, &K) → Option<&V>               │
//!   │  contains(&, &K) → bool                 │
//!   │  len(&) → usize                         │
//!   │  remove(&mut, &K) → Option<V>           │
//!   │  clear(&mut)                            │
//!   └──────────────────┬──────────────────────┘
//!                      │
//!        ┌─────────────┴──────────────┐
//!        ▼                            ▼
//!   PinnedLruCore               WeightedLruCore
//!   insert(K, V)                insert(K, V, weight)
//!   pin / unpin / is_pinned     used_capacity / capacity
//! ```
//!
//! Insertion is not part of [`CoreCache`]: the weighted policy needs a weight
//! with every new entry, so each core exposes its own `insert`.
//!
//! ## Eviction listener
//!
//! An [`EvictionListener`] is told the key of every entry removed under
//! capacity pressure, least recently used first, before the mutating call that
//! caused the eviction returns. Explicit `remove` and `clear` do not notify.
//!
//! Any `Fn(&K) + Send + Sync` closure is a listener:
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use pincache::policy::pinned_lru::PinnedLruCore;
//!
//! let evicted = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&evicted);
//! let mut cache = PinnedLruCore::with_listener(1, move |key: &u32| {
//!     sink.lock().unwrap().push(*key);
//! });
//!
//! cache.insert(1, "one");
//! cache.insert(2, "two");
//! assert_eq!(*evicted.lock().unwrap(), vec![1]);
//! ```
//!
//! A listener must not call back into the cache that invoked it. The
//! single-threaded cores hold `&mut self` while notifying, so the borrow
//! checker already forbids it there.

use std::sync::Arc;

/// Receives the key of each entry evicted due to capacity pressure.
pub trait EvictionListener<K>: Send + Sync {
    fn on_evict(&self, key: &K);
}

impl<K, F> EvictionListener<K> for F
where
    F: Fn(&K) + Send + Sync,
{
    #[inline]
    fn on_evict(&self, key: &K) {
        self(key)
    }
}

/// Shared, type-erased listener handle as stored by the caches.
pub type SharedListener<K> = Arc<dyn EvictionListener<K>>;

/// Operations common to every cache policy in this crate.
pub trait CoreCache<K, V> {
    /// Returns the value and marks the entry most recently used.
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Returns the value without touching recency order.
    fn peek(&self, key: &K) -> Option<&V>;

    /// Returns `true` if the key is present. Never touches recency order.
    fn contains(&self, key: &K) -> bool;

    /// Total number of entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes an entry without notifying the eviction listener.
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Drops every entry without notifying the eviction listener.
    fn clear(&mut self);
}
