//! # Count-bounded LRU Cache with Pinning
//!
//! An LRU cache whose limit counts only *unpinned* entries. A pinned entry
//! stays in the index but leaves the recency list, so it is never evicted
//! and never counts against the size limit.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                      PinnedLruCore<K, V>                             │
//!   │                                                                      │
//!   │   FxHashMap<K, Entry<V>>                RecencyList<K>               │
//!   │   ┌────────┬────────────────────┐                                    │
//!   │   │  key   │ Entry { value,     │       head (MRU)                   │
//!   │   │        │         node }     │         │                          │
//!   │   ├────────┼────────────────────┤         ▼                          │
//!   │   │  "a"   │ node: Some(id_1) ──┼──►   [ "a" ] ◄──► [ "c" ]          │
//!   │   │  "b"   │ node: None (pinned)│                      ▲             │
//!   │   │  "c"   │ node: Some(id_2) ──┼──────────────────────┘             │
//!   │   └────────┴────────────────────┘                    tail (LRU)      │
//!   │                                                                      │
//!   │   size = limit on RecencyList length (pinned entries are exempt)     │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations
//!
//! | Method          | Complexity | Description                                   |
//! |-----------------|------------|-----------------------------------------------|
//! | `insert(k, v)`  | O(1)*      | Insert or replace; new keys may evict         |
//! | `get(&k)`       | O(1)       | Lookup; unpinned hits move to MRU             |
//! | `peek(&k)`      | O(1)       | Lookup without touching recency               |
//! | `contains(&k)`  | O(1)       | Existence check, no recency change            |
//! | `pin(&k)`       | O(1)       | Take the entry out of the recency list        |
//! | `unpin(&k)`     | O(1)*      | Put the entry back at MRU; may evict          |
//! | `is_pinned(&k)` | O(1)       | `Err(NotFound)` for absent keys               |
//! | `remove(&k)`    | O(1)       | Drop an entry without notifying the listener  |
//!
//! \* amortized over the entries evicted.
//!
//! ## Eviction
//!
//! After a new key is inserted or a key is unpinned, entries are popped from
//! the tail of the recency list until its length is at most `size`. Each
//! evicted key is passed to the [`EvictionListener`] in that order. The loop
//! matters for `unpin`: unpinning entries that were pinned while the list was
//! full pushes the list over the limit by more than one.
//!
//! ```text
//!   size = 3, pinned: {2, 1, 3, 4}, queue: [5]
//!
//!   unpin(1)  queue: [1, 5]
//!   unpin(2)  queue: [2, 1, 5]
//!   unpin(3)  queue: [3, 2, 1, 5]  ──► evict 5
//!   unpin(4)  queue: [4, 3, 2, 1]  ──► evict 1
//! ```
//!
//! ## Thread Safety
//!
//! - `PinnedLruCore`: single-threaded; every call that can reorder takes `&mut self`
//! - `ConcurrentPinnedLruCache`: one `parking_lot::Mutex` around the core.
//!   `get` reorders the list, so there is no shared-read path. The eviction
//!   listener runs after the lock is released, before the call returns.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

#[cfg(feature = "concurrency")]
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::ds::{RecencyList, SlotId};
use crate::error::{CacheError, InvariantError};
use crate::stats::{Counters, PinnedLruStats};
use crate::traits::{CoreCache, EvictionListener, SharedListener};

// Upper bound on up-front allocation; larger caches grow on demand.
const PREALLOC_LIMIT: usize = 4096;

#[derive(Debug)]
struct Entry<V> {
    value: V,
    // Position in the recency list; `None` while pinned.
    node: Option<SlotId>,
}

/// Single-threaded count-bounded LRU cache with pinning.
///
/// # Example
///
/// ```
/// use pincache::policy::pinned_lru::PinnedLruCore;
///
/// let mut cache = PinnedLruCore::new(2);
/// cache.insert("a", 1);
/// cache.insert("b", 2);
///
/// // Pinned entries do not count against the size.
/// cache.pin(&"a");
/// cache.insert("c", 3);
/// assert_eq!(cache.len(), 3);
///
/// // "b" is now the least recently used unpinned entry.
/// cache.insert("d", 4);
/// assert!(!cache.contains(&"b"));
/// assert!(cache.contains(&"a"));
/// ```
pub struct PinnedLruCore<K, V> {
    map: FxHashMap<K, Entry<V>>,
    list: RecencyList<K>,
    size: usize,
    listener: Option<SharedListener<K>>,
    counters: Counters,
}

impl<K, V> PinnedLruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a cache that holds at most `size` unpinned entries.
    ///
    /// `size` is not validated: with `size == 0` every unpinned entry is
    /// evicted as soon as it is inserted.
    pub fn new(size: usize) -> Self {
        Self::with_shared_listener(size, None)
    }

    /// Creates a cache that reports evicted keys to `listener`.
    pub fn with_listener<L>(size: usize, listener: L) -> Self
    where
        L: EvictionListener<K> + 'static,
    {
        Self::with_shared_listener(size, Some(Arc::new(listener)))
    }

    pub(crate) fn with_shared_listener(size: usize, listener: Option<SharedListener<K>>) -> Self {
        let prealloc = size.min(PREALLOC_LIMIT);
        Self {
            map: FxHashMap::with_capacity_and_hasher(prealloc, Default::default()),
            list: RecencyList::with_capacity(prealloc),
            size,
            listener,
            counters: Counters::default(),
        }
    }

    /// Configured limit on unpinned entries.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Total number of entries, pinned and unpinned. May exceed [`size`](Self::size).
    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Number of unpinned entries, i.e. the recency list length.
    #[inline]
    pub fn queued_len(&self) -> usize {
        self.list.len()
    }

    #[inline]
    pub fn pinned_len(&self) -> usize {
        self.map.len() - self.list.len()
    }

    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Returns the value for `key`, marking it most recently used unless pinned.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        match self.map.get(key) {
            Some(entry) => {
                if let Some(node) = entry.node {
                    self.list.move_to_front(node);
                }
                self.counters.record_lookup(true);
                Some(&entry.value)
            },
            None => {
                self.counters.record_lookup(false);
                None
            },
        }
    }

    #[inline]
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.map.get(key).map(|entry| &entry.value)
    }

    /// Inserts or replaces a value and returns the previous one.
    ///
    /// An existing key keeps its pin state; if unpinned it moves to MRU.
    /// A new key enters unpinned at MRU, after which least recently used
    /// entries are evicted until the unpinned count is within `size`.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let previous = self.insert_entry(key, value);
        if previous.is_none() {
            self.evict_and_notify();
        }
        previous
    }

    /// Exempts `key` from eviction and from the size limit.
    ///
    /// Returns `true` if the key is in the cache. Pinning a pinned key is a no-op.
    pub fn pin(&mut self, key: &K) -> bool {
        let Some(entry) = self.map.get_mut(key) else {
            return false;
        };
        if let Some(node) = entry.node.take() {
            self.list.remove(node);
        }
        true
    }

    /// Returns `key` to the recency list as most recently used.
    ///
    /// Returns `true` if the key is in the cache. Unpinning may evict other
    /// entries, or with `size == 0` the key itself.
    pub fn unpin(&mut self, key: &K) -> bool {
        if self.unpin_entry(key).is_none() {
            return self.map.contains_key(key);
        }
        self.evict_and_notify();
        true
    }

    /// Reports whether `key` is pinned.
    ///
    /// # Errors
    ///
    /// [`CacheError::NotFound`] if the key is not in the cache.
    pub fn is_pinned(&self, key: &K) -> Result<bool, CacheError>
    where
        K: fmt::Debug,
    {
        self.map
            .get(key)
            .map(|entry| entry.node.is_none())
            .ok_or_else(|| CacheError::not_found(key))
    }

    /// Removes an entry, pinned or not, without notifying the listener.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let entry = self.map.remove(key)?;
        if let Some(node) = entry.node {
            self.list.remove(node);
        }
        Some(entry.value)
    }

    pub fn clear(&mut self) {
        self.map.clear();
        self.list.clear();
    }

    /// Unpinned keys from most to least recently used.
    pub fn recency_keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.list.iter()
    }

    /// Pinned keys, in no particular order.
    pub fn pinned_keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.map
            .iter()
            .filter(|(_, entry)| entry.node.is_none())
            .map(|(key, _)| key)
    }

    pub fn stats(&self) -> PinnedLruStats {
        PinnedLruStats::new(self.map.len(), self.list.len(), self.size, self.counters)
    }

    /// Emits [`stats`](Self::stats) at `info` level.
    pub fn log_stats(&self) {
        log::info!("pinned lru: {}", self.stats());
    }

    /// Cross-checks the index against the recency list.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let mut queued = 0usize;
        for (key, entry) in &self.map {
            if let Some(node) = entry.node {
                queued += 1;
                if self.list.get(node) != Some(key) {
                    return Err(InvariantError::new(format!(
                        "index entry points at list slot {} holding a different key",
                        node.index()
                    )));
                }
            }
        }
        if queued != self.list.len() {
            return Err(InvariantError::new(format!(
                "{} unpinned index entries but {} list nodes",
                queued,
                self.list.len()
            )));
        }
        if self.list.len() > self.size {
            return Err(InvariantError::new(format!(
                "{} unpinned entries exceed size {}",
                self.list.len(),
                self.size
            )));
        }
        Ok(())
    }

    // -- internals ------------------------------------------------------------

    /// Insert without running eviction. Returns the replaced value, if any.
    fn insert_entry(&mut self, key: K, value: V) -> Option<V> {
        if let Some(entry) = self.map.get_mut(&key) {
            if let Some(node) = entry.node {
                self.list.move_to_front(node);
            }
            self.counters.record_update();
            return Some(std::mem::replace(&mut entry.value, value));
        }

        let node = self.list.push_front(key.clone());
        self.map.insert(
            key,
            Entry {
                value,
                node: Some(node),
            },
        );
        self.counters.record_insert();
        None
    }

    /// Moves a pinned entry back to MRU. `Some(())` only if the pin state changed.
    fn unpin_entry(&mut self, key: &K) -> Option<()> {
        let entry = self.map.get_mut(key)?;
        if entry.node.is_some() {
            return None;
        }
        entry.node = Some(self.list.push_front(key.clone()));
        Some(())
    }

    /// Evicts the LRU unpinned entry if the list is over the limit.
    fn pop_overflow(&mut self) -> Option<K> {
        if self.list.len() <= self.size {
            return None;
        }
        let key = self.list.pop_back()?;
        self.map.remove(&key);
        self.counters.record_eviction();
        log::trace!(
            "pinned lru evicted least recently used entry; {} queued, size {}",
            self.list.len(),
            self.size
        );
        Some(key)
    }

    fn evict_and_notify(&mut self) {
        let mut evicted = 0usize;
        while let Some(key) = self.pop_overflow() {
            evicted += 1;
            if let Some(listener) = &self.listener {
                listener.on_evict(&key);
            }
        }
        self.log_eviction(evicted);
    }

    #[cfg(feature = "concurrency")]
    fn evict_into(&mut self, evicted: &mut Vec<K>) {
        let before = evicted.len();
        while let Some(key) = self.pop_overflow() {
            evicted.push(key);
        }
        self.log_eviction(evicted.len() - before);
    }

    fn log_eviction(&self, evicted: usize) {
        if evicted > 0 {
            log::debug!(
                "pinned lru evicted {} entries; {} queued, {} pinned, size {}",
                evicted,
                self.list.len(),
                self.pinned_len(),
                self.size
            );
        }
    }
}

impl<K, V> CoreCache<K, V> for PinnedLruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn get(&mut self, key: &K) -> Option<&V> {
        PinnedLruCore::get(self, key)
    }

    fn peek(&self, key: &K) -> Option<&V> {
        PinnedLruCore::peek(self, key)
    }

    fn contains(&self, key: &K) -> bool {
        PinnedLruCore::contains(self, key)
    }

    fn len(&self) -> usize {
        PinnedLruCore::len(self)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        PinnedLruCore::remove(self, key)
    }

    fn clear(&mut self) {
        PinnedLruCore::clear(self)
    }
}

impl<K, V> fmt::Debug for PinnedLruCore<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinnedLruCore")
            .field("len", &self.map.len())
            .field("queued", &self.list.len())
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl<K, V> Extend<(K, V)> for PinnedLruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

/// Thread-safe [`PinnedLruCore`] behind a single `parking_lot::Mutex`.
///
/// Cloning yields another handle to the same cache. The eviction listener is
/// kept outside the lock and invoked after it is released, so a listener may
/// call back into this cache.
///
/// # Example
///
/// ```
/// use pincache::policy::pinned_lru::ConcurrentPinnedLruCache;
///
/// let cache = ConcurrentPinnedLruCache::new(2);
/// cache.insert(1u32, "one".to_string());
/// cache.pin(&1);
/// cache.insert(2, "two".to_string());
/// cache.insert(3, "three".to_string());
///
/// assert_eq!(cache.len(), 3);
/// assert_eq!(cache.get(&1).as_deref(), Some("one"));
/// ```
#[cfg(feature = "concurrency")]
pub struct ConcurrentPinnedLruCache<K, V> {
    inner: Arc<Mutex<PinnedLruCore<K, V>>>,
    listener: Option<SharedListener<K>>,
}

#[cfg(feature = "concurrency")]
impl<K, V> Clone for ConcurrentPinnedLruCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            listener: self.listener.clone(),
        }
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> ConcurrentPinnedLruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(size: usize) -> Self {
        Self::with_shared_listener(size, None)
    }

    pub fn with_listener<L>(size: usize, listener: L) -> Self
    where
        L: EvictionListener<K> + 'static,
    {
        Self::with_shared_listener(size, Some(Arc::new(listener)))
    }

    pub(crate) fn with_shared_listener(size: usize, listener: Option<SharedListener<K>>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(PinnedLruCore::new(size))),
            listener,
        }
    }

    /// Returns a clone of the value, marking it most recently used unless pinned.
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        let mut cache = self.inner.lock();
        cache.get(key).cloned()
    }

    /// Like [`get`](Self::get), but hands `f` a reference instead of cloning.
    pub fn get_with<R>(&self, key: &K, f: impl FnOnce(&V) -> R) -> Option<R> {
        let mut cache = self.inner.lock();
        cache.get(key).map(f)
    }

    pub fn contains(&self, key: &K) -> bool {
        let cache = self.inner.lock();
        cache.contains(key)
    }

    pub fn insert(&self, key: K, value: V) -> Option<V> {
        let mut evicted = Vec::new();
        let previous = {
            let mut cache = self.inner.lock();
            let previous = cache.insert_entry(key, value);
            if previous.is_none() {
                cache.evict_into(&mut evicted);
            }
            previous
        };
        self.notify(&evicted);
        previous
    }

    pub fn pin(&self, key: &K) -> bool {
        let mut cache = self.inner.lock();
        cache.pin(key)
    }

    pub fn unpin(&self, key: &K) -> bool {
        let mut evicted = Vec::new();
        let present = {
            let mut cache = self.inner.lock();
            match cache.unpin_entry(key) {
                Some(()) => {
                    cache.evict_into(&mut evicted);
                    true
                },
                None => cache.contains(key),
            }
        };
        self.notify(&evicted);
        present
    }

    pub fn is_pinned(&self, key: &K) -> Result<bool, CacheError>
    where
        K: fmt::Debug,
    {
        let cache = self.inner.lock();
        cache.is_pinned(key)
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        let mut cache = self.inner.lock();
        cache.remove(key)
    }

    pub fn clear(&self) {
        let mut cache = self.inner.lock();
        cache.clear();
    }

    pub fn len(&self) -> usize {
        let cache = self.inner.lock();
        cache.len()
    }

    pub fn is_empty(&self) -> bool {
        let cache = self.inner.lock();
        cache.is_empty()
    }

    pub fn size(&self) -> usize {
        let cache = self.inner.lock();
        cache.size()
    }

    pub fn queued_len(&self) -> usize {
        let cache = self.inner.lock();
        cache.queued_len()
    }

    pub fn pinned_len(&self) -> usize {
        let cache = self.inner.lock();
        cache.pinned_len()
    }

    /// Unpinned keys from most to least recently used.
    pub fn recency_keys(&self) -> Vec<K> {
        let cache = self.inner.lock();
        cache.recency_keys().cloned().collect()
    }

    pub fn stats(&self) -> PinnedLruStats {
        let cache = self.inner.lock();
        cache.stats()
    }

    pub fn log_stats(&self) {
        let cache = self.inner.lock();
        cache.log_stats();
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let cache = self.inner.lock();
        cache.check_invariants()
    }

    fn notify(&self, evicted: &[K]) {
        if let Some(listener) = &self.listener {
            for key in evicted {
                listener.on_evict(key);
            }
        }
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> fmt::Debug for ConcurrentPinnedLruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.inner.lock();
        f.debug_struct("ConcurrentPinnedLruCache")
            .field("len", &cache.map.len())
            .field("queued", &cache.list.len())
            .field("size", &cache.size)
            .finish_non_exhaustive()
    }
}
