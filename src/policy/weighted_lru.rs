//! # Weight-bounded LRU Cache
//!
//! An LRU cache where every entry carries a caller-supplied weight (bytes,
//! segments, any unit) and the limit applies to the sum of weights rather than
//! the entry count. The cache never inspects values to size them.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                     WeightedLruCore<K, V>                            │
//!   │                                                                      │
//!   │   FxHashMap<K, Entry<V>>              RecencyList<K>                 │
//!   │   ┌───────┬──────────────────────┐                                   │
//!   │   │  seg1 │ { value, weight: 1,  │    head ─► [seg4] ◄──► [seg1]     │
//!   │   │       │   node: id_2 }       │    (MRU)                 (LRU)    │
//!   │   │  seg4 │ { value, weight: 2,  │                                   │
//!   │   │       │   node: id_1 }       │                                   │
//!   │   └───────┴──────────────────────┘                                   │
//!   │                                                                      │
//!   │   used_capacity = Σ weight = 3          capacity = 3                 │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Eviction
//!
//! After every insert, entries are popped from the tail until
//! `used_capacity <= capacity`. A single insert can evict many entries, and
//! an entry heavier than the whole capacity evicts everything else and then
//! itself:
//!
//! ```text
//!   capacity = 3
//!
//!   insert(1, w=1) insert(2, w=1) insert(3, w=1)   [3, 2, 1]  used 3
//!   get(1)                                         [1, 3, 2]  used 3
//!   insert(4, w=2)                                 [4, 1, 3, 2] used 5
//!       evict 2 ──► used 4
//!       evict 3 ──► used 3                         [4, 1]     used 3
//!   insert(9, w=5)                                 evicts 1, 4, 9 ──► used 0
//! ```
//!
//! ## Re-inserting a key
//!
//! Re-inserting an existing key replaces both its value and its weight:
//! `used_capacity` drops the old weight and adds the new one, the entry moves
//! to MRU, and eviction runs. If the new weight alone exceeds the capacity the
//! re-inserted entry is evicted last, after everything else.
//!
//! ## Thread Safety
//!
//! - `WeightedLruCore`: single-threaded
//! - `ConcurrentWeightedLruCache`: one `parking_lot::Mutex` around the core,
//!   taken by every method including accessors. The eviction listener runs
//!   after the lock is released, before the call returns.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

#[cfg(feature = "concurrency")]
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::ds::{RecencyList, SlotId};
use crate::error::InvariantError;
use crate::stats::{Counters, WeightedLruStats};
use crate::traits::{CoreCache, EvictionListener, SharedListener};

#[derive(Debug)]
struct Entry<V> {
    value: V,
    weight: u64,
    node: SlotId,
}

/// Single-threaded weight-bounded LRU cache.
///
/// # Example
///
/// ```
/// use pincache::policy::weighted_lru::WeightedLruCore;
///
/// let mut cache = WeightedLruCore::new(10);
/// cache.insert("small", vec![0u8; 3], 3);
/// cache.insert("large", vec![0u8; 6], 6);
/// assert_eq!(cache.used_capacity(), 9);
///
/// // Needs 4 more units: "small" is least recently used and goes first,
/// // which frees enough.
/// cache.insert("medium", vec![0u8; 4], 4);
/// assert!(!cache.contains(&"small"));
/// assert_eq!(cache.used_capacity(), 10);
/// ```
pub struct WeightedLruCore<K, V> {
    map: FxHashMap<K, Entry<V>>,
    list: RecencyList<K>,
    capacity: u64,
    // Wider than any single weight so the running sum cannot overflow before
    // eviction brings it back under `capacity`.
    used: u128,
    listener: Option<SharedListener<K>>,
    counters: Counters,
}

impl<K, V> WeightedLruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a cache whose entry weights may sum to at most `capacity`.
    pub fn new(capacity: u64) -> Self {
        Self::with_shared_listener(capacity, None)
    }

    /// Creates a cache that reports evicted keys to `listener`.
    pub fn with_listener<L>(capacity: u64, listener: L) -> Self
    where
        L: EvictionListener<K> + 'static,
    {
        Self::with_shared_listener(capacity, Some(Arc::new(listener)))
    }

    pub(crate) fn with_shared_listener(
        capacity: u64,
        listener: Option<SharedListener<K>>,
    ) -> Self {
        Self {
            map: FxHashMap::default(),
            list: RecencyList::new(),
            capacity,
            used: 0,
            listener,
            counters: Counters::default(),
        }
    }

    #[inline]
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Sum of the weights of all entries.
    #[inline]
    pub fn used_capacity(&self) -> u64 {
        u64::try_from(self.used).unwrap_or(u64::MAX)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Weight recorded for `key`.
    pub fn weight_of(&self, key: &K) -> Option<u64> {
        self.map.get(key).map(|entry| entry.weight)
    }

    /// Returns the value for `key` and marks it most recently used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        match self.map.get(key) {
            Some(entry) => {
                self.list.move_to_front(entry.node);
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

    /// Inserts or replaces an entry of the given weight, then evicts least
    /// recently used entries until the used capacity fits.
    ///
    /// Returns the replaced value when `key` was already present.
    pub fn insert(&mut self, key: K, value: V, weight: u64) -> Option<V> {
        let previous = self.insert_entry(key, value, weight);
        let mut evicted = 0usize;
        while let Some(key) = self.pop_overflow() {
            evicted += 1;
            if let Some(listener) = &self.listener {
                listener.on_evict(&key);
            }
        }
        self.log_eviction(evicted);
        previous
    }

    /// Removes an entry without notifying the listener.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let entry = self.map.remove(key)?;
        self.list.remove(entry.node);
        self.used -= u128::from(entry.weight);
        Some(entry.value)
    }

    pub fn clear(&mut self) {
        self.map.clear();
        self.list.clear();
        self.used = 0;
    }

    /// Keys from most to least recently used.
    pub fn recency_keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.list.iter()
    }

    pub fn stats(&self) -> WeightedLruStats {
        WeightedLruStats::new(
            self.map.len(),
            self.capacity,
            self.used_capacity(),
            self.counters,
        )
    }

    /// Emits [`stats`](Self::stats) at `info` level.
    pub fn log_stats(&self) {
        log::info!("weighted lru: {}", self.stats());
    }

    /// Cross-checks the index, the recency list, and the weight total.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.map.len() != self.list.len() {
            return Err(InvariantError::new(format!(
                "{} index entries but {} list nodes",
                self.map.len(),
                self.list.len()
            )));
        }
        let mut total = 0u128;
        for (key, entry) in &self.map {
            if self.list.get(entry.node) != Some(key) {
                return Err(InvariantError::new(format!(
                    "index entry points at list slot {} holding a different key",
                    entry.node.index()
                )));
            }
            total += u128::from(entry.weight);
        }
        if total != self.used {
            return Err(InvariantError::new(format!(
                "entry weights sum to {} but used capacity is {}",
                total, self.used
            )));
        }
        if self.used > u128::from(self.capacity) {
            return Err(InvariantError::new(format!(
                "used capacity {} exceeds capacity {}",
                self.used, self.capacity
            )));
        }
        Ok(())
    }

    // -- internals ------------------------------------------------------------

    fn insert_entry(&mut self, key: K, value: V, weight: u64) -> Option<V> {
        if let Some(entry) = self.map.get_mut(&key) {
            self.list.move_to_front(entry.node);
            self.used = self.used - u128::from(entry.weight) + u128::from(weight);
            entry.weight = weight;
            self.counters.record_update();
            return Some(std::mem::replace(&mut entry.value, value));
        }

        let node = self.list.push_front(key.clone());
        self.map.insert(
            key,
            Entry {
                value,
                weight,
                node,
            },
        );
        self.used += u128::from(weight);
        self.counters.record_insert();
        None
    }

    /// Evicts the LRU entry while the used capacity is over the limit.
    fn pop_overflow(&mut self) -> Option<K> {
        if self.used <= u128::from(self.capacity) {
            return None;
        }
        let key = self.list.pop_back()?;
        if let Some(entry) = self.map.remove(&key) {
            self.used -= u128::from(entry.weight);
            log::trace!(
                "weighted lru evicted entry of weight {}; used capacity {}",
                entry.weight,
                self.used
            );
        }
        self.counters.record_eviction();
        Some(key)
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
                "weighted lru evicted {} entries; used capacity {} of {}",
                evicted,
                self.used,
                self.capacity
            );
        }
    }
}

impl<K, V> CoreCache<K, V> for WeightedLruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn get(&mut self, key: &K) -> Option<&V> {
        WeightedLruCore::get(self, key)
    }

    fn peek(&self, key: &K) -> Option<&V> {
        WeightedLruCore::peek(self, key)
    }

    fn contains(&self, key: &K) -> bool {
        WeightedLruCore::contains(self, key)
    }

    fn len(&self) -> usize {
        WeightedLruCore::len(self)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        WeightedLruCore::remove(self, key)
    }

    fn clear(&mut self) {
        WeightedLruCore::clear(self)
    }
}

impl<K, V> fmt::Debug for WeightedLruCore<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeightedLruCore")
            .field("len", &self.map.len())
            .field("used_capacity", &self.used)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl<K, V> Extend<(K, V, u64)> for WeightedLruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn extend<T: IntoIterator<Item = (K, V, u64)>>(&mut self, iter: T) {
        for (key, value, weight) in iter {
            self.insert(key, value, weight);
        }
    }
}

/// Thread-safe [`WeightedLruCore`] behind a single `parking_lot::Mutex`.
///
/// # Example
///
/// ```
/// use pincache::policy::weighted_lru::ConcurrentWeightedLruCache;
///
/// let cache = ConcurrentWeightedLruCache::new(1024);
/// cache.insert("seg-1".to_string(), vec![1u8; 512], 512);
/// cache.insert("seg-2".to_string(), vec![2u8; 512], 512);
/// cache.insert("seg-3".to_string(), vec![3u8; 256], 256);
///
/// assert!(!cache.contains(&"seg-1".to_string()));
/// assert_eq!(cache.used_capacity(), 768);
/// ```
#[cfg(feature = "concurrency")]
pub struct ConcurrentWeightedLruCache<K, V> {
    inner: Arc<Mutex<WeightedLruCore<K, V>>>,
    listener: Option<SharedListener<K>>,
}

#[cfg(feature = "concurrency")]
impl<K, V> Clone for ConcurrentWeightedLruCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            listener: self.listener.clone(),
        }
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> ConcurrentWeightedLruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(capacity: u64) -> Self {
        Self::with_shared_listener(capacity, None)
    }

    pub fn with_listener<L>(capacity: u64, listener: L) -> Self
    where
        L: EvictionListener<K> + 'static,
    {
        Self::with_shared_listener(capacity, Some(Arc::new(listener)))
    }

    pub(crate) fn with_shared_listener(
        capacity: u64,
        listener: Option<SharedListener<K>>,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(WeightedLruCore::new(capacity))),
            listener,
        }
    }

    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        let mut cache = self.inner.lock();
        cache.get(key).cloned()
    }

    pub fn get_with<R>(&self, key: &K, f: impl FnOnce(&V) -> R) -> Option<R> {
        let mut cache = self.inner.lock();
        cache.get(key).map(f)
    }

    pub fn contains(&self, key: &K) -> bool {
        let cache = self.inner.lock();
        cache.contains(key)
    }

    pub fn insert(&self, key: K, value: V, weight: u64) -> Option<V> {
        let mut evicted = Vec::new();
        let previous = {
            let mut cache = self.inner.lock();
            let previous = cache.insert_entry(key, value, weight);
            cache.evict_into(&mut evicted);
            previous
        };
        if let Some(listener) = &self.listener {
            for key in &evicted {
                listener.on_evict(key);
            }
        }
        previous
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

    pub fn capacity(&self) -> u64 {
        let cache = self.inner.lock();
        cache.capacity()
    }

    pub fn used_capacity(&self) -> u64 {
        let cache = self.inner.lock();
        cache.used_capacity()
    }

    pub fn weight_of(&self, key: &K) -> Option<u64> {
        let cache = self.inner.lock();
        cache.weight_of(key)
    }

    pub fn recency_keys(&self) -> Vec<K> {
        let cache = self.inner.lock();
        cache.recency_keys().cloned().collect()
    }

    pub fn stats(&self) -> WeightedLruStats {
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
}

#[cfg(feature = "concurrency")]
impl<K, V> fmt::Debug for ConcurrentWeightedLruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.inner.lock();
        f.debug_struct("ConcurrentWeightedLruCache")
            .field("len", &cache.map.len())
            .field("used_capacity", &cache.used)
            .field("capacity", &cache.capacity)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    type EvictLog<K> = Arc<Mutex<Vec<K>>>;

    fn recording_cache<K, V>(capacity: u64) -> (WeightedLruCore<K, V>, EvictLog<K>)
    where
        K: Eq + Hash + Clone + Send + 'static,
    {
        let log: EvictLog<K> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let cache = WeightedLruCore::with_listener(capacity, move |key: &K| {
            sink.lock().unwrap().push(key.clone());
        });
        (cache, log)
    }

    fn drain<K>(log: &EvictLog<K>) -> Vec<K> {
        std::mem::take(&mut *log.lock().unwrap())
    }

    fn order<K: Eq + Hash + Clone, V>(cache: &WeightedLruCore<K, V>) -> Vec<K> {
        cache.recency_keys().cloned().collect()
    }

    mod basic_behavior {
        use super::*;

        #[test]
        fn new_cache_is_empty() {
            let cache: WeightedLruCore<u32, ()> = WeightedLruCore::new(100);
            assert_eq!(cache.capacity(), 100);
            assert_eq!(cache.used_capacity(), 0);
            assert!(cache.is_empty());
        }

        #[test]
        fn insert_accumulates_weight() {
            let mut cache = WeightedLruCore::new(10);
            cache.insert("a", 'a', 2);
            cache.insert("b", 'b', 3);
            assert_eq!(cache.used_capacity(), 5);
            assert_eq!(cache.len(), 2);
            assert_eq!(cache.weight_of(&"b"), Some(3));
            assert_eq!(cache.weight_of(&"c"), None);
        }

        #[test]
        fn get_moves_to_front_and_keeps_weight() {
            let mut cache = WeightedLruCore::new(10);
            cache.extend([(1, (), 1), (2, (), 1), (3, (), 1)]);
            assert_eq!(cache.get(&1), Some(&()));
            assert_eq!(order(&cache), vec![1, 3, 2]);
            assert_eq!(cache.used_capacity(), 3);
            assert_eq!(cache.len(), 3);
        }

        #[test]
        fn get_missing_key_has_no_effect() {
            let mut cache: WeightedLruCore<u8, u8> = WeightedLruCore::new(4);
            cache.insert(1, 1, 1);
            assert_eq!(cache.get(&9), None);
            assert_eq!(order(&cache), vec![1]);
            assert_eq!(cache.stats().misses, 1);
        }

        #[test]
        fn remove_releases_weight_without_notifying() {
            let (mut cache, log) = recording_cache(10);
            cache.insert("a", (), 4);
            cache.insert("b", (), 5);
            assert_eq!(cache.remove(&"a"), Some(()));
            assert_eq!(cache.used_capacity(), 5);
            assert_eq!(cache.remove(&"a"), None);
            assert!(drain(&log).is_empty());
            assert!(cache.check_invariants().is_ok());
        }

        #[test]
        fn clear_resets_used_capacity() {
            let mut cache = WeightedLruCore::new(10);
            cache.insert(1, (), 5);
            cache.clear();
            assert_eq!(cache.used_capacity(), 0);
            assert!(cache.is_empty());
        }

        #[test]
        fn zero_weight_entries_are_free() {
            let mut cache = WeightedLruCore::new(0);
            cache.extend([(1, (), 0), (2, (), 0)]);
            assert_eq!(cache.len(), 2);
            assert_eq!(cache.used_capacity(), 0);
        }
    }

    mod eviction {
        use super::*;

        #[test]
        fn evicts_until_weight_fits() {
            let (mut cache, log) = recording_cache(3);
            cache.insert("1", "one", 1);
            cache.insert("2", "two", 1);
            cache.insert("3", "three", 1);
            assert!(drain(&log).is_empty());

            cache.get(&"1");
            cache.insert("4", "four", 2);
            assert_eq!(drain(&log), vec!["2", "3"]);
            assert_eq!(order(&cache), vec!["4", "1"]);
            assert_eq!(cache.used_capacity(), 3);
        }

        #[test]
        fn oversized_entry_evicts_everything_including_itself() {
            let (mut cache, log) = recording_cache(3);
            cache.insert(1, (), 1);
            cache.insert(2, (), 1);
            cache.insert(9, (), 5);

            assert_eq!(drain(&log), vec![1, 2, 9]);
            assert!(cache.is_empty());
            assert_eq!(cache.used_capacity(), 0);
        }

        #[test]
        fn reinsert_with_heavier_weight_evicts_others() {
            let (mut cache, log) = recording_cache(4);
            cache.insert("a", 1, 1);
            cache.insert("b", 2, 1);
            cache.insert("c", 3, 1);

            assert_eq!(cache.insert("a", 10, 4), Some(1));
            assert_eq!(drain(&log), vec!["b", "c"]);
            assert_eq!(cache.used_capacity(), 4);
            assert_eq!(cache.weight_of(&"a"), Some(4));
            assert_eq!(cache.peek(&"a"), Some(&10));
        }

        #[test]
        fn reinsert_with_lighter_weight_frees_capacity() {
            let (mut cache, log) = recording_cache(4);
            cache.insert("a", (), 3);
            cache.insert("a", (), 1);
            assert_eq!(cache.used_capacity(), 1);

            cache.insert("b", (), 3);
            assert!(drain(&log).is_empty());
            assert_eq!(cache.used_capacity(), 4);
            assert_eq!(cache.stats().updates, 1);
        }

        #[test]
        fn reinsert_exceeding_capacity_evicts_itself_last() {
            let (mut cache, log) = recording_cache(2);
            cache.insert(1, (), 1);
            cache.insert(2, (), 1);
            cache.insert(1, (), 7);
            assert_eq!(drain(&log), vec![2, 1]);
            assert!(cache.is_empty());
        }

        #[test]
        fn weights_near_u64_max_do_not_overflow() {
            let (mut cache, log) = recording_cache(u64::MAX);
            cache.insert(1, (), 1);
            cache.insert(2, (), u64::MAX);
            assert_eq!(drain(&log), vec![1]);
            assert_eq!(cache.used_capacity(), u64::MAX);

            cache.insert(2, (), u64::MAX - 1);
            cache.insert(3, (), 1);
            assert!(drain(&log).is_empty());
            assert_eq!(cache.used_capacity(), u64::MAX);

            cache.insert(4, (), u64::MAX);
            assert_eq!(drain(&log), vec![2, 3]);
            assert_eq!(order(&cache), vec![4]);
            assert!(cache.check_invariants().is_ok());
        }

        #[test]
        fn huge_weights_over_small_capacity_evict_themselves() {
            let (mut cache, log) = recording_cache(10);
            cache.insert(1, (), u64::MAX);
            cache.insert(2, (), u64::MAX);
            assert_eq!(drain(&log), vec![1, 2]);
            assert_eq!(cache.used_capacity(), 0);
            assert_eq!(cache.stats().used_capacity, 0);
        }

        #[test]
        fn eviction_logs_each_entry_and_a_summary() {
            let mut cache = WeightedLruCore::new(2);
            let records = crate::test_log::capture(|| {
                cache.insert(1, (), 1);
                cache.insert(2, (), 1);
                cache.insert(3, (), 2);
            });

            let traces = records
                .iter()
                .filter(|(level, _)| *level == log::Level::Trace)
                .count();
            let debugs: Vec<_> = records
                .iter()
                .filter(|(level, _)| *level == log::Level::Debug)
                .map(|(_, msg)| msg.as_str())
                .collect();
            assert_eq!(traces, 2);
            assert_eq!(debugs, vec!["weighted lru evicted 2 entries; used capacity 2 of 2"]);
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Insert(u8, u64),
            Get(u8),
            Remove(u8),
        }

        fn op_strategy() -> impl Strategy<Value = Op> {
            prop_oneof![
                4 => (0u8..10, 0u64..6).prop_map(|(k, w)| Op::Insert(k, w)),
                2 => (0u8..10).prop_map(Op::Get),
                1 => (0u8..10).prop_map(Op::Remove),
            ]
        }

        /// Reference behavior: a Vec of (key, weight), MRU first.
        struct Model {
            queue: Vec<(u8, u64)>,
            capacity: u64,
            evicted: Vec<u8>,
        }

        impl Model {
            fn used(&self) -> u64 {
                self.queue.iter().map(|(_, w)| w).sum()
            }

            fn apply(&mut self, op: &Op) {
                match *op {
                    Op::Insert(k, w) => {
                        self.queue.retain(|(key, _)| *key != k);
                        self.queue.insert(0, (k, w));
                        while self.used() > self.capacity {
                            let (key, _) = self.queue.pop().unwrap();
                            self.evicted.push(key);
                        }
                    },
                    Op::Get(k) => {
                        if let Some(pos) = self.queue.iter().position(|(key, _)| *key == k) {
                            let item = self.queue.remove(pos);
                            self.queue.insert(0, item);
                        }
                    },
                    Op::Remove(k) => self.queue.retain(|(key, _)| *key != k),
                }
            }
        }

        proptest! {
            /// Property: used capacity never exceeds capacity and eviction
            /// follows the model's LRU order.
            #[cfg_attr(miri, ignore)]
            #[test]
            fn prop_matches_reference_model(
                capacity in 0u64..10,
                ops in prop::collection::vec(op_strategy(), 0..80)
            ) {
                let (mut cache, log) = recording_cache::<u8, ()>(capacity);
                let mut model = Model { queue: Vec::new(), capacity, evicted: Vec::new() };

                for op in &ops {
                    match *op {
                        Op::Insert(k, w) => { cache.insert(k, (), w); },
                        Op::Get(k) => { cache.get(&k); },
                        Op::Remove(k) => { cache.remove(&k); },
                    }
                    model.apply(op);

                    let expected: Vec<u8> = model.queue.iter().map(|(k, _)| *k).collect();
                    prop_assert_eq!(order(&cache), expected);
                    prop_assert_eq!(drain(&log), std::mem::take(&mut model.evicted));
                    prop_assert_eq!(cache.used_capacity(), model.used());
                    prop_assert!(cache.used_capacity() <= cache.capacity());
                    prop_assert!(cache.check_invariants().is_ok());
                }
            }

            /// Property: get never changes len or used capacity.
            #[cfg_attr(miri, ignore)]
            #[test]
            fn prop_get_preserves_accounting(
                weights in prop::collection::vec(0u64..4, 1..30),
                probes in prop::collection::vec(0usize..30, 0..30)
            ) {
                let mut cache = WeightedLruCore::new(20);
                for (i, w) in weights.iter().enumerate() {
                    cache.insert(i, (), *w);
                }
                for probe in probes {
                    let len = cache.len();
                    let used = cache.used_capacity();
                    cache.get(&probe);
                    prop_assert_eq!(cache.len(), len);
                    prop_assert_eq!(cache.used_capacity(), used);
                }
            }
        }
    }

    #[cfg(feature = "concurrency")]
    mod concurrent {
        use super::*;

        #[test]
        fn wrapper_notifies_in_eviction_order() {
            let log: EvictLog<u32> = Arc::new(Mutex::new(Vec::new()));
            let sink = Arc::clone(&log);
            let cache = ConcurrentWeightedLruCache::with_listener(3, move |key: &u32| {
                sink.lock().unwrap().push(*key);
            });

            cache.insert(1, "one", 1);
            cache.insert(2, "two", 1);
            cache.insert(3, "three", 1);
            assert_eq!(cache.get(&1), Some("one"));
            cache.insert(4, "four", 2);

            assert_eq!(drain(&log), vec![2, 3]);
            assert_eq!(cache.recency_keys(), vec![4, 1]);
            assert_eq!(cache.used_capacity(), 3);
            assert_eq!(cache.weight_of(&4), Some(2));
            assert!(cache.check_invariants().is_ok());
        }
    }
}
