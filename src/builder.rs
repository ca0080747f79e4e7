//! Builders for the two cache policies.
//!
//! Both builders carry a bound and an optional eviction listener, and produce
//! either the single-threaded core or, with the `concurrency` feature, the
//! mutex-wrapped cache.
//!
//! ## Example
//!
//! ```rust
//! use pincache::builder::PinnedLruBuilder;
//!
//! let mut cache = PinnedLruBuilder::new(2)
//!     .on_evict(|key: &u64| println!("evicted {key}"))
//!     .build::<String>();
//! cache.insert(1, "one".to_string());
//! cache.pin(&1);
//! assert_eq!(cache.is_pinned(&1), Ok(true));
//! ```
//!
//! `build()` accepts any bound, including zero, exactly like the cores' own
//! constructors. `try_build()` rejects a zero bound with a [`ConfigError`].

use std::hash::Hash;
use std::sync::Arc;

use crate::error::ConfigError;
#[cfg(feature = "concurrency")]
use crate::policy::pinned_lru::ConcurrentPinnedLruCache;
use crate::policy::pinned_lru::PinnedLruCore;
#[cfg(feature = "concurrency")]
use crate::policy::weighted_lru::ConcurrentWeightedLruCache;
use crate::policy::weighted_lru::WeightedLruCore;
use crate::traits::{EvictionListener, SharedListener};

/// Builder for [`PinnedLruCore`] and its concurrent wrapper.
pub struct PinnedLruBuilder<K> {
    size: usize,
    listener: Option<SharedListener<K>>,
}

impl<K> PinnedLruBuilder<K>
where
    K: Eq + Hash + Clone,
{
    /// Starts a builder for a cache holding at most `size` unpinned entries.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            listener: None,
        }
    }

    /// Reports evicted keys to `listener`.
    pub fn on_evict<L>(mut self, listener: L) -> Self
    where
        L: EvictionListener<K> + 'static,
    {
        self.listener = Some(Arc::new(listener));
        self
    }

    /// Shares an existing listener handle, e.g. across several caches.
    pub fn with_listener(mut self, listener: SharedListener<K>) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn build<V>(self) -> PinnedLruCore<K, V> {
        PinnedLruCore::with_shared_listener(self.size, self.listener)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError`] if the size is zero.
    pub fn try_build<V>(self) -> Result<PinnedLruCore<K, V>, ConfigError> {
        self.validate()?;
        Ok(self.build())
    }

    #[cfg(feature = "concurrency")]
    pub fn build_concurrent<V>(self) -> ConcurrentPinnedLruCache<K, V> {
        ConcurrentPinnedLruCache::with_shared_listener(self.size, self.listener)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.size == 0 {
            return Err(ConfigError::new("cache size must be greater than zero"));
        }
        Ok(())
    }
}

/// Builder for [`WeightedLruCore`] and its concurrent wrapper.
pub struct WeightedLruBuilder<K> {
    capacity: u64,
    listener: Option<SharedListener<K>>,
}

impl<K> WeightedLruBuilder<K>
where
    K: Eq + Hash + Clone,
{
    /// Starts a builder for a cache whose entry weights sum to at most
    /// `capacity`.
    pub fn new(capacity: u64) -> Self {
        Self {
            capacity,
            listener: None,
        }
    }

    pub fn on_evict<L>(mut self, listener: L) -> Self
    where
        L: EvictionListener<K> + 'static,
    {
        self.listener = Some(Arc::new(listener));
        self
    }

    pub fn with_listener(mut self, listener: SharedListener<K>) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn build<V>(self) -> WeightedLruCore<K, V> {
        WeightedLruCore::with_shared_listener(self.capacity, self.listener)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError`] if the capacity is zero.
    pub fn try_build<V>(self) -> Result<WeightedLruCore<K, V>, ConfigError> {
        self.validate()?;
        Ok(self.build())
    }

    #[cfg(feature = "concurrency")]
    pub fn build_concurrent<V>(self) -> ConcurrentWeightedLruCache<K, V> {
        ConcurrentWeightedLruCache::with_shared_listener(self.capacity, self.listener)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::new("cache capacity must be greater than zero"));
        }
        Ok(())
    }
}
