pub use crate::builder::{PinnedLruBuilder, WeightedLruBuilder};
pub use crate::error::{CacheError, ConfigError, InvariantError};
pub use crate::policy::pinned_lru::PinnedLruCore;
pub use crate::policy::weighted_lru::WeightedLruCore;
pub use crate::stats::{PinnedLruStats, WeightedLruStats};
pub use crate::traits::{CoreCache, EvictionListener, SharedListener};

#[cfg(feature = "concurrency")]
pub use crate::policy::pinned_lru::ConcurrentPinnedLruCache;
#[cfg(feature = "concurrency")]
pub use crate::policy::weighted_lru::ConcurrentWeightedLruCache;
