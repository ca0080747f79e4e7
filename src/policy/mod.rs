//! Eviction policies.
//!
//! - [`pinned_lru`]: count-bounded LRU where pinned entries are exempt from
//!   the size limit.
//! - [`weighted_lru`]: LRU bounded by the sum of caller-supplied weights.

pub mod pinned_lru;
pub mod weighted_lru;
