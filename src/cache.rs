//! Path match caching.
//!
//! This module provides [`MatchCache`], an LRU cache from a normalized path
//! to the route it matched and the parameters bound by that match. It is
//! gated behind the `cache` feature flag and uses the [`lru`] crate
//! internally.
//!
//! A [`RouteTable`](crate::RouteTable) is immutable once registered, so
//! entries never go stale for the router that owns the cache. Only
//! successful matches are stored; a path that matched nothing is looked up
//! again on the next navigation.
//!
//! [`CacheStats`] tracks hits, misses and evictions so you can monitor
//! cache effectiveness at runtime.
//!
//! # Examples
//!
//! ```
//! use view_navigator::{MatchCache, RouteParams};
//!
//! let mut cache = MatchCache::new();
//! cache.insert("/instructor/7".to_string(), 3, RouteParams::new().with("id", "7"));
//!
//! let (index, params) = cache.get("/instructor/7").unwrap();
//! assert_eq!(index, 3);
//! assert_eq!(params.get("id"), Some("7"));
//! assert_eq!(cache.stats().hits, 1);
//! ```

use crate::{debug_log, trace_log, RouteParams};
use lru::LruCache;
use std::num::NonZeroUsize;

/// Counters tracking cache hit/miss rates and evictions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of lookups answered from the cache.
    pub hits: usize,
    /// Number of lookups that fell through to the matcher.
    pub misses: usize,
    /// Number of entries pushed out by the LRU policy.
    pub evictions: usize,
}

impl CacheStats {
    /// Return the hit rate as a value in `0.0..=1.0`.
    ///
    /// Returns `0.0` if no lookups have been performed.
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// LRU cache of path match results.
///
/// Values are the route's registration index in its table plus the bound
/// parameters. Default capacity is 1000 entries.
#[derive(Debug)]
pub struct MatchCache {
    entries: LruCache<String, (usize, RouteParams)>,
    stats: CacheStats,
}

impl MatchCache {
    /// Default number of cached paths.
    pub const DEFAULT_CAPACITY: usize = 1000;

    /// Create a cache with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create a cache holding at most `capacity` paths.
    ///
    /// A capacity of zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(cap),
            stats: CacheStats::default(),
        }
    }

    /// Look up the match for a normalized path.
    ///
    /// Returns `None` on a cache miss. Updates hit/miss stats.
    pub fn get(&mut self, path: &str) -> Option<(usize, RouteParams)> {
        if let Some(entry) = self.entries.get(path) {
            self.stats.hits += 1;
            trace_log!("Match cache hit for path: '{}'", path);
            Some(entry.clone())
        } else {
            self.stats.misses += 1;
            trace_log!("Match cache miss for path: '{}'", path);
            None
        }
    }

    /// Remember the match for a normalized path.
    pub fn insert(&mut self, path: String, route_index: usize, params: RouteParams) {
        trace_log!("Caching route #{} for path '{}'", route_index, path);
        let replacing = self.entries.contains(path.as_str());
        if let Some((evicted, _)) = self.entries.push(path, (route_index, params)) {
            if !replacing {
                self.stats.evictions += 1;
                trace_log!("Evicted '{}' from match cache", evicted);
            }
        }
    }

    /// Drop every entry. Stats are kept.
    pub fn clear(&mut self) {
        let len = self.entries.len();
        self.entries.clear();
        debug_log!(
            "Match cache cleared: {} entries removed (hit rate: {:.1}%)",
            len,
            self.stats.hit_rate() * 100.0
        );
    }

    /// Return a reference to the current cache statistics.
    pub const fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Number of cached paths.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of cached paths.
    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }
}

impl Default for MatchCache {
    fn default() -> Self {
        Self::new()
    }
}
