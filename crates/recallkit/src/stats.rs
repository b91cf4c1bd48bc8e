//! Engine statistics tracking

/// Statistics for [`KeyedCache`](crate::KeyedCache) performance tracking
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    hits: u64,
    misses: u64,
    inserts: u64,
    evictions: u64,
    invalidations: u64,
}

impl CacheStats {
    /// Create new stats tracker
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub(crate) fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub(crate) fn record_insert(&mut self) {
        self.inserts += 1;
    }

    pub(crate) fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub(crate) fn record_invalidations(&mut self, count: usize) {
        self.invalidations += count as u64;
    }

    /// Get total hits
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Get total misses
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Get total inserts of previously absent keys
    pub fn inserts(&self) -> u64 {
        self.inserts
    }

    /// Get total evictions
    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    /// Get total entries removed by predicate invalidation
    pub fn invalidations(&self) -> u64 {
        self.invalidations
    }

    /// Calculate hit ratio (0.0 to 1.0)
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Reset all statistics
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Statistics for [`AdjustingTree`](crate::AdjustingTree) access tracking
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TreeStats {
    searches: u64,
    hits: u64,
    inserts: u64,
    updates: u64,
    rotations: u64,
}

impl TreeStats {
    /// Create new stats tracker
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_search(&mut self, hit: bool) {
        self.searches += 1;
        if hit {
            self.hits += 1;
        }
    }

    pub(crate) fn record_insert(&mut self) {
        self.inserts += 1;
    }

    pub(crate) fn record_update(&mut self) {
        self.updates += 1;
    }

    pub(crate) fn record_rotations(&mut self, count: u64) {
        self.rotations += count;
    }

    /// Get total searches
    pub fn searches(&self) -> u64 {
        self.searches
    }

    /// Get searches that found their key
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Get inserts that created a node
    pub fn inserts(&self) -> u64 {
        self.inserts
    }

    /// Get inserts that overwrote an existing key
    pub fn updates(&self) -> u64 {
        self.updates
    }

    /// Get total single rotations performed while splaying, counted as a
    /// bottom-up splay would: one per zig, two per zig-zig or zig-zag
    pub fn rotations(&self) -> u64 {
        self.rotations
    }

    /// Reset all statistics
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
