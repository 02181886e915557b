//! Cache Statistics Module
//!
//! Tracks read and write outcomes of a cache store.

// == Cache Stats ==
/// Counters for one `CacheStore` instance since it was created.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Reads that returned a stored value
    pub hits: u64,
    /// Reads that found no row or an expired one
    pub misses: u64,
    /// Rows removed because they were read or swept after their deadline
    pub expirations: u64,
    /// Storage operations that failed and were reported through return values
    pub storage_failures: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Expirations ==
    /// Adds `count` removed expired rows to the expiration counter.
    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }

    // == Record Storage Failure ==
    /// Increments the storage failure counter.
    pub fn record_storage_failure(&mut self) {
        self.storage_failures += 1;
    }
}
