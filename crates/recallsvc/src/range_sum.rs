//! Inclusive range sums over a mutable array, optionally memoized

use recallkit::{Error, KeyedCache, Result};
use tracing::trace;

/// Cache key for a range query: inclusive `(left, right)` bounds
pub type RangeKey = (usize, usize);

/// Range-sum service over an owned array.
///
/// With a cache attached, sums are memoized by `(left, right)` and every
/// update drops the cached ranges covering the written index.
pub struct RangeSumService {
    /// Backing array
    values: Vec<i64>,

    /// Memoized sums, if caching is enabled
    cache: Option<KeyedCache<RangeKey, i64>>,
}

impl RangeSumService {
    /// Create an uncached service; every query scans the array
    pub fn new(values: Vec<i64>) -> Self {
        Self { values, cache: None }
    }

    /// Create a service memoizing sums in `cache`
    pub fn with_cache(values: Vec<i64>, cache: KeyedCache<RangeKey, i64>) -> Self {
        Self {
            values,
            cache: Some(cache),
        }
    }

    /// Create a service with a fresh cache of the given capacity
    ///
    /// # Errors
    /// * [`Error::InvalidCapacity`] if `capacity` is zero
    pub fn with_capacity(values: Vec<i64>, capacity: usize) -> Result<Self> {
        Ok(Self::with_cache(values, KeyedCache::new(capacity)?))
    }

    /// Sum of `values[left..=right]`
    ///
    /// # Errors
    /// * [`Error::InvalidRange`] unless `left <= right < len`
    pub fn range_sum(&mut self, left: usize, right: usize) -> Result<i64> {
        if left > right || right >= self.values.len() {
            return Err(Error::InvalidRange {
                left,
                right,
                len: self.values.len(),
            });
        }

        let Some(cache) = self.cache.as_mut() else {
            return Ok(self.values[left..=right].iter().sum());
        };

        if let Some(&sum) = cache.get(&(left, right)) {
            return Ok(sum);
        }

        let sum = self.values[left..=right].iter().sum();
        cache.put((left, right), sum);
        Ok(sum)
    }

    /// Write `value` at `index`, dropping every cached range covering it
    ///
    /// # Errors
    /// * [`Error::IndexOutOfRange`] if `index >= len`; nothing is modified
    pub fn update(&mut self, index: usize, value: i64) -> Result<()> {
        let len = self.values.len();
        let slot = self
            .values
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange { index, len })?;
        *slot = value;

        if let Some(cache) = self.cache.as_mut() {
            let stale = cache.invalidate(|&(left, right)| left <= index && index <= right);
            trace!(index, stale, "dropped stale range sums");
        }
        Ok(())
    }

    /// Get the backing array
    pub fn values(&self) -> &[i64] {
        &self.values
    }

    /// Get the array length
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the array is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get the attached cache, if any
    pub fn cache(&self) -> Option<&KeyedCache<RangeKey, i64>> {
        self.cache.as_ref()
    }

    /// Consume the service, returning the backing array
    pub fn into_values(self) -> Vec<i64> {
        self.values
    }
}
