//! Bounded, least-recently-used cache of fetched bracket schedules.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;
use tax_core::TaxYearData;

/// Year-keyed LRU cache shared by concurrent requests.
///
/// Entries never expire on their own; they leave only when a newer year
/// pushes the least-recently-used one out. The lock is held only for the
/// duration of a single map operation.
pub struct TaxDataCache {
    entries: Mutex<LruCache<i32, Arc<TaxYearData>>>,
}

impl TaxDataCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Looks up `tax_year`, marking it most recently used on a hit.
    pub fn get(
        &self,
        tax_year: i32,
    ) -> Option<Arc<TaxYearData>> {
        self.entries.lock().get(&tax_year).cloned()
    }

    /// Stores `data` under `tax_year`.
    ///
    /// Returns the year that was evicted to make room, if any. Replacing an
    /// existing entry for the same year evicts nothing.
    pub fn insert(
        &self,
        tax_year: i32,
        data: Arc<TaxYearData>,
    ) -> Option<i32> {
        let evicted = self.entries.lock().push(tax_year, data);

        match evicted {
            Some((year, _)) if year != tax_year => {
                tracing::debug!(evicted = year, inserted = tax_year, "evicted tax year from cache");
                Some(year)
            }
            _ => None,
        }
    }

    /// Whether `tax_year` is cached, without touching its recency.
    pub fn contains(
        &self,
        tax_year: i32,
    ) -> bool {
        self.entries.lock().contains(&tax_year)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
