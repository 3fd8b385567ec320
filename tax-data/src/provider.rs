//! Cache-then-retry access to upstream bracket data.

use std::sync::Arc;

use tax_core::TaxYearData;

use crate::{BracketSource, FetchError, RetryPolicy, TaxDataCache};

/// Serves bracket schedules from the cache, falling back to the upstream
/// source under a retry policy on a miss.
///
/// Only a fetch that succeeded and decoded is cached. Two concurrent misses
/// for the same year may both go upstream; the later insert simply replaces
/// the earlier one.
pub struct BracketDataProvider<S> {
    source: S,
    cache: TaxDataCache,
    retry: RetryPolicy,
}

impl<S: BracketSource> BracketDataProvider<S> {
    pub fn new(
        source: S,
        cache: TaxDataCache,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            source,
            cache,
            retry,
        }
    }

    /// Returns the bracket schedule for `tax_year`.
    ///
    /// # Errors
    ///
    /// * [`FetchError::Client`] or [`FetchError::Decode`] straight away when
    ///   the upstream answer cannot improve with another try.
    /// * [`FetchError::Exhausted`] when every allowed attempt failed
    ///   transiently.
    pub async fn fetch(
        &self,
        tax_year: i32,
    ) -> Result<Arc<TaxYearData>, FetchError> {
        if let Some(cached) = self.cache.get(tax_year) {
            tracing::debug!(tax_year, "tax data cache hit");
            return Ok(cached);
        }

        tracing::info!(tax_year, "cache miss, calling the tax data API");

        let data = self
            .retry
            .run(|_| self.source.fetch_year(tax_year))
            .await
            .inspect_err(|e| match e.status() {
                Some(status) => {
                    tracing::error!(tax_year, status, "failed to fetch tax data due to an HTTP error: {e}")
                }
                None => {
                    tracing::error!(tax_year, "failed to fetch tax data due to a network-related error: {e}")
                }
            })?;

        let data = Arc::new(data);
        self.cache.insert(tax_year, Arc::clone(&data));

        Ok(data)
    }

    pub fn cache(&self) -> &TaxDataCache {
        &self.cache
    }
}
