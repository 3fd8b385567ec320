//! HTTP front end of the tax calculator.
//!
//! One endpoint, `GET /calculate-tax`, validates its query, pulls the
//! year's brackets through the shared [`BracketDataProvider`] and answers
//! with the computed [`tax_core::TaxResult`].

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::Router;
use tax_data::{BracketDataProvider, BracketSource, HttpBracketSource, TaxDataCache};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod logging;
pub mod utils;

pub use config::{ConfigError, ServiceConfig};

/// Provider behind the endpoint; the source is boxed so tests can swap in
/// their own.
pub type SharedProvider = Arc<BracketDataProvider<Arc<dyn BracketSource>>>;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub provider: SharedProvider,
    pub supported_years: Arc<BTreeSet<i32>>,
}

impl AppState {
    pub fn new(
        provider: SharedProvider,
        supported_years: BTreeSet<i32>,
    ) -> Self {
        Self {
            provider,
            supported_years: Arc::new(supported_years),
        }
    }

    /// Wires the HTTP upstream client, cache and retry policy described by
    /// `config`.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ConfigError> {
        let source: Arc<dyn BracketSource> = Arc::new(HttpBracketSource::new(
            &config.tax_api_url,
            config.request_timeout(),
        )?);

        let provider = BracketDataProvider::new(
            source,
            TaxDataCache::new(config.cache_capacity()?),
            config.retry_policy(),
        );

        Ok(Self::new(Arc::new(provider), config.supported_tax_years.clone()))
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/calculate-tax", get(api::calculate_tax))
        .layer(CatchPanicLayer::custom(api::panic_response))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
