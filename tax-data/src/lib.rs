//! Upstream access to tax bracket data.
//!
//! [`BracketDataProvider`] answers from a bounded [`TaxDataCache`] when it
//! can and otherwise asks a [`BracketSource`] (normally the
//! [`HttpBracketSource`]) under a [`RetryPolicy`]. Failures are typed by
//! [`FetchError`], whose variants decide whether a retry is worth it.

pub mod cache;
pub mod error;
pub mod provider;
pub mod retry;
pub mod source;

pub use cache::TaxDataCache;
pub use error::FetchError;
pub use provider::BracketDataProvider;
pub use retry::RetryPolicy;
pub use source::{BracketSource, HttpBracketSource};
