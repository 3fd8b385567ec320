//! Service configuration, loaded once at startup.
//!
//! The file is JSON unless its extension is `.toml`. Only the upstream URL
//! and the supported years are required; everything else has a default.

use std::collections::BTreeSet;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tax_data::{FetchError, RetryPolicy};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("cannot build upstream client: {0}")]
    Client(#[from] FetchError),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceConfig {
    /// Number of tax years kept in the bracket cache.
    #[serde(default = "default_cache_max_size")]
    pub cache_max_size: usize,

    pub supported_tax_years: BTreeSet<i32>,

    /// Base URL of the upstream tax-data API.
    pub tax_api_url: String,

    /// Total attempts per upstream fetch, the first one included.
    #[serde(default = "default_max_retries")]
    pub tax_api_max_retries: u32,

    #[serde(default = "default_timeout_secs")]
    pub tax_api_timeout_secs: u64,

    #[serde(default = "default_backoff_base_ms")]
    pub tax_api_backoff_base_ms: u64,

    #[serde(default = "default_backoff_max_ms")]
    pub tax_api_backoff_max_ms: u64,

    #[serde(default = "default_true")]
    pub tax_api_backoff_jitter: bool,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Log filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_cache_max_size() -> usize {
    100
}

fn default_max_retries() -> u32 {
    3
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_backoff_base_ms() -> u64 {
    1_000
}

fn default_backoff_max_ms() -> u64 {
    60_000
}

fn default_true() -> bool {
    true
}

fn default_bind_address() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ServiceConfig {
    /// Reads and validates the config file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        if is_toml {
            Self::from_toml_str(&contents)
        } else {
            Self::from_json_str(&contents)
        }
    }

    pub fn from_json_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.supported_tax_years.is_empty() {
            return Err(ConfigError::Invalid(
                "supported_tax_years must list at least one year".to_string(),
            ));
        }
        if self.tax_api_url.trim().is_empty() {
            return Err(ConfigError::Invalid("tax_api_url must not be empty".to_string()));
        }
        if self.cache_max_size == 0 {
            return Err(ConfigError::Invalid("cache_max_size must be at least 1".to_string()));
        }
        if self.tax_api_max_retries == 0 {
            return Err(ConfigError::Invalid(
                "tax_api_max_retries must be at least 1".to_string(),
            ));
        }
        if self.tax_api_backoff_base_ms > self.tax_api_backoff_max_ms {
            return Err(ConfigError::Invalid(format!(
                "tax_api_backoff_base_ms ({}) exceeds tax_api_backoff_max_ms ({})",
                self.tax_api_backoff_base_ms, self.tax_api_backoff_max_ms
            )));
        }
        Ok(())
    }

    pub fn cache_capacity(&self) -> Result<NonZeroUsize, ConfigError> {
        NonZeroUsize::new(self.cache_max_size)
            .ok_or_else(|| ConfigError::Invalid("cache_max_size must be at least 1".to_string()))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.tax_api_max_retries)
            .with_base_delay(Duration::from_millis(self.tax_api_backoff_base_ms))
            .with_max_delay(Duration::from_millis(self.tax_api_backoff_max_ms))
            .with_jitter(self.tax_api_backoff_jitter)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.tax_api_timeout_secs)
    }
}
