use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tax_core::TaxYearData;

use crate::FetchError;

const USER_AGENT: &str = concat!("tax-data/", env!("CARGO_PKG_VERSION"));

/// Somewhere bracket schedules can be fetched from, one year per call.
///
/// Implementations make exactly one attempt; retrying and caching are the
/// job of [`crate::BracketDataProvider`].
#[async_trait]
pub trait BracketSource: Send + Sync {
    async fn fetch_year(
        &self,
        tax_year: i32,
    ) -> Result<TaxYearData, FetchError>;
}

#[async_trait]
impl<T: BracketSource + ?Sized> BracketSource for Arc<T> {
    async fn fetch_year(
        &self,
        tax_year: i32,
    ) -> Result<TaxYearData, FetchError> {
        (**self).fetch_year(tax_year).await
    }
}

/// Client for the upstream tax-data HTTP API.
///
/// Requests `GET {base_url}/{tax_year}` and expects
/// `{"tax_brackets": [{"min": .., "max": .., "rate": ..}, ..]}` back.
pub struct HttpBracketSource {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpBracketSource {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            http_client,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn year_url(
        &self,
        tax_year: i32,
    ) -> String {
        format!("{}/{}", self.base_url, tax_year)
    }
}

#[async_trait]
impl BracketSource for HttpBracketSource {
    async fn fetch_year(
        &self,
        tax_year: i32,
    ) -> Result<TaxYearData, FetchError> {
        let url = self.year_url(tax_year);
        tracing::debug!(tax_year, url = %url, "requesting tax brackets");

        let response = self.http_client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::from_status(status.as_u16(), body));
        }

        // Body transport failures keep their own class; only the payload
        // itself can be undecodable.
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}
