use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use super::FundamentalsSource;
use crate::fundamentals::parse_fundamentals;
use crate::models::{Config, FundamentalsRow};

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Failure to retrieve the quote page for a ticker
#[derive(Debug, Error)]
pub enum FundamentalsError {
    #[error("Failed to fetch the webpage. Status code: {0}")]
    Status(u16),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Fetches quote pages and extracts the fundamentals table
pub struct FinvizClient {
    client: Client,
    base_url: String,
}

impl FinvizClient {
    pub fn new(config: &Config) -> Result<Self, FundamentalsError> {
        Self::build(&config.fundamentals_base_url, config.request_timeout)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, FundamentalsError> {
        Self::build(base_url, Duration::from_secs(30))
    }

    fn build(base_url: &str, timeout: Duration) -> Result<Self, FundamentalsError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(BROWSER_USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Download the raw quote page for a ticker
    pub async fn fetch_page(&self, ticker: &str) -> Result<String, FundamentalsError> {
        let url = format!("{}/quote.ashx", self.base_url);
        debug!("Fetching quote page for {}", ticker);

        let response = self.client.get(&url).query(&[("t", ticker)]).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FundamentalsError::Status(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl FundamentalsSource for FinvizClient {
    async fn fetch_fundamentals(&self, ticker: &str) -> Result<FundamentalsRow, FundamentalsError> {
        let page = self.fetch_page(ticker).await?;
        Ok(parse_fundamentals(&page))
    }
}
