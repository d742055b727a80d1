use async_trait::async_trait;
use chrono::NaiveDate;
use std::time::Duration;
use thiserror::Error;

use crate::models::{Aggregate, FundamentalsRow};

pub mod finviz_client;
pub mod polygon_client;
pub use finviz_client::{FinvizClient, FundamentalsError};
pub use polygon_client::PolygonClient;

/// Errors raised by the market-data client
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed with status {status}")]
    Http { status: u16, url: String },
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Exponential backoff applied to rate-limited requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self { max_retries, base_delay }
    }

    /// Total requests to make; at least one even when `max_retries` is 0
    pub fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }

    /// Delay before the attempt following `attempt` (1-based): `base * 2^attempt`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(1))
    }
}

/// Source of minute bars, daily closes and the ticker universe
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataProvider {
    /// Minute aggregates for one calendar date
    async fn minute_aggregates(&self, ticker: &str, date: NaiveDate) -> Result<Vec<Aggregate>, ApiError>;

    /// Closing price of the daily aggregate for `date`, if the API has one
    async fn daily_close(&self, ticker: &str, date: NaiveDate) -> Result<Option<f64>, ApiError>;

    /// Every ticker in the reference list, in API order
    async fn list_tickers(&self) -> Result<Vec<String>, ApiError>;
}

/// Source of per-ticker fundamentals
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FundamentalsSource {
    async fn fetch_fundamentals(&self, ticker: &str) -> Result<FundamentalsRow, FundamentalsError>;
}
