use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use super::{ApiError, MarketDataProvider, RetryPolicy};
use crate::models::{Aggregate, AggregatesResponse, Config, TickerPage};

/// Client for the Polygon-style aggregates and reference endpoints
pub struct PolygonClient {
    client: Client,
    base_url: String,
    api_key: String,
    retry: RetryPolicy,
    page_limit: u32,
}

impl PolygonClient {
    /// Create a new client from the application configuration
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent("intraday-landmarks/0.1")
            .build()?;

        Ok(Self {
            client,
            base_url: config.polygon_base_url.trim_end_matches('/').to_string(),
            api_key: config.polygon_api_key.clone(),
            retry: RetryPolicy::new(config.max_retries, config.retry_base_delay),
            page_limit: config.ticker_page_limit,
        })
    }

    /// Create a client against an arbitrary base URL
    pub fn with_base_url(base_url: &str, api_key: &str, retry: RetryPolicy) -> Result<Self, ApiError> {
        Ok(Self {
            client: Client::builder().build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            retry,
            page_limit: 1000,
        })
    }

    fn aggregates_url(&self, ticker: &str, timespan: &str, date: NaiveDate) -> String {
        let day = date.format("%Y-%m-%d");
        format!(
            "{}/v2/aggs/ticker/{}/range/1/{}/{}/{}",
            self.base_url, ticker, timespan, day, day
        )
    }

    /// GET a JSON document, retrying on HTTP 429.
    ///
    /// Returns `Ok(None)` once every attempt has been rate limited. Any other
    /// non-success status is returned as [`ApiError::Http`] without retrying.
    pub async fn get_json_with_retry(&self, url: &str, query: &[(&str, String)]) -> Result<Option<Value>, ApiError> {
        let attempts = self.retry.attempts();
        for attempt in 1..=attempts {
            debug!("Making request to: {} (attempt {})", url, attempt);

            let response = self
                .client
                .get(url)
                .query(&[("apiKey", self.api_key.as_str())])
                .query(query)
                .send()
                .await?;

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                if attempt < attempts {
                    let wait = self.retry.delay_for(attempt);
                    warn!("Rate limit exceeded. Retrying in {:?}...", wait);
                    tokio::time::sleep(wait).await;
                }
                continue;
            }

            if !status.is_success() {
                return Err(ApiError::Http {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }

            return Ok(Some(response.json::<Value>().await?));
        }

        warn!("⚠️ Giving up on {} after {} rate-limited attempts", url, attempts);
        Ok(None)
    }

    async fn fetch_aggregates(&self, url: &str) -> Result<Vec<Aggregate>, ApiError> {
        let Some(body) = self.get_json_with_retry(url, &[]).await? else {
            return Ok(Vec::new());
        };

        let response: AggregatesResponse = serde_json::from_value(body)
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;

        Ok(response.results.unwrap_or_default())
    }

    /// `next_url` links come back without the API key; the key is re-attached per request
    fn next_page_url(&self, next_url: &str) -> Result<String, ApiError> {
        let parsed = Url::parse(next_url)
            .map_err(|e| ApiError::InvalidResponse(format!("bad next_url '{}': {}", next_url, e)))?;
        Ok(parsed.to_string())
    }
}

#[async_trait]
impl MarketDataProvider for PolygonClient {
    async fn minute_aggregates(&self, ticker: &str, date: NaiveDate) -> Result<Vec<Aggregate>, ApiError> {
        let url = self.aggregates_url(ticker, "minute", date);
        let aggregates = self.fetch_aggregates(&url).await?;

        if aggregates.is_empty() {
            warn!("No minute-level data found for {} on {}", ticker, date);
        } else {
            debug!("Retrieved {} minute bars for {} on {}", aggregates.len(), ticker, date);
        }
        Ok(aggregates)
    }

    async fn daily_close(&self, ticker: &str, date: NaiveDate) -> Result<Option<f64>, ApiError> {
        let url = self.aggregates_url(ticker, "day", date);
        let aggregates = self.fetch_aggregates(&url).await?;

        match aggregates.first() {
            Some(day) => Ok(Some(day.close)),
            None => {
                warn!("No daily data found for {} on {}", ticker, date);
                Ok(None)
            }
        }
    }

    async fn list_tickers(&self) -> Result<Vec<String>, ApiError> {
        let mut tickers = Vec::new();
        let mut next_url = Some(format!("{}/v3/reference/tickers", self.base_url));
        let mut first_page = true;

        while let Some(url) = next_url.take() {
            let query = if first_page {
                vec![("limit", self.page_limit.to_string())]
            } else {
                Vec::new()
            };
            first_page = false;

            let body = match self.get_json_with_retry(&url, &query).await {
                Ok(Some(body)) => body,
                Ok(None) => break,
                Err(e) => {
                    warn!("Failed to fetch ticker page: {}", e);
                    break;
                }
            };

            let page: TickerPage = match serde_json::from_value(body) {
                Ok(page) => page,
                Err(e) => {
                    warn!("Malformed ticker page from {}: {}", url, e);
                    break;
                }
            };
            tickers.extend(page.results.into_iter().map(|r| r.ticker));

            next_url = match page.next_url.map(|link| self.next_page_url(&link)) {
                Some(Ok(link)) => Some(link),
                Some(Err(e)) => {
                    warn!("Stopping pagination: {}", e);
                    None
                }
                None => None,
            };
        }

        info!("📋 Collected {} tickers from the reference list", tickers.len());
        Ok(tickers)
    }
}
