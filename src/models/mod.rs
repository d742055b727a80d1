use anyhow::{anyhow, Context};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use chrono_tz::Tz;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Placeholder written for fundamentals that could not be found on the page
pub const MISSING_PLACEHOLDER: &str = "###";

/// One minute of OHLCV data in exchange-local time
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Raw aggregate as returned by the market-data API
#[derive(Debug, Clone, Deserialize)]
pub struct Aggregate {
    #[serde(rename = "t")]
    pub timestamp_ms: i64,
    #[serde(rename = "o")]
    pub open: f64,
    #[serde(rename = "h")]
    pub high: f64,
    #[serde(rename = "l")]
    pub low: f64,
    #[serde(rename = "c")]
    pub close: f64,
    #[serde(rename = "v")]
    pub volume: f64,
}

/// Envelope of the aggregates endpoints
#[derive(Debug, Deserialize)]
pub struct AggregatesResponse {
    pub results: Option<Vec<Aggregate>>,
}

#[derive(Debug, Deserialize)]
pub struct TickerReference {
    pub ticker: String,
}

/// One page of the ticker reference list
#[derive(Debug, Deserialize)]
pub struct TickerPage {
    #[serde(default)]
    pub results: Vec<TickerReference>,
    pub next_url: Option<String>,
}

/// A ticker's normalized minute series for one trading day
#[derive(Debug, Clone)]
pub struct DaySeries {
    pub ticker: String,
    pub date: NaiveDate,
    pub previous_date: NaiveDate,
    pub previous_close: Option<f64>,
    pub bars: Vec<Bar>,
}

/// A price together with the timestamp of the bar that produced it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub price: f64,
    pub time: NaiveDateTime,
}

/// Closed local-clock interval used to slice a day's bars
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl DayWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }
}

/// Window boundaries used by the landmark calculator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionWindows {
    pub pre_market: DayWindow,
    pub regular: DayWindow,
    pub extended: DayWindow,
    pub open_bell: NaiveTime,
    pub close_bell: NaiveTime,
}

impl SessionWindows {
    /// Span from the start of pre-market through the end of the regular session
    pub fn pre_market_through_close(&self) -> DayWindow {
        DayWindow::new(self.pre_market.start, self.regular.end)
    }
}

impl Default for SessionWindows {
    fn default() -> Self {
        Self {
            pre_market: DayWindow::new(hm(4, 0), hm(9, 29)),
            regular: DayWindow::new(hm(9, 29), hm(16, 0)),
            extended: DayWindow::new(hm(4, 0), hm(19, 0)),
            open_bell: hm(9, 30),
            close_bell: hm(16, 0),
        }
    }
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

/// Derived statistics for one ticker on one trading day
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkRow {
    pub ticker: String,
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub previous_close: Option<f64>,
    pub pm_high: Option<PricePoint>,
    pub pm_volume_to_high: Option<u64>,
    pub pm_low_post_high: Option<PricePoint>,
    pub pm_volume: Option<u64>,
    pub open_price: Option<f64>,
    pub open_1min_volume: Option<u64>,
    pub open_2min_volume: Option<u64>,
    pub volume_pm_to_intraday_high: Option<u64>,
    pub volume_open_to_intraday_high: Option<u64>,
    pub gap_price: Option<PricePoint>,
    pub hod: Option<PricePoint>,
    pub hod_percent: Option<f64>,
    pub hod_1min_volume: Option<u64>,
    pub lod_pre_high: Option<PricePoint>,
    pub lod_post_high: Option<PricePoint>,
    pub eod_price: Option<f64>,
    pub eod_percent: Option<f64>,
    pub total_volume: Option<u64>,
}

/// A scraped value, or the marker that the label was absent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Found(String),
    Missing,
}

impl FieldValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Found(value) => f.write_str(value),
            FieldValue::Missing => f.write_str(MISSING_PLACEHOLDER),
        }
    }
}

/// Fundamentals scraped from the quote page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundamentalsRow {
    pub market_cap: FieldValue,
    pub float: FieldValue,
    pub short_float: FieldValue,
    pub shares_outstanding: FieldValue,
    pub institutional_ownership: FieldValue,
    pub insider_ownership: FieldValue,
}

impl FundamentalsRow {
    pub fn fields(&self) -> [&FieldValue; 6] {
        [
            &self.market_cap,
            &self.float,
            &self.short_float,
            &self.shares_outstanding,
            &self.institutional_ownership,
            &self.insider_ownership,
        ]
    }

    pub fn missing_count(&self) -> usize {
        self.fields().iter().filter(|f| f.is_missing()).count()
    }
}

/// How the user wants tickers selected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickerSelection {
    All,
    Explicit(Vec<String>),
}

/// Configuration for the application
#[derive(Debug, Clone)]
pub struct Config {
    pub polygon_api_key: String,
    pub polygon_base_url: String,
    pub fundamentals_base_url: String,
    pub exchange_timezone: Tz,
    pub output_path: PathBuf,
    pub max_retries: u32,
    pub retry_base_delay: Duration,
    pub request_timeout: Duration,
    pub ticker_page_limit: u32,
    pub windows: SessionWindows,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup
    pub fn from_lookup<L>(lookup: L) -> anyhow::Result<Self>
    where
        L: Fn(&str) -> Option<String>,
    {
        let vars = EnvVars { lookup };

        let timezone_name = vars.string("EXCHANGE_TIMEZONE", "America/New_York");
        let exchange_timezone: Tz = timezone_name
            .parse()
            .map_err(|e| anyhow!("Invalid EXCHANGE_TIMEZONE '{}': {}", timezone_name, e))?;

        let defaults = SessionWindows::default();
        let windows = SessionWindows {
            pre_market: DayWindow::new(
                vars.time("PREMARKET_START", defaults.pre_market.start)?,
                vars.time("PREMARKET_END", defaults.pre_market.end)?,
            ),
            regular: DayWindow::new(
                vars.time("SESSION_START", defaults.regular.start)?,
                vars.time("SESSION_END", defaults.regular.end)?,
            ),
            extended: DayWindow::new(
                vars.time("EXTENDED_START", defaults.extended.start)?,
                vars.time("EXTENDED_END", defaults.extended.end)?,
            ),
            open_bell: vars.time("OPEN_BELL", defaults.open_bell)?,
            close_bell: vars.time("CLOSE_BELL", defaults.close_bell)?,
        };

        Ok(Config {
            polygon_api_key: (vars.lookup)("POLYGON_API_KEY")
                .ok_or_else(|| anyhow!("POLYGON_API_KEY environment variable required"))?,
            polygon_base_url: vars.string("POLYGON_BASE_URL", "https://api.polygon.io"),
            fundamentals_base_url: vars.string("FUNDAMENTALS_BASE_URL", "https://finviz.com"),
            exchange_timezone,
            output_path: vars.string("OUTPUT_PATH", "Updated_Stock_Data.xlsx").into(),
            max_retries: vars.parse("MAX_RETRIES", 5),
            retry_base_delay: Duration::from_millis(vars.parse("RETRY_BASE_DELAY_MS", 1000)),
            request_timeout: Duration::from_secs(vars.parse("REQUEST_TIMEOUT_SECS", 30)),
            ticker_page_limit: vars.parse("TICKER_PAGE_LIMIT", 1000),
            windows,
        })
    }
}

struct EnvVars<L> {
    lookup: L,
}

impl<L: Fn(&str) -> Option<String>> EnvVars<L> {
    fn string(&self, key: &str, default: &str) -> String {
        (self.lookup)(key).unwrap_or_else(|| default.to_string())
    }

    fn parse<T: std::str::FromStr>(&self, key: &str, default: T) -> T {
        (self.lookup)(key)
            .and_then(|s| s.parse().ok())
            .unwrap_or(default)
    }

    fn time(&self, key: &str, default: NaiveTime) -> anyhow::Result<NaiveTime> {
        match (self.lookup)(key) {
            Some(value) => NaiveTime::parse_from_str(value.trim(), "%H:%M")
                .with_context(|| format!("{} must be HH:MM, got '{}'", key, value)),
            None => Ok(default),
        }
    }
}
