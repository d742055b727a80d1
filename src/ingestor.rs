use chrono::NaiveDate;
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::api::{ApiError, MarketDataProvider};
use crate::models::{Aggregate, Bar, DaySeries};
use crate::utils::{previous_business_day, to_exchange_local};

/// Fetch a ticker's minute series for `date` together with the previous close.
///
/// Returns `Ok(None)` when the API has no minute bars for the date, in which
/// case the ticker is skipped for this run.
pub async fn fetch_day_series<P>(
    provider: &P,
    ticker: &str,
    date: NaiveDate,
    timezone: &Tz,
) -> Result<Option<DaySeries>, ApiError>
where
    P: MarketDataProvider + ?Sized,
{
    let previous_date = previous_business_day(date);
    let previous_close = provider.daily_close(ticker, previous_date).await?;
    if previous_close.is_none() {
        warn!("No previous close for {} on {}", ticker, previous_date);
    }

    let aggregates = provider.minute_aggregates(ticker, date).await?;
    let bars = normalize_bars(&aggregates, date, timezone);

    if bars.is_empty() {
        warn!("No minute bars for {} on {}, skipping", ticker, date);
        return Ok(None);
    }

    debug!("{}: {} bars on {}, previous close {:?}", ticker, bars.len(), date, previous_close);

    Ok(Some(DaySeries {
        ticker: ticker.to_string(),
        date,
        previous_date,
        previous_close,
        bars,
    }))
}

/// Convert raw aggregates into exchange-local bars on `date`, ascending by time
pub fn normalize_bars(aggregates: &[Aggregate], date: NaiveDate, timezone: &Tz) -> Vec<Bar> {
    let mut bars: Vec<Bar> = aggregates
        .iter()
        .filter_map(|agg| {
            let timestamp = to_exchange_local(agg.timestamp_ms, timezone)?;
            Some(Bar {
                timestamp,
                open: agg.open,
                high: agg.high,
                low: agg.low,
                close: agg.close,
                volume: agg.volume.max(0.0).round() as u64,
            })
        })
        .filter(|bar| bar.timestamp.date() == date)
        .collect();

    bars.sort_by_key(|bar| bar.timestamp);
    bars
}
