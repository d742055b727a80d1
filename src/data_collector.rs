use chrono::NaiveDate;
use chrono_tz::Tz;
use tracing::{debug, error, info, warn};

use crate::api::{FundamentalsSource, MarketDataProvider};
use crate::ingestor::fetch_day_series;
use crate::landmarks::LandmarkCalculator;
use crate::report::ReportBuilder;

/// Counts of what happened to each ticker during a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionSummary {
    pub total: usize,
    pub with_landmarks: usize,
    pub without_data: usize,
    pub failed: usize,
    pub with_fundamentals: usize,
}

/// Runs the per-ticker pipeline: minute bars, landmarks, fundamentals
pub struct DayCollector<'a, P: ?Sized, F: ?Sized> {
    market_data: &'a P,
    fundamentals: &'a F,
    calculator: LandmarkCalculator,
    timezone: Tz,
}

impl<'a, P, F> DayCollector<'a, P, F>
where
    P: MarketDataProvider + Sync + ?Sized,
    F: FundamentalsSource + Sync + ?Sized,
{
    pub fn new(market_data: &'a P, fundamentals: &'a F, calculator: LandmarkCalculator, timezone: Tz) -> Self {
        Self {
            market_data,
            fundamentals,
            calculator,
            timezone,
        }
    }

    /// Process every ticker in order; failures are logged and counted, never fatal
    pub async fn collect(&self, tickers: &[String], date: NaiveDate) -> (ReportBuilder, CollectionSummary) {
        let mut report = ReportBuilder::new(date);
        let mut summary = CollectionSummary {
            total: tickers.len(),
            ..Default::default()
        };

        info!("📈 Collecting {} tickers for {}", tickers.len(), date);

        for (index, ticker) in tickers.iter().enumerate() {
            report.add_ticker(ticker);
            debug!("{}/{}: {}", index + 1, tickers.len(), ticker);

            self.collect_landmarks(ticker, date, &mut report, &mut summary).await;

            match self.fundamentals.fetch_fundamentals(ticker).await {
                Ok(row) => {
                    if row.missing_count() > 0 {
                        warn!("{}: {} fundamentals fields missing", ticker, row.missing_count());
                    }
                    report.set_fundamentals(ticker, row);
                    summary.with_fundamentals += 1;
                }
                Err(e) => {
                    error!("Error fetching data for {}: {}", ticker, e);
                }
            }

            if (index + 1) % 25 == 0 {
                info!("📊 Progress: {}/{} tickers processed", index + 1, tickers.len());
            }
        }

        info!(
            "✅ Collection finished: {} with landmarks, {} without data, {} failed, {} with fundamentals",
            summary.with_landmarks, summary.without_data, summary.failed, summary.with_fundamentals
        );

        (report, summary)
    }

    async fn collect_landmarks(
        &self,
        ticker: &str,
        date: NaiveDate,
        report: &mut ReportBuilder,
        summary: &mut CollectionSummary,
    ) {
        let series = match fetch_day_series(self.market_data, ticker, date, &self.timezone).await {
            Ok(Some(series)) => series,
            Ok(None) => {
                summary.without_data += 1;
                return;
            }
            Err(e) => {
                error!("❌ {}: market data request failed - {}", ticker, e);
                summary.failed += 1;
                return;
            }
        };

        match self.calculator.compute(&series) {
            Ok(row) => {
                report.set_landmarks(row);
                summary.with_landmarks += 1;
            }
            Err(e) => {
                error!("❌ {}: {}", ticker, e);
                summary.failed += 1;
            }
        }

        report.set_bars(ticker, series.bars);
    }
}
