//! Daily landmark statistics over a single day's minute bars.
//!
//! All windows are closed local-clock intervals taken from [`SessionWindows`].
//! Bars are assumed to be sorted ascending and to share one calendar date, so
//! every window maps onto a contiguous slice of the series. A statistic whose
//! window holds no bars is reported as `None`.

use chrono::{Datelike, NaiveTime};
use thiserror::Error;

use crate::models::{Bar, DaySeries, DayWindow, LandmarkRow, PricePoint, SessionWindows};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LandmarkError {
    #[error("no bars for {ticker} on {date}")]
    EmptySeries { ticker: String, date: String },
}

/// Computes a [`LandmarkRow`] from a [`DaySeries`]
#[derive(Debug, Clone, Default)]
pub struct LandmarkCalculator {
    windows: SessionWindows,
}

impl LandmarkCalculator {
    pub fn new(windows: SessionWindows) -> Self {
        Self { windows }
    }

    pub fn windows(&self) -> &SessionWindows {
        &self.windows
    }

    pub fn compute(&self, series: &DaySeries) -> Result<LandmarkRow, LandmarkError> {
        let bars = series.bars.as_slice();
        if bars.is_empty() {
            return Err(LandmarkError::EmptySeries {
                ticker: series.ticker.clone(),
                date: series.date.to_string(),
            });
        }

        let w = &self.windows;

        // Pre-market
        let pre_market = window_slice(bars, &w.pre_market);
        let pm_peak = first_max_high(pre_market);
        let pm_high = pm_peak.map(|i| high_point(&pre_market[i]));
        let pm_volume_to_high = pm_peak.map(|i| volume_through(pre_market, i));
        let pm_volume = non_empty(pre_market).map(total_volume);

        // Opening bars
        let open_index = first_at_or_after(bars, w.open_bell);
        let open_bar = open_index.map(|i| &bars[i]);
        let next_bar = open_index.and_then(|i| bars.get(i + 1));
        let open_price = open_bar.map(|b| b.open);
        let open_1min_volume = open_bar.map(|b| b.volume);
        let open_2min_volume = open_bar.zip(next_bar).map(|(a, b)| a.volume + b.volume);

        // Volume into the intraday high
        let volume_pm_to_intraday_high = volume_to_peak(window_slice(bars, &w.pre_market_through_close()));
        let regular = window_slice(bars, &w.regular);
        let volume_open_to_intraday_high = volume_to_peak(regular);

        // Gap target from the first two regular-session minutes
        let gap_price = match (open_bar, series.previous_close) {
            (Some(first), Some(previous_close)) => {
                let peak = match next_bar {
                    Some(second) if second.high > first.high => second,
                    _ => first,
                };
                Some(PricePoint {
                    price: peak.high + 0.5 * (first.open - previous_close),
                    time: peak.timestamp,
                })
            }
            _ => None,
        };

        // High of day
        let hod_in_regular = first_max_high(regular);
        let hod_bar = hod_in_regular.map(|i| &regular[i]);
        let hod = hod_bar.map(high_point);
        let hod_1min_volume = hod_bar.map(|b| b.volume);
        let hod_percent = hod.zip(open_price).and_then(|(h, open)| percent_change(open, h.price));

        // Lows either side of the PM high, over the whole day
        let pm_high_index = pm_peak.map(|i| index_in(bars, &pre_market[i]));
        let lod_pre_high = pm_high_index.and_then(|i| first_min_low(&bars[..i]).map(|j| low_point(&bars[j])));
        let lod_post_high = pm_high_index.and_then(|i| first_min_low(&bars[i..]).map(|j| low_point(&bars[i + j])));
        let pm_low_post_high = lod_post_high;

        // End of day
        let eod_price = first_at_or_after(bars, w.close_bell).map(|i| bars[i].open);
        let eod_percent = eod_price.zip(open_price).and_then(|(eod, open)| percent_change(open, eod));

        let total_volume = non_empty(window_slice(bars, &w.extended)).map(total_volume);

        Ok(LandmarkRow {
            ticker: series.ticker.clone(),
            date: series.date,
            weekday: series.date.weekday(),
            previous_close: series.previous_close,
            pm_high,
            pm_volume_to_high,
            pm_low_post_high,
            pm_volume,
            open_price,
            open_1min_volume,
            open_2min_volume,
            volume_pm_to_intraday_high,
            volume_open_to_intraday_high,
            gap_price,
            hod,
            hod_percent,
            hod_1min_volume,
            lod_pre_high,
            lod_post_high,
            eod_price,
            eod_percent,
            total_volume,
        })
    }
}

/// Contiguous run of bars whose local time falls inside `window`
pub fn window_slice<'a>(bars: &'a [Bar], window: &DayWindow) -> &'a [Bar] {
    let start = bars.partition_point(|b| b.timestamp.time() < window.start);
    let end = bars.partition_point(|b| b.timestamp.time() <= window.end);
    if start >= end {
        &[]
    } else {
        &bars[start..end]
    }
}

/// Index of the first bar attaining the highest high
pub fn first_max_high(bars: &[Bar]) -> Option<usize> {
    bars.iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, bar)| match best {
            Some((_, high)) if bar.high <= high => best,
            _ => Some((i, bar.high)),
        })
        .map(|(i, _)| i)
}

/// Index of the first bar attaining the lowest low
pub fn first_min_low(bars: &[Bar]) -> Option<usize> {
    bars.iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, bar)| match best {
            Some((_, low)) if bar.low >= low => best,
            _ => Some((i, bar.low)),
        })
        .map(|(i, _)| i)
}

/// Volume from the first bar through `index`, inclusive
pub fn volume_through(bars: &[Bar], index: usize) -> u64 {
    bars[..=index].iter().map(|b| b.volume).sum()
}

/// Volume from the start of `bars` through its highest-high bar
pub fn volume_to_peak(bars: &[Bar]) -> Option<u64> {
    first_max_high(bars).map(|i| volume_through(bars, i))
}

fn first_at_or_after(bars: &[Bar], time: NaiveTime) -> Option<usize> {
    let index = bars.partition_point(|b| b.timestamp.time() < time);
    (index < bars.len()).then_some(index)
}

fn total_volume(bars: &[Bar]) -> u64 {
    bars.iter().map(|b| b.volume).sum()
}

fn non_empty(bars: &[Bar]) -> Option<&[Bar]> {
    (!bars.is_empty()).then_some(bars)
}

// `bar` must be an element of `bars`; windows are sub-slices of the day
fn index_in(bars: &[Bar], bar: &Bar) -> usize {
    bars.partition_point(|b| b.timestamp < bar.timestamp)
}

fn high_point(bar: &Bar) -> PricePoint {
    PricePoint { price: bar.high, time: bar.timestamp }
}

fn low_point(bar: &Bar) -> PricePoint {
    PricePoint { price: bar.low, time: bar.timestamp }
}

fn percent_change(from: f64, to: f64) -> Option<f64> {
    (from != 0.0).then(|| (to - from) / from * 100.0)
}
