//! Landmark statistics over a hand-built trading day

use test_log::test;
use pretty_assertions::assert_eq;
use chrono::Weekday;
use intraday_landmarks::landmarks::{first_max_high, window_slice, LandmarkCalculator};
use intraday_landmarks::models::{DayWindow, PricePoint, SessionWindows};

use crate::common::fixtures::{at, bar, sample_day_series};
use crate::common::logging::{init_test_logging, log_test_data, log_test_step};

fn assert_close(actual: Option<f64>, expected: f64) {
    let actual = actual.expect("value should be present");
    assert!((actual - expected).abs() < 1e-9, "expected {}, got {}", expected, actual);
}

#[test]
fn test_premarket_landmarks() {
    init_test_logging();
    log_test_step("Computing pre-market landmarks");

    let row = LandmarkCalculator::default().compute(&sample_day_series()).unwrap();
    log_test_data("row", &row);

    assert_eq!(row.weekday, Weekday::Mon);
    assert_eq!(row.previous_close, Some(100.0));
    assert_eq!(row.pm_high, Some(PricePoint { price: 105.0, time: at(7, 0) }));
    assert_eq!(row.pm_volume_to_high, Some(3000));
    // Lowest low from the 07:00 PM high onward, session included
    assert_eq!(row.pm_low_post_high, Some(PricePoint { price: 98.0, time: at(12, 0) }));
    assert_eq!(row.pm_volume, Some(4200));
}

#[test]
fn test_opening_bars() {
    let row = LandmarkCalculator::default().compute(&sample_day_series()).unwrap();

    assert_eq!(row.open_price, Some(102.0));
    assert_eq!(row.open_1min_volume, Some(5000));
    assert_eq!(row.open_2min_volume, Some(8000));
}

#[test]
fn test_gap_price_uses_higher_of_first_two_minutes() {
    // 09:31 high 108 beats 09:30 high 106; gap = 108 + 0.5 * (102 - 100)
    let row = LandmarkCalculator::default().compute(&sample_day_series()).unwrap();
    assert_eq!(row.gap_price, Some(PricePoint { price: 109.0, time: at(9, 31) }));
}

#[test]
fn test_gap_price_tie_goes_to_open_bar() {
    let mut series = sample_day_series();
    // Give 09:31 the same high as 09:30
    series.bars[5].high = 106.0;

    let row = LandmarkCalculator::default().compute(&series).unwrap();
    assert_eq!(row.gap_price, Some(PricePoint { price: 107.0, time: at(9, 30) }));
}

#[test]
fn test_high_of_day_ignores_after_hours() {
    let row = LandmarkCalculator::default().compute(&sample_day_series()).unwrap();

    assert_eq!(row.hod, Some(PricePoint { price: 110.0, time: at(10, 15) }));
    assert_eq!(row.hod_1min_volume, Some(4000));
    assert_close(row.hod_percent, (110.0 - 102.0) / 102.0 * 100.0);
}

#[test]
fn test_lows_either_side_of_premarket_high() {
    let row = LandmarkCalculator::default().compute(&sample_day_series()).unwrap();

    // Only the 04:00 bar precedes the 07:00 PM high
    assert_eq!(row.lod_pre_high, Some(PricePoint { price: 100.5, time: at(4, 0) }));
    assert_eq!(row.lod_post_high, Some(PricePoint { price: 98.0, time: at(12, 0) }));
}

#[test]
fn test_volume_into_intraday_high() {
    let row = LandmarkCalculator::default().compute(&sample_day_series()).unwrap();

    // 04:00 through 10:15
    assert_eq!(row.volume_pm_to_intraday_high, Some(16200));
    // 09:29 through 10:15
    assert_eq!(row.volume_open_to_intraday_high, Some(12700));
}

#[test]
fn test_end_of_day_and_total_volume() {
    let row = LandmarkCalculator::default().compute(&sample_day_series()).unwrap();

    assert_eq!(row.eod_price, Some(100.0));
    assert_close(row.eod_percent, (100.0 - 102.0) / 102.0 * 100.0);
    // Everything except the 19:30 bar
    assert_eq!(row.total_volume, Some(21000));
}

#[test]
fn test_custom_windows_change_the_slices() {
    log_test_step("Narrowing pre-market to 07:30-09:29");

    let mut windows = SessionWindows::default();
    windows.pre_market = DayWindow::new(at(7, 30).time(), at(9, 29).time());
    let calculator = LandmarkCalculator::new(windows);
    assert_eq!(calculator.windows().pre_market.start, at(7, 30).time());

    let row = calculator.compute(&sample_day_series()).unwrap();
    assert_eq!(row.pm_high, Some(PricePoint { price: 104.5, time: at(8, 0) }));
    assert_eq!(row.pm_volume, Some(1200));
}

#[test]
fn test_regular_window_without_bars() {
    let mut series = sample_day_series();
    series.bars = vec![bar(5, 0, 10.0, 11.0, 9.0, 10.0, 100), bar(18, 0, 10.0, 12.0, 9.5, 11.0, 50)];

    let row = LandmarkCalculator::default().compute(&series).unwrap();
    assert_eq!(row.hod, None);
    assert_eq!(row.hod_percent, None);
    assert_eq!(row.lod_pre_high, None);
    assert_eq!(row.open_price, Some(10.0));
    assert_eq!(row.open_1min_volume, Some(50));
    assert_eq!(row.gap_price.map(|p| p.time), Some(at(18, 0)));
    assert_eq!(row.total_volume, Some(150));
}

#[test]
fn test_window_slice_and_peak_helpers() {
    let bars = sample_day_series().bars;
    let regular = window_slice(&bars, &SessionWindows::default().regular);

    assert_eq!(regular.first().map(|b| b.timestamp), Some(at(9, 29)));
    assert_eq!(regular.last().map(|b| b.timestamp), Some(at(16, 0)));
    assert_eq!(first_max_high(regular).map(|i| regular[i].timestamp), Some(at(10, 15)));
}
