//! Aggregated sheet layout built from per-ticker results

use test_log::test;
use pretty_assertions::assert_eq;
use intraday_landmarks::landmarks::LandmarkCalculator;
use intraday_landmarks::report::{Cell, ReportBuilder, AGGREGATED_SHEET, BAR_COLUMNS, LANDMARK_COLUMNS};
use intraday_landmarks::fundamentals::FUNDAMENTALS_COLUMNS;

use crate::common::fixtures::{fundamentals, sample_day_series, trade_date};

fn sample_report() -> ReportBuilder {
    let series = sample_day_series();
    let row = LandmarkCalculator::default().compute(&series).unwrap();

    let mut report = ReportBuilder::new(trade_date());
    report.add_ticker("AAPL");
    report.add_ticker("NODATA");
    report.set_landmarks(row);
    report.set_bars("AAPL", series.bars);
    report.set_fundamentals("NODATA", fundamentals("12.0M"));
    report
}

#[test]
fn test_headers_are_landmarks_then_fundamentals() {
    let table = sample_report().aggregated_table();

    assert_eq!(table.headers.len(), LANDMARK_COLUMNS.len() + FUNDAMENTALS_COLUMNS.len());
    assert_eq!(table.headers[0], "Date");
    assert_eq!(table.headers[LANDMARK_COLUMNS.len()], "Market Cap");
    assert_eq!(AGGREGATED_SHEET, "Aggregated Data");
}

#[test]
fn test_rows_follow_request_order() {
    let report = sample_report();
    assert_eq!(report.tickers().collect::<Vec<_>>(), vec!["AAPL", "NODATA"]);
    assert_eq!(report.len(), 2);

    let table = report.aggregated_table();
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.cell(0, "Ticker"), Some(&Cell::Text("AAPL".to_string())));
    assert_eq!(table.cell(0, "PM Hi"), Some(&Cell::Number(105.0)));
    assert_eq!(table.cell(0, "PM Hi Time"), Some(&Cell::Text("2024-06-10 07:00:00".to_string())));
    assert_eq!(table.cell(0, "Total Volume"), Some(&Cell::Integer(21000)));
    assert_eq!(table.cell(0, "Market Cap"), Some(&Cell::Empty));
}

#[test]
fn test_ticker_without_landmarks_keeps_its_fundamentals() {
    let table = sample_report().aggregated_table();

    assert_eq!(table.cell(1, "Ticker"), Some(&Cell::Text("NODATA".to_string())));
    assert_eq!(table.cell(1, "HOD"), Some(&Cell::Empty));
    assert_eq!(table.cell(1, "Market Cap"), Some(&Cell::Text("12.0M".to_string())));
    assert_eq!(table.cell(1, "Inst Own %"), Some(&Cell::Text("###".to_string())));
}

#[test]
fn test_bars_table() {
    let report = sample_report();
    let bars = report.bars_table("AAPL").unwrap();

    assert_eq!(bars.headers, BAR_COLUMNS.iter().map(|h| h.to_string()).collect::<Vec<_>>());
    assert_eq!(bars.rows.len(), 11);
    assert_eq!(bars.cell(0, "time"), Some(&Cell::Text("2024-06-10 04:00:00".to_string())));
    assert_eq!(bars.cell(0, "volume"), Some(&Cell::Integer(1000)));
    assert!(report.bars_table("NODATA").unwrap().rows.is_empty());
    assert!(report.bars_table("MSFT").is_none());
}
