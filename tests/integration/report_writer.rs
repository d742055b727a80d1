//! Workbook output on disk

use test_log::test;
use tempfile::TempDir;
use intraday_landmarks::landmarks::LandmarkCalculator;
use intraday_landmarks::report::ReportBuilder;

use crate::common::fixtures::{fundamentals, sample_day_series, trade_date};

fn report_with(tickers: &[&str]) -> ReportBuilder {
    let series = sample_day_series();
    let mut report = ReportBuilder::new(trade_date());

    for ticker in tickers {
        let mut series = series.clone();
        series.ticker = ticker.to_string();
        let row = LandmarkCalculator::default().compute(&series).unwrap();
        report.set_landmarks(row);
        report.set_bars(ticker, series.bars);
        report.set_fundamentals(ticker, fundamentals("1.0B"));
    }
    report
}

#[test]
fn test_workbook_is_written() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Updated_Stock_Data.xlsx");

    report_with(&["AAPL", "MSFT"]).write_workbook(&path).unwrap();

    let metadata = std::fs::metadata(&path).unwrap();
    assert!(metadata.len() > 0);
}

#[test]
fn test_clashing_sheet_names_still_write() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("clash.xlsx");

    // Both sanitize to BRK_A and differ only by case from brk_a
    report_with(&["BRK/A", "BRK:A", "brk_a"]).write_workbook(&path).unwrap();
    assert!(path.exists());
}

#[test]
fn test_unwritable_path_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing").join("out.xlsx");

    assert!(report_with(&["AAPL"]).write_workbook(&path).is_err());
}
