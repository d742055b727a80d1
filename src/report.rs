//! Assembly of per-ticker results into a workbook.
//!
//! Rows are keyed by ticker symbol, so a ticker that is missing one side
//! (no minute data, failed scrape) never shifts another ticker's values.

use chrono::{NaiveDate, NaiveDateTime};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

use crate::fundamentals::FUNDAMENTALS_COLUMNS;
use crate::models::{Bar, FundamentalsRow, LandmarkRow, PricePoint};

pub const AGGREGATED_SHEET: &str = "Aggregated Data";

/// Columns of the aggregated sheet that come from the landmark calculator
pub const LANDMARK_COLUMNS: [&str; 28] = [
    "Date",
    "Day",
    "Ticker",
    "PREV Close",
    "PM Hi",
    "PM Hi Time",
    "PM total vol to PM High",
    "PM Low-Post Hi",
    "PM Low-Post Hi Time",
    "PM Volume",
    "Open $",
    "Open 1 min Vol",
    "Open 2 min Vol",
    "∑ VOL: PM High to Intra-Day High",
    "∑ VOL: Open to Intra-Day High",
    "2m + 50% Gap Price",
    "2m + 50% Gap Price Time",
    "HOD",
    "HOD Time",
    "HOD %",
    "HOD 1 Minute Volume",
    "LOD Pre Hi",
    "LOD Pre Hi Time",
    "LOD Post Hi",
    "LOD Post Hi Time",
    "EOD $",
    "EOD %",
    "Total Volume",
];

pub const BAR_COLUMNS: [&str; 6] = ["time", "open_price", "close_price", "high_price", "low_price", "volume"];

const MAX_SHEET_NAME_LEN: usize = 31;
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write workbook: {0}")]
    Workbook(#[from] XlsxError),
}

/// A single spreadsheet cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Integer(u64),
    Empty,
}

impl From<Option<f64>> for Cell {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Cell::Empty, Cell::Number)
    }
}

impl From<Option<u64>> for Cell {
    fn from(value: Option<u64>) -> Self {
        value.map_or(Cell::Empty, Cell::Integer)
    }
}

impl From<Option<NaiveDateTime>> for Cell {
    fn from(value: Option<NaiveDateTime>) -> Self {
        value.map_or(Cell::Empty, |t| Cell::Text(t.format(TIME_FORMAT).to_string()))
    }
}

/// Header plus rows, ready to be written as one sheet
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl ReportTable {
    /// Value under `column` in row `row`, if both exist
    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let index = self.headers.iter().position(|h| h == column)?;
        self.rows.get(row)?.get(index)
    }
}

/// Everything collected for one ticker
#[derive(Debug, Clone, Default)]
pub struct TickerReport {
    pub landmarks: Option<LandmarkRow>,
    pub fundamentals: Option<FundamentalsRow>,
    pub bars: Vec<Bar>,
}

/// Accumulates per-ticker results in request order
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    date: NaiveDate,
    order: Vec<String>,
    entries: HashMap<String, TickerReport>,
}

impl ReportBuilder {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            order: Vec::new(),
            entries: HashMap::new(),
        }
    }

    fn entry(&mut self, ticker: &str) -> &mut TickerReport {
        if !self.entries.contains_key(ticker) {
            self.order.push(ticker.to_string());
        }
        self.entries.entry(ticker.to_string()).or_default()
    }

    /// Register a ticker so it gets a row even if nothing is collected for it
    pub fn add_ticker(&mut self, ticker: &str) {
        self.entry(ticker);
    }

    pub fn set_landmarks(&mut self, row: LandmarkRow) {
        let ticker = row.ticker.clone();
        self.entry(&ticker).landmarks = Some(row);
    }

    pub fn set_fundamentals(&mut self, ticker: &str, row: FundamentalsRow) {
        self.entry(ticker).fundamentals = Some(row);
    }

    pub fn set_bars(&mut self, ticker: &str, bars: Vec<Bar>) {
        self.entry(ticker).bars = bars;
    }

    pub fn get(&self, ticker: &str) -> Option<&TickerReport> {
        self.entries.get(ticker)
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The combined landmarks + fundamentals table, one row per ticker
    pub fn aggregated_table(&self) -> ReportTable {
        let headers = LANDMARK_COLUMNS
            .iter()
            .chain(FUNDAMENTALS_COLUMNS.iter())
            .map(|h| h.to_string())
            .collect();

        let rows = self
            .order
            .iter()
            .map(|ticker| {
                let report = &self.entries[ticker];
                let mut row = match &report.landmarks {
                    Some(landmarks) => landmark_cells(landmarks),
                    None => placeholder_landmark_cells(ticker, self.date),
                };
                match &report.fundamentals {
                    Some(fundamentals) => row.extend(fundamentals.fields().iter().map(|f| Cell::Text(f.to_string()))),
                    None => row.extend(std::iter::repeat(Cell::Empty).take(FUNDAMENTALS_COLUMNS.len())),
                }
                row
            })
            .collect();

        ReportTable { headers, rows }
    }

    /// The raw minute bars of one ticker
    pub fn bars_table(&self, ticker: &str) -> Option<ReportTable> {
        let report = self.entries.get(ticker)?;
        Some(ReportTable {
            headers: BAR_COLUMNS.iter().map(|h| h.to_string()).collect(),
            rows: report.bars.iter().map(bar_cells).collect(),
        })
    }

    /// Write the aggregated sheet and one raw-bar sheet per ticker to `path`
    pub fn write_workbook(&self, path: &Path) -> Result<(), ReportError> {
        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(AGGREGATED_SHEET)?;
        write_table(worksheet, &self.aggregated_table(), &header_format)?;

        let mut used_names: HashSet<String> = HashSet::new();
        used_names.insert(AGGREGATED_SHEET.to_lowercase());

        for ticker in &self.order {
            let Some(table) = self.bars_table(ticker) else {
                continue;
            };
            let name = unique_sheet_name(ticker, &mut used_names);
            debug!("Writing {} bars for {} to sheet '{}'", table.rows.len(), ticker, name);

            let worksheet = workbook.add_worksheet();
            worksheet.set_name(&name)?;
            write_table(worksheet, &table, &header_format)?;
        }

        workbook.save(path)?;
        info!("💾 Wrote {} tickers to {}", self.order.len(), path.display());
        Ok(())
    }
}

fn write_table(worksheet: &mut Worksheet, table: &ReportTable, header_format: &Format) -> Result<(), XlsxError> {
    for (col, header) in table.headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, header, header_format)?;
    }

    for (r, row) in table.rows.iter().enumerate() {
        let row_num = (r + 1) as u32;
        for (c, cell) in row.iter().enumerate() {
            let col = c as u16;
            match cell {
                Cell::Text(text) => {
                    worksheet.write_string(row_num, col, text)?;
                }
                Cell::Number(value) => {
                    worksheet.write_number(row_num, col, *value)?;
                }
                Cell::Integer(value) => {
                    worksheet.write_number(row_num, col, *value as f64)?;
                }
                Cell::Empty => {}
            }
        }
    }
    Ok(())
}

fn price(point: Option<PricePoint>) -> Cell {
    point.map(|p| p.price).into()
}

fn time(point: Option<PricePoint>) -> Cell {
    point.map(|p| p.time).into()
}

fn landmark_cells(row: &LandmarkRow) -> Vec<Cell> {
    vec![
        Cell::Text(row.date.to_string()),
        Cell::Text(weekday_name(row.date)),
        Cell::Text(row.ticker.clone()),
        row.previous_close.into(),
        price(row.pm_high),
        time(row.pm_high),
        row.pm_volume_to_high.into(),
        price(row.pm_low_post_high),
        time(row.pm_low_post_high),
        row.pm_volume.into(),
        row.open_price.into(),
        row.open_1min_volume.into(),
        row.open_2min_volume.into(),
        row.volume_pm_to_intraday_high.into(),
        row.volume_open_to_intraday_high.into(),
        price(row.gap_price),
        time(row.gap_price),
        price(row.hod),
        time(row.hod),
        row.hod_percent.into(),
        row.hod_1min_volume.into(),
        price(row.lod_pre_high),
        time(row.lod_pre_high),
        price(row.lod_post_high),
        time(row.lod_post_high),
        row.eod_price.into(),
        row.eod_percent.into(),
        row.total_volume.into(),
    ]
}

fn placeholder_landmark_cells(ticker: &str, date: NaiveDate) -> Vec<Cell> {
    let mut cells = vec![
        Cell::Text(date.to_string()),
        Cell::Text(weekday_name(date)),
        Cell::Text(ticker.to_string()),
    ];
    cells.resize(LANDMARK_COLUMNS.len(), Cell::Empty);
    cells
}

fn bar_cells(bar: &Bar) -> Vec<Cell> {
    vec![
        Cell::Text(bar.timestamp.format(TIME_FORMAT).to_string()),
        Cell::Number(bar.open),
        Cell::Number(bar.close),
        Cell::Number(bar.high),
        Cell::Number(bar.low),
        Cell::Integer(bar.volume),
    ]
}

fn weekday_name(date: NaiveDate) -> String {
    date.format("%A").to_string()
}

/// Excel sheet names: at most 31 characters, none of `[]:*?/\`, unique ignoring case
fn unique_sheet_name(ticker: &str, used: &mut HashSet<String>) -> String {
    let cleaned: String = ticker
        .chars()
        .map(|c| if matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\') { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches('\'');
    let base: String = if cleaned.is_empty() { "Sheet".to_string() } else { cleaned.chars().take(MAX_SHEET_NAME_LEN).collect() };

    let mut name = base.clone();
    let mut suffix = 2;
    while !used.insert(name.to_lowercase()) {
        let tag = format!("_{}", suffix);
        let keep = MAX_SHEET_NAME_LEN.saturating_sub(tag.len());
        name = format!("{}{}", base.chars().take(keep).collect::<String>(), tag);
        suffix += 1;
    }
    name
}
