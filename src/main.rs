use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use intraday_landmarks::api::{FinvizClient, MarketDataProvider, PolygonClient};
use intraday_landmarks::data_collector::DayCollector;
use intraday_landmarks::landmarks::LandmarkCalculator;
use intraday_landmarks::models::{Config, TickerSelection};
use intraday_landmarks::prompt::{parse_ticker_list, Prompter};
use intraday_landmarks::utils::parse_trade_date;

/// Intraday landmark report for a single trading day
#[derive(Parser)]
#[command(name = "intraday-landmarks")]
#[command(version = "0.1.0")]
#[command(about = "Compute pre-market and session landmarks per ticker and write them to a workbook")]
#[command(long_about = "
Fetches minute bars for each ticker on the given date, computes pre-market high,
high of day, volume into the highs and the gap price target, scrapes a handful of
fundamentals, and writes everything to a multi-sheet .xlsx file.

Any option left out is asked for interactively.

Examples:
  intraday-landmarks --tickers AAPL MSFT --date 2024-06-10
  intraday-landmarks --all --date 2024-06-10 --output june10.xlsx
")]
struct Args {
    /// Process every ticker in the reference list
    #[arg(long, conflicts_with = "tickers")]
    all: bool,

    /// Ticker symbols to process
    #[arg(long, short = 't', num_args = 1..)]
    tickers: Vec<String>,

    /// Trading date in YYYY-MM-DD format
    #[arg(long, short = 'd')]
    date: Option<String>,

    /// Output workbook path (defaults to OUTPUT_PATH or Updated_Stock_Data.xlsx)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("intraday_landmarks=info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default subscriber failed");

    let args = Args::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            eprintln!("❌ Configuration Error: {}", e);
            eprintln!("Make sure you have a .env file with POLYGON_API_KEY set.");
            std::process::exit(1);
        }
    };

    let market_data = PolygonClient::new(&config)?;
    let fundamentals = FinvizClient::new(&config)?;

    let stdin = std::io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), std::io::stdout());
    let current_year = Local::now().year();

    let selection = if args.all {
        TickerSelection::All
    } else if !args.tickers.is_empty() {
        TickerSelection::Explicit(parse_ticker_list(&args.tickers.join(" "))?)
    } else {
        prompter.ticker_selection()?
    };

    let date = match resolve_date(args.date.as_deref(), &mut prompter, current_year) {
        Ok(date) => date,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let tickers = match selection {
        TickerSelection::All => market_data.list_tickers().await?,
        TickerSelection::Explicit(tickers) => tickers,
    };
    info!("🚀 Processing {} tickers for {}", tickers.len(), date);

    let calculator = LandmarkCalculator::new(config.windows);
    let collector = DayCollector::new(&market_data, &fundamentals, calculator, config.exchange_timezone);
    let (report, summary) = collector.collect(&tickers, date).await;

    let output = args.output.unwrap_or(config.output_path);
    report
        .write_workbook(&output)
        .with_context(|| format!("writing {}", output.display()))?;

    info!(
        "📊 {} tickers: {} with landmarks, {} without data, {} failed",
        summary.total, summary.with_landmarks, summary.without_data, summary.failed
    );
    println!("Data updated successfully!");
    Ok(())
}

fn resolve_date<R: std::io::BufRead, W: std::io::Write>(
    flag: Option<&str>,
    prompter: &mut Prompter<R, W>,
    current_year: i32,
) -> Result<NaiveDate> {
    match flag {
        Some(date) => Ok(parse_trade_date(date, current_year)?),
        None => prompter.trade_date(current_year),
    }
}
