use anyhow::{anyhow, Result};
use chrono::{Datelike, Local};
use clap::Parser;
use tracing::{info, Level};

use intraday_landmarks::api::PolygonClient;
use intraday_landmarks::ingestor::fetch_day_series;
use intraday_landmarks::landmarks::LandmarkCalculator;
use intraday_landmarks::models::{Config, PricePoint};
use intraday_landmarks::utils::parse_trade_date;

/// Print one ticker's landmarks without scraping or writing a workbook
#[derive(Parser)]
#[command(name = "fetch_day")]
struct Args {
    /// Ticker symbol
    ticker: String,

    /// Trading date in YYYY-MM-DD format
    date: String,
}

fn show(point: Option<PricePoint>) -> String {
    match point {
        Some(p) => format!("${:.2} at {}", p.price, p.time.format("%H:%M")),
        None => "n/a".to_string(),
    }
}

fn show_opt<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| v.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default subscriber failed");

    let args = Args::parse();
    let config = Config::from_env()?;
    let date = parse_trade_date(&args.date, Local::now().year())?;
    let ticker = args.ticker.to_uppercase();

    info!("📈 Fetching {} minute bars for {}", ticker, date);

    let client = PolygonClient::new(&config)?;
    let series = fetch_day_series(&client, &ticker, date, &config.exchange_timezone)
        .await?
        .ok_or_else(|| anyhow!("No minute bars for {} on {}", ticker, date))?;

    let row = LandmarkCalculator::new(config.windows).compute(&series)?;

    println!("\n📊 {} on {} ({})", row.ticker, row.date, row.weekday);
    println!("Previous close ({}): {}", series.previous_date, show_opt(row.previous_close));
    println!("PM high:            {}", show(row.pm_high));
    println!("PM volume:          {}", show_opt(row.pm_volume));
    println!("PM vol to PM high:  {}", show_opt(row.pm_volume_to_high));
    println!("Open:               {}", show_opt(row.open_price));
    println!("HOD:                {}", show(row.hod));
    println!("Gap price (2m+50%): {}", show(row.gap_price));
    println!("EOD:                {}", show_opt(row.eod_price));
    println!("Total volume:       {}", show_opt(row.total_volume));
    println!("Bars:               {}", series.bars.len());

    Ok(())
}
