use anyhow::Result;
use tracing::{info, Level};

use intraday_landmarks::api::{MarketDataProvider, PolygonClient};
use intraday_landmarks::models::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default subscriber failed");

    info!("🔄 Fetching the ticker reference list");

    let config = Config::from_env()?;
    let client = PolygonClient::new(&config)?;
    let tickers = client.list_tickers().await?;

    for ticker in &tickers {
        println!("{}", ticker);
    }

    info!("✅ {} tickers listed", tickers.len());
    Ok(())
}
