//! # Market Report
//!
//! Prints the latest S&P 500 close, the SOFR rate, the treasury yield curve
//! and the forex conversion matrix, fetched one after another. A failed
//! retrieval is reported and the report moves on to the next one.
//!
//! With `--json` the whole pass is printed as one snapshot document instead.

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use lib_findata::loggers::setup_logging;
use lib_findata::{load_app_config, MarketDataFetcher};
use tracing::info;

/// Command-line arguments for the market report.
#[derive(Parser, Debug)]
#[command(author, version, about = "Prints index, short rate, yield curve and forex data", long_about = None)]
pub struct Args {
    /// Print a JSON snapshot instead of the text report.
    #[arg(long)]
    pub json: bool,

    /// Single treasury term to print (e.g. 10Y) in addition to the curve.
    #[arg(short, long)]
    pub term: Option<String>,
}

fn heading(title: &str) {
    println!("\n{}", title.bold().cyan());
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_app_config().context("Failed to load configuration")?;
    let _guard = setup_logging("market_report").context("Failed to initialize logging")?;
    info!("{}", config);

    let fetcher = MarketDataFetcher::from_config(&config).context("Failed to build market data clients")?;

    if args.json {
        let snapshot = fetcher.snapshot().await;
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    heading("S&P 500");
    match fetcher.sp500_price().await {
        Ok(price) => println!("Latest S&P 500 Price: {:.2}", price),
        Err(e) => println!("{} {}", "Unavailable:".red(), e),
    }

    heading("SOFR");
    match fetcher.sofr_rate().await {
        Ok(rate) => println!("Latest SOFR Rate: {}", rate),
        Err(e) => println!("{} {}", "Unavailable:".red(), e),
    }

    if let Some(term) = args.term.as_deref() {
        heading("Treasury Rate");
        match fetcher.treasury_rate(term).await {
            Ok(point) => println!("{} Treasury Rate: {} ({})", point.term, point.rate, point.date),
            Err(e) => println!("{} {}", "Unavailable:".red(), e),
        }
    }

    heading("Treasury Yield Curve");
    match fetcher.yield_curve().await {
        Ok(curve) => {
            print!("{}", curve);
            for failure in &curve.failures {
                println!("{} {}: {}", "Missing".yellow(), failure.term, failure.reason);
            }
        }
        Err(e) => println!("{} {}", "Unavailable:".red(), e),
    }

    heading("Forex Conversion Matrix");
    match fetcher.forex_matrix(None, None).await {
        Ok(matrix) => print!("{}", matrix),
        Err(e) => println!("{} {}", "Unavailable:".red(), e),
    }

    Ok(())
}
