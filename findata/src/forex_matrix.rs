//! # Forex Matrix
//!
//! Fetches one exchange-rate table and prints the conversion factor between
//! every pair of the requested currencies, either as a square matrix or as
//! one `FROM to TO: factor` line per pair.

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use lib_findata::configs::config_app::parse_currency_list;
use lib_findata::loggers::setup_logging;
use lib_findata::{load_app_config, MarketDataFetcher};

#[derive(Parser, Debug)]
#[command(author, version, about = "Prints pairwise forex conversion factors", long_about = None)]
pub struct Args {
    /// Comma separated currency codes (e.g. "USD,EUR,GBP"). Defaults to the
    /// configured list, or every currency of the table.
    #[arg(short, long)]
    pub currencies: Option<String>,

    /// Base currency of the rate table. Defaults to the configured base.
    #[arg(short, long)]
    pub base: Option<String>,

    /// Print one line per ordered pair instead of the matrix.
    #[arg(short, long)]
    pub pairs: bool,

    /// Print the matrix as JSON.
    #[arg(long, conflicts_with = "pairs")]
    pub json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_app_config().context("Failed to load configuration")?;
    let _guard = setup_logging("forex_matrix").context("Failed to initialize logging")?;

    let fetcher = MarketDataFetcher::from_config(&config).context("Failed to build market data clients")?;

    let currencies = args.currencies.as_deref().map(parse_currency_list);
    let matrix = fetcher
        .forex_matrix(currencies.as_deref(), args.base.as_deref())
        .await
        .context("Failed to build the conversion matrix")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&matrix.to_nested())?);
    } else if args.pairs {
        for (from, to, factor) in matrix.pairs() {
            println!("{} to {}: {:.4}", from, to, factor);
        }
    } else {
        println!("{}", format!("Conversion factors (base {})", matrix.base).bold().cyan());
        print!("{}", matrix);
    }

    Ok(())
}
