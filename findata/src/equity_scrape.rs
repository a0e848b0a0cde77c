//! # Equity Scrape
//!
//! Scrapes the live S&P 500 price from the Yahoo Finance quote page and the
//! gainers field from the gainers page, printing the text as displayed.

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use lib_findata::loggers::setup_logging;
use lib_findata::markets::equity::equitypages::parse_displayed_number;
use lib_findata::{load_app_config, MarketDataFetcher};

#[derive(Parser, Debug)]
#[command(author, version, about = "Scrapes the S&P 500 quote and gainers pages", long_about = None)]
pub struct Args {
    /// Also print the rows of the gainers table.
    #[arg(short, long)]
    pub table: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_app_config().context("Failed to load configuration")?;
    let _guard = setup_logging("equity_scrape").context("Failed to initialize logging")?;

    let fetcher = MarketDataFetcher::from_config(&config).context("Failed to build market data clients")?;

    println!("{}", "S&P 500 (live)".bold().cyan());
    match fetcher.snp_live().await {
        Ok(text) => match parse_displayed_number(&text) {
            Some(value) => println!("{} ({:.2})", text.trim(), value),
            None => println!("{}", text),
        },
        Err(e) => println!("{} {}", "Unavailable:".red(), e),
    }

    println!("\n{}", "Gainers".bold().cyan());
    match fetcher.gainers().await {
        Ok(text) => println!("{}", text),
        Err(e) => println!("{} {}", "Unavailable:".red(), e),
    }

    if args.table {
        println!("\n{}", "Gainers table".bold().cyan());
        match fetcher.gainers_table().await {
            Ok(rows) => {
                for row in rows {
                    println!("{}", row.iter().map(|c| c.trim()).collect::<Vec<_>>().join(" | "));
                }
            }
            Err(e) => println!("{} {}", "Unavailable:".red(), e),
        }
    }

    Ok(())
}
