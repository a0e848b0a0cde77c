//! # Financial Market APIs Module
//!
//! This module groups the client implementations for each market data
//! provider and the normalized values they return.
//!
//! ## Contained Modules:
//!
//! - **`yahoo`**: chart API client and the S&P 500 index price.
//! - **`fred`**: FRED observations client, SOFR and the treasury yield curve.
//! - **`forex`**: exchange-rate table client and the pairwise conversion
//!   matrix built from it.
//! - **`equity`**: scraped fields of the Yahoo Finance quote and gainers pages.
//! - **`fetcher`**: one facade over all of the above, built from `AppConfig`.
//!
//! Every retrieval is a single sequential attempt returning
//! `Result<_, MarketDataError>`; failures are logged where they happen.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms, unused_qualifications)]

/// Scraped equity page fields.
pub mod equity;
/// Error kinds shared by all market clients.
pub mod error;
/// Facade over every provider plus the sequential snapshot.
pub mod fetcher;
/// Exchange-rate tables and conversion matrices.
pub mod forex;
/// FRED time series: SOFR and treasury yields.
pub mod fred;
/// Yahoo chart API: index prices.
pub mod yahoo;
