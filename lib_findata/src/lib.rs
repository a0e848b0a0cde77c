//! # lib_findata
//!
//! Market data retrieval for the `findata` scripts: an equity index price,
//! the SOFR rate, the treasury yield curve, forex conversion matrices and
//! fields scraped from equity pages.
//!
//! Modules are gated by cargo features named after their folders
//! (`configs`, `loggers`, `retrieve`, `markets`); `full` enables them all.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms, unused_qualifications)]

/// Application configuration (.env, JSON file, environment variables).
#[cfg(feature = "configs")]
pub mod configs;
/// Console and rolling-file logging setup.
#[cfg(feature = "loggers")]
pub mod loggers;
/// Provider clients and the data models they return.
#[cfg(feature = "markets")]
pub mod markets;
/// HTTP fetch helper and HTML field extraction.
#[cfg(feature = "retrieve")]
pub mod retrieve;

#[cfg(feature = "configs")]
pub use configs::config_app::{load_app_config, AppConfig, ConfigError};
#[cfg(feature = "markets")]
pub use markets::error::MarketDataError;
#[cfg(feature = "markets")]
pub use markets::fetcher::{MarketDataFetcher, MarketSnapshot};
