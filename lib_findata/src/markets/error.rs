use thiserror::Error;

use crate::configs::config_app::ConfigError;
use crate::retrieve::ky_http::FetchError;

/// Why a market data retrieval produced no value.
#[derive(Debug, Error)]
pub enum MarketDataError {
    /// Transport failure, non-2xx status or undecodable body.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The provider returned a series with no entries.
    #[error("No data fetched for {series}")]
    EmptySeries { series: String },

    /// The entry selected from the series carries no value.
    #[error("Latest entry of {series} has no value")]
    MissingValue { series: String },

    /// The rate table payload had no rates.
    #[error("No rates data returned for base {base}")]
    EmptyRates { base: String },

    /// A rate that is not strictly positive and finite.
    #[error("Invalid rate {rate} for currency {currency}")]
    InvalidRate { currency: String, rate: f64 },

    /// A currency code that is not three ASCII letters.
    #[error("Invalid currency code '{code}'")]
    InvalidCurrency { code: String },

    /// None of the requested currencies exist in the rate table.
    #[error("None of the specified currencies were found in the rate table: {requested:?}")]
    NoMatchingCurrencies { requested: Vec<String> },

    /// A treasury term label outside the fixed maturity set.
    #[error("Term '{term}' not recognized. Valid terms are: {valid}")]
    UnknownTerm { term: String, valid: String },

    /// A scraped page had no element matching the selector.
    #[error("No element matching {selector} on {url}")]
    ElementNotFound { url: String, selector: String },

    /// Required configuration (e.g. the FRED key) is missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl MarketDataError {
    /// Stable short name of the failure kind, for logs and snapshots.
    pub fn kind(&self) -> &'static str {
        match self {
            MarketDataError::Fetch(FetchError::Transport(_)) => "transport",
            MarketDataError::Fetch(FetchError::InvalidUrl(_)) => "invalid_url",
            MarketDataError::Fetch(FetchError::HttpStatus { .. }) => "http_status",
            MarketDataError::Fetch(FetchError::Decode { .. }) => "malformed_payload",
            MarketDataError::EmptySeries { .. } => "empty_series",
            MarketDataError::MissingValue { .. } => "missing_value",
            MarketDataError::EmptyRates { .. } => "empty_rates",
            MarketDataError::InvalidRate { .. } => "invalid_rate",
            MarketDataError::InvalidCurrency { .. } => "invalid_currency",
            MarketDataError::NoMatchingCurrencies { .. } => "no_matching_currencies",
            MarketDataError::UnknownTerm { .. } => "unknown_term",
            MarketDataError::ElementNotFound { .. } => "element_not_found",
            MarketDataError::Config(_) => "config",
        }
    }
}
