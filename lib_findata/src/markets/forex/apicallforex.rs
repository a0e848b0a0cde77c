//! # Exchange Rate Table Client
//!
//! `GET v4/latest/{base}` answers with every known currency priced against
//! `base`:
//!
//! ```json
//! {"base":"USD","date":"2024-05-01","rates":{"USD":1,"EUR":0.93,"GBP":0.8}}
//! ```
//!
//! The rates keep the order of the payload. A table with no rates is
//! rejected; a rate that is not strictly positive only disqualifies its own
//! currency (see [`usable_rate`]).

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::markets::error::MarketDataError;
use crate::retrieve::ky_http::{ApiClient, ClientOptions, FetchError};

/// Currency code to rate, relative to `base`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    pub base: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub rates: IndexMap<String, f64>,
}

impl RateTable {
    /// Builds a table from `(code, rate)` pairs, keeping their order.
    pub fn from_pairs<I, S>(base: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            base: base.into(),
            date: None,
            rates: pairs.into_iter().map(|(code, rate)| (code.into(), rate)).collect(),
        }
    }

    pub fn rate(&self, currency: &str) -> Option<f64> {
        self.rates.get(currency).copied()
    }

    pub fn currencies(&self) -> impl Iterator<Item = &str> + '_ {
        self.rates.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Rejects a table without rates.
    pub fn validate(&self) -> Result<(), MarketDataError> {
        if self.rates.is_empty() {
            return Err(MarketDataError::EmptyRates { base: self.base.clone() });
        }
        Ok(())
    }

    /// The rate of `currency`, or `InvalidRate` when it cannot be divided by.
    pub fn checked_rate(&self, currency: &str) -> Option<Result<f64, MarketDataError>> {
        self.rate(currency).map(|rate| {
            if usable_rate(rate) {
                Ok(rate)
            } else {
                Err(MarketDataError::InvalidRate {
                    currency: currency.to_string(),
                    rate,
                })
            }
        })
    }
}

/// Strictly positive and finite.
pub fn usable_rate(rate: f64) -> bool {
    rate.is_finite() && rate > 0.0
}

/// Normalizes a currency code to upper case; anything but three ASCII
/// letters is `InvalidCurrency`.
pub fn normalize_currency(code: &str) -> Result<String, MarketDataError> {
    let trimmed = code.trim();
    if trimmed.len() == 3 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(trimmed.to_ascii_uppercase())
    } else {
        Err(MarketDataError::InvalidCurrency { code: code.to_string() })
    }
}

/// Client for the exchange-rate table endpoint.
pub struct ApiCallForex {
    client: ApiClient,
}

impl ApiCallForex {
    /// Creates a client against `base_url` (normally `https://api.exchangerate-api.com/`).
    pub fn new(base_url: &str, options: ClientOptions) -> Result<Self, FetchError> {
        Ok(Self {
            client: ApiClient::new(base_url, options)?,
        })
    }

    /// Latest rate table priced against `base`, validated.
    pub async fn fetch_rates(&self, base: &str) -> Result<RateTable, MarketDataError> {
        let result = match normalize_currency(base) {
            Ok(code) => match self.client.get_json::<RateTable>(&format!("v4/latest/{}", code), &[]).await {
                Ok(table) => table.validate().map(|_| table),
                Err(e) => Err(e.into()),
            },
            Err(e) => Err(e),
        };

        match &result {
            Ok(table) => debug!(base, currencies = table.len(), "Rate table fetched"),
            Err(e) => error!(base, kind = e.kind(), "Error fetching forex data: {}", e),
        }
        result
    }
}
