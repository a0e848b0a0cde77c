//! # Conversion Matrix
//!
//! For currencies `C` taken from one rate table `R`, the factor converting
//! one unit of row currency `i` into column currency `j` is `R[j] / R[i]`.
//! The diagonal is exactly 1.0 and `M[i][j] * M[j][i]` is 1.0 up to
//! rounding.
//!
//! Requested codes are trimmed and upper-cased, duplicates collapse to their
//! first occurrence and codes missing from the table are dropped. Rows and
//! columns follow the request order, or the table order when nothing was
//! requested.
//!
//! Only the selected rates are divided by. A requested currency whose rate
//! is zero, negative or not finite is `InvalidRate`; when the whole table is
//! used such currencies are skipped with a warning.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::markets::error::MarketDataError;
use crate::markets::forex::apicallforex::{usable_rate, ApiCallForex, RateTable};

/// Square matrix of conversion factors, labeled on both axes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionMatrix {
    /// Base currency of the rate table the matrix was derived from.
    pub base: String,
    currencies: Vec<String>,
    /// `factors[i][j]` converts `currencies[i]` into `currencies[j]`.
    factors: Vec<Vec<f64>>,
}

impl ConversionMatrix {
    /// Derives the matrix from `table`.
    ///
    /// `currencies` of `None` or an empty slice selects every currency of the
    /// table with a usable rate. When none of the requested codes is in the
    /// table the result is `NoMatchingCurrencies`.
    pub fn from_rates<S>(table: &RateTable, currencies: Option<&[S]>) -> Result<Self, MarketDataError>
    where
        S: AsRef<str>,
    {
        table.validate()?;

        let requested: Vec<String> = currencies
            .unwrap_or_default()
            .iter()
            .map(|c| c.as_ref().trim().to_uppercase())
            .filter(|c| !c.is_empty())
            .collect();

        let mut selected: IndexMap<String, f64> = IndexMap::new();
        if requested.is_empty() {
            for (code, rate) in &table.rates {
                if usable_rate(*rate) {
                    selected.insert(code.clone(), *rate);
                } else {
                    warn!(currency = %code, rate = *rate, base = %table.base, "Unusable rate, currency skipped");
                }
            }
        } else {
            for code in &requested {
                match table.checked_rate(code) {
                    Some(rate) => {
                        let rate = rate?;
                        selected.entry(code.clone()).or_insert(rate);
                    }
                    None => warn!(currency = %code, base = %table.base, "Currency not in rate table, skipped"),
                }
            }
        }

        if selected.is_empty() {
            return Err(MarketDataError::NoMatchingCurrencies { requested });
        }

        let factors = selected
            .values()
            .map(|from| selected.values().map(|to| to / from).collect())
            .collect();

        Ok(Self {
            base: table.base.clone(),
            currencies: selected.into_keys().collect(),
            factors,
        })
    }

    /// Row and column labels, in order.
    pub fn currencies(&self) -> &[String] {
        &self.currencies
    }

    pub fn len(&self) -> usize {
        self.currencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.currencies.is_empty()
    }

    fn index_of(&self, currency: &str) -> Option<usize> {
        self.currencies.iter().position(|c| c.eq_ignore_ascii_case(currency))
    }

    /// Factor converting one unit of `from` into `to`.
    pub fn get(&self, from: &str, to: &str) -> Option<f64> {
        let i = self.index_of(from)?;
        let j = self.index_of(to)?;
        Some(self.factors[i][j])
    }

    /// Factors from `from` into every currency, in column order.
    pub fn row(&self, from: &str) -> Option<&[f64]> {
        self.index_of(from).map(|i| self.factors[i].as_slice())
    }

    /// Every ordered `(from, to, factor)` triple, row by row.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str, f64)> + '_ {
        self.currencies.iter().zip(&self.factors).flat_map(move |(from, row)| {
            self.currencies
                .iter()
                .zip(row)
                .map(move |(to, factor)| (from.as_str(), to.as_str(), *factor))
        })
    }

    /// Row currency to (column currency to factor).
    pub fn to_nested(&self) -> IndexMap<String, IndexMap<String, f64>> {
        let mut nested: IndexMap<String, IndexMap<String, f64>> = IndexMap::new();
        for (from, to, factor) in self.pairs() {
            nested.entry(from.to_string()).or_default().insert(to.to_string(), factor);
        }
        nested
    }
}

impl fmt::Display for ConversionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>5}", "")?;
        for code in &self.currencies {
            write!(f, " {:>10}", code)?;
        }
        writeln!(f)?;
        for (code, row) in self.currencies.iter().zip(&self.factors) {
            write!(f, "{:>5}", code)?;
            for factor in row {
                write!(f, " {:>10.4}", factor)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Service building conversion matrices from freshly fetched rate tables.
pub struct ForexMatrix {
    api_call: Arc<ApiCallForex>,
}

impl ForexMatrix {
    pub fn new(api_call: Arc<ApiCallForex>) -> Self {
        Self { api_call }
    }

    /// Fetches the table for `base` and derives the matrix for `currencies`.
    pub async fn build<S>(&self, currencies: Option<&[S]>, base: &str) -> Result<ConversionMatrix, MarketDataError>
    where
        S: AsRef<str>,
    {
        let table = self.api_call.fetch_rates(base).await?;

        let result = ConversionMatrix::from_rates(&table, currencies);
        match &result {
            Ok(matrix) => info!(base, currencies = matrix.len(), "Conversion matrix built"),
            Err(e) => error!(base, kind = e.kind(), "Error: {}", e),
        }
        result
    }
}
