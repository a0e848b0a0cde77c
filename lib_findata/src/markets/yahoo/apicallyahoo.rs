//! # Yahoo Chart API Client
//!
//! Fetches `v8/finance/chart/{symbol}` and maps the payload onto a small
//! strongly-typed model. Only the fields the index quote needs are modeled;
//! unknown fields are ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use crate::markets::error::MarketDataError;
use crate::retrieve::ky_http::{ApiClient, ClientOptions, FetchError};

/// Top-level envelope of a chart response.
#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<Value>,
}

/// One symbol's chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartResult {
    #[serde(default)]
    pub meta: ChartMeta,
    /// Unix seconds of each bar.
    #[serde(default)]
    pub timestamp: Vec<i64>,
    #[serde(default)]
    pub indicators: Indicators,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    pub symbol: Option<String>,
    pub currency: Option<String>,
    pub regular_market_price: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<QuoteSeries>,
}

/// OHLC columns; entries are `null` for bars without a print.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuoteSeries {
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
}

impl ChartResult {
    /// Close column of the first quote series, empty when absent.
    pub fn closes(&self) -> &[Option<f64>] {
        self.indicators.quote.first().map(|q| q.close.as_slice()).unwrap_or_default()
    }
}

/// Client for the Yahoo Finance chart API.
pub struct ApiCallYahoo {
    client: ApiClient,
}

impl ApiCallYahoo {
    /// Creates a client against `base_url` (normally `https://query1.finance.yahoo.com/`).
    pub fn new(base_url: &str, options: ClientOptions) -> Result<Self, FetchError> {
        Ok(Self {
            client: ApiClient::new(base_url, options)?,
        })
    }

    /// Fetches the chart of `symbol` for the given range and bar interval.
    ///
    /// A response without a result is reported as `EmptySeries`.
    pub async fn fetch_chart(&self, symbol: &str, range: &str, interval: &str) -> Result<ChartResult, MarketDataError> {
        let path = format!("v8/finance/chart/{}", encode_symbol(symbol));
        let envelope: ChartEnvelope = self
            .client
            .get_json(&path, &[("range", range), ("interval", interval)])
            .await?;

        if let Some(err) = envelope.chart.error.as_ref().filter(|e| !e.is_null()) {
            error!(symbol, error = %err, "Yahoo chart returned an error object");
        }

        let result = envelope.chart.result.and_then(|mut r| if r.is_empty() { None } else { Some(r.swap_remove(0)) });
        match result {
            Some(chart) => {
                debug!(symbol, bars = chart.timestamp.len(), "Yahoo chart fetched");
                Ok(chart)
            }
            None => Err(MarketDataError::EmptySeries {
                series: symbol.to_string(),
            }),
        }
    }
}

/// Percent-encodes a ticker for use as a path segment (`^GSPC` -> `%5EGSPC`).
pub fn encode_symbol(symbol: &str) -> String {
    url::form_urlencoded::byte_serialize(symbol.as_bytes()).collect()
}
