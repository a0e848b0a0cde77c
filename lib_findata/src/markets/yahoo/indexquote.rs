//! # Index Quote
//!
//! Latest close of an index from a one-day chart. The value is the literal
//! last entry of the close column: a trailing `null` is reported as
//! `MissingValue` rather than skipped.

use std::sync::Arc;

use tracing::{error, info};

use crate::markets::error::MarketDataError;
use crate::markets::yahoo::apicallyahoo::{ApiCallYahoo, ChartResult};

/// Yahoo Finance ticker of the S&P 500 index.
pub const SP500_SYMBOL: &str = "^GSPC";

/// Chart range and bar interval used for latest-value queries.
const LATEST_RANGE: &str = "1d";
const LATEST_INTERVAL: &str = "1d";

/// Service returning the most recent index close.
pub struct IndexQuote {
    api_call: Arc<ApiCallYahoo>,
}

impl IndexQuote {
    pub fn new(api_call: Arc<ApiCallYahoo>) -> Self {
        Self { api_call }
    }

    /// Latest close of `symbol`.
    pub async fn latest_close(&self, symbol: &str) -> Result<f64, MarketDataError> {
        let result = match self.api_call.fetch_chart(symbol, LATEST_RANGE, LATEST_INTERVAL).await {
            Ok(chart) => last_close(symbol, &chart),
            Err(e) => Err(e),
        };

        match &result {
            Ok(price) => info!(symbol, price, "Index price retrieved"),
            Err(e) => error!(symbol, kind = e.kind(), "Error retrieving index price: {}", e),
        }
        result
    }

    /// Latest close of the S&P 500.
    pub async fn sp500_price(&self) -> Result<f64, MarketDataError> {
        self.latest_close(SP500_SYMBOL).await
    }
}

/// Literal last close of `chart`.
pub fn last_close(symbol: &str, chart: &ChartResult) -> Result<f64, MarketDataError> {
    match chart.closes().last() {
        None => Err(MarketDataError::EmptySeries {
            series: symbol.to_string(),
        }),
        Some(None) => Err(MarketDataError::MissingValue {
            series: symbol.to_string(),
        }),
        Some(Some(close)) => Ok(*close),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieve::ky_http::ClientOptions;
    use crate::retrieve::mock_server::{MockResponse, MockServer};

    fn chart(closes: &str) -> String {
        format!(
            r#"{{"chart":{{"result":[{{"meta":{{"symbol":"^GSPC"}},"indicators":{{"quote":[{{"close":{}}}]}}}}],"error":null}}}}"#,
            closes
        )
    }

    fn service(body: String) -> IndexQuote {
        let server = MockServer::start(move |_| MockResponse::json(200, &body));
        let api = ApiCallYahoo::new(&server.url(""), ClientOptions::default()).unwrap();
        IndexQuote::new(Arc::new(api))
    }

    #[tokio::test]
    async fn test_sp500_price_takes_last_close() {
        let quote = service(chart("[5290.25, 5321.09]"));
        assert_eq!(quote.sp500_price().await.unwrap(), 5321.09);
    }

    #[tokio::test]
    async fn test_empty_series_is_error_not_panic() {
        let quote = service(chart("[]"));
        let err = quote.sp500_price().await.unwrap_err();
        assert!(matches!(err, MarketDataError::EmptySeries { ref series } if series == "^GSPC"));
    }

    #[tokio::test]
    async fn test_trailing_null_is_missing_value() {
        let quote = service(chart("[5290.25, null]"));
        let err = quote.sp500_price().await.unwrap_err();
        assert!(matches!(err, MarketDataError::MissingValue { .. }));
    }

    #[tokio::test]
    async fn test_http_failure_is_fetch_error() {
        let server = MockServer::start(|_| MockResponse::json(500, "{}"));
        let api = ApiCallYahoo::new(&server.url(""), ClientOptions::default()).unwrap();
        let quote = IndexQuote::new(Arc::new(api));

        let err = quote.latest_close("^DJI").await.unwrap_err();
        assert_eq!(err.kind(), "http_status");
    }
}
