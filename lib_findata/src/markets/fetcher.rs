//! # Market Data Fetcher
//!
//! One facade over every provider client, built from an [`AppConfig`]. The
//! FRED client only exists when a key is configured; the SOFR and treasury
//! retrievals report `ConfigError::MissingEnvVar` otherwise, while everything
//! else keeps working.
//!
//! [`MarketDataFetcher::snapshot`] runs every retrieval once, strictly one
//! after another, and records each outcome without stopping at the first
//! failure.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::configs::config_app::{AppConfig, ConfigError, ENV_FRED_API_KEY};
use crate::markets::equity::equitypages::EquityPages;
use crate::markets::error::MarketDataError;
use crate::markets::forex::apicallforex::ApiCallForex;
use crate::markets::forex::conversionmatrix::{ConversionMatrix, ForexMatrix};
use crate::markets::fred::apicallfred::ApiCallFred;
use crate::markets::fred::sofr::Sofr;
use crate::markets::fred::treasury::{Term, TreasuryCurve, YieldCurve, YieldPoint};
use crate::markets::yahoo::apicallyahoo::ApiCallYahoo;
use crate::markets::yahoo::indexquote::IndexQuote;
use crate::retrieve::ky_http::ClientOptions;

/// Client options derived from the configuration.
pub fn client_options(config: &AppConfig) -> ClientOptions {
    let mut options = ClientOptions::default();
    if let Some(agent) = &config.user_agent {
        options.user_agent = agent.clone();
    }
    options.timeout = config.request_timeout_secs.map(Duration::from_secs);
    options
}

struct FredServices {
    sofr: Sofr,
    treasury: TreasuryCurve,
}

pub struct MarketDataFetcher {
    index: IndexQuote,
    fred: Option<FredServices>,
    forex: ForexMatrix,
    equity: EquityPages,
    reference_base: String,
    forex_currencies: Vec<String>,
}

impl MarketDataFetcher {
    /// Builds every client from `config`.
    ///
    /// # Errors
    /// `MarketDataError::Fetch` when an endpoint URL is malformed or the HTTP
    /// client cannot be created. A missing FRED key is not an error here.
    pub fn from_config(config: &AppConfig) -> Result<Self, MarketDataError> {
        let options = client_options(config);
        let endpoints = &config.endpoints;

        let yahoo = Arc::new(ApiCallYahoo::new(&endpoints.yahoo_chart_url, options.clone())?);
        let forex = Arc::new(ApiCallForex::new(&endpoints.forex_url, options.clone())?);
        let equity = EquityPages::new(&endpoints.snp_live_url, &endpoints.gainers_url, options.clone())?;

        let fred = match config.fred_api_key() {
            Ok(key) => {
                let api = Arc::new(ApiCallFred::new(&endpoints.fred_url, key, options)?);
                Some(FredServices {
                    sofr: Sofr::new(Arc::clone(&api)),
                    treasury: TreasuryCurve::new(api),
                })
            }
            Err(e) => {
                warn!("{}; SOFR and treasury retrievals are unavailable", e);
                None
            }
        };

        Ok(Self {
            index: IndexQuote::new(yahoo),
            fred,
            forex: ForexMatrix::new(forex),
            equity,
            reference_base: config.reference_base.clone(),
            forex_currencies: config.forex_currencies.clone(),
        })
    }

    fn fred(&self) -> Result<&FredServices, MarketDataError> {
        self.fred
            .as_ref()
            .ok_or_else(|| ConfigError::MissingEnvVar(ENV_FRED_API_KEY.to_string()).into())
    }

    /// Latest S&P 500 close.
    pub async fn sp500_price(&self) -> Result<f64, MarketDataError> {
        self.index.sp500_price().await
    }

    /// Latest SOFR observation.
    pub async fn sofr_rate(&self) -> Result<f64, MarketDataError> {
        self.fred()?.sofr.latest().await
    }

    /// Latest yield for a term label such as `"10Y"`.
    pub async fn treasury_rate(&self, term: &str) -> Result<YieldPoint, MarketDataError> {
        self.fred()?.treasury.rate_for_label(term).await
    }

    /// Every maturity with its own outcome.
    pub async fn all_treasury_rates(&self) -> Result<Vec<(Term, Result<YieldPoint, MarketDataError>)>, MarketDataError> {
        Ok(self.fred()?.treasury.all_rates().await)
    }

    /// The latest yield curve; only a missing FRED key fails the whole call.
    pub async fn yield_curve(&self) -> Result<YieldCurve, MarketDataError> {
        Ok(self.fred()?.treasury.latest_curve().await)
    }

    /// Conversion matrix for `currencies` against `base`.
    ///
    /// `None` for `currencies` uses the configured list (every currency when
    /// that is empty); `None` for `base` uses the configured reference base.
    pub async fn forex_matrix(
        &self,
        currencies: Option<&[String]>,
        base: Option<&str>,
    ) -> Result<ConversionMatrix, MarketDataError> {
        let currencies = currencies.unwrap_or(self.forex_currencies.as_slice());
        let base = base.unwrap_or(self.reference_base.as_str());
        self.forex.build(Some(currencies), base).await
    }

    /// Live S&P 500 price text from the quote page.
    pub async fn snp_live(&self) -> Result<String, MarketDataError> {
        self.equity.snp_live().await
    }

    /// Gainers field text.
    pub async fn gainers(&self) -> Result<String, MarketDataError> {
        self.equity.gainers().await
    }

    /// Rows of the gainers table.
    pub async fn gainers_table(&self) -> Result<Vec<Vec<String>>, MarketDataError> {
        self.equity.gainers_table().await
    }

    /// Runs every retrieval once, in order, collecting each outcome.
    pub async fn snapshot(&self) -> MarketSnapshot {
        let snapshot = MarketSnapshot {
            taken_at: Utc::now(),
            sp500_price: self.sp500_price().await.into(),
            sofr_rate: self.sofr_rate().await.into(),
            yield_curve: self.yield_curve().await.into(),
            forex_matrix: self.forex_matrix(None, None).await.into(),
            snp_live: self.snp_live().await.into(),
            gainers: self.gainers().await.into(),
        };
        info!(
            taken_at = %snapshot.taken_at,
            failures = snapshot.failure_count(),
            "Market snapshot complete"
        );
        snapshot
    }
}

/// Outcome of one retrieval inside a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome<T> {
    #[serde(rename = "ok")]
    Success { value: T },
    Failed { kind: String, message: String },
}

impl<T> Outcome<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Success { value } => Some(value),
            Outcome::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }
}

impl<T> From<Result<T, MarketDataError>> for Outcome<T> {
    fn from(result: Result<T, MarketDataError>) -> Self {
        match result {
            Ok(value) => Outcome::Success { value },
            Err(e) => Outcome::Failed {
                kind: e.kind().to_string(),
                message: e.to_string(),
            },
        }
    }
}

/// Every retrieval of one sequential pass.
#[derive(Debug, Clone, Serialize)]
pub struct MarketSnapshot {
    pub taken_at: DateTime<Utc>,
    pub sp500_price: Outcome<f64>,
    pub sofr_rate: Outcome<f64>,
    pub yield_curve: Outcome<YieldCurve>,
    pub forex_matrix: Outcome<ConversionMatrix>,
    pub snp_live: Outcome<String>,
    pub gainers: Outcome<String>,
}

impl MarketSnapshot {
    /// Number of retrievals that failed.
    pub fn failure_count(&self) -> usize {
        [
            self.sp500_price.is_failed(),
            self.sofr_rate.is_failed(),
            self.yield_curve.is_failed(),
            self.forex_matrix.is_failed(),
            self.snp_live.is_failed(),
            self.gainers.is_failed(),
        ]
        .into_iter()
        .filter(|failed| *failed)
        .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieve::mock_server::{MockResponse, MockServer};

    const CHART: &str =
        r#"{"chart":{"result":[{"meta":{"symbol":"^GSPC"},"indicators":{"quote":[{"close":[5300.5,5321.09]}]}}],"error":null}}"#;
    const SOFR: &str = r#"{"observations":[{"date":"2024-04-29","value":"5.32"},{"date":"2024-04-30","value":"5.31"}]}"#;
    const TREASURY: &str = r#"{"observations":[{"date":"2024-04-29","value":"4.61"},{"date":"2024-04-30","value":"."}]}"#;
    const RATES: &str = r#"{"base":"USD","rates":{"USD":1,"EUR":0.9,"GBP":0.78,"JPY":157.8}}"#;
    const QUOTE_PAGE: &str = r#"<html><body><span data-testid="qsp-price">5,321.09</span></body></html>"#;

    fn market() -> MockServer {
        MockServer::start(|req| match req.path.as_str() {
            "/v8/finance/chart/%5EGSPC" => MockResponse::json(200, CHART),
            "/fred/series/observations" => match req.query_param("series_id").as_deref() {
                Some("SOFR") => MockResponse::json(200, SOFR),
                Some("DGS30") => MockResponse::json(500, "{}"),
                _ => MockResponse::json(200, TREASURY),
            },
            "/v4/latest/USD" => MockResponse::json(200, RATES),
            "/quote/%5EGSPC/" => MockResponse::html(200, QUOTE_PAGE),
            _ => MockResponse::html(404, "<html></html>"),
        })
    }

    fn config(server: &MockServer, fred_key: Option<&str>) -> AppConfig {
        let mut config = AppConfig {
            fred_api_key: fred_key.map(str::to_string),
            forex_currencies: vec!["USD".to_string(), "EUR".to_string(), "GBP".to_string()],
            ..AppConfig::default()
        };
        config.endpoints.yahoo_chart_url = server.url("");
        config.endpoints.fred_url = server.url("");
        config.endpoints.forex_url = server.url("");
        config.endpoints.snp_live_url = server.url("quote/%5EGSPC/");
        config.endpoints.gainers_url = server.url("gainers/");
        config
    }

    #[test]
    fn test_client_options_from_config() {
        let config = AppConfig {
            user_agent: Some("findata-test".to_string()),
            request_timeout_secs: Some(7),
            ..AppConfig::default()
        };
        let options = client_options(&config);
        assert_eq!(options.user_agent, "findata-test");
        assert_eq!(options.timeout, Some(Duration::from_secs(7)));
        assert_eq!(client_options(&AppConfig::default()).timeout, None);
    }

    #[tokio::test]
    async fn test_scalar_and_curve_retrievals() {
        let server = market();
        let fetcher = MarketDataFetcher::from_config(&config(&server, Some("k3y"))).unwrap();

        assert_eq!(fetcher.sp500_price().await.unwrap(), 5321.09);
        assert_eq!(fetcher.sofr_rate().await.unwrap(), 5.31);
        assert_eq!(fetcher.treasury_rate("10Y").await.unwrap().rate, 4.61);
        assert_eq!(fetcher.treasury_rate("11Y").await.unwrap_err().kind(), "unknown_term");

        let curve = fetcher.yield_curve().await.unwrap();
        assert_eq!(curve.len(), 9);
        assert_eq!(curve.failures[0].term, Term::Y30);

        let all = fetcher.all_treasury_rates().await.unwrap();
        assert_eq!(all.len(), 10);
        assert!(all[9].1.is_err());
    }

    #[tokio::test]
    async fn test_missing_fred_key_only_affects_fred() {
        let server = market();
        let fetcher = MarketDataFetcher::from_config(&config(&server, None)).unwrap();

        let err = fetcher.sofr_rate().await.unwrap_err();
        assert_eq!(err.kind(), "config");
        assert!(err.to_string().contains("FRED_API_KEY"));
        assert!(fetcher.yield_curve().await.is_err());
        assert!(fetcher.sp500_price().await.is_ok());
    }

    #[tokio::test]
    async fn test_forex_matrix_defaults_and_overrides() {
        let server = market();
        let fetcher = MarketDataFetcher::from_config(&config(&server, None)).unwrap();

        let m = fetcher.forex_matrix(None, None).await.unwrap();
        assert_eq!(m.currencies(), ["USD", "EUR", "GBP"]);

        let wanted = vec!["JPY".to_string()];
        let m = fetcher.forex_matrix(Some(wanted.as_slice()), Some("USD")).await.unwrap();
        assert_eq!(m.get("JPY", "JPY"), Some(1.0));

        let err = fetcher.forex_matrix(None, Some("CHF")).await.unwrap_err();
        assert_eq!(err.kind(), "http_status");
    }

    #[tokio::test]
    async fn test_snapshot_records_each_outcome() {
        let server = market();
        let fetcher = MarketDataFetcher::from_config(&config(&server, Some("k3y"))).unwrap();

        let snapshot = fetcher.snapshot().await;
        assert_eq!(snapshot.sp500_price.value(), Some(&5321.09));
        assert_eq!(snapshot.sofr_rate.value(), Some(&5.31));
        assert_eq!(snapshot.yield_curve.value().map(YieldCurve::len), Some(9));
        assert_eq!(snapshot.snp_live.value().map(String::as_str), Some("5,321.09"));
        assert!(snapshot.gainers.is_failed());
        assert_eq!(snapshot.failure_count(), 1);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["sp500_price"]["status"], "ok");
        assert_eq!(json["gainers"]["status"], "failed");
        assert_eq!(json["gainers"]["kind"], "http_status");
    }
}
