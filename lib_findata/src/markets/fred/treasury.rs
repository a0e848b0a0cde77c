//! # Treasury Yield Curve
//!
//! The ten constant-maturity treasury series published by FRED, fetched one
//! after another. Each maturity takes the last observation that carries a
//! value, skipping trailing gaps (the most recent business day is often
//! still `"."`).
//!
//! A maturity that fails is logged and left out of the curve; the failure is
//! recorded alongside the rows. A curve where every maturity failed is still
//! returned, with zero rows.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::markets::error::MarketDataError;
use crate::markets::fred::apicallfred::{latest_valid_observation, ApiCallFred};

/// Fixed treasury maturities, shortest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Term {
    #[serde(rename = "3M")]
    M3,
    #[serde(rename = "6M")]
    M6,
    #[serde(rename = "1Y")]
    Y1,
    #[serde(rename = "2Y")]
    Y2,
    #[serde(rename = "3Y")]
    Y3,
    #[serde(rename = "5Y")]
    Y5,
    #[serde(rename = "7Y")]
    Y7,
    #[serde(rename = "10Y")]
    Y10,
    #[serde(rename = "20Y")]
    Y20,
    #[serde(rename = "30Y")]
    Y30,
}

impl Term {
    pub const ALL: [Term; 10] = [
        Term::M3,
        Term::M6,
        Term::Y1,
        Term::Y2,
        Term::Y3,
        Term::Y5,
        Term::Y7,
        Term::Y10,
        Term::Y20,
        Term::Y30,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Term::M3 => "3M",
            Term::M6 => "6M",
            Term::Y1 => "1Y",
            Term::Y2 => "2Y",
            Term::Y3 => "3Y",
            Term::Y5 => "5Y",
            Term::Y7 => "7Y",
            Term::Y10 => "10Y",
            Term::Y20 => "20Y",
            Term::Y30 => "30Y",
        }
    }

    /// FRED constant-maturity series for this term.
    pub fn series_id(self) -> &'static str {
        match self {
            Term::M3 => "DGS3MO",
            Term::M6 => "DGS6MO",
            Term::Y1 => "DGS1",
            Term::Y2 => "DGS2",
            Term::Y3 => "DGS3",
            Term::Y5 => "DGS5",
            Term::Y7 => "DGS7",
            Term::Y10 => "DGS10",
            Term::Y20 => "DGS20",
            Term::Y30 => "DGS30",
        }
    }

    fn valid_labels() -> String {
        Term::ALL.iter().map(|t| t.label()).collect::<Vec<_>>().join(", ")
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Term {
    type Err = MarketDataError;

    /// Case-insensitive label lookup (`"10y"` -> `Term::Y10`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Term::ALL
            .iter()
            .copied()
            .find(|t| t.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| MarketDataError::UnknownTerm {
                term: s.to_string(),
                valid: Term::valid_labels(),
            })
    }
}

/// One row of the curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldPoint {
    pub term: Term,
    /// Yield in percent.
    pub rate: f64,
    /// Date of the observation the rate was taken from.
    pub date: NaiveDate,
}

/// A maturity left out of the curve, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermFailure {
    pub term: Term,
    pub kind: String,
    pub reason: String,
}

/// Latest yield per maturity: a (term, rate) table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YieldCurve {
    pub rows: Vec<YieldPoint>,
    pub failures: Vec<TermFailure>,
}

impl YieldCurve {
    /// Number of maturities with a rate.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rate(&self, term: Term) -> Option<f64> {
        self.rows.iter().find(|p| p.term == term).map(|p| p.rate)
    }

    pub fn terms(&self) -> impl Iterator<Item = Term> + '_ {
        self.rows.iter().map(|p| p.term)
    }
}

impl fmt::Display for YieldCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>4}  {:>8}", "Term", "Rate")?;
        for point in &self.rows {
            writeln!(f, "{:>4}  {:>8.2}", point.term.label(), point.rate)?;
        }
        Ok(())
    }
}

/// Service fetching treasury yields from FRED.
pub struct TreasuryCurve {
    api_call: Arc<ApiCallFred>,
}

impl TreasuryCurve {
    pub fn new(api_call: Arc<ApiCallFred>) -> Self {
        Self { api_call }
    }

    /// Latest defined yield of one maturity.
    pub async fn rate(&self, term: Term) -> Result<YieldPoint, MarketDataError> {
        let series_id = term.series_id();
        let series = self.api_call.fetch_observations(series_id).await?;
        let (date, rate) = latest_valid_observation(series_id, &series)?;
        Ok(YieldPoint { term, rate, date })
    }

    /// Like [`TreasuryCurve::rate`], from a label such as `"10Y"`.
    pub async fn rate_for_label(&self, label: &str) -> Result<YieldPoint, MarketDataError> {
        let term = label.parse::<Term>().inspect_err(|e| error!("Error: {}", e))?;
        self.rate(term).await
    }

    /// Every maturity with its individual outcome, in maturity order.
    pub async fn all_rates(&self) -> Vec<(Term, Result<YieldPoint, MarketDataError>)> {
        let mut outcomes = Vec::with_capacity(Term::ALL.len());
        for term in Term::ALL {
            let outcome = self.rate(term).await;
            match &outcome {
                Ok(point) => info!(term = term.label(), rate = point.rate, "{}: {}", term, point.rate),
                Err(e) => error!(
                    term = term.label(),
                    series_id = term.series_id(),
                    kind = e.kind(),
                    "Error retrieving data for {} ({}): {}",
                    term,
                    term.series_id(),
                    e
                ),
            }
            outcomes.push((term, outcome));
        }
        outcomes
    }

    /// The latest curve. Never fails as a whole; see the module docs.
    pub async fn latest_curve(&self) -> YieldCurve {
        let mut curve = YieldCurve::default();
        for (term, outcome) in self.all_rates().await {
            match outcome {
                Ok(point) => curve.rows.push(point),
                Err(e) => curve.failures.push(TermFailure {
                    term,
                    kind: e.kind().to_string(),
                    reason: e.to_string(),
                }),
            }
        }
        curve
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieve::ky_http::ClientOptions;
    use crate::retrieve::mock_server::{MockResponse, MockServer};

    fn curve_service<F>(respond: F) -> TreasuryCurve
    where
        F: Fn(&str) -> MockResponse + Send + 'static,
    {
        let server = MockServer::start(move |req| respond(req.query_param("series_id").as_deref().unwrap_or_default()));
        let api = ApiCallFred::new(&server.url(""), "k3y", ClientOptions::default()).unwrap();
        TreasuryCurve::new(Arc::new(api))
    }

    fn series_body(value: &str) -> String {
        format!(
            r#"{{"observations":[{{"date":"2024-04-29","value":"{}"}},{{"date":"2024-04-30","value":"."}}]}}"#,
            value
        )
    }

    #[test]
    fn test_term_labels_and_series() {
        assert_eq!(Term::ALL.len(), 10);
        assert_eq!(Term::M3.series_id(), "DGS3MO");
        assert_eq!(Term::Y30.label(), "30Y");
        assert_eq!("10y".parse::<Term>().unwrap(), Term::Y10);
        assert_eq!(serde_json::to_string(&Term::M6).unwrap(), "\"6M\"");
    }

    #[test]
    fn test_unknown_term_lists_valid_labels() {
        let err = "4Y".parse::<Term>().unwrap_err();
        assert_eq!(err.kind(), "unknown_term");
        assert!(err.to_string().contains("3M, 6M, 1Y, 2Y, 3Y, 5Y, 7Y, 10Y, 20Y, 30Y"));
    }

    #[tokio::test]
    async fn test_latest_curve_all_terms_skip_trailing_gap() {
        let service = curve_service(|_| MockResponse::json(200, &series_body("4.50")));
        let curve = service.latest_curve().await;

        assert_eq!(curve.len(), 10);
        assert!(curve.failures.is_empty());
        assert_eq!(curve.terms().collect::<Vec<_>>(), Term::ALL.to_vec());
        assert_eq!(curve.rows[0].date, NaiveDate::from_ymd_opt(2024, 4, 29).unwrap());
        assert_eq!(curve.rate(Term::Y10), Some(4.50));
    }

    #[tokio::test]
    async fn test_latest_curve_omits_failed_term() {
        let service = curve_service(|series| {
            if series == "DGS7" {
                MockResponse::json(500, "{}")
            } else {
                MockResponse::json(200, &series_body("4.25"))
            }
        });
        let curve = service.latest_curve().await;

        assert_eq!(curve.len(), 9);
        assert_eq!(curve.rate(Term::Y7), None);
        assert_eq!(curve.failures.len(), 1);
        assert_eq!(curve.failures[0].term, Term::Y7);
        assert_eq!(curve.failures[0].kind, "http_status");
    }

    #[tokio::test]
    async fn test_latest_curve_all_failing_is_empty_table() {
        let service = curve_service(|_| MockResponse::json(200, r#"{"observations":[]}"#));
        let curve = service.latest_curve().await;

        assert!(curve.is_empty());
        assert_eq!(curve.failures.len(), 10);
    }

    #[tokio::test]
    async fn test_rate_for_label() {
        let service = curve_service(|series| {
            if series == "DGS2" {
                MockResponse::json(200, &series_body("4.91"))
            } else {
                MockResponse::json(404, "{}")
            }
        });

        let point = service.rate_for_label("2Y").await.unwrap();
        assert_eq!((point.term, point.rate), (Term::Y2, 4.91));

        let err = service.rate_for_label("8Y").await.unwrap_err();
        assert!(matches!(err, MarketDataError::UnknownTerm { .. }));
    }

    #[test]
    fn test_display_two_columns() {
        let curve = YieldCurve {
            rows: vec![YieldPoint {
                term: Term::Y10,
                rate: 4.5,
                date: NaiveDate::from_ymd_opt(2024, 4, 29).unwrap(),
            }],
            failures: Vec::new(),
        };
        assert_eq!(curve.to_string(), "Term      Rate\n 10Y      4.50\n");
    }
}
