//! # FRED API Client
//!
//! Retrieves the observations of a series from `fred/series/observations`.
//! The API key is supplied by the caller at construction; nothing here reads
//! process configuration.
//!
//! FRED encodes a missing observation as the string `"."`; such entries are
//! kept (so "last entry" means the literal last entry) with `value: None`.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::markets::error::MarketDataError;
use crate::retrieve::ky_http::{ApiClient, ClientOptions, FetchError};

const OBSERVATIONS_PATH: &str = "fred/series/observations";

/// One dated entry of a FRED series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    /// `None` where FRED reports `"."`.
    #[serde(deserialize_with = "deserialize_fred_value")]
    pub value: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ObservationsEnvelope {
    #[serde(default)]
    observations: Vec<Observation>,
}

/// FRED sends values as strings; `"."` marks a missing value.
fn deserialize_fred_value<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let raw = raw.trim();
    if raw == "." || raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(Some)
        .map_err(|e| serde::de::Error::custom(format!("invalid observation value {raw:?}: {e}")))
}

/// Client for FRED series observations.
pub struct ApiCallFred {
    client: ApiClient,
    api_key: String,
}

impl ApiCallFred {
    /// Creates a client against `base_url` (normally `https://api.stlouisfed.org/`).
    pub fn new(base_url: &str, api_key: impl Into<String>, options: ClientOptions) -> Result<Self, FetchError> {
        Ok(Self {
            client: ApiClient::new(base_url, options)?,
            api_key: api_key.into(),
        })
    }

    /// Every observation of `series_id`, oldest first.
    ///
    /// An invalid key surfaces as `FetchError::HttpStatus` (FRED answers 400).
    /// A series with no observations is `EmptySeries`.
    pub async fn fetch_observations(&self, series_id: &str) -> Result<Vec<Observation>, MarketDataError> {
        let query = [
            ("series_id", series_id),
            ("api_key", self.api_key.as_str()),
            ("file_type", "json"),
        ];
        let envelope: ObservationsEnvelope = self.client.get_json(OBSERVATIONS_PATH, &query).await?;

        if envelope.observations.is_empty() {
            return Err(MarketDataError::EmptySeries {
                series: series_id.to_string(),
            });
        }
        debug!(series_id, count = envelope.observations.len(), "FRED observations fetched");
        Ok(envelope.observations)
    }
}

/// The literal last observation; a missing value there is `MissingValue`.
pub fn latest_observation(series_id: &str, observations: &[Observation]) -> Result<(NaiveDate, f64), MarketDataError> {
    match observations.last() {
        None => Err(MarketDataError::EmptySeries {
            series: series_id.to_string(),
        }),
        Some(Observation { value: None, .. }) => Err(MarketDataError::MissingValue {
            series: series_id.to_string(),
        }),
        Some(Observation { date, value: Some(v) }) => Ok((*date, *v)),
    }
}

/// The last observation carrying a finite value; trailing gaps are skipped.
pub fn latest_valid_observation(series_id: &str, observations: &[Observation]) -> Result<(NaiveDate, f64), MarketDataError> {
    if observations.is_empty() {
        return Err(MarketDataError::EmptySeries {
            series: series_id.to_string(),
        });
    }
    observations
        .iter()
        .rev()
        .find_map(|o| o.value.filter(|v| v.is_finite()).map(|v| (o.date, v)))
        .ok_or_else(|| MarketDataError::MissingValue {
            series: series_id.to_string(),
        })
}
