use std::sync::Arc;

use tracing::{error, info};

use crate::markets::error::MarketDataError;
use crate::markets::fred::apicallfred::{latest_observation, ApiCallFred};

/// FRED series identifier of the Secured Overnight Financing Rate.
pub const SOFR_SERIES: &str = "SOFR";

/// Latest SOFR fixing.
pub struct Sofr {
    api_call: Arc<ApiCallFred>,
}

impl Sofr {
    pub fn new(api_call: Arc<ApiCallFred>) -> Self {
        Self { api_call }
    }

    /// The literal last observation of the series, in percent.
    pub async fn latest(&self) -> Result<f64, MarketDataError> {
        let result = match self.api_call.fetch_observations(SOFR_SERIES).await {
            Ok(series) => latest_observation(SOFR_SERIES, &series).map(|(_, rate)| rate),
            Err(e) => Err(e),
        };

        match &result {
            Ok(rate) => info!(rate, "SOFR rate retrieved"),
            Err(e) => error!(kind = e.kind(), "Error retrieving SOFR rate: {}", e),
        }
        result
    }
}
