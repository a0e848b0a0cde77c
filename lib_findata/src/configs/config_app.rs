use std::path::Path;
use std::{env, fmt, fs};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable holding the FRED API key.
pub const ENV_FRED_API_KEY: &str = "FRED_API_KEY";
/// Environment variable pointing at an optional JSON configuration file.
pub const ENV_CONFIG_FILE: &str = "FINDATA_CONFIG_FILE";

pub const DEFAULT_REFERENCE_BASE: &str = "USD";
pub const DEFAULT_YAHOO_CHART_URL: &str = "https://query1.finance.yahoo.com/";
pub const DEFAULT_FRED_URL: &str = "https://api.stlouisfed.org/";
pub const DEFAULT_FOREX_URL: &str = "https://api.exchangerate-api.com/";
pub const DEFAULT_SNP_LIVE_URL: &str = "https://finance.yahoo.com/quote/%5EGSPC/";
pub const DEFAULT_GAINERS_URL: &str = "https://finance.yahoo.com/markets/stocks/gainers/";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error occurred: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Environment variable {0} is not present")]
    MissingEnvVar(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Provider endpoints. Overridable so tests and mirrors can point elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub yahoo_chart_url: String,
    pub fred_url: String,
    pub forex_url: String,
    pub snp_live_url: String,
    pub gainers_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            yahoo_chart_url: DEFAULT_YAHOO_CHART_URL.to_string(),
            fred_url: DEFAULT_FRED_URL.to_string(),
            forex_url: DEFAULT_FOREX_URL.to_string(),
            snp_live_url: DEFAULT_SNP_LIVE_URL.to_string(),
            gainers_url: DEFAULT_GAINERS_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// FRED credential. Only the SOFR and treasury retrievals need it.
    pub fred_api_key: Option<String>,
    /// Base currency of forex rate tables.
    pub reference_base: String,
    /// Currencies of the forex matrix; empty means every available currency.
    pub forex_currencies: Vec<String>,
    /// Overrides the HTTP client's browser user agent.
    pub user_agent: Option<String>,
    /// Whole-request timeout in seconds; `None` waits indefinitely.
    pub request_timeout_secs: Option<u64>,
    pub endpoints: Endpoints,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fred_api_key: None,
            reference_base: DEFAULT_REFERENCE_BASE.to_string(),
            forex_currencies: Vec::new(),
            user_agent: None,
            request_timeout_secs: None,
            endpoints: Endpoints::default(),
        }
    }
}

impl AppConfig {
    /// Reads a JSON configuration file. Missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Overrides fields from variables resolved through `lookup`.
    ///
    /// Recognized keys: `FRED_API_KEY`, `FINDATA_REFERENCE_BASE`,
    /// `FINDATA_FOREX_CURRENCIES` (comma separated), `FINDATA_USER_AGENT`,
    /// `FINDATA_REQUEST_TIMEOUT_SECS`, and `FINDATA_<ENDPOINT>_URL` for each
    /// endpoint (`YAHOO_CHART`, `FRED`, `FOREX`, `SNP_LIVE`, `GAINERS`).
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(key) = non_empty(ENV_FRED_API_KEY) {
            self.fred_api_key = Some(key);
        }
        if let Some(base) = non_empty("FINDATA_REFERENCE_BASE") {
            self.reference_base = base.to_uppercase();
        }
        if let Some(list) = non_empty("FINDATA_FOREX_CURRENCIES") {
            self.forex_currencies = parse_currency_list(&list);
        }
        if let Some(agent) = non_empty("FINDATA_USER_AGENT") {
            self.user_agent = Some(agent);
        }
        if let Some(raw) = non_empty("FINDATA_REQUEST_TIMEOUT_SECS") {
            let secs = raw.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                key: "FINDATA_REQUEST_TIMEOUT_SECS".to_string(),
                value: raw.clone(),
            })?;
            self.request_timeout_secs = Some(secs).filter(|s| *s > 0);
        }

        let endpoints = [
            ("FINDATA_YAHOO_CHART_URL", &mut self.endpoints.yahoo_chart_url),
            ("FINDATA_FRED_URL", &mut self.endpoints.fred_url),
            ("FINDATA_FOREX_URL", &mut self.endpoints.forex_url),
            ("FINDATA_SNP_LIVE_URL", &mut self.endpoints.snp_live_url),
            ("FINDATA_GAINERS_URL", &mut self.endpoints.gainers_url),
        ];
        for (key, slot) in endpoints {
            if let Some(url) = non_empty(key) {
                *slot = url;
            }
        }

        Ok(())
    }

    /// The FRED key, or `MissingEnvVar` when unset.
    pub fn fred_api_key(&self) -> Result<&str, ConfigError> {
        self.fred_api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar(ENV_FRED_API_KEY.to_string()))
    }
}

impl fmt::Display for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AppConfig
    FRED key: {},
    Reference base: {},
    Forex currencies: {:?},
    Request timeout: {:?},
    Endpoints: {:?}
",
            if self.fred_api_key.is_some() { "*****" } else { "<unset>" },
            self.reference_base,
            self.forex_currencies,
            self.request_timeout_secs,
            self.endpoints
        )
    }
}

/// Splits `"usd, EUR,,gbp"` into `["USD", "EUR", "GBP"]`.
pub fn parse_currency_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|c| c.trim().to_uppercase())
        .filter(|c| !c.is_empty())
        .collect()
}

/// Loads the configuration: `.env`, then `FINDATA_CONFIG_FILE` if set, then
/// the process environment.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();

    let mut config = match env::var(ENV_CONFIG_FILE) {
        Ok(path) if !path.trim().is_empty() => AppConfig::from_json_file(Path::new(path.trim()))?,
        _ => AppConfig::default(),
    };
    config.apply_env_from(|key| env::var(key).ok())?;
    Ok(config)
}
