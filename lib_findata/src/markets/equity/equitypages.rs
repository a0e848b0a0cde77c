//! # Equity Pages
//!
//! Displayed values scraped from two Yahoo Finance pages. Both URLs come from
//! configuration; the defaults are the `^GSPC` quote page and the gainers
//! screener.
//!
//! The gainers field is located by the class `js-signals_1` on a `span`.
//! That name has historically been handed over as a bare string where an
//! attribute filter was expected, which HTML libraries treat as a class
//! match; the selector here spells that out.

use tracing::{error, info};

use crate::markets::error::MarketDataError;
use crate::retrieve::html::{extract_field, extract_rows, fetch_document, FieldSelector};
use crate::retrieve::ky_http::{ApiClient, ClientOptions, FetchError};

const SNP_PRICE_TEST_ID: &str = "qsp-price";
const GAINERS_CLASS: &str = "js-signals_1";

/// Selector of the live index price on the quote page.
pub fn snp_price_selector() -> FieldSelector {
    FieldSelector::attribute("data-testid", SNP_PRICE_TEST_ID)
}

/// Selector of the gainers field.
pub fn gainers_selector() -> FieldSelector {
    FieldSelector::class(GAINERS_CLASS)
}

/// Parses a displayed number such as `"5,123.45"`, `"+1.25%"` or `"(0.50)"`.
pub fn parse_displayed_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let (negative, body) = match trimmed.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, trimmed),
    };
    let cleaned: String = body
        .trim_end_matches('%')
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    let value = cleaned.parse::<f64>().ok().filter(|v| v.is_finite())?;
    Some(if negative { -value } else { value })
}

/// Scraper of the configured quote and gainers pages.
pub struct EquityPages {
    client: ApiClient,
    snp_live_url: String,
    gainers_url: String,
}

impl EquityPages {
    pub fn new(snp_live_url: &str, gainers_url: &str, options: ClientOptions) -> Result<Self, FetchError> {
        Ok(Self {
            client: ApiClient::new(snp_live_url, options)?,
            snp_live_url: snp_live_url.to_string(),
            gainers_url: gainers_url.to_string(),
        })
    }

    async fn scrape(&self, url: &str, selector: &FieldSelector) -> Result<String, MarketDataError> {
        let document = fetch_document(&self.client, url).await?;
        extract_field(&document, selector).ok_or_else(|| MarketDataError::ElementNotFound {
            url: url.to_string(),
            selector: selector.to_string(),
        })
    }

    /// Live S&P 500 price as displayed, text verbatim.
    pub async fn snp_live(&self) -> Result<String, MarketDataError> {
        let result = self.scrape(&self.snp_live_url, &snp_price_selector()).await;
        match &result {
            Ok(text) => info!(url = %self.snp_live_url, text = %text, "Live index price scraped"),
            Err(e) => error!(url = %self.snp_live_url, kind = e.kind(), "Error scraping live index price: {}", e),
        }
        result
    }

    /// Live S&P 500 price parsed as a number.
    pub async fn snp_live_value(&self) -> Result<f64, MarketDataError> {
        let text = self.snp_live().await?;
        parse_displayed_number(&text).ok_or_else(|| MarketDataError::MissingValue {
            series: format!("{} ({})", self.snp_live_url, text.trim()),
        })
    }

    /// Gainers field as displayed, text verbatim.
    pub async fn gainers(&self) -> Result<String, MarketDataError> {
        let result = self.scrape(&self.gainers_url, &gainers_selector()).await;
        match &result {
            Ok(text) => info!(url = %self.gainers_url, text = %text, "Gainers field scraped"),
            Err(e) => error!(url = %self.gainers_url, kind = e.kind(), "Error scraping gainers: {}", e),
        }
        result
    }

    /// Cell texts of each body row of the first table on the gainers page.
    pub async fn gainers_table(&self) -> Result<Vec<Vec<String>>, MarketDataError> {
        let table = FieldSelector::any("table");
        let document = fetch_document(&self.client, &self.gainers_url).await?;
        let rows = extract_rows(&document, &table);
        if rows.is_empty() {
            error!(url = %self.gainers_url, "No gainers table rows found");
            return Err(MarketDataError::ElementNotFound {
                url: self.gainers_url.clone(),
                selector: table.to_string(),
            });
        }
        info!(url = %self.gainers_url, rows = rows.len(), "Gainers table scraped");
        Ok(rows)
    }
}
