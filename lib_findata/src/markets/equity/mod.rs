//! # Equity Pages Module
//!
//! - **`equitypages`**: fields scraped from the Yahoo Finance `^GSPC` quote
//!   page and the day's gainers page.

/// Scraped quote and gainers pages.
pub mod equitypages;
