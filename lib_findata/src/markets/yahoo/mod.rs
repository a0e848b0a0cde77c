//! # Yahoo Finance Chart Integration Module
//!
//! - **`apicallyahoo`**: low-level client and wire model of the
//!   `v8/finance/chart` endpoint.
//! - **`indexquote`**: latest closing price of an index (the S&P 500 by default).

/// Client for the Yahoo chart endpoint.
pub mod apicallyahoo;
/// Latest index close taken from a chart response.
pub mod indexquote;
