//! # Data Retrieval Module
//!
//! Generic retrieval utilities shared by every market data client.
//!
//! ## Contained Modules:
//!
//! - **`ky_http`**: a GET-oriented `ApiClient` built on `reqwest` that sends a
//!   browser-like header set and turns non-2xx responses into typed errors.
//! - **`html`**: parsing of fetched pages and extraction of single fields or
//!   table rows through a `FieldSelector`.
//!
//! Every call is a single attempt; there is no retry layer.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms, unused_qualifications)]

/// HTTP client with browser-mimicking headers and typed failures.
pub mod ky_http;
/// HTML document parsing and field extraction.
pub mod html;

#[cfg(test)]
pub(crate) mod mock_server;
