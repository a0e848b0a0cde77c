//! # FRED Integration Module
//!
//! Time series from the Federal Reserve Economic Data API.
//!
//! ## Contained Modules:
//!
//! - **`apicallfred`**: observations client holding the API key, plus the
//!   two latest-value selection policies (literal last entry, last defined
//!   entry).
//! - **`sofr`**: the Secured Overnight Financing Rate.
//! - **`treasury`**: the fixed set of treasury maturities and the yield
//!   curve assembled from them.

/// Client for `fred/series/observations`.
pub mod apicallfred;
/// Secured Overnight Financing Rate.
pub mod sofr;
/// Treasury maturities and the latest yield curve.
pub mod treasury;
