//! # Configuration Modules
//!
//! Runtime configuration for the market data clients. Values are layered from
//! a `.env` file, an optional JSON file and the process environment, and the
//! result is handed explicitly to every client constructor.

/// Application configuration loading and validation.
pub mod config_app;
