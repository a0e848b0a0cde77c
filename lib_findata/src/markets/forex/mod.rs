//! # Forex Module
//!
//! - **`apicallforex`**: client of the exchangerate-api `v4/latest/{base}`
//!   endpoint and the validated rate table it returns.
//! - **`conversionmatrix`**: the square matrix of pairwise conversion
//!   factors derived from one rate table.

/// Rate table client.
pub mod apicallforex;
/// Pairwise conversion factors.
pub mod conversionmatrix;
