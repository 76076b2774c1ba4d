//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the canonical per-country record (`CountryEmissions`) and fuel buckets
//! - fetch outcomes and the combined result handed to the presentation layer
//! - fetch configuration (`FetchConfig`)

pub mod config;
pub mod types;

pub use config::*;
pub use types::*;
