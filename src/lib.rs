//! `grid-emissions` library crate.
//!
//! The binary (`gridmix`) is a thin wrapper around this library so that:
//!
//! - parsing, normalization and fallback logic are testable without a network
//! - the fetch cycle is shared by the text report and the TUI
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod mix;
pub mod plot;
pub mod report;
pub mod tui;
