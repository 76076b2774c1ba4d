//! Command-line parsing for the NZ/AU grid emissions dashboard.
//!
//! The goal of this module is to keep **argument parsing** separate from
//! fetching and presentation. Flags here override the environment config.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{Country, FailurePolicy, NzIntensityMode};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "gridmix", version, about = "NZ & AU electricity generation mix and carbon intensity")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Write logs to this file instead of stderr (the TUI only logs when set).
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch both countries once and print a report.
    Fetch(FetchArgs),
    /// Print a randomized mock record as JSON.
    Mock(MockArgs),
    /// Render a previously exported snapshot JSON.
    Show(ShowArgs),
    /// Launch the interactive two-panel dashboard.
    ///
    /// Uses the same fetch cycle as `gridmix fetch`, rendered with Ratatui.
    Tui(TuiArgs),
}

/// Upstream overrides shared by `fetch` and `tui`.
#[derive(Debug, Args, Clone, Default)]
pub struct SourceArgs {
    /// NZ generation/price feed URL.
    #[arg(long, value_name = "URL")]
    pub nz_price_url: Option<String>,

    /// NZ carbon intensity feed URL.
    #[arg(long, value_name = "URL")]
    pub nz_intensity_url: Option<String>,

    /// AU relay URL.
    #[arg(long, value_name = "URL")]
    pub au_url: Option<String>,

    /// Per-request HTTP timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// NZ carbon intensity source.
    #[arg(long, value_enum)]
    pub nz_intensity: Option<NzIntensityMode>,

    /// What to show when a country's upstream fails.
    #[arg(long, value_enum)]
    pub on_failure: Option<FailurePolicy>,
}

#[derive(Debug, Args, Clone)]
pub struct FetchArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Print the `{nz, au}` pair as JSON instead of the text report.
    #[arg(long)]
    pub json: bool,

    /// Also write the detailed snapshot JSON to this path.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,

    /// Mix bar width (columns).
    #[arg(long, default_value_t = 40)]
    pub width: usize,
}

#[derive(Debug, Args, Clone)]
pub struct MockArgs {
    #[arg(long, value_enum)]
    pub country: Country,

    /// Seed for reproducible output.
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Debug, Args, Clone)]
pub struct ShowArgs {
    /// Snapshot JSON produced by `gridmix fetch --export` or the TUI `e` key.
    #[arg(long, value_name = "JSON")]
    pub file: PathBuf,

    /// Mix bar width (columns).
    #[arg(long, default_value_t = 40)]
    pub width: usize,
}

#[derive(Debug, Args, Clone, Default)]
pub struct TuiArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}
