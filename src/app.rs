//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - resolves the fetch config (environment, then CLI overrides)
//! - dispatches to the text report, mock output, snapshot viewer or TUI

use std::time::Duration;

use clap::Parser;
use tracing::info;

use crate::cli::{Command, FetchArgs, MockArgs, ShowArgs, SourceArgs, TuiArgs};
use crate::data::{generate_mock_seeded, mock_for};
use crate::domain::FetchConfig;
use crate::error::AppError;
use crate::logging::LogTarget;

pub mod pipeline;
pub mod snapshot;

/// Entry point for the `gridmix` binary.
pub fn run() -> Result<(), AppError> {
    // We want `gridmix` and `gridmix --on-failure omit` to behave like
    // `gridmix tui ...`. Clap requires a subcommand name, so rewrite argv
    // before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let log_target = match (&cli.log_file, &cli.command) {
        (Some(path), _) => LogTarget::File(path.as_path()),
        (None, Command::Tui(_)) => LogTarget::Off,
        (None, _) => LogTarget::Stderr,
    };
    crate::logging::init(cli.verbose, log_target)?;

    match cli.command {
        Command::Fetch(args) => handle_fetch(args),
        Command::Mock(args) => handle_mock(args),
        Command::Show(args) => handle_show(args),
        Command::Tui(args) => handle_tui(args),
    }
}

fn handle_fetch(args: FetchArgs) -> Result<(), AppError> {
    let config = fetch_config_from_args(&args.source)?;
    let report = pipeline::fetch_live(&config)?;

    if args.json {
        let json = serde_json::to_string_pretty(&report.to_all())
            .map_err(|e| AppError::new(4, format!("Failed to serialize result: {e}")))?;
        println!("{json}");
    } else {
        println!("{}", crate::report::format_report(&report, args.width));
    }

    if let Some(path) = &args.export {
        crate::io::write_report_json(path, &report)?;
        info!(path = %path.display(), "snapshot exported");
    }

    Ok(())
}

fn handle_mock(args: MockArgs) -> Result<(), AppError> {
    let rec = match args.seed {
        Some(seed) => generate_mock_seeded(args.country, seed),
        None => mock_for(args.country),
    };
    let json = serde_json::to_string_pretty(&rec)
        .map_err(|e| AppError::new(4, format!("Failed to serialize mock record: {e}")))?;
    println!("{json}");
    Ok(())
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let report = crate::io::read_report_json(&args.file)?;
    println!("{}", crate::report::format_report(&report, args.width));
    Ok(())
}

fn handle_tui(args: TuiArgs) -> Result<(), AppError> {
    let config = fetch_config_from_args(&args.source)?;
    crate::tui::run(config)
}

/// Environment config with CLI overrides applied on top.
pub fn fetch_config_from_args(args: &SourceArgs) -> Result<FetchConfig, AppError> {
    let config = FetchConfig::from_env()?;
    apply_overrides(config, args)
}

fn apply_overrides(mut config: FetchConfig, args: &SourceArgs) -> Result<FetchConfig, AppError> {
    if let Some(url) = &args.nz_price_url {
        config.nz_price_url = url.clone();
    }
    if let Some(url) = &args.nz_intensity_url {
        config.nz_intensity_url = url.clone();
    }
    if let Some(url) = &args.au_url {
        config.au_url = url.clone();
    }
    if let Some(secs) = args.timeout {
        if secs == 0 {
            return Err(AppError::new(2, "--timeout must be at least 1 second."));
        }
        config.timeout = Duration::from_secs(secs);
    }
    if let Some(mode) = args.nz_intensity {
        config.nz_intensity = mode;
    }
    if let Some(policy) = args.on_failure {
        config.on_failure = policy;
    }
    Ok(config)
}

/// Rewrite argv so `gridmix` defaults to `gridmix tui`.
///
/// Rules:
/// - `gridmix`                         -> `gridmix tui`
/// - `gridmix --on-failure omit ...`   -> `gridmix tui --on-failure omit ...`
/// - `gridmix --help/--version/-h`     -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "fetch" | "mock" | "show" | "tui");
    if is_subcommand {
        return argv;
    }

    // Global flags may precede the subcommand.
    if argv[1..].iter().any(|a| matches!(a.as_str(), "fetch" | "mock" | "show" | "tui")) {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FailurePolicy, NzIntensityMode};

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_tui() {
        assert_eq!(rewrite_args(argv(&["gridmix"])), argv(&["gridmix", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["gridmix", "--on-failure", "omit"])),
            argv(&["gridmix", "tui", "--on-failure", "omit"])
        );
    }

    #[test]
    fn explicit_subcommands_are_untouched() {
        for args in [
            argv(&["gridmix", "fetch", "--json"]),
            argv(&["gridmix", "--help"]),
            argv(&["gridmix", "-v", "fetch"]),
        ] {
            assert_eq!(rewrite_args(args.clone()), args);
        }
    }

    #[test]
    fn cli_flags_override_the_environment() {
        let base = FetchConfig {
            au_api_key: Some("key".into()),
            ..FetchConfig::default()
        };
        let args = SourceArgs {
            au_url: Some("http://127.0.0.1:9/au".into()),
            timeout: Some(2),
            nz_intensity: Some(NzIntensityMode::Estimate),
            on_failure: Some(FailurePolicy::Omit),
            ..SourceArgs::default()
        };

        let config = apply_overrides(base.clone(), &args).unwrap();
        assert_eq!(config.au_url, "http://127.0.0.1:9/au");
        assert_eq!(config.timeout, Duration::from_secs(2));
        assert_eq!(config.nz_intensity, NzIntensityMode::Estimate);
        assert_eq!(config.on_failure, FailurePolicy::Omit);
        assert_eq!(config.nz_price_url, base.nz_price_url);
        assert_eq!(config.au_api_key.as_deref(), Some("key"));

        let zero = SourceArgs {
            timeout: Some(0),
            ..SourceArgs::default()
        };
        assert_eq!(apply_overrides(base, &zero).unwrap_err().exit_code(), 2);
    }
}
