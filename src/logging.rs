//! `tracing` subscriber setup.
//!
//! `RUST_LOG` wins when set. Otherwise `-v` picks the level for this crate:
//! none = warn, one = info, two or more = debug.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Where log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget<'a> {
    Stderr,
    File(&'a Path),
    /// No subscriber at all (the TUI without `--log-file`).
    Off,
}

pub fn level_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

pub fn init(verbose: u8, target: LogTarget<'_>) -> Result<(), AppError> {
    let filter = || {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| format!("grid_emissions={}", level_for(verbose)).into())
    };

    // A second init (e.g. in tests) keeps the first subscriber.
    match target {
        LogTarget::Off => {}
        LogTarget::Stderr => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(std::io::stderr)
                .with_target(false)
                .try_init();
        }
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| AppError::new(2, format!("Failed to open log file '{}': {e}", path.display())))?;
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_for(0), "warn");
        assert_eq!(level_for(1), "info");
        assert_eq!(level_for(2), "debug");
        assert_eq!(level_for(9), "debug");
    }

    #[test]
    fn unwritable_log_file_is_an_io_error() {
        let err = init(0, LogTarget::File(Path::new("/nonexistent/dir/gridmix.log"))).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
