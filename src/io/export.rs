//! Read/write snapshot JSON files.
//!
//! A snapshot file is a serialized `FetchReport`: both country outcomes with
//! their origin and fallback reason, plus the fetch time. `gridmix show`
//! renders one without touching the network.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::domain::FetchReport;
use crate::error::AppError;

/// Write a snapshot JSON file.
pub fn write_report_json(path: &Path, report: &FetchReport) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create snapshot JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, report)
        .map_err(|e| AppError::new(2, format!("Failed to write snapshot JSON: {e}")))?;

    Ok(())
}

/// Read a snapshot JSON file.
pub fn read_report_json(path: &Path) -> Result<FetchReport, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open snapshot JSON '{}': {e}", path.display())))?;
    let report: FetchReport =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid snapshot JSON: {e}")))?;
    Ok(report)
}

/// Timestamped file name in the working directory, used by the TUI export key.
pub fn default_export_path() -> PathBuf {
    let ts = Local::now().format("%Y%m%d_%H%M%S");
    PathBuf::from(format!("gridmix_snapshot_{ts}.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::generate_mock_seeded;
    use crate::domain::{Country, CountryOutcome};

    #[test]
    fn snapshot_file_reloads_unchanged() {
        let report = FetchReport::new(
            CountryOutcome::mock(generate_mock_seeded(Country::Nz, 1), "HTTP error: 500"),
            CountryOutcome::unavailable(Country::Au, "malformed payload: empty regions"),
        );
        let path = std::env::temp_dir().join(format!("gridmix_export_test_{}.json", std::process::id()));

        write_report_json(&path, &report).unwrap();
        let back = read_report_json(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(back, report);
    }

    #[test]
    fn exported_field_names_match_the_wire_format() {
        let report = FetchReport::new(
            CountryOutcome::live(generate_mock_seeded(Country::Nz, 2)),
            CountryOutcome::unavailable(Country::Au, "HTTP error: 404"),
        );
        let json = serde_json::to_value(&report).unwrap();
        let nz = &json["nz"]["emissions"];
        assert_eq!(nz["country"], "NZ");
        assert!(nz["totalDemandMW"].is_number());
        assert!(nz["carbonIntensity_gCO2kWh"].is_number());
        assert!(nz["generationMix"]["hydro"].is_number());
        assert_eq!(json["nz"]["origin"], "live");
        assert!(json["nz"].get("fallback_reason").is_none());
        assert_eq!(json["au"]["emissions"], serde_json::Value::Null);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = read_report_json(Path::new("/nonexistent/gridmix.json")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
