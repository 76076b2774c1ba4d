//! Fetch configuration.
//!
//! Values come from the environment (a `.env` file is read first) and can be
//! overridden by CLI flags in `app::fetch_config_from_args`.

use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const DEFAULT_NZ_PRICE_URL: &str = "https://api.em6.co.nz/ords/em6/data_api/free/price";
pub const DEFAULT_NZ_INTENSITY_URL: &str =
    "https://api.em6.co.nz/ords/em6/data_api/free/current_carbon_intensity";
pub const DEFAULT_AU_URL: &str = "http://localhost:3001/api/emissions/australia";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const ENV_NZ_PRICE_URL: &str = "GRIDMIX_NZ_PRICE_URL";
const ENV_NZ_INTENSITY_URL: &str = "GRIDMIX_NZ_INTENSITY_URL";
const ENV_AU_URL: &str = "GRIDMIX_AU_URL";
const ENV_AU_API_KEY: &str = "GRIDMIX_AU_API_KEY";
const ENV_TIMEOUT_SECS: &str = "GRIDMIX_TIMEOUT_SECS";
const ENV_NZ_INTENSITY: &str = "GRIDMIX_NZ_INTENSITY";
const ENV_ON_FAILURE: &str = "GRIDMIX_ON_FAILURE";

/// How the NZ fetcher obtains carbon intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NzIntensityMode {
    /// Second call to the dedicated intensity feed.
    Feed,
    /// Skip the second call and estimate from the generation mix.
    Estimate,
}

/// What a country fetcher yields when its upstream fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Substitute a randomized mock record.
    Mock,
    /// Yield no record (null in the produced interface).
    Omit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchConfig {
    pub nz_price_url: String,
    pub nz_intensity_url: String,
    pub au_url: String,
    /// Bearer token sent with the AU request, if set.
    pub au_api_key: Option<String>,
    pub timeout: Duration,
    pub nz_intensity: NzIntensityMode,
    pub on_failure: FailurePolicy,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            nz_price_url: DEFAULT_NZ_PRICE_URL.to_string(),
            nz_intensity_url: DEFAULT_NZ_INTENSITY_URL.to_string(),
            au_url: DEFAULT_AU_URL.to_string(),
            au_api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            nz_intensity: NzIntensityMode::Feed,
            on_failure: FailurePolicy::Mock,
        }
    }
}

impl FetchConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (the environment in
    /// production, a map in tests). Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(url) = get(ENV_NZ_PRICE_URL) {
            config.nz_price_url = url;
        }
        if let Some(url) = get(ENV_NZ_INTENSITY_URL) {
            config.nz_intensity_url = url;
        }
        if let Some(url) = get(ENV_AU_URL) {
            config.au_url = url;
        }
        config.au_api_key = get(ENV_AU_API_KEY);

        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            config.timeout = parse_timeout(&raw)
                .map_err(|e| AppError::new(2, format!("Invalid {ENV_TIMEOUT_SECS}: {e}")))?;
        }
        if let Some(raw) = get(ENV_NZ_INTENSITY) {
            config.nz_intensity = NzIntensityMode::from_str(&raw, true)
                .map_err(|_| AppError::new(2, format!("Invalid {ENV_NZ_INTENSITY} '{raw}' (feed|estimate).")))?;
        }
        if let Some(raw) = get(ENV_ON_FAILURE) {
            config.on_failure = FailurePolicy::from_str(&raw, true)
                .map_err(|_| AppError::new(2, format!("Invalid {ENV_ON_FAILURE} '{raw}' (mock|omit).")))?;
        }

        Ok(config)
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, String> {
    let secs: u64 = raw.parse().map_err(|e| format!("'{raw}': {e}"))?;
    if secs == 0 {
        return Err("timeout must be at least 1 second".to_string());
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = FetchConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, FetchConfig::default());
        assert_eq!(config.on_failure, FailurePolicy::Mock);
        assert_eq!(config.nz_intensity, NzIntensityMode::Feed);
    }

    #[test]
    fn environment_overrides_are_applied() {
        let config = FetchConfig::from_lookup(lookup_from(&[
            (ENV_AU_URL, "http://relay.internal/au"),
            (ENV_AU_API_KEY, "  "),
            (ENV_TIMEOUT_SECS, "3"),
            (ENV_NZ_INTENSITY, "Estimate"),
            (ENV_ON_FAILURE, "omit"),
        ]))
        .unwrap();

        assert_eq!(config.au_url, "http://relay.internal/au");
        assert_eq!(config.au_api_key, None);
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.nz_intensity, NzIntensityMode::Estimate);
        assert_eq!(config.on_failure, FailurePolicy::Omit);
        assert_eq!(config.nz_price_url, DEFAULT_NZ_PRICE_URL);
    }

    #[test]
    fn invalid_values_are_config_errors() {
        let err = FetchConfig::from_lookup(lookup_from(&[(ENV_TIMEOUT_SECS, "0")])).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let err = FetchConfig::from_lookup(lookup_from(&[(ENV_ON_FAILURE, "retry")])).unwrap_err();
        assert!(err.to_string().contains("mock|omit"));
    }
}
