//! Upstream data sources and the per-country fetch/fallback policy.
//!
//! - `http`: the `Upstream` seam and its reqwest implementation
//! - `nz` / `au`: country fetchers (raw payload -> `CountryEmissions`)
//! - `mock`: synthetic records used as fallback and as a standalone source

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::{info, warn};

use crate::domain::{Country, CountryOutcome, FailurePolicy, FetchConfig};
use crate::error::FetchError;

pub mod au;
pub mod http;
pub mod mock;
pub mod nz;

pub use http::{HttpUpstream, Upstream};
pub use mock::{generate_mock, generate_mock_seeded, mock_for};

/// Run one country's fetcher and absorb any failure according to
/// `config.on_failure`. Never returns an error.
pub fn fetch_country(country: Country, upstream: &dyn Upstream, config: &FetchConfig) -> CountryOutcome {
    let result = match country {
        Country::Nz => nz::fetch_nz(upstream, config),
        Country::Au => au::fetch_au(upstream, config),
    };

    match result {
        Ok(emissions) => {
            info!(
                country = %country,
                demand_mw = emissions.total_demand_mw,
                intensity = emissions.carbon_intensity,
                mix_total = emissions.mix_total(),
                "live data fetched"
            );
            CountryOutcome::live(emissions)
        }
        Err(err) => fall_back(country, config.on_failure, &err),
    }
}

fn fall_back(country: Country, policy: FailurePolicy, err: &FetchError) -> CountryOutcome {
    match policy {
        FailurePolicy::Mock => {
            warn!(country = %country, error = %err, "upstream failed; using mock data");
            CountryOutcome::mock(mock_for(country), err.to_string())
        }
        FailurePolicy::Omit => {
            warn!(country = %country, error = %err, "upstream failed; no data for this cycle");
            CountryOutcome::unavailable(country, err.to_string())
        }
    }
}

/// Parse the timestamp formats seen across upstream feeds.
///
/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS` (taken as UTC), or a bare
/// date (midnight UTC).
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory `Upstream` for fetcher tests.

    use std::collections::HashMap;
    use std::sync::Mutex;

    use serde_json::Value;

    use super::Upstream;
    use crate::error::FetchError;

    #[derive(Default)]
    pub struct StubUpstream {
        responses: HashMap<String, Result<Value, FetchError>>,
        calls: Mutex<Vec<(String, Option<String>)>>,
    }

    impl StubUpstream {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_json(mut self, url: &str, body: Value) -> Self {
            self.responses.insert(url.to_string(), Ok(body));
            self
        }

        pub fn with_status(mut self, url: &str, status: u16) -> Self {
            self.responses.insert(url.to_string(), Err(FetchError::HttpStatus(status)));
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().iter().map(|(url, _)| url.clone()).collect()
        }

        pub fn bearers(&self) -> Vec<Option<String>> {
            self.calls.lock().unwrap().iter().map(|(_, b)| b.clone()).collect()
        }
    }

    impl Upstream for StubUpstream {
        fn get_json(&self, url: &str, bearer: Option<&str>) -> Result<Value, FetchError> {
            self.calls
                .lock()
                .unwrap()
                .push((url.to_string(), bearer.map(str::to_string)));
            self.responses
                .get(url)
                .cloned()
                .unwrap_or_else(|| Err(FetchError::Transport(format!("connection refused: {url}"))))
        }
    }
}
