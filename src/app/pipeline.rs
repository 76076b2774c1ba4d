//! Shared fetch cycle used by both CLI and TUI front-ends.
//!
//! One cycle: NZ and AU fetchers run concurrently on their own scoped
//! threads, each absorbs its own failure, and the pair is returned together.
//! The front-ends only decide how to present the result.

use std::thread;

use tracing::{debug, error, info};

use crate::data::{HttpUpstream, Upstream, fetch_country};
use crate::domain::{AllEmissions, Country, CountryOutcome, FetchConfig, FetchReport};
use crate::error::AppError;

/// Run one fetch cycle against `upstream` and report per-country outcomes.
///
/// Never fails: a broken upstream becomes a mock or an empty outcome
/// according to `config.on_failure`. Wall time is bounded by the slower
/// country, not the sum of both.
pub fn fetch_all_detailed(upstream: &dyn Upstream, config: &FetchConfig) -> FetchReport {
    debug!(on_failure = ?config.on_failure, nz_intensity = ?config.nz_intensity, "starting fetch cycle");
    let (nz, au) = thread::scope(|s| {
        let nz = s.spawn(|| fetch_country(Country::Nz, upstream, config));
        let au = s.spawn(|| fetch_country(Country::Au, upstream, config));
        (joined(Country::Nz, nz.join()), joined(Country::Au, au.join()))
    });
    info!(nz = %nz.origin, au = %au.origin, "fetch cycle complete");
    FetchReport::new(nz, au)
}

fn joined(country: Country, result: thread::Result<CountryOutcome>) -> CountryOutcome {
    result.unwrap_or_else(|_| {
        error!(country = country.code(), "fetch thread panicked");
        CountryOutcome::unavailable(country, "fetch thread panicked")
    })
}

/// The plain `{nz, au}` pair; either side may be a mock or absent.
pub fn fetch_all(upstream: &dyn Upstream, config: &FetchConfig) -> AllEmissions {
    fetch_all_detailed(upstream, config).to_all()
}

/// Build the production HTTP upstream and run one cycle.
pub fn fetch_live(config: &FetchConfig) -> Result<FetchReport, AppError> {
    let upstream = HttpUpstream::new(config.timeout)?;
    Ok(fetch_all_detailed(&upstream, config))
}
