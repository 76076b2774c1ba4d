//! Synthetic country records.
//!
//! Used as a standalone data source (`gridmix mock`) and as the fallback when a
//! live fetch fails. Values are random; the shape (fields, ranges, a mix that
//! sums to exactly 100) is fixed per country.

use std::ops::Range;

use chrono::Utc;
use rand::prelude::*;
use rand::rngs::StdRng;

use crate::domain::{Country, CountryEmissions, FuelCategory, GenerationMix};

struct MockProfile {
    demand_mw: Range<u32>,
    intensity: Range<u32>,
    /// Drawn in order; each draw is capped at what is left of 100.
    shares: &'static [(FuelCategory, Range<u32>)],
}

static AU_PROFILE: MockProfile = MockProfile {
    demand_mw: 15_000..25_000,
    intensity: 250..450,
    shares: &[
        (FuelCategory::Coal, 30..60),
        (FuelCategory::Wind, 15..35),
        (FuelCategory::Solar, 10..30),
        (FuelCategory::Gas, 5..20),
    ],
};

static NZ_PROFILE: MockProfile = MockProfile {
    demand_mw: 4_000..5_000,
    intensity: 50..100,
    shares: &[
        (FuelCategory::Hydro, 50..70),
        (FuelCategory::Wind, 15..35),
        (FuelCategory::Geothermal, 5..15),
        (FuelCategory::Gas, 5..15),
    ],
};

fn profile(country: Country) -> &'static MockProfile {
    match country {
        Country::Nz => &NZ_PROFILE,
        Country::Au => &AU_PROFILE,
    }
}

/// Generate a mock record with the caller's RNG (seed it for reproducible output).
pub fn generate_mock<R: Rng>(country: Country, rng: &mut R) -> CountryEmissions {
    let profile = profile(country);

    let mut remaining = 100u32;
    let mut generation_mix = GenerationMix::new();
    for (fuel, range) in profile.shares {
        let share = rng.gen_range(range.clone()).min(remaining);
        remaining -= share;
        generation_mix.insert(*fuel, share);
    }
    generation_mix.insert(FuelCategory::Other, remaining);

    CountryEmissions {
        country,
        timestamp: Utc::now(),
        total_demand_mw: f64::from(rng.gen_range(profile.demand_mw.clone())),
        carbon_intensity: f64::from(rng.gen_range(profile.intensity.clone())),
        generation_mix,
    }
}

/// Mock record from a fixed seed.
pub fn generate_mock_seeded(country: Country, seed: u64) -> CountryEmissions {
    let mut rng = StdRng::seed_from_u64(seed);
    generate_mock(country, &mut rng)
}

/// Mock record from the thread-local RNG.
pub fn mock_for(country: Country) -> CountryEmissions {
    generate_mock(country, &mut rand::thread_rng())
}
