//! Presentation helpers shared by the text report and the TUI.
//!
//! Everything here is derived from a `CountryEmissions`; nothing is fetched.

use crate::domain::{CountryEmissions, FuelCategory};

pub mod format;

pub use format::*;

/// One bar in a mix chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartEntry {
    pub fuel: FuelCategory,
    pub label: &'static str,
    pub percent: u32,
    /// Approximate output, `round(percent / 100 * demand)`.
    pub mw: u64,
}

/// Renewable vs non-renewable share of a mix, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenewableSplit {
    pub renewable: u32,
    pub non_renewable: u32,
}

/// Non-zero fuels, largest share first (ties by fuel order).
pub fn chart_entries(rec: &CountryEmissions) -> Vec<ChartEntry> {
    let mut entries: Vec<ChartEntry> = rec
        .generation_mix
        .iter()
        .filter(|(_, pct)| **pct > 0)
        .map(|(fuel, pct)| ChartEntry {
            fuel: *fuel,
            label: fuel.display_name(),
            percent: *pct,
            mw: approx_mw(*pct, rec.total_demand_mw),
        })
        .collect();
    entries.sort_by(|a, b| b.percent.cmp(&a.percent).then(a.fuel.cmp(&b.fuel)));
    entries
}

/// Renewable share counts hydro, wind, solar, geothermal and battery.
///
/// Percentages are rounded independently, so the renewable sum can exceed
/// 100; the non-renewable side never goes below zero.
pub fn renewable_split(rec: &CountryEmissions) -> RenewableSplit {
    let renewable: u32 = rec
        .generation_mix
        .iter()
        .filter(|(fuel, _)| fuel.is_renewable())
        .map(|(_, pct)| *pct)
        .sum();
    RenewableSplit {
        renewable,
        non_renewable: 100u32.saturating_sub(renewable),
    }
}

/// Fixed RGB color per fuel, used by every chart.
pub fn fuel_rgb(fuel: FuelCategory) -> (u8, u8, u8) {
    match fuel {
        FuelCategory::Hydro => (59, 130, 246),
        FuelCategory::Wind => (16, 185, 129),
        FuelCategory::Solar => (245, 158, 11),
        FuelCategory::Gas => (239, 68, 68),
        FuelCategory::Coal => (120, 113, 108),
        FuelCategory::Geothermal => (139, 92, 246),
        FuelCategory::Battery => (6, 182, 212),
        FuelCategory::CoGen => (236, 72, 153),
        FuelCategory::DieselOil => (249, 115, 22),
        FuelCategory::Other => (156, 163, 175),
    }
}

fn approx_mw(percent: u32, demand_mw: f64) -> u64 {
    let mw = (f64::from(percent) / 100.0 * demand_mw).round();
    if mw.is_finite() && mw > 0.0 { mw as u64 } else { 0 }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{TimeZone, Utc};

    use crate::domain::{Country, CountryEmissions, FuelCategory, GenerationMix};

    pub fn record(country: Country, demand: f64, intensity: f64, mix: &[(FuelCategory, u32)]) -> CountryEmissions {
        let mut generation_mix = GenerationMix::new();
        for fuel in FuelCategory::ALL {
            generation_mix.insert(fuel, 0);
        }
        for (fuel, pct) in mix {
            generation_mix.insert(*fuel, *pct);
        }
        CountryEmissions {
            country,
            timestamp: Utc.with_ymd_and_hms(2025, 3, 1, 0, 30, 0).unwrap(),
            total_demand_mw: demand,
            carbon_intensity: intensity,
            generation_mix,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::record;
    use super::*;
    use crate::domain::Country;

    #[test]
    fn chart_entries_skip_zero_and_sort_by_share() {
        let rec = record(
            Country::Nz,
            4_000.0,
            80.0,
            &[
                (FuelCategory::Wind, 15),
                (FuelCategory::Hydro, 60),
                (FuelCategory::Gas, 15),
                (FuelCategory::Geothermal, 10),
            ],
        );
        let entries = chart_entries(&rec);
        let fuels: Vec<_> = entries.iter().map(|e| e.fuel).collect();
        assert_eq!(
            fuels,
            vec![FuelCategory::Hydro, FuelCategory::Wind, FuelCategory::Gas, FuelCategory::Geothermal]
        );
        assert_eq!(entries[0].mw, 2_400);
        assert_eq!(entries[0].label, "Hydro");
        assert_eq!(entries[3].mw, 400);
    }

    #[test]
    fn renewable_split_counts_the_renewable_fuels() {
        let rec = record(
            Country::Au,
            20_000.0,
            400.0,
            &[
                (FuelCategory::Coal, 50),
                (FuelCategory::Solar, 20),
                (FuelCategory::Wind, 15),
                (FuelCategory::Battery, 2),
                (FuelCategory::Gas, 13),
            ],
        );
        assert_eq!(
            renewable_split(&rec),
            RenewableSplit { renewable: 37, non_renewable: 63 }
        );
    }

    #[test]
    fn renewable_split_never_goes_negative() {
        let rec = record(
            Country::Nz,
            1.0,
            0.0,
            &[(FuelCategory::Hydro, 51), (FuelCategory::Wind, 50)],
        );
        let split = renewable_split(&rec);
        assert_eq!(split.renewable, 101);
        assert_eq!(split.non_renewable, 0);
    }

    #[test]
    fn every_fuel_has_a_distinct_color() {
        let mut seen = std::collections::HashSet::new();
        for fuel in FuelCategory::ALL {
            assert!(seen.insert(fuel_rgb(fuel)), "duplicate color for {fuel}");
        }
    }
}
