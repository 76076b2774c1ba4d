//! Generation-mix parsing: upstream fuel keys -> canonical fuel magnitudes.
//!
//! Every upstream source reports fuels under its own field names. A
//! `FuelKeyTable` is the explicit association between a `FuelCategory` and
//! the keys one source uses for it. Keys missing from the table are dropped
//! (and logged at debug level), never guessed.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::domain::FuelCategory;

/// One sparse upstream sub-record: field key -> magnitude (`None` = not reported).
pub type SubRecord = BTreeMap<String, Option<f64>>;

/// Canonical fuel -> absolute magnitude (MWh, MW, or summed percentages).
pub type Magnitudes = BTreeMap<FuelCategory, f64>;

/// Explicit canonical-fuel <-> upstream-key association for one source.
#[derive(Debug, Clone, Copy)]
pub struct FuelKeyTable {
    pub source: &'static str,
    entries: &'static [(FuelCategory, &'static [&'static str])],
}

/// em6 `generation_type` fields (NZ).
pub const NZ_EM6_KEYS: FuelKeyTable = FuelKeyTable {
    source: "em6",
    entries: &[
        (FuelCategory::Battery, &["bat_mwh"]),
        (FuelCategory::Hydro, &["hyd_mwh"]),
        (FuelCategory::Wind, &["win_mwh"]),
        (FuelCategory::Solar, &["sol_mwh"]),
        (FuelCategory::Gas, &["gas_mwh"]),
        (FuelCategory::Geothermal, &["geo_mwh"]),
        (FuelCategory::Coal, &["cg_mwh"]),
        (FuelCategory::CoGen, &["cog_mwh"]),
        (FuelCategory::DieselOil, &["liq_mwh"]),
    ],
};

/// Grid-data provider fueltech codes (AU).
pub const AU_FUELTECH_KEYS: FuelKeyTable = FuelKeyTable {
    source: "fueltech",
    entries: &[
        (FuelCategory::Battery, &["battery_discharging"]),
        (FuelCategory::Hydro, &["hydro"]),
        (FuelCategory::Wind, &["wind"]),
        (FuelCategory::Solar, &["solar_utility", "solar_rooftop"]),
        (
            FuelCategory::Gas,
            &["gas_ccgt", "gas_ocgt", "gas_recip", "gas_steam", "gas_wcmg"],
        ),
        (FuelCategory::Coal, &["coal_black", "coal_brown"]),
        (FuelCategory::DieselOil, &["distillate"]),
        (FuelCategory::Other, &["bioenergy_biomass", "bioenergy_biogas"]),
    ],
};

impl FuelKeyTable {
    /// Canonical fuels covered by this table, in table order.
    pub fn fuels(&self) -> impl Iterator<Item = FuelCategory> + '_ {
        self.entries.iter().map(|(fuel, _)| *fuel)
    }

    pub fn keys_for(&self, fuel: FuelCategory) -> &'static [&'static str] {
        self.entries
            .iter()
            .find(|(f, _)| *f == fuel)
            .map(|(_, keys)| *keys)
            .unwrap_or(&[])
    }

    pub fn fuel_for(&self, key: &str) -> Option<FuelCategory> {
        self.entries
            .iter()
            .find(|(_, keys)| keys.contains(&key))
            .map(|(fuel, _)| *fuel)
    }
}

/// Sum each canonical fuel's keys across all sub-records.
///
/// Every fuel in `table` appears in the output, even when nothing matched.
/// Missing values count as 0; negative values are clamped to 0 with a warning.
pub fn parse_generation_mix(records: &[SubRecord], table: &FuelKeyTable) -> Magnitudes {
    let mut out: Magnitudes = table.fuels().map(|fuel| (fuel, 0.0)).collect();
    let mut unmapped: BTreeSet<&str> = BTreeSet::new();

    for record in records {
        for (key, value) in record {
            let Some(fuel) = table.fuel_for(key) else {
                unmapped.insert(key.as_str());
                continue;
            };
            let Some(v) = *value else { continue };
            *out.entry(fuel).or_insert(0.0) += clamp_magnitude(table.source, key, v);
        }
    }

    if !unmapped.is_empty() {
        debug!(source = table.source, keys = ?unmapped, "dropping unmapped fuel keys");
    }

    out
}

fn clamp_magnitude(source: &str, key: &str, value: f64) -> f64 {
    if !value.is_finite() {
        warn!(source, key, value, "non-finite magnitude treated as 0");
        return 0.0;
    }
    if value < 0.0 {
        warn!(source, key, value, "negative magnitude clamped to 0");
        return 0.0;
    }
    value
}

/// Convert one JSON object into a `SubRecord`. Non-numeric fields become `None`.
pub fn sub_record_from_json(object: &Map<String, Value>) -> SubRecord {
    object
        .iter()
        .map(|(key, value)| (key.clone(), value.as_f64()))
        .collect()
}
