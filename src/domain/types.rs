//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - rebuilt from scratch on every fetch cycle
//! - exported to JSON and reloaded later (`gridmix show`)
//! - handed to the TUI without any further conversion

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Countries covered by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
pub enum Country {
    #[serde(rename = "NZ")]
    #[value(name = "nz")]
    Nz,
    #[serde(rename = "AU")]
    #[value(name = "au")]
    Au,
}

impl Country {
    pub const ALL: [Country; 2] = [Country::Nz, Country::Au];

    pub fn code(self) -> &'static str {
        match self {
            Country::Nz => "NZ",
            Country::Au => "AU",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Country::Nz => "New Zealand (Aotearoa)",
            Country::Au => "Australia",
        }
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Canonical technology bucket used by every generation mix.
///
/// Upstream sources name fuels differently (`hyd_mwh`, `coal_black`, ...);
/// the per-source tables in `mix::parser` map those keys onto this enum.
/// Declaration order is the display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FuelCategory {
    Hydro,
    Wind,
    Solar,
    Gas,
    Coal,
    Geothermal,
    Battery,
    CoGen,
    DieselOil,
    Other,
}

impl FuelCategory {
    pub const ALL: [FuelCategory; 10] = [
        FuelCategory::Hydro,
        FuelCategory::Wind,
        FuelCategory::Solar,
        FuelCategory::Gas,
        FuelCategory::Coal,
        FuelCategory::Geothermal,
        FuelCategory::Battery,
        FuelCategory::CoGen,
        FuelCategory::DieselOil,
        FuelCategory::Other,
    ];

    /// Serialized name (the key used in `generationMix`).
    pub fn key(self) -> &'static str {
        match self {
            FuelCategory::Hydro => "hydro",
            FuelCategory::Wind => "wind",
            FuelCategory::Solar => "solar",
            FuelCategory::Gas => "gas",
            FuelCategory::Coal => "coal",
            FuelCategory::Geothermal => "geothermal",
            FuelCategory::Battery => "battery",
            FuelCategory::CoGen => "coGen",
            FuelCategory::DieselOil => "dieselOil",
            FuelCategory::Other => "other",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        FuelCategory::ALL.into_iter().find(|f| f.key() == key)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            FuelCategory::Hydro => "Hydro",
            FuelCategory::Wind => "Wind",
            FuelCategory::Solar => "Solar",
            FuelCategory::Gas => "Gas",
            FuelCategory::Coal => "Coal",
            FuelCategory::Geothermal => "Geothermal",
            FuelCategory::Battery => "Battery",
            FuelCategory::CoGen => "Co-generation",
            FuelCategory::DieselOil => "Diesel/Oil",
            FuelCategory::Other => "Other",
        }
    }

    /// Fuels counted towards the renewable share on the dashboard.
    pub fn is_renewable(self) -> bool {
        matches!(
            self,
            FuelCategory::Hydro
                | FuelCategory::Wind
                | FuelCategory::Solar
                | FuelCategory::Geothermal
                | FuelCategory::Battery
        )
    }
}

impl fmt::Display for FuelCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Fuel category -> integer percentage share.
///
/// Each value is in `[0, 100]`. Values are rounded independently, so the sum
/// may drift to 99 or 101.
pub type GenerationMix = BTreeMap<FuelCategory, u32>;

/// Canonical per-country reading shared by NZ and AU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryEmissions {
    pub country: Country,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "totalDemandMW")]
    pub total_demand_mw: f64,
    #[serde(rename = "carbonIntensity_gCO2kWh")]
    pub carbon_intensity: f64,
    #[serde(rename = "generationMix")]
    pub generation_mix: GenerationMix,
}

impl CountryEmissions {
    /// Sum of all percentage shares (ideally 100).
    pub fn mix_total(&self) -> u32 {
        self.generation_mix.values().sum()
    }
}

/// Where a country's record came from in a fetch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataOrigin {
    Live,
    Mock,
    Unavailable,
}

impl DataOrigin {
    pub fn label(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Mock => "mock",
            Self::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for DataOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of one country fetcher, including why it fell back (if it did).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryOutcome {
    pub country: Country,
    pub origin: DataOrigin,
    pub emissions: Option<CountryEmissions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

impl CountryOutcome {
    pub fn live(emissions: CountryEmissions) -> Self {
        Self {
            country: emissions.country,
            origin: DataOrigin::Live,
            emissions: Some(emissions),
            fallback_reason: None,
        }
    }

    pub fn mock(emissions: CountryEmissions, reason: impl Into<String>) -> Self {
        Self {
            country: emissions.country,
            origin: DataOrigin::Mock,
            emissions: Some(emissions),
            fallback_reason: Some(reason.into()),
        }
    }

    pub fn unavailable(country: Country, reason: impl Into<String>) -> Self {
        Self {
            country,
            origin: DataOrigin::Unavailable,
            emissions: None,
            fallback_reason: Some(reason.into()),
        }
    }
}

/// The produced interface: one record (or null) per country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllEmissions {
    pub nz: Option<CountryEmissions>,
    pub au: Option<CountryEmissions>,
}

impl AllEmissions {
    /// True when neither country produced a record; the dashboard shows an
    /// error banner only in this case.
    pub fn is_unusable(&self) -> bool {
        self.nz.is_none() && self.au.is_none()
    }
}

/// Detailed result of one fetch cycle (also the JSON export format).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchReport {
    pub tool: String,
    pub fetched_at: DateTime<Utc>,
    pub nz: CountryOutcome,
    pub au: CountryOutcome,
}

impl FetchReport {
    pub fn new(nz: CountryOutcome, au: CountryOutcome) -> Self {
        Self {
            tool: "gridmix".to_string(),
            fetched_at: Utc::now(),
            nz,
            au,
        }
    }

    pub fn outcome(&self, country: Country) -> &CountryOutcome {
        match country {
            Country::Nz => &self.nz,
            Country::Au => &self.au,
        }
    }

    pub fn to_all(&self) -> AllEmissions {
        AllEmissions {
            nz: self.nz.emissions.clone(),
            au: self.au.emissions.clone(),
        }
    }

    pub fn is_unusable(&self) -> bool {
        self.nz.emissions.is_none() && self.au.emissions.is_none()
    }
}
