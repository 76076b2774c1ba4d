//! Australia fetcher (relay service).
//!
//! The relay has changed its output over time, so the payload shape is
//! detected rather than assumed:
//!
//! - per-region map: `{"NSW": {totalDemandMW, carbonIntensity_gCO2kWh, generationMix}, ...}`
//! - flattened record: `{country, timestamp, totalDemandMW, carbonIntensity_gCO2kWh, generationMix}`
//! - provider series passthrough: `{"data": [{"metric": "power"|"emissions", "results": [...]}]}`
//!
//! Region maps are re-aggregated (demand summed, mixes summed then
//! normalized, intensity averaged); flattened records pass through;
//! provider series are parsed with the fueltech table.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::data::http::Upstream;
use crate::data::parse_instant;
use crate::domain::{Country, CountryEmissions, FetchConfig, FuelCategory, GenerationMix};
use crate::error::FetchError;
use crate::mix::{AU_FUELTECH_KEYS, IntensitySource, Magnitudes, SubRecord, normalize_mix, parse_generation_mix, resolve_intensity};

/// Detected relay payload shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayShape {
    Regions,
    Flat,
    ProviderSeries,
}

impl RelayShape {
    pub fn detect(object: &Map<String, Value>) -> Self {
        if object.contains_key("totalDemandMW") {
            RelayShape::Flat
        } else if object.get("data").is_some_and(Value::is_array) {
            RelayShape::ProviderSeries
        } else {
            RelayShape::Regions
        }
    }
}

#[derive(Debug, Deserialize)]
struct RegionRecord {
    #[serde(rename = "totalDemandMW", default)]
    total_demand_mw: Option<f64>,
    #[serde(rename = "carbonIntensity_gCO2kWh", default)]
    carbon_intensity: Option<f64>,
    #[serde(rename = "generationMix", default)]
    generation_mix: Option<Map<String, Value>>,
    #[serde(default)]
    timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FlatRecord {
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(rename = "totalDemandMW")]
    total_demand_mw: f64,
    #[serde(rename = "carbonIntensity_gCO2kWh")]
    carbon_intensity: f64,
    #[serde(rename = "generationMix", default)]
    generation_mix: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct ProviderResponse {
    data: Vec<MetricBlock>,
}

#[derive(Debug, Deserialize)]
struct MetricBlock {
    metric: String,
    #[serde(default)]
    results: Vec<SeriesResult>,
}

#[derive(Debug, Deserialize)]
struct SeriesResult {
    #[serde(default)]
    columns: SeriesColumns,
    #[serde(default)]
    data: Vec<(String, Option<f64>)>,
}

#[derive(Debug, Default, Deserialize)]
struct SeriesColumns {
    #[serde(default)]
    fueltech: Option<String>,
}

pub fn fetch_au(upstream: &dyn Upstream, config: &FetchConfig) -> Result<CountryEmissions, FetchError> {
    let body = upstream.get_json(&config.au_url, config.au_api_key.as_deref())?;
    parse_relay_payload(&body)
}

/// Turn any supported relay payload into one AU record.
pub fn parse_relay_payload(body: &Value) -> Result<CountryEmissions, FetchError> {
    let object = body
        .as_object()
        .ok_or_else(|| FetchError::malformed("AU relay: expected a JSON object"))?;

    let shape = RelayShape::detect(object);
    debug!(?shape, "AU relay payload shape");
    match shape {
        RelayShape::Flat => parse_flat(body),
        RelayShape::ProviderSeries => parse_provider_series(body),
        RelayShape::Regions => parse_regions(object),
    }
}

fn parse_regions(object: &Map<String, Value>) -> Result<CountryEmissions, FetchError> {
    if object.is_empty() {
        return Err(FetchError::malformed("AU relay: no regions in payload"));
    }

    let mut regions = Vec::with_capacity(object.len());
    for (name, value) in object {
        let region: RegionRecord = serde_json::from_value(value.clone())
            .map_err(|e| FetchError::malformed(format!("AU relay region '{name}': {e}")))?;
        regions.push(region);
    }
    if regions.iter().all(|r| r.total_demand_mw.is_none()) {
        return Err(FetchError::malformed("AU relay: no region reports totalDemandMW"));
    }

    let total_demand_mw: f64 = regions
        .iter()
        .map(|r| r.total_demand_mw.unwrap_or(0.0).max(0.0))
        .sum();

    let mut summed = Magnitudes::new();
    for region in &regions {
        let Some(mix) = &region.generation_mix else { continue };
        for (fuel, pct) in mix_entries(mix) {
            *summed.entry(fuel).or_insert(0.0) += pct;
        }
    }

    let intensities: Vec<f64> = regions
        .iter()
        .map(|r| r.carbon_intensity.unwrap_or(0.0))
        .collect();

    let timestamp = regions
        .iter()
        .filter_map(|r| r.timestamp.as_deref().and_then(parse_instant))
        .max();

    Ok(CountryEmissions {
        country: Country::Au,
        timestamp: timestamp.unwrap_or_else(Utc::now),
        total_demand_mw,
        carbon_intensity: resolve_intensity(IntensitySource::RegionAverage(&intensities)),
        generation_mix: normalize_mix(&summed),
    })
}

fn parse_flat(body: &Value) -> Result<CountryEmissions, FetchError> {
    let record: FlatRecord = serde_json::from_value(body.clone())
        .map_err(|e| FetchError::malformed(format!("AU relay record: {e}")))?;

    if let Some(country) = record.country.as_deref() {
        if country != Country::Au.code() {
            return Err(FetchError::malformed(format!(
                "AU relay record is for country '{country}'"
            )));
        }
    }

    let generation_mix: GenerationMix = mix_entries(&record.generation_mix)
        .map(|(fuel, pct)| (fuel, pct.round().clamp(0.0, 100.0) as u32))
        .collect();

    Ok(CountryEmissions {
        country: Country::Au,
        timestamp: record
            .timestamp
            .as_deref()
            .and_then(parse_instant)
            .unwrap_or_else(Utc::now),
        total_demand_mw: record.total_demand_mw.max(0.0),
        carbon_intensity: resolve_intensity(IntensitySource::Feed(record.carbon_intensity)),
        generation_mix,
    })
}

fn parse_provider_series(body: &Value) -> Result<CountryEmissions, FetchError> {
    let resp: ProviderResponse = serde_json::from_value(body.clone())
        .map_err(|e| FetchError::malformed(format!("AU provider series: {e}")))?;

    let mut power: Vec<SubRecord> = Vec::new();
    let mut emissions_t = 0.0;
    let mut latest_ts: Option<DateTime<Utc>> = None;

    for block in &resp.data {
        for series in &block.results {
            let Some(fueltech) = series.columns.fueltech.as_deref() else {
                continue;
            };
            let Some((ts, value)) = latest_point(&series.data) else {
                continue;
            };
            match block.metric.as_str() {
                "power" => {
                    if AU_FUELTECH_KEYS.fuel_for(fueltech).is_some() {
                        latest_ts = latest_ts.max(ts);
                    }
                    let mut record = SubRecord::new();
                    record.insert(fueltech.to_string(), Some(value));
                    power.push(record);
                }
                "emissions" => emissions_t += value.max(0.0),
                other => debug!(metric = other, "ignoring provider metric"),
            }
        }
    }

    if power.is_empty() {
        return Err(FetchError::malformed("AU provider series: no power series"));
    }

    let magnitudes = parse_generation_mix(&power, &AU_FUELTECH_KEYS);
    let total_demand_mw = crate::mix::normalize::total(&magnitudes);

    Ok(CountryEmissions {
        country: Country::Au,
        timestamp: latest_ts.unwrap_or_else(Utc::now),
        total_demand_mw,
        carbon_intensity: resolve_intensity(IntensitySource::EmissionsRatio {
            emissions_t,
            power_mw: total_demand_mw,
        }),
        generation_mix: normalize_mix(&magnitudes),
    })
}

/// Canonical-keyed numeric entries of a relay `generationMix`. Unknown fuel
/// names and non-numeric values are dropped.
fn mix_entries(mix: &Map<String, Value>) -> impl Iterator<Item = (FuelCategory, f64)> + '_ {
    mix.iter().filter_map(|(key, value)| {
        let Some(fuel) = FuelCategory::from_key(key) else {
            debug!(key = key.as_str(), "dropping unknown fuel in relay mix");
            return None;
        };
        value.as_f64().filter(|v| v.is_finite()).map(|v| (fuel, v.max(0.0)))
    })
}

/// Most recent non-null point of a `[timestamp, value]` series.
///
/// Uses timestamps when all of them parse, otherwise the last non-null entry.
fn latest_point(points: &[(String, Option<f64>)]) -> Option<(Option<DateTime<Utc>>, f64)> {
    let present: Vec<(Option<DateTime<Utc>>, f64)> = points
        .iter()
        .filter_map(|(ts, v)| v.map(|v| (parse_instant(ts), v)))
        .collect();

    if present.iter().all(|(ts, _)| ts.is_some()) {
        present.into_iter().max_by_key(|(ts, _)| *ts)
    } else {
        present.into_iter().last()
    }
}
