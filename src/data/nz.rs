//! New Zealand fetcher (em6 free data API).
//!
//! Two sequential calls: the price feed (per trading period, with a
//! `generation_type` array of per-fuel MWh sub-records) and, in `feed` mode,
//! the carbon intensity feed. Either failing fails the whole NZ result.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::data::http::Upstream;
use crate::data::parse_instant;
use crate::domain::{Country, CountryEmissions, FetchConfig, NzIntensityMode};
use crate::error::FetchError;
use crate::mix::parser::sub_record_from_json;
use crate::mix::{IntensitySource, NZ_EM6_KEYS, SubRecord, normalize_mix, parse_generation_mix, resolve_intensity};

#[derive(Debug, Deserialize)]
struct PriceResponse {
    #[serde(default)]
    items: Vec<PriceItem>,
}

#[derive(Debug, Deserialize)]
struct PriceItem {
    #[serde(default)]
    trading_date: Option<String>,
    #[serde(default)]
    trading_period: Option<u32>,
    #[serde(default)]
    generation_type: Option<Vec<Map<String, Value>>>,
}

#[derive(Debug, Deserialize)]
struct IntensityResponse {
    #[serde(default)]
    items: Vec<IntensityItem>,
}

#[derive(Debug, Deserialize)]
struct IntensityItem {
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    current_carbon_intensity: Option<f64>,
    #[serde(default)]
    carbon_intensity: Option<f64>,
    #[serde(default)]
    intensity: Option<f64>,
}

impl IntensityItem {
    /// First of the known intensity keys that is present.
    fn value(&self) -> Option<f64> {
        self.current_carbon_intensity
            .or(self.carbon_intensity)
            .or(self.intensity)
    }
}

/// Generation totals for the most recent trading period.
#[derive(Debug, Clone)]
pub struct NzInterval {
    pub trading_date: Option<DateTime<Utc>>,
    pub records: Vec<SubRecord>,
}

/// One reading from the intensity feed.
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityReading {
    pub timestamp: Option<DateTime<Utc>>,
    pub value: f64,
}

/// Fetch and normalize NZ data. Errors are returned, not absorbed; the
/// fallback policy lives in `data::fetch_country`.
pub fn fetch_nz(upstream: &dyn Upstream, config: &FetchConfig) -> Result<CountryEmissions, FetchError> {
    let price = upstream.get_json(&config.nz_price_url, None)?;
    let interval = parse_price_feed(price)?;

    let magnitudes = parse_generation_mix(&interval.records, &NZ_EM6_KEYS);
    let generation_mix = normalize_mix(&magnitudes);
    let total_demand_mw = crate::mix::normalize::total(&magnitudes);

    let (carbon_intensity, timestamp) = match config.nz_intensity {
        NzIntensityMode::Feed => {
            let body = upstream.get_json(&config.nz_intensity_url, None)?;
            let reading = parse_intensity_feed(body)?;
            (
                resolve_intensity(IntensitySource::Feed(reading.value)),
                reading.timestamp.or(interval.trading_date),
            )
        }
        NzIntensityMode::Estimate => (
            resolve_intensity(IntensitySource::EstimatedFromMix(&generation_mix)),
            interval.trading_date,
        ),
    };

    Ok(CountryEmissions {
        country: Country::Nz,
        timestamp: timestamp.unwrap_or_else(Utc::now),
        total_demand_mw,
        carbon_intensity,
        generation_mix,
    })
}

/// Pick the latest trading period from a price feed body.
///
/// Latest means the greatest `(trading_date, trading_period)` when every item
/// has a parseable date; otherwise the last item in the array.
pub fn parse_price_feed(body: Value) -> Result<NzInterval, FetchError> {
    let resp: PriceResponse = serde_json::from_value(body)
        .map_err(|e| FetchError::malformed(format!("NZ price feed: {e}")))?;

    let dated: Option<Vec<_>> = resp
        .items
        .iter()
        .map(|item| {
            item.trading_date
                .as_deref()
                .and_then(parse_instant)
                .map(|d| (d, item.trading_period.unwrap_or(0)))
        })
        .collect();

    let latest = match dated {
        Some(keys) if !keys.is_empty() => keys
            .iter()
            .enumerate()
            .max_by_key(|(_, key)| **key)
            .map(|(idx, _)| idx),
        _ => resp.items.len().checked_sub(1),
    };
    let latest_idx = latest.ok_or_else(|| FetchError::malformed("NZ price feed has no items"))?;
    if latest_idx + 1 != resp.items.len() {
        debug!(latest_idx, items = resp.items.len(), "NZ price feed is not sorted oldest-first");
    }

    let item = &resp.items[latest_idx];
    let generation = item
        .generation_type
        .as_ref()
        .filter(|g| !g.is_empty())
        .ok_or_else(|| FetchError::malformed("NZ price feed: latest item has no generation_type"))?;

    Ok(NzInterval {
        trading_date: item.trading_date.as_deref().and_then(parse_instant),
        records: generation.iter().map(sub_record_from_json).collect(),
    })
}

/// Pick the latest reading from an intensity feed body.
///
/// Latest means the greatest timestamp when every item has a parseable one,
/// with ties going to the earlier item; otherwise the first item (the feed is
/// documented newest-first).
pub fn parse_intensity_feed(body: Value) -> Result<IntensityReading, FetchError> {
    let resp: IntensityResponse = serde_json::from_value(body)
        .map_err(|e| FetchError::malformed(format!("NZ intensity feed: {e}")))?;

    let stamps: Option<Vec<DateTime<Utc>>> = resp
        .items
        .iter()
        .map(|item| item.timestamp.as_deref().and_then(parse_instant))
        .collect();

    let latest = match stamps {
        Some(stamps) if !stamps.is_empty() => stamps
            .iter()
            .enumerate()
            .rev()
            .max_by_key(|(_, ts)| **ts)
            .map(|(idx, _)| idx),
        _ if resp.items.is_empty() => None,
        _ => Some(0),
    };
    let idx = latest.ok_or_else(|| FetchError::malformed("NZ intensity feed has no items"))?;
    if idx != 0 {
        debug!(idx, "NZ intensity feed is not sorted newest-first");
    }

    let item = &resp.items[idx];
    let value = item
        .value()
        .ok_or_else(|| FetchError::malformed("NZ intensity feed: latest item has no intensity value"))?;

    Ok(IntensityReading {
        timestamp: item.timestamp.as_deref().and_then(parse_instant),
        value,
    })
}
