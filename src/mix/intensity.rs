//! Carbon intensity resolution (gCO2/kWh).
//!
//! Which strategy applies depends on what the upstream gave us:
//!
//! - a dedicated intensity feed (NZ): use the latest reading as-is
//! - only a fuel mix: weight fixed per-fuel emission factors by share
//! - several sub-region readings (AU relay): average them
//! - paired power/emissions totals (AU provider): emissions / power
//!
//! None of these fail. Missing or invalid inputs contribute 0.

use crate::domain::{FuelCategory, GenerationMix};

/// Approximate lifecycle-free emission factor per fuel (gCO2/kWh).
pub fn emission_factor(fuel: FuelCategory) -> f64 {
    match fuel {
        FuelCategory::Hydro
        | FuelCategory::Wind
        | FuelCategory::Solar
        | FuelCategory::Battery
        | FuelCategory::Other => 0.0,
        FuelCategory::Geothermal => 5.0,
        FuelCategory::Gas => 500.0,
        FuelCategory::CoGen => 600.0,
        FuelCategory::DieselOil => 700.0,
        FuelCategory::Coal => 800.0,
    }
}

/// Input to `resolve`, one variant per strategy.
#[derive(Debug, Clone, Copy)]
pub enum IntensitySource<'a> {
    Feed(f64),
    EstimatedFromMix(&'a GenerationMix),
    RegionAverage(&'a [f64]),
    EmissionsRatio { emissions_t: f64, power_mw: f64 },
}

pub fn resolve(source: IntensitySource<'_>) -> f64 {
    match source {
        IntensitySource::Feed(value) => from_feed(value),
        IntensitySource::EstimatedFromMix(mix) => estimate_from_mix(mix),
        IntensitySource::RegionAverage(values) => average_across_regions(values),
        IntensitySource::EmissionsRatio {
            emissions_t,
            power_mw,
        } => from_emissions_ratio(emissions_t, power_mw),
    }
}

/// Latest feed reading, kept to 2 decimals.
pub fn from_feed(value: f64) -> f64 {
    round_to(non_negative(value), 2)
}

/// Σ factor[fuel] × pct[fuel] / 100, rounded to the nearest integer.
pub fn estimate_from_mix(mix: &GenerationMix) -> f64 {
    let weighted: f64 = mix
        .iter()
        .map(|(fuel, pct)| emission_factor(*fuel) * f64::from(*pct) / 100.0)
        .sum();
    weighted.round()
}

/// Arithmetic mean across regions, rounded to the nearest integer (0 for no regions).
pub fn average_across_regions(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sum: f64 = values.iter().map(|v| non_negative(*v)).sum();
    (sum / values.len() as f64).round()
}

/// Total emissions (tCO2 per interval-hour) over total power (MW), × 1000,
/// kept to 2 decimals. Zero power yields 0.
pub fn from_emissions_ratio(emissions_t: f64, power_mw: f64) -> f64 {
    let power = non_negative(power_mw);
    if power <= 0.0 {
        return 0.0;
    }
    round_to(non_negative(emissions_t) / power * 1000.0, 2)
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_from_half_coal_half_gas() {
        let mix: GenerationMix = [(FuelCategory::Coal, 50), (FuelCategory::Gas, 50)]
            .into_iter()
            .collect();
        assert_eq!(estimate_from_mix(&mix), 650.0);
        assert_eq!(resolve(IntensitySource::EstimatedFromMix(&mix)), 650.0);
    }

    #[test]
    fn estimate_ignores_zero_carbon_fuels() {
        let mix: GenerationMix = [
            (FuelCategory::Hydro, 60),
            (FuelCategory::Wind, 25),
            (FuelCategory::Geothermal, 10),
            (FuelCategory::Gas, 5),
        ]
        .into_iter()
        .collect();
        // 0.10 * 5 + 0.05 * 500 = 25.5 -> 26
        assert_eq!(estimate_from_mix(&mix), 26.0);
        assert_eq!(estimate_from_mix(&GenerationMix::new()), 0.0);
    }

    #[test]
    fn region_average_guards_empty_input() {
        assert_eq!(average_across_regions(&[]), 0.0);
        assert_eq!(average_across_regions(&[300.0, 401.0]), 351.0);
        assert_eq!(resolve(IntensitySource::RegionAverage(&[100.0, 200.0, 301.0])), 200.0);
    }

    #[test]
    fn feed_values_keep_two_decimals() {
        assert_eq!(from_feed(87.456), 87.46);
        assert_eq!(from_feed(-3.0), 0.0);
        assert_eq!(from_feed(f64::NAN), 0.0);
    }

    #[test]
    fn emissions_ratio_matches_relay_formula() {
        // 9_000 t over 20_000 MW -> 450 g/kWh
        assert_eq!(from_emissions_ratio(9_000.0, 20_000.0), 450.0);
        assert_eq!(from_emissions_ratio(1.0, 3.0), 333.33);
        assert_eq!(
            resolve(IntensitySource::EmissionsRatio {
                emissions_t: 5.0,
                power_mw: 0.0
            }),
            0.0
        );
    }
}
