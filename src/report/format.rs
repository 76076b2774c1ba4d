//! Formatted terminal output for `gridmix fetch` and `gridmix show`.
//!
//! Formatting lives in one place so output changes stay localized and the
//! data code never builds strings.

use crate::domain::{CountryOutcome, DataOrigin, FetchReport};
use crate::plot::render_mix_bars;
use crate::report::{chart_entries, renewable_split};

pub const ERROR_BANNER: &str = "No grid data available: both the New Zealand and Australia sources failed.";

/// Full report: one card per country, or the error banner if neither
/// country produced a record.
pub fn format_report(report: &FetchReport, bar_width: usize) -> String {
    let mut out = String::new();
    out.push_str("=== gridmix - NZ & AU grid emissions ===\n");
    out.push_str(&format!(
        "Fetched: {}\n",
        report.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    if report.is_unusable() {
        out.push('\n');
        out.push_str(ERROR_BANNER);
        out.push('\n');
        for outcome in [&report.nz, &report.au] {
            if let Some(reason) = &outcome.fallback_reason {
                out.push_str(&format!("  {}: {reason}\n", outcome.country));
            }
        }
        return out;
    }

    for outcome in [&report.nz, &report.au] {
        out.push('\n');
        out.push_str(&format_country(outcome, bar_width));
    }
    out
}

/// One country card: header, headline figures, renewable split and mix bars.
pub fn format_country(outcome: &CountryOutcome, bar_width: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "--- {} [{}] ---\n",
        outcome.country.display_name(),
        origin_tag(outcome.origin)
    ));

    let Some(rec) = &outcome.emissions else {
        out.push_str("No data.\n");
        if let Some(reason) = &outcome.fallback_reason {
            out.push_str(&format!("Reason: {reason}\n"));
        }
        return out;
    };

    if let Some(reason) = &outcome.fallback_reason {
        out.push_str(&format!("Showing mock data ({reason})\n"));
    }

    out.push_str(&format!(
        "As-of: {}\n",
        rec.timestamp.format("%Y-%m-%d %H:%M UTC")
    ));
    out.push_str(&format!("Demand: {:.0} MW\n", rec.total_demand_mw));
    out.push_str(&format!(
        "Carbon intensity: {} gCO2/kWh\n",
        fmt_intensity(rec.carbon_intensity)
    ));

    let split = renewable_split(rec);
    out.push_str(&format!(
        "Renewable: {}% | Non-renewable: {}%\n",
        split.renewable, split.non_renewable
    ));

    let entries = chart_entries(rec);
    if entries.is_empty() {
        out.push_str("Generation mix: (no generation reported)\n");
    } else {
        out.push_str("Generation mix:\n");
        out.push_str(&render_mix_bars(&entries, bar_width));
    }
    out
}

pub fn origin_tag(origin: DataOrigin) -> &'static str {
    match origin {
        DataOrigin::Live => "LIVE",
        DataOrigin::Mock => "MOCK",
        DataOrigin::Unavailable => "UNAVAILABLE",
    }
}

/// Whole numbers print without decimals; fractional values keep two.
pub fn fmt_intensity(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Country, FuelCategory};
    use crate::report::fixtures::record;

    fn nz_live() -> CountryOutcome {
        CountryOutcome::live(record(
            Country::Nz,
            4_000.0,
            92.35,
            &[(FuelCategory::Hydro, 60), (FuelCategory::Wind, 25), (FuelCategory::Gas, 15)],
        ))
    }

    #[test]
    fn country_card_lists_figures_and_bars() {
        let txt = format_country(&nz_live(), 10);
        assert!(txt.starts_with("--- New Zealand (Aotearoa) [LIVE] ---\n"));
        assert!(txt.contains("As-of: 2025-03-01 00:30 UTC\n"));
        assert!(txt.contains("Demand: 4000 MW\n"));
        assert!(txt.contains("Carbon intensity: 92.35 gCO2/kWh\n"));
        assert!(txt.contains("Renewable: 85% | Non-renewable: 15%\n"));
        assert!(txt.contains("Hydro         ██████      60%   2400 MW\n"));
        assert!(!txt.contains("Coal"));
    }

    #[test]
    fn mock_cards_say_why() {
        let outcome = CountryOutcome::mock(
            record(Country::Au, 20_000.0, 400.0, &[(FuelCategory::Coal, 100)]),
            "HTTP error: 500",
        );
        let txt = format_country(&outcome, 10);
        assert!(txt.contains("[MOCK]"));
        assert!(txt.contains("Showing mock data (HTTP error: 500)\n"));
        assert!(txt.contains("Carbon intensity: 400 gCO2/kWh\n"));
    }

    #[test]
    fn banner_only_when_both_countries_are_missing() {
        let au_missing = CountryOutcome::unavailable(Country::Au, "transport error: timed out");
        let partial = FetchReport::new(nz_live(), au_missing.clone());
        let txt = format_report(&partial, 10);
        assert!(!txt.contains(ERROR_BANNER));
        assert!(txt.contains("--- Australia [UNAVAILABLE] ---\nNo data.\nReason: transport error: timed out\n"));

        let none = FetchReport::new(
            CountryOutcome::unavailable(Country::Nz, "HTTP error: 502"),
            au_missing,
        );
        let txt = format_report(&none, 10);
        assert!(txt.contains(ERROR_BANNER));
        assert!(txt.contains("  NZ: HTTP error: 502\n"));
        assert!(!txt.contains("---"));
    }

    #[test]
    fn zero_generation_is_not_an_error() {
        let outcome = CountryOutcome::live(record(Country::Nz, 0.0, 0.0, &[]));
        let txt = format_country(&outcome, 10);
        assert!(txt.contains("Generation mix: (no generation reported)\n"));
        assert!(txt.contains("Renewable: 0% | Non-renewable: 100%\n"));
    }
}
