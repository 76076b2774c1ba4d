//! Magnitudes -> integer percentage shares.

use crate::domain::GenerationMix;
use crate::mix::parser::Magnitudes;

/// Sum of all magnitudes.
pub fn total(magnitudes: &Magnitudes) -> f64 {
    magnitudes.values().sum()
}

/// Convert absolute magnitudes to integer percentages of their total.
///
/// Each share is rounded on its own (`f64::round`, half away from zero), so
/// the output may sum to 99 or 101; no remainder redistribution is applied.
/// A zero (or non-finite) total maps every fuel to 0.
pub fn normalize_mix(magnitudes: &Magnitudes) -> GenerationMix {
    let total = total(magnitudes);
    if !(total.is_finite() && total > 0.0) {
        return magnitudes.keys().map(|fuel| (*fuel, 0)).collect();
    }

    magnitudes
        .iter()
        .map(|(fuel, value)| {
            let pct = (value.max(0.0) / total * 100.0).round().clamp(0.0, 100.0);
            (*fuel, pct as u32)
        })
        .collect()
}
