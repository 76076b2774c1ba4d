//! ASCII bar chart of a generation mix for terminal output.
//!
//! Fixed-width and deterministic so the output can be golden-tested:
//!
//! ```text
//! Hydro         ██████      60%   2400 MW
//! Wind          █▌          15%    600 MW
//! ```

use crate::report::ChartEntry;

const LABEL_WIDTH: usize = 13;
const FULL: char = '█';
const HALF: char = '▌';

/// Render one row per entry; a 100% share fills `width` columns.
pub fn render_mix_bars(entries: &[ChartEntry], width: usize) -> String {
    let width = width.max(10);
    let mut out = String::new();
    for entry in entries {
        out.push_str(&format!(
            "{:<LABEL_WIDTH$} {} {:>3}% {:>6} MW\n",
            entry.label,
            bar(entry.percent, width),
            entry.percent,
            entry.mw,
        ));
    }
    out
}

/// A bar of `percent` in half-cell steps, padded to `width`.
fn bar(percent: u32, width: usize) -> String {
    let halves = (f64::from(percent.min(100)) / 100.0 * (width * 2) as f64).round() as usize;
    let mut s: String = std::iter::repeat_n(FULL, halves / 2).collect();
    if halves % 2 == 1 {
        s.push(HALF);
    }
    let used = halves / 2 + halves % 2;
    s.extend(std::iter::repeat_n(' ', width.saturating_sub(used)));
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FuelCategory;

    fn entry(fuel: FuelCategory, percent: u32, mw: u64) -> ChartEntry {
        ChartEntry {
            fuel,
            label: fuel.display_name(),
            percent,
            mw,
        }
    }

    #[test]
    fn bars_golden_snapshot_small() {
        let entries = vec![
            entry(FuelCategory::Hydro, 60, 2400),
            entry(FuelCategory::Wind, 15, 600),
            entry(FuelCategory::DieselOil, 5, 200),
        ];
        let txt = render_mix_bars(&entries, 10);
        let expected = concat!(
            "Hydro         ██████      60%   2400 MW\n",
            "Wind          █▌          15%    600 MW\n",
            "Diesel/Oil    ▌            5%    200 MW\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn full_share_fills_the_width() {
        assert_eq!(bar(100, 12), "█".repeat(12));
        assert_eq!(bar(0, 4), "    ");
        assert_eq!(bar(250, 4), "████");
    }
}
