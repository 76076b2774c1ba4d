//! Source-independent mix arithmetic.
//!
//! - `parser`: upstream fuel keys -> canonical fuel magnitudes
//! - `normalize`: magnitudes -> integer percentages
//! - `intensity`: carbon intensity strategies

pub mod intensity;
pub mod normalize;
pub mod parser;

pub use intensity::{IntensitySource, resolve as resolve_intensity};
pub use normalize::normalize_mix;
pub use parser::{AU_FUELTECH_KEYS, FuelKeyTable, Magnitudes, NZ_EM6_KEYS, SubRecord, parse_generation_mix};
