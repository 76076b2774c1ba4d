//! Terminal plotting (plain text, no TUI).

pub mod ascii;

pub use ascii::render_mix_bars;
