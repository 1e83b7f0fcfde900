//! Chart rendering for hourly VWAP tables.
//!
//! Renders the two-panel layout (price/VWAP over volume) as a standalone
//! SVG document.

pub mod svg;

pub use svg::SvgChart;
