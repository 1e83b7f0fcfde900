//! Trade normalization and hourly aggregation.
//!
//! This crate handles:
//! - Coercing raw exchange tuples into typed trades
//! - Hour bucketing in a display timezone
//! - Per-hour volume, VWAP and last price

pub mod hourly;
pub mod normalizer;

pub use hourly::{aggregate_hourly, aggregate_hourly_with, HourlyAggregator};
pub use normalizer::{normalize, NormalizationStats, TradeNormalizer};
