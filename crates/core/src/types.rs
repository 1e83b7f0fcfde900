//! Core data types for the hourly VWAP pipeline.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Fields in a Kraken trade tuple without the trailing trade id.
pub const RAW_TRADE_ARITY: usize = 6;

/// Fields in a Kraken trade tuple that carries the trade id.
pub const RAW_TRADE_ARITY_WITH_ID: usize = 7;

/// Label format for hour buckets. Sorts chronologically for 4-digit years.
pub const BUCKET_LABEL_FORMAT: &str = "%Y/%m/%d %H:00";

/// One loosely typed field of a raw trade tuple.
///
/// Kraken sends price and volume as decimal strings and the timestamp as a
/// JSON number, but nothing upstream guarantees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawField {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl From<f64> for RawField {
    fn from(value: f64) -> Self {
        RawField::Number(value)
    }
}

impl From<&str> for RawField {
    fn from(value: &str) -> Self {
        RawField::Text(value.to_string())
    }
}

/// Coerce a raw field to a float.
///
/// Strings are trimmed before parsing. Non-finite results ("NaN", "inf")
/// and non-scalar fields are treated as missing.
pub fn try_parse_float(field: &RawField) -> Option<f64> {
    let value = match field {
        RawField::Number(n) => *n,
        RawField::Text(s) => s.trim().parse::<f64>().ok()?,
        RawField::Other(_) => return None,
    };
    value.is_finite().then_some(value)
}

/// Convert fractional seconds since the Unix epoch to a UTC instant.
///
/// Returns `None` for non-finite input or instants chrono cannot represent.
pub fn utc_from_epoch_secs(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    let mut whole = secs.floor();
    let mut nanos = ((secs - whole) * 1e9).round();
    if nanos >= 1e9 {
        whole += 1.0;
        nanos = 0.0;
    }
    if whole < i64::MIN as f64 || whole > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp(whole as i64, nanos as u32)
}

/// Resolve an IANA timezone identifier such as `Europe/Madrid`.
pub fn parse_timezone(tz: &str) -> Result<Tz> {
    tz.parse::<Tz>().map_err(|_| Error::invalid_timezone(tz))
}

/// A raw trade record as returned by the exchange.
///
/// `[price, volume, time, side, order_type, misc]`, optionally followed by a
/// numeric trade id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawTrade(pub Vec<RawField>);

impl RawTrade {
    /// Build a six-field record. Mostly useful for fixtures.
    pub fn new(
        price: impl Into<RawField>,
        volume: impl Into<RawField>,
        time: impl Into<RawField>,
    ) -> Self {
        RawTrade(vec![
            price.into(),
            volume.into(),
            time.into(),
            RawField::from("b"),
            RawField::from("m"),
            RawField::from(""),
        ])
    }

    /// Number of fields in the record.
    #[inline]
    pub fn arity(&self) -> usize {
        self.0.len()
    }

    /// Whether the record has one of the accepted shapes.
    #[inline]
    pub fn has_valid_arity(&self) -> bool {
        matches!(self.arity(), RAW_TRADE_ARITY | RAW_TRADE_ARITY_WITH_ID)
    }

    /// Price field (index 0).
    pub fn price(&self) -> Option<&RawField> {
        self.0.first()
    }

    /// Volume field (index 1).
    pub fn volume(&self) -> Option<&RawField> {
        self.0.get(1)
    }

    /// Timestamp field (index 2).
    pub fn time(&self) -> Option<&RawField> {
        self.0.get(2)
    }
}

/// A normalized trade.
///
/// The timestamp is always UTC; conversion to a display zone happens only
/// when bucketing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Trade price, `None` if the raw value did not parse.
    pub price: Option<f64>,
    /// Trade volume, `None` if the raw value did not parse.
    pub volume: Option<f64>,
    /// Execution time.
    pub timestamp: DateTime<Utc>,
    /// `price * volume`, `None` if either is missing or the product overflows.
    pub notional: Option<f64>,
}

impl Trade {
    /// Create a trade, deriving the notional.
    pub fn new(price: Option<f64>, volume: Option<f64>, timestamp: DateTime<Utc>) -> Self {
        let notional = match (price, volume) {
            (Some(p), Some(v)) => Some(p * v).filter(|n| n.is_finite()),
            _ => None,
        };
        Self {
            price,
            volume,
            timestamp,
            notional,
        }
    }
}

/// Aggregated trades for one display-timezone hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourBucket {
    /// Sum of volumes.
    pub volume_sum: f64,
    /// Sum of notionals.
    pub notional_sum: f64,
    /// `notional_sum / volume_sum`, `None` when no volume traded.
    pub vwap: Option<f64>,
    /// Price of the last priced trade in arrival order.
    pub last_price: Option<f64>,
    /// Trades that fell into this hour.
    pub trade_count: u32,
}

/// Ordered `(label, bucket)` rows produced by the aggregator.
pub type BucketTable = Vec<(String, HourBucket)>;
