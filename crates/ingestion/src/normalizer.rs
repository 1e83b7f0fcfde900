//! Raw trade normalization.
//!
//! Turns loosely typed exchange tuples into [`Trade`] records with numeric
//! price/volume and a UTC timestamp. Unparseable prices and volumes are kept
//! as missing values; only structural problems abort the batch.

use tracing::{debug, warn};
use vwap_core::{try_parse_float, utc_from_epoch_secs, Error, RawTrade, Result, Trade};

/// Statistics about the last normalized batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizationStats {
    /// Records normalized.
    pub total_trades: u64,
    /// Records whose price did not parse.
    pub missing_price: u64,
    /// Records whose volume did not parse.
    pub missing_volume: u64,
}

impl NormalizationStats {
    /// Whether any field was coerced to missing.
    pub fn is_degraded(&self) -> bool {
        self.missing_price > 0 || self.missing_volume > 0
    }

    /// Reset statistics.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Normalizer for raw trade batches.
#[derive(Debug, Default)]
pub struct TradeNormalizer {
    stats: NormalizationStats,
}

impl TradeNormalizer {
    /// Create a new normalizer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize a single record.
    ///
    /// `index` is only used to locate the record in error messages.
    pub fn normalize_one(&mut self, index: usize, raw: &RawTrade) -> Result<Trade> {
        if !raw.has_valid_arity() {
            return Err(Error::malformed(
                index,
                format!("expected 6 or 7 fields, got {}", raw.arity()),
            ));
        }

        let secs = raw
            .time()
            .and_then(try_parse_float)
            .ok_or_else(|| Error::malformed(index, "timestamp is not a number"))?;
        let timestamp = utc_from_epoch_secs(secs)
            .ok_or_else(|| Error::malformed(index, format!("timestamp {secs} out of range")))?;

        let price = raw.price().and_then(try_parse_float);
        let volume = raw.volume().and_then(try_parse_float);

        self.stats.total_trades += 1;
        if price.is_none() {
            self.stats.missing_price += 1;
        }
        if volume.is_none() {
            self.stats.missing_volume += 1;
        }

        Ok(Trade::new(price, volume, timestamp))
    }

    /// Normalize a batch, preserving length and order.
    pub fn normalize_batch(&mut self, pair: &str, raw_trades: &[RawTrade]) -> Result<Vec<Trade>> {
        self.stats.reset();

        let trades = raw_trades
            .iter()
            .enumerate()
            .map(|(i, raw)| self.normalize_one(i, raw))
            .collect::<Result<Vec<_>>>()?;

        if self.stats.is_degraded() {
            warn!(
                pair,
                missing_price = self.stats.missing_price,
                missing_volume = self.stats.missing_volume,
                "some trade fields did not parse"
            );
        }
        debug!(pair, trades = trades.len(), "normalized trade batch");

        Ok(trades)
    }

    /// Get statistics for the last batch.
    pub fn stats(&self) -> &NormalizationStats {
        &self.stats
    }
}

/// Normalize a raw trade batch for `pair`.
pub fn normalize(pair: &str, raw_trades: &[RawTrade]) -> Result<Vec<Trade>> {
    TradeNormalizer::new().normalize_batch(pair, raw_trades)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vwap_core::RawField;

    #[test]
    fn test_preserves_length_and_order() {
        let raw = vec![
            RawTrade::new("300.0", "1", 1_700_000_300.0),
            RawTrade::new("100.0", "2", 1_700_000_100.0),
            RawTrade::new("200.0", "3", 1_700_000_200.0),
        ];

        let trades = normalize("XBTUSDT", &raw).unwrap();

        assert_eq!(trades.len(), 3);
        let prices: Vec<_> = trades.iter().map(|t| t.price.unwrap()).collect();
        assert_eq!(prices, vec![300.0, 100.0, 200.0]);
        assert_eq!(trades[1].timestamp.timestamp(), 1_700_000_100);
    }

    #[test]
    fn test_bad_fields_become_missing() {
        let raw = vec![
            RawTrade::new("bad", "5", 1_700_000_000.0),
            RawTrade::new("100", "", 1_700_000_000.0),
        ];

        let mut normalizer = TradeNormalizer::new();
        let trades = normalizer.normalize_batch("ETHUSDT", &raw).unwrap();

        assert_eq!(trades[0].price, None);
        assert_eq!(trades[0].volume, Some(5.0));
        assert_eq!(trades[0].notional, None);
        assert_eq!(trades[1].price, Some(100.0));
        assert_eq!(trades[1].volume, None);

        let stats = normalizer.stats();
        assert_eq!(stats.total_trades, 2);
        assert_eq!(stats.missing_price, 1);
        assert_eq!(stats.missing_volume, 1);
        assert!(stats.is_degraded());
    }

    #[test]
    fn test_numeric_fields_accepted() {
        let raw = vec![RawTrade::new(50000.0, 0.1, 1_700_000_000.5)];

        let trades = normalize("XBTUSDT", &raw).unwrap();

        assert_eq!(trades[0].price, Some(50000.0));
        assert_eq!(trades[0].timestamp.timestamp_subsec_millis(), 500);
    }

    #[test]
    fn test_seven_field_record() {
        let mut raw = RawTrade::new("1.5", "2", 1_700_000_000.0);
        raw.0.push(RawField::Number(123456.0));

        let trades = normalize("XRPUSDT", &[raw]).unwrap();

        assert_eq!(trades.len(), 1);
    }

    #[test]
    fn test_wrong_arity_is_malformed() {
        let good = RawTrade::new("1", "1", 1_700_000_000.0);
        let short = RawTrade(vec![RawField::from("1"), RawField::from("1")]);

        let err = normalize("XBTUSDT", &[good, short]).unwrap_err();

        assert!(matches!(err, Error::MalformedInput { index: 1, .. }));
    }

    #[test]
    fn test_bad_timestamp_is_malformed() {
        let raw = vec![RawTrade::new("1", "1", "yesterday")];

        let err = normalize("XBTUSDT", &raw).unwrap_err();

        assert!(matches!(err, Error::MalformedInput { index: 0, .. }));
    }

    #[test]
    fn test_empty_batch() {
        let trades = normalize("XBTUSDT", &[]).unwrap();
        assert!(trades.is_empty());
    }
}
