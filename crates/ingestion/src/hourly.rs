//! Hourly bucketing and VWAP computation.
//!
//! Groups normalized trades by the hour they fall in, as seen from a display
//! timezone, and reduces each group to an [`HourBucket`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::debug;
use vwap_core::config::MissingPricePolicy;
use vwap_core::{parse_timezone, BucketTable, HourBucket, Result, Trade, BUCKET_LABEL_FORMAT};

/// Builder for hour buckets from normalized trades.
pub struct HourlyAggregator {
    /// Display timezone for labels.
    tz: Tz,
    /// Missing price handling.
    policy: MissingPricePolicy,
    /// Buckets being built, keyed by label. Label order is chronological.
    buckets: BTreeMap<String, BucketInProgress>,
}

/// A bucket that's currently being built.
#[derive(Debug, Clone, Default)]
struct BucketInProgress {
    volume_sum: f64,
    notional_sum: f64,
    last_price: Option<f64>,
    trade_count: u32,
}

impl BucketInProgress {
    fn add_trade(&mut self, trade: &Trade, policy: MissingPricePolicy) {
        self.trade_count += 1;

        if trade.price.is_none() && policy == MissingPricePolicy::ExcludeTrade {
            return;
        }

        self.volume_sum += trade.volume.unwrap_or(0.0);
        self.notional_sum += trade.notional.unwrap_or(0.0);
        if trade.price.is_some() {
            self.last_price = trade.price;
        }
    }

    fn vwap(&self) -> Option<f64> {
        if self.volume_sum > 0.0 {
            Some(self.notional_sum / self.volume_sum).filter(|v| v.is_finite())
        } else {
            None
        }
    }

    fn to_bucket(&self) -> HourBucket {
        HourBucket {
            volume_sum: self.volume_sum,
            notional_sum: self.notional_sum,
            vwap: self.vwap(),
            last_price: self.last_price,
            trade_count: self.trade_count,
        }
    }
}

impl HourlyAggregator {
    /// Create an aggregator for an IANA timezone identifier.
    pub fn new(timezone: &str, policy: MissingPricePolicy) -> Result<Self> {
        Ok(Self::with_tz(parse_timezone(timezone)?, policy))
    }

    /// Create an aggregator for an already resolved timezone.
    pub fn with_tz(tz: Tz, policy: MissingPricePolicy) -> Self {
        Self {
            tz,
            policy,
            buckets: BTreeMap::new(),
        }
    }

    /// Label of the display-timezone hour containing `ts`.
    ///
    /// An instant exactly on the hour belongs to the hour starting there.
    pub fn bucket_label(&self, ts: &DateTime<Utc>) -> String {
        ts.with_timezone(&self.tz)
            .format(BUCKET_LABEL_FORMAT)
            .to_string()
    }

    /// Add a trade.
    pub fn add_trade(&mut self, trade: &Trade) {
        let label = self.bucket_label(&trade.timestamp);
        self.buckets
            .entry(label)
            .or_default()
            .add_trade(trade, self.policy);
    }

    /// Add multiple trades in arrival order.
    pub fn add_trades(&mut self, trades: &[Trade]) {
        for trade in trades {
            self.add_trade(trade);
        }
    }

    /// Get the number of buckets currently being built.
    pub fn pending_bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Snapshot the buckets in ascending label order.
    pub fn table(&self) -> BucketTable {
        self.buckets
            .iter()
            .map(|(label, bucket)| (label.clone(), bucket.to_bucket()))
            .collect()
    }

    /// Finalize all buckets, leaving the aggregator empty.
    pub fn finish(&mut self) -> BucketTable {
        let table = self.table();
        self.buckets.clear();
        debug!(tz = %self.tz, buckets = table.len(), "finalized hourly buckets");
        table
    }
}

/// Aggregate trades into hour buckets using the default missing price policy.
pub fn aggregate_hourly(trades: &[Trade], timezone: &str) -> Result<BucketTable> {
    aggregate_hourly_with(trades, timezone, MissingPricePolicy::default())
}

/// Aggregate trades into hour buckets.
pub fn aggregate_hourly_with(
    trades: &[Trade],
    timezone: &str,
    policy: MissingPricePolicy,
) -> Result<BucketTable> {
    let mut aggregator = HourlyAggregator::new(timezone, policy)?;
    aggregator.add_trades(trades);
    Ok(aggregator.finish())
}
