//! Fetch, normalize and aggregate one batch of trades.

use anyhow::Result;
use tracing::info;
use vwap_core::config::AggregationConfig;
use vwap_core::BucketTable;
use vwap_feed::TradeSource;
use vwap_ingestion::{aggregate_hourly_with, normalize};

/// Output of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Trades in the fetched batch.
    pub trade_count: usize,
    /// Hour buckets in label order.
    pub table: BucketTable,
}

/// Run the pipeline for `pair`.
///
/// Fetch errors are returned as-is; callers can downcast to
/// [`vwap_feed::FeedError`].
pub fn run(
    source: &dyn TradeSource,
    pair: &str,
    aggregation: &AggregationConfig,
) -> Result<PipelineOutput> {
    let raw = source.fetch_recent_trades(pair)?;
    let trades = normalize(pair, &raw)?;
    let table = aggregate_hourly_with(&trades, &aggregation.timezone, aggregation.missing_price)?;

    info!(
        pair,
        trades = trades.len(),
        buckets = table.len(),
        tz = %aggregation.timezone,
        "aggregated recent trades"
    );

    Ok(PipelineOutput {
        trade_count: trades.len(),
        table,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vwap_core::config::MissingPricePolicy;
    use vwap_core::{Error, RawField, RawTrade};
    use vwap_feed::{FeedError, FeedResult};

    struct FixtureSource(Vec<RawTrade>);

    impl TradeSource for FixtureSource {
        fn fetch_recent_trades(&self, _symbol: &str) -> FeedResult<Vec<RawTrade>> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    impl TradeSource for FailingSource {
        fn fetch_recent_trades(&self, _symbol: &str) -> FeedResult<Vec<RawTrade>> {
            Err(FeedError::Api("EAPI:Rate limit exceeded".to_string()))
        }
    }

    fn utc() -> AggregationConfig {
        AggregationConfig {
            timezone: "UTC".to_string(),
            missing_price: MissingPricePolicy::CountVolume,
        }
    }

    #[test]
    fn test_end_to_end() {
        let source = FixtureSource(vec![
            RawTrade::new("100", "2", 1_700_000_000.0),
            RawTrade::new("200", "1", 1_700_000_010.0),
            RawTrade::new("bad", "5", 1_700_003_700.0),
        ]);

        let output = run(&source, "XBTUSDT", &utc()).unwrap();

        assert_eq!(output.trade_count, 3);
        assert_eq!(output.table.len(), 2);
        let (label, first) = &output.table[0];
        assert_eq!(label, "2023/11/14 22:00");
        assert_eq!(first.last_price, Some(200.0));
        assert_eq!(first.notional_sum, 400.0);
        let second = &output.table[1].1;
        assert_eq!(second.volume_sum, 5.0);
        assert_eq!(second.vwap, Some(0.0));
        assert_eq!(second.last_price, None);
    }

    #[test]
    fn test_fetch_error_is_propagated() {
        let err = run(&FailingSource, "XBTUSDT", &utc()).unwrap_err();

        let feed_err = err.downcast_ref::<FeedError>().unwrap();
        assert!(matches!(feed_err, FeedError::Api(msg) if msg == "EAPI:Rate limit exceeded"));
    }

    #[test]
    fn test_malformed_batch() {
        let source = FixtureSource(vec![RawTrade(vec![RawField::from("1")])]);

        let err = run(&source, "XBTUSDT", &utc()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::MalformedInput { index: 0, .. })
        ));
    }

    #[test]
    fn test_invalid_timezone() {
        let source = FixtureSource(vec![]);
        let aggregation = AggregationConfig {
            timezone: "Not/AZone".to_string(),
            ..utc()
        };

        let err = run(&source, "XBTUSDT", &aggregation).unwrap_err();

        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::InvalidTimezone(_))));
    }
}
