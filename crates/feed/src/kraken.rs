//! Kraken public REST client for recent trades.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info};
use vwap_core::config::ExchangeConfig;
use vwap_core::RawTrade;

use crate::error::{FeedError, FeedResult};

/// Path of the public recent-trades endpoint.
const TRADES_PATH: &str = "/0/public/Trades";

/// Key Kraken uses for the pagination cursor inside `result`.
const LAST_KEY: &str = "last";

/// Anything that can supply a batch of recent raw trades for a pair.
pub trait TradeSource {
    /// Fetch the most recent trades for `symbol`, oldest first.
    fn fetch_recent_trades(&self, symbol: &str) -> FeedResult<Vec<RawTrade>>;
}

/// Response envelope shared by Kraken public endpoints.
#[derive(Debug, Deserialize)]
struct KrakenResponse {
    #[serde(default)]
    error: Vec<String>,
    #[serde(default)]
    result: Option<Map<String, Value>>,
}

/// Blocking Kraken REST client.
///
/// Owns its HTTP connection pool; create one per run and pass it where
/// trades are needed.
pub struct KrakenClient {
    client: Client,
    base_url: String,
}

impl KrakenClient {
    /// Create a client from exchange configuration.
    pub fn new(config: &ExchangeConfig) -> FeedResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("kraken-vwap/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Full URL of the recent-trades endpoint.
    pub fn trades_url(&self) -> String {
        format!("{}{}", self.base_url, TRADES_PATH)
    }
}

impl TradeSource for KrakenClient {
    fn fetch_recent_trades(&self, symbol: &str) -> FeedResult<Vec<RawTrade>> {
        let url = self.trades_url();
        info!(symbol, %url, "fetching recent trades");

        let body = self
            .client
            .get(&url)
            .query(&[("pair", symbol)])
            .send()?
            .error_for_status()?
            .text()?;

        parse_trades_response(symbol, &body)
    }
}

/// Decode a `Trades` response body into raw trade tuples.
///
/// The trade list is looked up under the requested symbol first. Kraken
/// answers some legacy symbols under their canonical name (`XBTUSD` comes
/// back as `XXBTZUSD`), so a single non-cursor key is accepted as well.
pub fn parse_trades_response(symbol: &str, body: &str) -> FeedResult<Vec<RawTrade>> {
    let response: KrakenResponse = serde_json::from_str(body)?;

    if !response.error.is_empty() {
        return Err(FeedError::Api(response.error.join("; ")));
    }

    let mut result = response
        .result
        .ok_or_else(|| FeedError::MalformedResponse("missing result object".to_string()))?;

    if let Some(last) = result.get(LAST_KEY) {
        debug!(symbol, %last, "trade cursor");
    }

    let key = if result.contains_key(symbol) {
        symbol.to_string()
    } else {
        let mut pair_keys = result.keys().filter(|k| k.as_str() != LAST_KEY);
        match (pair_keys.next(), pair_keys.next()) {
            (Some(only), None) => only.clone(),
            _ => return Err(FeedError::MissingPair(symbol.to_string())),
        }
    };

    let trades = result
        .remove(&key)
        .ok_or_else(|| FeedError::MissingPair(symbol.to_string()))?;

    let trades: Vec<RawTrade> = serde_json::from_value(trades).map_err(|e| {
        FeedError::MalformedResponse(format!("trade list for {key} is not an array of arrays: {e}"))
    })?;

    debug!(symbol, key = %key, trades = trades.len(), "decoded trades response");
    Ok(trades)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vwap_core::RawField;

    #[test]
    fn test_parse_trades() {
        let body = r#"{
            "error": [],
            "result": {
                "XBTUSDT": [
                    ["36500.10000", "0.00150000", 1700000000.1234, "b", "l", "", 6101],
                    ["36501.00000", "0.02000000", 1700000005.5, "s", "m", "", 6102]
                ],
                "last": "1700000005500000000"
            }
        }"#;

        let trades = parse_trades_response("XBTUSDT", body).unwrap();

        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].arity(), 7);
        assert_eq!(trades[0].price(), Some(&RawField::from("36500.10000")));
        assert_eq!(trades[1].time(), Some(&RawField::Number(1700000005.5)));
    }

    #[test]
    fn test_parse_canonical_pair_key() {
        let body = r#"{
            "error": [],
            "result": {
                "XXBTZUSD": [["36500.1", "0.1", 1700000000, "b", "l", ""]],
                "last": "1700000000000000000"
            }
        }"#;

        let trades = parse_trades_response("XBTUSD", body).unwrap();

        assert_eq!(trades.len(), 1);
    }

    #[test]
    fn test_api_error() {
        let body = r#"{"error": ["EQuery:Unknown asset pair"]}"#;

        let err = parse_trades_response("FOOBAR", body).unwrap_err();

        assert!(matches!(err, FeedError::Api(msg) if msg == "EQuery:Unknown asset pair"));
    }

    #[test]
    fn test_missing_pair() {
        let body = r#"{
            "error": [],
            "result": { "AAA": [], "BBB": [], "last": "0" }
        }"#;

        let err = parse_trades_response("XBTUSDT", body).unwrap_err();

        assert!(matches!(err, FeedError::MissingPair(p) if p == "XBTUSDT"));
    }

    #[test]
    fn test_trade_list_not_array() {
        let body = r#"{"error": [], "result": {"XBTUSDT": "oops", "last": "0"}}"#;

        let err = parse_trades_response("XBTUSDT", body).unwrap_err();

        assert!(matches!(err, FeedError::MalformedResponse(_)));
    }

    #[test]
    fn test_trade_record_not_array() {
        let body = r#"{"error": [], "result": {"XBTUSDT": [null], "last": "0"}}"#;

        let err = parse_trades_response("XBTUSDT", body).unwrap_err();

        assert!(matches!(err, FeedError::MalformedResponse(_)));
    }

    #[test]
    fn test_missing_result() {
        let err = parse_trades_response("XBTUSDT", r#"{"error": []}"#).unwrap_err();
        assert!(matches!(err, FeedError::MalformedResponse(_)));
    }

    #[test]
    fn test_not_json() {
        let err = parse_trades_response("XBTUSDT", "<html>").unwrap_err();
        assert!(matches!(err, FeedError::Json(_)));
    }

    #[test]
    fn test_trades_url() {
        let config = ExchangeConfig {
            api_url: "https://api.kraken.com/".to_string(),
            timeout_secs: 5,
        };
        let client = KrakenClient::new(&config).unwrap();
        assert_eq!(client.trades_url(), "https://api.kraken.com/0/public/Trades");
    }
}
