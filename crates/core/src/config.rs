//! Configuration structures for the hourly VWAP pipeline.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::parse_timezone;

/// Main configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Exchange endpoint configuration.
    pub exchange: ExchangeConfig,
    /// Bucketing configuration.
    pub aggregation: AggregationConfig,
    /// Chart output configuration.
    pub chart: ChartConfig,
    /// Pairs offered by the selection menu.
    pub pairs: Vec<PairOption>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exchange: ExchangeConfig::default(),
            aggregation: AggregationConfig::default(),
            chart: ChartConfig::default(),
            pairs: default_pairs(),
        }
    }
}

impl Config {
    /// Load a configuration from a JSON file. Missing sections take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        parse_timezone(&self.aggregation.timezone)?;

        if self.exchange.timeout_secs == 0 {
            return Err(Error::config("exchange.timeout_secs must be positive"));
        }
        if self.chart.width == 0 || self.chart.height == 0 {
            return Err(Error::config("chart dimensions must be positive"));
        }
        if self.pairs.is_empty() {
            return Err(Error::config("at least one pair must be configured"));
        }

        let mut keys = HashSet::new();
        for pair in &self.pairs {
            if pair.key.trim().is_empty() || pair.symbol.trim().is_empty() {
                return Err(Error::config("pair key and symbol must be non-empty"));
            }
            if !keys.insert(pair.key.as_str()) {
                return Err(Error::config(format!("duplicate pair key: {}", pair.key)));
            }
        }
        Ok(())
    }
}

/// Exchange endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    /// REST base URL.
    pub api_url: String,
    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.kraken.com".to_string(),
            timeout_secs: 10,
        }
    }
}

/// How a trade with an unparseable price enters the bucket sums.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPricePolicy {
    /// Volume still counts towards the VWAP denominator; notional adds 0.
    #[default]
    CountVolume,
    /// The trade adds nothing to either sum.
    ExcludeTrade,
}

/// Bucketing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// IANA timezone used for bucket labels.
    pub timezone: String,
    /// Missing price handling.
    pub missing_price: MissingPricePolicy,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            timezone: "Europe/Madrid".to_string(),
            missing_price: MissingPricePolicy::default(),
        }
    }
}

/// Chart output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1500,
            height: 800,
        }
    }
}

/// One entry of the pair selection menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairOption {
    /// Menu key typed by the user.
    pub key: String,
    /// Exchange pair symbol.
    pub symbol: String,
    /// Human-readable description.
    pub description: String,
}

impl PairOption {
    fn new(key: &str, symbol: &str, description: &str) -> Self {
        Self {
            key: key.to_string(),
            symbol: symbol.to_string(),
            description: description.to_string(),
        }
    }
}

/// The five USDT pairs offered by default.
pub fn default_pairs() -> Vec<PairOption> {
    vec![
        PairOption::new("1", "XBTUSDT", "XBT/USDT (Bitcoin)"),
        PairOption::new("2", "ETHUSDT", "ETH/USDT (Ethereum)"),
        PairOption::new("3", "XRPUSDT", "XRP/USDT (Ripple)"),
        PairOption::new("4", "XDGUSDT", "DOGE/USDT (Dogecoin)"),
        PairOption::new("5", "LTCUSDT", "LTC/USDT (Litecoin)"),
    ]
}
