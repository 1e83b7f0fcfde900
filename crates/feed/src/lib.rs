//! Market data fetch for the hourly VWAP pipeline.
//!
//! This crate provides:
//! - The `TradeSource` seam used by the pipeline
//! - A blocking Kraken REST client
//! - Decoding of the `Trades` response envelope

pub mod error;
pub mod kraken;

pub use error::{FeedError, FeedResult};
pub use kraken::{parse_trades_response, KrakenClient, TradeSource};
