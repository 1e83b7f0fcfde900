//! Core types and configuration for the hourly VWAP pipeline.
//!
//! This crate provides shared types used across all other crates:
//! - Raw and normalized trade records
//! - Hourly bucket output
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
