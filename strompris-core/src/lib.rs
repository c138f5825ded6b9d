//! Strompris Core: Norwegian spot-price retrieval and history.
//!
//! - Domain types (zones, currencies, price records, time-ordered series)
//! - Daily price fetcher for the hvakosterstrommen.no API
//! - Range aggregation with per-day failure isolation and memoization
//! - Append-only CSV dataset and the daily dataset updater
//! - Derived statistics (daily means, current interval, summaries)
//! - TOML configuration

pub mod config;
pub mod data;
pub mod domain;
pub mod stats;

pub use config::{ConfigError, StromprisConfig};
pub use domain::{Currency, PriceRecord, PriceSeries, Zone};
