//! Multi-exchange crypto rate aggregation
//!
//! Fetches spot tickers from Binance, Coinbase and Kraken concurrently,
//! resolves quote currencies through per-exchange fallback chains, and
//! summarizes the results:
//! - Exchange connectors (`adapters`)
//! - Best/worst/average pricing with arbitrage detection (`core`)
//! - Coin comparison and historical candles (`core`)

pub mod adapters;
pub mod config;
pub mod core;
pub mod error;

pub use error::{AppError, RateError};
