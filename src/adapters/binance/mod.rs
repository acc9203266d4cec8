//! Binance exchange connector
//!
//! Public REST market data via `GET /api/v3/ticker/24hr`.

pub mod adapter;
pub mod config;
pub mod types;

pub use adapter::BinanceConnector;
pub use config::BinanceConfig;
