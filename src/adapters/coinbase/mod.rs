//! Coinbase Exchange connector
//!
//! Public REST market data via `GET /products/{product_id}/stats`.

pub mod adapter;
pub mod config;
pub mod types;

pub use adapter::CoinbaseConnector;
pub use config::CoinbaseConfig;
