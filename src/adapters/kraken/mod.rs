//! Kraken exchange connector
//!
//! Public REST market data: `GET /0/public/Ticker` for tickers and
//! `GET /0/public/OHLC` for candles. Kraken lists real fiat quotes, which
//! makes it the candle source for historical charts.

pub mod adapter;
pub mod config;
pub mod types;

pub use adapter::KrakenConnector;
pub use config::KrakenConfig;
