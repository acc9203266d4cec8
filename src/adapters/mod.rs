//! Exchange connectors for Binance, Coinbase and Kraken
//!
//! This module provides the abstractions the rate fetcher relies on
//! (`TickerSource`, `CandleSource`, `ConnectorFactory`) and one public REST
//! connector per supported exchange.

pub mod binance;
pub mod coinbase;
pub mod errors;
pub mod factory;
pub mod kraken;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use errors::{ExchangeError, ExchangeResult};
pub use factory::{AnyConnector, LiveConnectors};
pub use traits::{CandleSource, ConnectorFactory, TickerSource};
pub use types::{
    is_exchange_supported, supported_exchanges, ExchangeClass, ExchangeId, FallbackPolicy,
    RawCandle, RawTicker, TradingPair,
};
