//! Connector trait definitions
//!
//! `TickerSource` is the single capability the rate fetcher needs from an
//! exchange: fetch a ticker for a pair, or fail with a typed error.
//! `ConnectorFactory` hands out a fresh connector per request so concurrent
//! fetches never share a client.

use async_trait::async_trait;

use crate::adapters::errors::ExchangeResult;
use crate::adapters::types::{ExchangeId, RawCandle, RawTicker, TradingPair};

/// Market-data capability of one exchange
///
/// # Example Implementation
///
/// ```ignore
/// struct FixedSource(f64);
///
/// #[async_trait]
/// impl TickerSource for FixedSource {
///     fn exchange_id(&self) -> ExchangeId {
///         ExchangeId::Binance
///     }
///
///     async fn fetch_ticker(&self, _pair: &TradingPair) -> ExchangeResult<RawTicker> {
///         Ok(RawTicker { last: self.0, ..Default::default() })
///     }
/// }
/// ```
#[async_trait]
pub trait TickerSource: Send + Sync {
    /// Exchange this connector talks to
    fn exchange_id(&self) -> ExchangeId;

    /// Fetch the current 24h ticker for `pair`
    ///
    /// Must return `ExchangeError::PairNotListed` when the exchange does not
    /// list the pair, so callers can move on to another quote currency.
    async fn fetch_ticker(&self, pair: &TradingPair) -> ExchangeResult<RawTicker>;
}

/// Historical OHLC capability, implemented by exchanges that serve candles
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// Fetch up to the most recent candles of `interval_minutes` for `pair`
    async fn fetch_candles(
        &self,
        pair: &TradingPair,
        interval_minutes: u32,
    ) -> ExchangeResult<Vec<RawCandle>>;
}

/// Builds connectors on demand
pub trait ConnectorFactory: Send + Sync {
    type Source: TickerSource;

    /// Construct a new connector instance for `exchange`
    fn connector(&self, exchange: ExchangeId) -> Self::Source;
}
