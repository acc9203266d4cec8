//! Binance Types
//!
//! Response types for `GET /api/v3/ticker/24hr`. Binance encodes prices and
//! volumes as strings.

use serde::Deserialize;

use crate::adapters::errors::ExchangeResult;
use crate::adapters::types::{parse_f64, RawTicker, TradingPair};

/// Binance error code for an unknown symbol
pub const INVALID_SYMBOL_CODE: i64 = -1121;

/// 24h rolling window ticker
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceTicker24h {
    pub last_price: String,
    pub open_price: String,
    pub high_price: String,
    pub low_price: String,
    /// Base asset volume
    pub volume: String,
    /// Window close time (Unix ms)
    pub close_time: i64,
}

impl BinanceTicker24h {
    /// Convert to the connector-neutral ticker
    pub fn to_raw_ticker(&self) -> ExchangeResult<RawTicker> {
        Ok(RawTicker {
            last: parse_f64("lastPrice", &self.last_price)?,
            open: Some(parse_f64("openPrice", &self.open_price)?),
            high: Some(parse_f64("highPrice", &self.high_price)?),
            low: Some(parse_f64("lowPrice", &self.low_price)?),
            base_volume: Some(parse_f64("volume", &self.volume)?),
            timestamp_ms: Some(self.close_time),
        })
    }
}

/// Error body returned with non-2xx statuses
#[derive(Debug, Clone, Deserialize)]
pub struct BinanceErrorBody {
    pub code: i64,
    pub msg: String,
}

/// Binance symbol for a pair, e.g. `BTCUSDT`
pub fn to_binance_symbol(pair: &TradingPair) -> String {
    format!("{}{}", pair.base, pair.quote)
}
