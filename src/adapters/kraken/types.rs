//! Kraken Types
//!
//! Every Kraken REST response is wrapped as `{"error": [...], "result": {...}}`
//! and the result is keyed by Kraken's own pair name (`XXBTZUSD` for a
//! `XBTUSD` request), so parsing takes the first entry instead of looking the
//! key up.
//!
//! Ticker fields are `[today, last_24h]` arrays except `c` (`[price, lot]`)
//! and `o` (plain string).

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::types::{parse_f64, RawCandle, RawTicker, TradingPair};

/// Error prefix Kraken uses for unlisted pairs
pub const UNKNOWN_PAIR_ERROR: &str = "EQuery:Unknown asset pair";

/// Response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct KrakenResponse<T> {
    #[serde(default)]
    pub error: Vec<String>,
    pub result: Option<T>,
}

/// Ticker entry for one pair
#[derive(Debug, Clone, Deserialize)]
pub struct KrakenTickerInfo {
    /// Last trade closed `[price, lot volume]`
    pub c: Vec<String>,
    /// Volume `[today, last 24h]`
    pub v: Vec<String>,
    /// Low `[today, last 24h]`
    pub l: Vec<String>,
    /// High `[today, last 24h]`
    pub h: Vec<String>,
    /// Today's opening price
    pub o: String,
}

fn window_value(field: &str, values: &[String]) -> ExchangeResult<Option<f64>> {
    values
        .get(1)
        .or_else(|| values.first())
        .map(|v| parse_f64(field, v))
        .transpose()
}

impl KrakenTickerInfo {
    pub fn to_raw_ticker(&self) -> ExchangeResult<RawTicker> {
        let last = self
            .c
            .first()
            .ok_or_else(|| ExchangeError::InvalidResponse("Kraken ticker missing 'c'".into()))?;
        Ok(RawTicker {
            last: parse_f64("c", last)?,
            open: Some(parse_f64("o", &self.o)?),
            high: window_value("h", &self.h)?,
            low: window_value("l", &self.l)?,
            base_volume: window_value("v", &self.v)?,
            timestamp_ms: None,
        })
    }
}

/// Map a base/quote asset to Kraken's naming
pub fn to_kraken_asset(asset: &str) -> &str {
    match asset {
        "BTC" => "XBT",
        "DOGE" => "XDG",
        other => other,
    }
}

/// Kraken pair name for a request, e.g. `XBTUSD`
pub fn to_kraken_pair(pair: &TradingPair) -> String {
    format!("{}{}", to_kraken_asset(&pair.base), to_kraken_asset(&pair.quote))
}

/// Turn a non-empty `error` array into a typed error
pub fn classify_errors(errors: &[String], pair: &TradingPair) -> Option<ExchangeError> {
    if errors.is_empty() {
        return None;
    }
    if errors.iter().any(|e| e.starts_with(UNKNOWN_PAIR_ERROR)) {
        return Some(ExchangeError::PairNotListed {
            exchange: "kraken".to_string(),
            pair: pair.to_string(),
        });
    }
    Some(ExchangeError::Api {
        status: 200,
        message: errors.join("; "),
    })
}

/// Extract the single ticker from a ticker result map
pub fn first_ticker(result: HashMap<String, KrakenTickerInfo>) -> ExchangeResult<KrakenTickerInfo> {
    result
        .into_values()
        .next()
        .ok_or_else(|| ExchangeError::InvalidResponse("Kraken ticker result is empty".into()))
}

/// Parse the candle array of an OHLC result
///
/// Result shape: `{"XXBTZUSD": [[time, open, high, low, close, vwap, volume, count], ...], "last": 1700000000}`
pub fn parse_ohlc_result(result: &HashMap<String, Value>) -> ExchangeResult<Vec<RawCandle>> {
    let rows = result
        .iter()
        .find(|(key, _)| key.as_str() != "last")
        .and_then(|(_, value)| value.as_array())
        .ok_or_else(|| ExchangeError::InvalidResponse("Kraken OHLC result has no candles".into()))?;

    rows.iter().map(parse_ohlc_row).collect()
}

fn parse_ohlc_row(row: &Value) -> ExchangeResult<RawCandle> {
    let cells = row
        .as_array()
        .filter(|cells| cells.len() >= 5)
        .ok_or_else(|| ExchangeError::InvalidResponse(format!("Malformed OHLC row: {}", row)))?;

    let time_secs = cells[0]
        .as_i64()
        .ok_or_else(|| ExchangeError::InvalidResponse(format!("Invalid OHLC time: {}", cells[0])))?;
    let number = |idx: usize, field: &str| -> ExchangeResult<f64> {
        match &cells[idx] {
            Value::String(s) => parse_f64(field, s),
            Value::Number(n) => n.as_f64().ok_or_else(|| {
                ExchangeError::InvalidResponse(format!("Invalid OHLC {}: {}", field, n))
            }),
            other => Err(ExchangeError::InvalidResponse(format!(
                "Invalid OHLC {}: {}",
                field, other
            ))),
        }
    };

    let open_time_ms = time_secs.checked_mul(1000).ok_or_else(|| {
        ExchangeError::InvalidResponse(format!("OHLC time out of range: {}", time_secs))
    })?;

    Ok(RawCandle {
        open_time_ms,
        open: number(1, "open")?,
        high: number(2, "high")?,
        low: number(3, "low")?,
        close: number(4, "close")?,
    })
}
