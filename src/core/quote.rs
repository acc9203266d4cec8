//! Normalized ticker quote
//!
//! `TickerQuote` is what the rest of the pipeline consumes: one exchange, one
//! resolved pair, with 24h statistics filled in where the source left gaps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::types::{ExchangeId, RawTicker, TradingPair};

/// Result of querying one exchange for one pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerQuote {
    /// Exchange identifier (e.g., "kraken")
    pub exchange: String,
    /// Pair actually quoted, which may differ from the requested one
    pub pair: String,
    /// Last trade price (positive, finite)
    pub price: f64,
    #[serde(rename = "volume24h")]
    pub volume_24h: f64,
    #[serde(rename = "high24h")]
    pub high_24h: f64,
    #[serde(rename = "low24h")]
    pub low_24h: f64,
    #[serde(rename = "change24h")]
    pub change_24h: f64,
    #[serde(rename = "changePercent24h")]
    pub change_percent_24h: f64,
    /// Source timestamp, or fetch time when the source has none
    pub timestamp: DateTime<Utc>,
    /// RFC 3339 rendering of `timestamp`
    pub last_updated: String,
}

/// Keep a non-negative finite value, otherwise use `default`
fn non_negative_or(value: Option<f64>, default: f64) -> f64 {
    value
        .filter(|v| v.is_finite() && *v >= 0.0)
        .unwrap_or(default)
}

impl TickerQuote {
    /// Normalize a raw connector ticker
    ///
    /// Fails with `InvalidResponse` when the last price is not a positive
    /// finite number; every other gap is filled with a documented default.
    pub fn from_raw(
        exchange: ExchangeId,
        pair: &TradingPair,
        raw: RawTicker,
        fetched_at: DateTime<Utc>,
    ) -> ExchangeResult<Self> {
        let price = raw.last;
        if !price.is_finite() || price <= 0.0 {
            return Err(ExchangeError::InvalidResponse(format!(
                "{} reported non-positive price {} for {}",
                exchange, price, pair
            )));
        }

        // Change is only meaningful against a positive open
        let (change_24h, change_percent_24h) = match raw.open {
            Some(open) if open.is_finite() && open > 0.0 => {
                let change = price - open;
                (change, change / open * 100.0)
            }
            _ => (0.0, 0.0),
        };

        let timestamp = raw
            .timestamp_ms
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .unwrap_or(fetched_at);

        Ok(Self {
            exchange: exchange.to_string(),
            pair: pair.to_string(),
            price,
            volume_24h: non_negative_or(raw.base_volume, 0.0),
            high_24h: non_negative_or(raw.high, price),
            low_24h: non_negative_or(raw.low, price),
            change_24h,
            change_percent_24h,
            timestamp,
            last_updated: timestamp.to_rfc3339(),
        })
    }

    /// Quote currency of the resolved pair ("USDT" for "BTC/USDT")
    pub fn quote_currency(&self) -> &str {
        self.pair.rsplit('/').next().unwrap_or(&self.pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetched_at() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp_millis(1_700_000_000_000).unwrap()
    }

    #[test]
    fn test_from_raw_computes_change() {
        let raw = RawTicker {
            last: 110.0,
            open: Some(100.0),
            high: Some(112.0),
            low: Some(95.0),
            base_volume: Some(7.5),
            timestamp_ms: Some(1_700_000_123_000),
        };
        let quote =
            TickerQuote::from_raw(ExchangeId::Binance, &TradingPair::new("BTC", "USDT"), raw, fetched_at())
                .unwrap();
        assert_eq!(quote.exchange, "binance");
        assert_eq!(quote.pair, "BTC/USDT");
        assert_eq!(quote.change_24h, 10.0);
        assert_eq!(quote.change_percent_24h, 10.0);
        assert_eq!(quote.timestamp.timestamp_millis(), 1_700_000_123_000);
        assert_eq!(quote.quote_currency(), "USDT");
    }

    #[test]
    fn test_from_raw_fills_defaults() {
        let raw = RawTicker {
            last: 50.0,
            ..Default::default()
        };
        let quote =
            TickerQuote::from_raw(ExchangeId::Coinbase, &TradingPair::new("SOL", "USD"), raw, fetched_at())
                .unwrap();
        assert_eq!(quote.high_24h, 50.0);
        assert_eq!(quote.low_24h, 50.0);
        assert_eq!(quote.volume_24h, 0.0);
        assert_eq!(quote.change_percent_24h, 0.0);
        assert_eq!(quote.timestamp, fetched_at());
    }

    #[test]
    fn test_zero_open_yields_zero_change() {
        let raw = RawTicker {
            last: 3.0,
            open: Some(0.0),
            ..Default::default()
        };
        let quote =
            TickerQuote::from_raw(ExchangeId::Kraken, &TradingPair::new("ADA", "EUR"), raw, fetched_at())
                .unwrap();
        assert_eq!(quote.change_24h, 0.0);
        assert_eq!(quote.change_percent_24h, 0.0);
    }

    #[test]
    fn test_non_positive_price_rejected() {
        for last in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let raw = RawTicker {
                last,
                ..Default::default()
            };
            let result =
                TickerQuote::from_raw(ExchangeId::Kraken, &TradingPair::new("BTC", "USD"), raw, fetched_at());
            assert!(matches!(result, Err(ExchangeError::InvalidResponse(_))));
        }
    }

    #[test]
    fn test_serializes_with_camel_case_names() {
        let raw = RawTicker {
            last: 1.0,
            ..Default::default()
        };
        let quote =
            TickerQuote::from_raw(ExchangeId::Binance, &TradingPair::new("XRP", "USDT"), raw, fetched_at())
                .unwrap();
        let json = serde_json::to_value(&quote).unwrap();
        assert!(json.get("volume24h").is_some());
        assert!(json.get("changePercent24h").is_some());
        assert_eq!(json["lastUpdated"], "2023-11-14T22:13:20+00:00");
        assert!(json.get("last_updated").is_none());
    }

    #[test]
    fn test_last_updated_follows_source_timestamp() {
        let raw = RawTicker {
            last: 2.0,
            timestamp_ms: Some(1_700_000_123_000),
            ..Default::default()
        };
        let quote =
            TickerQuote::from_raw(ExchangeId::Kraken, &TradingPair::new("DOT", "EUR"), raw, fetched_at())
                .unwrap();
        assert_eq!(quote.last_updated, "2023-11-14T22:15:23+00:00");
    }
}
