//! Coinbase Types
//!
//! The stats endpoint reports a 24h window without a timestamp; `high`,
//! `low` and `volume` may be absent for freshly listed products.

use serde::Deserialize;

use crate::adapters::errors::ExchangeResult;
use crate::adapters::types::{parse_f64, RawTicker, TradingPair};

/// 24h product stats
#[derive(Debug, Clone, Deserialize)]
pub struct CoinbaseStats {
    pub open: Option<String>,
    pub high: Option<String>,
    pub low: Option<String>,
    pub last: String,
    pub volume: Option<String>,
}

impl CoinbaseStats {
    pub fn to_raw_ticker(&self) -> ExchangeResult<RawTicker> {
        let optional = |field: &str, value: &Option<String>| -> ExchangeResult<Option<f64>> {
            value.as_deref().map(|v| parse_f64(field, v)).transpose()
        };
        Ok(RawTicker {
            last: parse_f64("last", &self.last)?,
            open: optional("open", &self.open)?,
            high: optional("high", &self.high)?,
            low: optional("low", &self.low)?,
            base_volume: optional("volume", &self.volume)?,
            timestamp_ms: None,
        })
    }
}

/// Error body, e.g. `{"message":"NotFound"}`
#[derive(Debug, Clone, Deserialize)]
pub struct CoinbaseErrorBody {
    pub message: String,
}

/// Coinbase product id for a pair, e.g. `BTC-USD`
pub fn to_product_id(pair: &TradingPair) -> String {
    format!("{}-{}", pair.base, pair.quote)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stats_with_missing_fields() {
        let json = r#"{"open":"2000.5","last":"2010.0"}"#;
        let stats: CoinbaseStats = serde_json::from_str(json).unwrap();
        let raw = stats.to_raw_ticker().unwrap();
        assert_eq!(raw.last, 2010.0);
        assert_eq!(raw.open, Some(2000.5));
        assert_eq!(raw.high, None);
        assert_eq!(raw.base_volume, None);
    }
}
