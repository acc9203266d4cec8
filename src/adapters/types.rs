//! Core data types for exchange connectors
//!
//! These types are shared by every connector: the closed set of supported
//! exchanges, trading pairs, the raw ticker/candle shapes connectors return,
//! and the per-exchange quote-currency fallback tables.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::error::RateError;

// =============================================================================
// Exchange identifiers
// =============================================================================

/// Supported exchanges
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeId {
    Binance,
    Coinbase,
    Kraken,
}

impl ExchangeId {
    /// Every supported exchange, in default query order
    pub const ALL: [ExchangeId; 3] = [ExchangeId::Binance, ExchangeId::Coinbase, ExchangeId::Kraken];

    /// Lowercase identifier used in config, logs and quotes
    pub fn as_str(&self) -> &'static str {
        match self {
            ExchangeId::Binance => "binance",
            ExchangeId::Coinbase => "coinbase",
            ExchangeId::Kraken => "kraken",
        }
    }

    /// Which quote-currency family this exchange lists
    pub fn class(&self) -> ExchangeClass {
        match self {
            ExchangeId::Binance | ExchangeId::Coinbase => ExchangeClass::CryptoPair,
            ExchangeId::Kraken => ExchangeClass::FiatNative,
        }
    }
}

impl fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExchangeId {
    type Err = RateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "binance" => Ok(ExchangeId::Binance),
            "coinbase" => Ok(ExchangeId::Coinbase),
            "kraken" => Ok(ExchangeId::Kraken),
            _ => Err(RateError::UnsupportedExchange(s.to_string())),
        }
    }
}

/// Names of all supported exchanges
pub fn supported_exchanges() -> Vec<&'static str> {
    ExchangeId::ALL.iter().map(|id| id.as_str()).collect()
}

/// Case-insensitive check against the supported exchange set
pub fn is_exchange_supported(name: &str) -> bool {
    name.parse::<ExchangeId>().is_ok()
}

// =============================================================================
// Quote-currency fallback tables
// =============================================================================

/// Broad crypto-pair exchanges list stablecoin and crypto quotes
const CRYPTO_PAIR_NATIVE: &[&str] = &["USD", "EUR", "GBP", "USDT", "USDC", "BTC", "ETH"];
const CRYPTO_PAIR_FALLBACKS: &[&str] = &["USDT", "USD", "EUR"];

/// Fiat-native exchanges list real fiat quotes
const FIAT_NATIVE: &[&str] = &["USD", "EUR", "GBP", "CAD", "JPY", "CHF", "AUD"];
const FIAT_NATIVE_FALLBACKS: &[&str] = &["USD", "EUR"];

/// Quote-currency family of an exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeClass {
    /// Lists crypto/stablecoin pairs (BTC/USDT); USD often only as USDT
    CryptoPair,
    /// Lists real fiat pairs (BTC/USD, BTC/CHF)
    FiatNative,
}

/// Per-exchange table deciding which quote currencies to try, in order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackPolicy {
    /// Quotes the exchange is expected to list directly
    pub native: Vec<String>,
    /// Appended when the requested quote is not native
    pub fallbacks: Vec<String>,
    /// Extra candidates tried right after a specific requested quote
    #[serde(default)]
    pub aliases: BTreeMap<String, Vec<String>>,
}

impl FallbackPolicy {
    /// Built-in table for an exchange class
    pub fn for_class(class: ExchangeClass) -> Self {
        let to_vec = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        match class {
            ExchangeClass::CryptoPair => {
                let mut aliases = BTreeMap::new();
                aliases.insert("USD".to_string(), vec!["USDT".to_string()]);
                Self {
                    native: to_vec(CRYPTO_PAIR_NATIVE),
                    fallbacks: to_vec(CRYPTO_PAIR_FALLBACKS),
                    aliases,
                }
            }
            ExchangeClass::FiatNative => Self {
                native: to_vec(FIAT_NATIVE),
                fallbacks: to_vec(FIAT_NATIVE_FALLBACKS),
                aliases: BTreeMap::new(),
            },
        }
    }

    /// Ordered, de-duplicated quote currencies to attempt for `requested`
    pub fn candidates(&self, requested: &str) -> Vec<String> {
        let requested = requested.to_uppercase();
        let mut out = vec![requested.clone()];

        // Alias keys come straight from YAML in whatever case was written
        for (_, aliases) in self
            .aliases
            .iter()
            .filter(|(key, _)| key.eq_ignore_ascii_case(&requested))
        {
            out.extend(aliases.iter().map(|q| q.to_uppercase()));
        }
        if !self.native.iter().any(|q| q.eq_ignore_ascii_case(&requested)) {
            out.extend(self.fallbacks.iter().map(|q| q.to_uppercase()));
        }

        let mut seen = Vec::with_capacity(out.len());
        out.retain(|q| {
            if seen.contains(q) {
                false
            } else {
                seen.push(q.clone());
                true
            }
        });
        out
    }
}

// =============================================================================
// Trading pair
// =============================================================================

/// Base/quote currency combination, always upper-case
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TradingPair {
    pub base: String,
    pub quote: String,
}

impl TradingPair {
    pub fn new(base: &str, quote: &str) -> Self {
        Self {
            base: base.trim().to_uppercase(),
            quote: quote.trim().to_uppercase(),
        }
    }
}

impl fmt::Display for TradingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

// =============================================================================
// Raw connector output
// =============================================================================

/// Ticker as reported by an exchange, before normalization into a quote
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTicker {
    /// Last trade price
    pub last: f64,
    /// 24h opening price
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    /// 24h volume in base currency
    pub base_volume: Option<f64>,
    /// Source timestamp (Unix ms)
    pub timestamp_ms: Option<i64>,
}

/// One OHLC bucket as reported by an exchange
#[derive(Debug, Clone, PartialEq)]
pub struct RawCandle {
    /// Bucket open time (Unix ms)
    pub open_time_ms: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Parse a numeric string field from an exchange payload
pub(crate) fn parse_f64(field: &str, value: &str) -> ExchangeResult<f64> {
    value.trim().parse::<f64>().map_err(|e| {
        ExchangeError::InvalidResponse(format!("Invalid {} '{}': {}", field, value, e))
    })
}

// =============================================================================
// HTTP client
// =============================================================================

/// HTTP connection timeout (milliseconds)
const HTTP_CONNECT_TIMEOUT_MS: u64 = 3000;
/// TCP keepalive interval (seconds)
const HTTP_TCP_KEEPALIVE_SECS: u64 = 30;

/// Create the HTTP client owned by a single connector instance
pub fn create_http_client(exchange_name: &str, timeout: Duration) -> reqwest::Client {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_millis(HTTP_CONNECT_TIMEOUT_MS))
        .tcp_keepalive(Duration::from_secs(HTTP_TCP_KEEPALIVE_SECS))
        .user_agent(concat!("rate_aggregator/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new());
    tracing::debug!(
        phase = "init",
        exchange = %exchange_name,
        timeout_ms = timeout.as_millis() as u64,
        connect_timeout_ms = HTTP_CONNECT_TIMEOUT_MS,
        "HTTP client configured"
    );
    client
}
