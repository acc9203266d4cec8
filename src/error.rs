//! Application-wide error types using thiserror
//!
//! `RateError` is the domain taxonomy of the rate pipeline. `AppError` wraps
//! it together with configuration and I/O failures for the binary.

use serde::Serialize;
use thiserror::Error;

use crate::adapters::errors::ExchangeError;

/// One exchange that failed inside a multi-exchange request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExchangeFailure {
    pub exchange: String,
    pub reason: String,
}

/// One coin that failed inside a comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoinFailure {
    pub coin: String,
    pub reason: String,
}

fn join_exchange_failures(failures: &[ExchangeFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{}: {}", f.exchange, f.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

fn join_coin_failures(failures: &[CoinFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{}: {}", f.coin, f.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors of the fetch / aggregate / compare pipeline
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RateError {
    #[error("Exchange '{0}' is not supported")]
    UnsupportedExchange(String),

    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("No exchanges requested")]
    NoExchangesRequested,

    /// Every quote-currency candidate failed on one exchange
    #[error(
        "Failed to fetch {requested} from {exchange}. Tried: {}. Error: {last_error}",
        .attempted.join(", ")
    )]
    RateUnavailable {
        exchange: String,
        requested: String,
        attempted: Vec<String>,
        last_error: String,
    },

    #[error("{exchange} did not respond within {timeout_ms}ms")]
    Timeout { exchange: String, timeout_ms: u64 },

    /// Every exchange in a multi-exchange request failed
    #[error("Failed to fetch {pair} from any exchange ({})", join_exchange_failures(.failures))]
    NoLiquiditySource {
        pair: String,
        failures: Vec<ExchangeFailure>,
    },

    /// Every coin in a comparison failed
    #[error("Failed to fetch prices for all coins ({})", join_coin_failures(.failures))]
    ComparisonFailed { failures: Vec<CoinFailure> },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Rate error: {0}")]
    Rate(#[from] RateError),

    #[error("Exchange error: {0}")]
    Exchange(#[from] ExchangeError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_unavailable_lists_attempts() {
        let err = RateError::RateUnavailable {
            exchange: "binance".to_string(),
            requested: "BTC/CHF".to_string(),
            attempted: vec!["BTC/CHF".into(), "BTC/USDT".into()],
            last_error: "API error (451): restricted".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to fetch BTC/CHF from binance. Tried: BTC/CHF, BTC/USDT. \
             Error: API error (451): restricted"
        );
    }

    #[test]
    fn test_no_liquidity_source_names_every_exchange() {
        let err = RateError::NoLiquiditySource {
            pair: "ETH/USD".to_string(),
            failures: vec![
                ExchangeFailure { exchange: "binance".into(), reason: "down".into() },
                ExchangeFailure { exchange: "kraken".into(), reason: "slow".into() },
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("ETH/USD"));
        assert!(msg.contains("binance: down"));
        assert!(msg.contains("kraken: slow"));
    }

    #[test]
    fn test_app_error_from_rate_error() {
        let app: AppError = RateError::NoExchangesRequested.into();
        assert_eq!(app.to_string(), "Rate error: No exchanges requested");
    }
}
