//! Binance Configuration

use std::time::Duration;

use crate::config::constants;

/// Production REST endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";

/// Configuration for the Binance public REST API
#[derive(Debug, Clone)]
pub struct BinanceConfig {
    /// REST base URL, without trailing slash
    pub base_url: String,
    /// Optional API key; raises the per-IP request weight limit
    pub api_key: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout: constants::rate_fetch_timeout(),
        }
    }
}

impl BinanceConfig {
    /// Create configuration from environment variables
    ///
    /// `BINANCE_BASE_URL` overrides the endpoint, `BINANCE_API_KEY` is sent as
    /// `X-MBX-APIKEY` when present.
    pub fn from_env() -> Self {
        Self {
            base_url: constants::base_url_override("BINANCE_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key: constants::binance_api_key(),
            timeout: constants::rate_fetch_timeout(),
        }
    }

    /// Full URL of the 24h ticker endpoint
    pub fn ticker_url(&self) -> String {
        format!("{}/api/v3/ticker/24hr", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = BinanceConfig::default();
        assert!(config.api_key.is_none());
        assert_eq!(config.ticker_url(), "https://api.binance.com/api/v3/ticker/24hr");
    }

    #[test]
    fn test_ticker_url_trims_trailing_slash() {
        let config = BinanceConfig {
            base_url: "http://127.0.0.1:1234/".to_string(),
            ..Default::default()
        };
        assert_eq!(config.ticker_url(), "http://127.0.0.1:1234/api/v3/ticker/24hr");
    }
}
