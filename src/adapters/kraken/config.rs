//! Kraken Configuration

use std::time::Duration;

use crate::config::constants;

/// Production REST endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.kraken.com";

/// Configuration for the Kraken public REST API
#[derive(Debug, Clone)]
pub struct KrakenConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for KrakenConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: constants::rate_fetch_timeout(),
        }
    }
}

impl KrakenConfig {
    /// Create configuration from environment variables (`KRAKEN_BASE_URL`)
    pub fn from_env() -> Self {
        Self {
            base_url: constants::base_url_override("KRAKEN_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: constants::rate_fetch_timeout(),
        }
    }

    pub fn ticker_url(&self) -> String {
        format!("{}/0/public/Ticker", self.base_url.trim_end_matches('/'))
    }

    pub fn ohlc_url(&self) -> String {
        format!("{}/0/public/OHLC", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_urls() {
        let config = KrakenConfig::default();
        assert_eq!(config.ticker_url(), "https://api.kraken.com/0/public/Ticker");
        assert_eq!(config.ohlc_url(), "https://api.kraken.com/0/public/OHLC");
    }
}
