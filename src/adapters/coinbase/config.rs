//! Coinbase Configuration

use std::time::Duration;

use crate::config::constants;

/// Production REST endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.exchange.coinbase.com";

/// Configuration for the Coinbase Exchange public REST API
#[derive(Debug, Clone)]
pub struct CoinbaseConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for CoinbaseConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: constants::rate_fetch_timeout(),
        }
    }
}

impl CoinbaseConfig {
    /// Create configuration from environment variables (`COINBASE_BASE_URL`)
    pub fn from_env() -> Self {
        Self {
            base_url: constants::base_url_override("COINBASE_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: constants::rate_fetch_timeout(),
        }
    }

    /// Full URL of the 24h stats endpoint for a product
    pub fn stats_url(&self, product_id: &str) -> String {
        format!(
            "{}/products/{}/stats",
            self.base_url.trim_end_matches('/'),
            product_id
        )
    }
}
