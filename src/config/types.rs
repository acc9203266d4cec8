//! Configuration types
//!
//! Every section has serde defaults, so an empty YAML document (or no file at
//! all) yields the built-in configuration.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::adapters::types::{ExchangeId, FallbackPolicy};
use crate::error::AppError;

use super::constants;

// ============================================================================
// Defaults
// ============================================================================

fn default_exchanges() -> Vec<ExchangeId> {
    ExchangeId::ALL.to_vec()
}

fn default_timeout_ms() -> u64 {
    constants::rate_fetch_timeout_ms()
}

fn default_threshold() -> f64 {
    constants::arbitrage_threshold_percent()
}

/// Bounds accepted for `request_timeout_ms`
const MIN_TIMEOUT_MS: u64 = 1_000;
const MAX_TIMEOUT_MS: u64 = 60_000;

// ============================================================================
// Configuration Structs
// ============================================================================

/// Per-exchange overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExchangeOverride {
    /// REST endpoint replacing the production URL
    #[serde(default)]
    pub base_url: Option<String>,
    /// Quote-currency table replacing the exchange-class default
    #[serde(default)]
    pub fallback: Option<FallbackPolicy>,
}

/// Exchange selection and connector settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangesConfig {
    /// Exchanges queried when the caller names none
    #[serde(default = "default_exchanges")]
    pub default: Vec<ExchangeId>,
    /// Bound on one exchange's whole fetch (fallback chain included)
    #[serde(default = "default_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default)]
    pub overrides: BTreeMap<ExchangeId, ExchangeOverride>,
}

impl Default for ExchangesConfig {
    fn default() -> Self {
        Self {
            default: default_exchanges(),
            request_timeout_ms: default_timeout_ms(),
            overrides: BTreeMap::new(),
        }
    }
}

impl ExchangesConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Configured endpoint override, if any
    pub fn base_url(&self, exchange: ExchangeId) -> Option<&str> {
        self.overrides
            .get(&exchange)
            .and_then(|o| o.base_url.as_deref())
    }

    /// Fallback table for an exchange: override, else class default
    pub fn fallback_policy(&self, exchange: ExchangeId) -> FallbackPolicy {
        self.overrides
            .get(&exchange)
            .and_then(|o| o.fallback.clone())
            .unwrap_or_else(|| FallbackPolicy::for_class(exchange.class()))
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.default.is_empty() {
            return Err(AppError::Config(
                "exchanges.default must name at least one exchange".to_string(),
            ));
        }

        for (i, id) in self.default.iter().enumerate() {
            if self.default[..i].contains(id) {
                return Err(AppError::Config(format!(
                    "exchanges.default lists '{}' more than once",
                    id
                )));
            }
        }

        if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&self.request_timeout_ms) {
            return Err(AppError::Config(format!(
                "exchanges.request_timeout_ms must be {}-{}, got {}",
                MIN_TIMEOUT_MS, MAX_TIMEOUT_MS, self.request_timeout_ms
            )));
        }

        for (id, overrides) in &self.overrides {
            if let Some(url) = &overrides.base_url {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(AppError::Config(format!(
                        "exchanges.overrides.{}.base_url must be an http(s) URL, got '{}'",
                        id, url
                    )));
                }
            }
            if let Some(policy) = &overrides.fallback {
                if policy.native.is_empty() {
                    return Err(AppError::Config(format!(
                        "exchanges.overrides.{}.fallback.native cannot be empty",
                        id
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Arbitrage classification policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbitrageConfig {
    /// Spread percentage that must be exceeded (e.g., 0.1 = 0.1%)
    #[serde(default = "default_threshold")]
    pub threshold_percent: f64,
}

impl Default for ArbitrageConfig {
    fn default() -> Self {
        Self {
            threshold_percent: default_threshold(),
        }
    }
}

impl ArbitrageConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if !self.threshold_percent.is_finite() || self.threshold_percent < 0.0 {
            return Err(AppError::Config(format!(
                "arbitrage.threshold_percent must be a non-negative number, got {}",
                self.threshold_percent
            )));
        }
        Ok(())
    }
}

/// Root application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub exchanges: ExchangesConfig,
    #[serde(default)]
    pub arbitrage: ArbitrageConfig,
}

impl AppConfig {
    /// Validate all configuration rules
    pub fn validate(&self) -> Result<(), AppError> {
        self.exchanges.validate()?;
        self.arbitrage.validate()?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::types::ExchangeClass;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.exchanges.default,
            vec![ExchangeId::Binance, ExchangeId::Coinbase, ExchangeId::Kraken]
        );
    }

    #[test]
    fn test_duplicate_default_exchange_rejected() {
        let mut config = AppConfig::default();
        config.exchanges.default = vec![ExchangeId::Kraken, ExchangeId::Kraken];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_timeout_out_of_range_rejected() {
        let mut config = AppConfig::default();
        config.exchanges.request_timeout_ms = 50;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let mut config = AppConfig::default();
        config.arbitrage.threshold_percent = -0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fallback_policy_defaults_to_exchange_class() {
        let config = ExchangesConfig::default();
        assert_eq!(
            config.fallback_policy(ExchangeId::Kraken),
            FallbackPolicy::for_class(ExchangeClass::FiatNative)
        );
        assert_eq!(
            config.fallback_policy(ExchangeId::Binance),
            FallbackPolicy::for_class(ExchangeClass::CryptoPair)
        );
    }
}
