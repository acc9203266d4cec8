//! Connector factory for exchange selection
//!
//! Maps the closed `ExchangeId` set onto concrete connectors. Uses an
//! enum-based dispatch pattern (no `Box<dyn>`) so adding an exchange means
//! adding a variant here and a connector module.

use async_trait::async_trait;

use crate::adapters::binance::{BinanceConfig, BinanceConnector};
use crate::adapters::coinbase::{CoinbaseConfig, CoinbaseConnector};
use crate::adapters::errors::ExchangeResult;
use crate::adapters::kraken::{KrakenConfig, KrakenConnector};
use crate::adapters::traits::{ConnectorFactory, TickerSource};
use crate::adapters::types::{ExchangeId, RawTicker, TradingPair};
use crate::config::ExchangesConfig;

// =============================================================================
// AnyConnector: enum-based dispatch
// =============================================================================

/// Enum wrapping all concrete connector types for runtime dispatch.
pub enum AnyConnector {
    Binance(BinanceConnector),
    Coinbase(CoinbaseConnector),
    Kraken(KrakenConnector),
}

#[async_trait]
impl TickerSource for AnyConnector {
    fn exchange_id(&self) -> ExchangeId {
        match self {
            AnyConnector::Binance(c) => c.exchange_id(),
            AnyConnector::Coinbase(c) => c.exchange_id(),
            AnyConnector::Kraken(c) => c.exchange_id(),
        }
    }

    async fn fetch_ticker(&self, pair: &TradingPair) -> ExchangeResult<RawTicker> {
        match self {
            AnyConnector::Binance(c) => c.fetch_ticker(pair).await,
            AnyConnector::Coinbase(c) => c.fetch_ticker(pair).await,
            AnyConnector::Kraken(c) => c.fetch_ticker(pair).await,
        }
    }
}

// =============================================================================
// LiveConnectors: production factory
// =============================================================================

/// Factory building REST connectors against the real exchange endpoints
///
/// Holds only configuration; every `connector()` call constructs a new
/// connector with its own HTTP client.
#[derive(Debug, Clone)]
pub struct LiveConnectors {
    binance: BinanceConfig,
    coinbase: CoinbaseConfig,
    kraken: KrakenConfig,
}

impl LiveConnectors {
    /// Build from environment defaults, then apply the YAML overrides
    pub fn from_config(config: &ExchangesConfig) -> Self {
        let timeout = config.request_timeout();

        let mut binance = BinanceConfig::from_env();
        let mut coinbase = CoinbaseConfig::from_env();
        let mut kraken = KrakenConfig::from_env();
        binance.timeout = timeout;
        coinbase.timeout = timeout;
        kraken.timeout = timeout;

        if let Some(url) = config.base_url(ExchangeId::Binance) {
            binance.base_url = url.to_string();
        }
        if let Some(url) = config.base_url(ExchangeId::Coinbase) {
            coinbase.base_url = url.to_string();
        }
        if let Some(url) = config.base_url(ExchangeId::Kraken) {
            kraken.base_url = url.to_string();
        }

        Self {
            binance,
            coinbase,
            kraken,
        }
    }

    /// Standalone Kraken connector, used as the candle source
    pub fn kraken(&self) -> KrakenConnector {
        KrakenConnector::new(self.kraken.clone())
    }
}

impl ConnectorFactory for LiveConnectors {
    type Source = AnyConnector;

    fn connector(&self, exchange: ExchangeId) -> AnyConnector {
        match exchange {
            ExchangeId::Binance => AnyConnector::Binance(BinanceConnector::new(self.binance.clone())),
            ExchangeId::Coinbase => {
                AnyConnector::Coinbase(CoinbaseConnector::new(self.coinbase.clone()))
            }
            ExchangeId::Kraken => AnyConnector::Kraken(self.kraken()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;

    #[test]
    fn test_connector_matches_exchange_id() {
        let factory = LiveConnectors::from_config(&ExchangesConfig::default());
        for id in ExchangeId::ALL {
            assert_eq!(factory.connector(id).exchange_id(), id);
        }
    }

    #[test]
    fn test_base_url_override_applied() {
        let config = load_config_from_str(
            r#"
exchanges:
  request_timeout_ms: 9000
  overrides:
    kraken:
      base_url: "http://127.0.0.1:9999"
"#,
        )
        .unwrap();
        let factory = LiveConnectors::from_config(&config.exchanges);
        assert_eq!(factory.kraken.base_url, "http://127.0.0.1:9999");
        assert_eq!(factory.kraken.timeout.as_millis(), 9000);
        assert_eq!(factory.binance.timeout.as_millis(), 9000);
    }
}
