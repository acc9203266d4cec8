//! Coinbase Connector Implementation

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::traits::TickerSource;
use crate::adapters::types::{create_http_client, ExchangeId, RawTicker, TradingPair};

use super::config::CoinbaseConfig;
use super::types::{to_product_id, CoinbaseErrorBody, CoinbaseStats};

/// Coinbase connector implementing `TickerSource`
pub struct CoinbaseConnector {
    config: CoinbaseConfig,
    http_client: reqwest::Client,
}

impl CoinbaseConnector {
    pub fn new(config: CoinbaseConfig) -> Self {
        let http_client = create_http_client("coinbase", config.timeout);
        Self { config, http_client }
    }
}

#[async_trait]
impl TickerSource for CoinbaseConnector {
    fn exchange_id(&self) -> ExchangeId {
        ExchangeId::Coinbase
    }

    async fn fetch_ticker(&self, pair: &TradingPair) -> ExchangeResult<RawTicker> {
        let url = self.config.stats_url(&to_product_id(pair));
        let timeout_ms = self.config.timeout.as_millis() as u64;
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| ExchangeError::from(e).with_timeout_ms(timeout_ms))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ExchangeError::from(e).with_timeout_ms(timeout_ms))?;

        if status == StatusCode::NOT_FOUND {
            return Err(ExchangeError::PairNotListed {
                exchange: "coinbase".to_string(),
                pair: pair.to_string(),
            });
        }
        if !status.is_success() {
            let message = serde_json::from_str::<CoinbaseErrorBody>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(ExchangeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let stats: CoinbaseStats = serde_json::from_str(&body).map_err(|e| {
            ExchangeError::InvalidResponse(format!("Failed to parse Coinbase stats: {}", e))
        })?;
        stats.to_raw_ticker()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connector_for(server: &mockito::Server) -> CoinbaseConnector {
        CoinbaseConnector::new(CoinbaseConfig {
            base_url: server.url(),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_fetch_ticker_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/products/ETH-EUR/stats")
            .with_status(200)
            .with_body(r#"{"open":"3000","high":"3100","low":"2950","last":"3050","volume":"1234.5"}"#)
            .create_async()
            .await;

        let ticker = connector_for(&server)
            .fetch_ticker(&TradingPair::new("eth", "eur"))
            .await
            .unwrap();
        assert_eq!(ticker.last, 3050.0);
        assert_eq!(ticker.high, Some(3100.0));
        assert_eq!(ticker.timestamp_ms, None);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_ticker_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/products/BTC-USDT/stats")
            .with_status(404)
            .with_body(r#"{"message":"NotFound"}"#)
            .create_async()
            .await;

        let err = connector_for(&server)
            .fetch_ticker(&TradingPair::new("BTC", "USDT"))
            .await
            .unwrap_err();
        assert!(err.is_pair_not_listed());
    }

    #[tokio::test]
    async fn test_fetch_ticker_server_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/products/BTC-USD/stats")
            .with_status(503)
            .with_body(r#"{"message":"service unavailable"}"#)
            .create_async()
            .await;

        let err = connector_for(&server)
            .fetch_ticker(&TradingPair::new("BTC", "USD"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ExchangeError::Api {
                status: 503,
                message: "service unavailable".to_string()
            }
        );
    }
}
