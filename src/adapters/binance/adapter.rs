//! Binance Connector Implementation

use async_trait::async_trait;

use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::traits::TickerSource;
use crate::adapters::types::{create_http_client, ExchangeId, RawTicker, TradingPair};
use crate::config::logging::sanitize;

use super::config::BinanceConfig;
use super::types::{to_binance_symbol, BinanceErrorBody, BinanceTicker24h, INVALID_SYMBOL_CODE};

/// Binance connector implementing `TickerSource`
pub struct BinanceConnector {
    config: BinanceConfig,
    http_client: reqwest::Client,
}

impl BinanceConnector {
    /// Create a new connector with its own HTTP client
    pub fn new(config: BinanceConfig) -> Self {
        if let Some(key) = config.api_key.as_deref() {
            tracing::debug!(exchange = "binance", api_key = %sanitize(key), "Using API key");
        }
        let http_client = create_http_client("binance", config.timeout);
        Self { config, http_client }
    }
}

#[async_trait]
impl TickerSource for BinanceConnector {
    fn exchange_id(&self) -> ExchangeId {
        ExchangeId::Binance
    }

    async fn fetch_ticker(&self, pair: &TradingPair) -> ExchangeResult<RawTicker> {
        let symbol = to_binance_symbol(pair);
        let mut request = self
            .http_client
            .get(self.config.ticker_url())
            .query(&[("symbol", symbol.as_str())]);
        if let Some(key) = self.config.api_key.as_deref() {
            request = request.header("X-MBX-APIKEY", key);
        }

        let timeout_ms = self.config.timeout.as_millis() as u64;
        let response = request
            .send()
            .await
            .map_err(|e| ExchangeError::from(e).with_timeout_ms(timeout_ms))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ExchangeError::from(e).with_timeout_ms(timeout_ms))?;

        if !status.is_success() {
            return Err(match serde_json::from_str::<BinanceErrorBody>(&body) {
                Ok(err) if err.code == INVALID_SYMBOL_CODE => ExchangeError::PairNotListed {
                    exchange: "binance".to_string(),
                    pair: pair.to_string(),
                },
                Ok(err) => ExchangeError::Api {
                    status: status.as_u16(),
                    message: err.msg,
                },
                Err(_) => ExchangeError::Api {
                    status: status.as_u16(),
                    message: body,
                },
            });
        }

        let ticker: BinanceTicker24h = serde_json::from_str(&body).map_err(|e| {
            ExchangeError::InvalidResponse(format!("Failed to parse Binance ticker: {}", e))
        })?;
        ticker.to_raw_ticker()
    }
}
