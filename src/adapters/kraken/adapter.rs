//! Kraken Connector Implementation

use std::collections::HashMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::traits::{CandleSource, TickerSource};
use crate::adapters::types::{
    create_http_client, ExchangeId, RawCandle, RawTicker, TradingPair,
};

use super::config::KrakenConfig;
use super::types::{
    classify_errors, first_ticker, parse_ohlc_result, to_kraken_pair, KrakenResponse,
    KrakenTickerInfo,
};

/// Kraken connector implementing `TickerSource` and `CandleSource`
pub struct KrakenConnector {
    config: KrakenConfig,
    http_client: reqwest::Client,
}

impl KrakenConnector {
    pub fn new(config: KrakenConfig) -> Self {
        let http_client = create_http_client("kraken", config.timeout);
        Self { config, http_client }
    }

    /// GET a public endpoint and unwrap the `{error, result}` envelope
    async fn get_public<T: DeserializeOwned>(
        &self,
        url: String,
        query: &[(&str, String)],
        pair: &TradingPair,
    ) -> ExchangeResult<T> {
        let timeout_ms = self.config.timeout.as_millis() as u64;
        let response = self
            .http_client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| ExchangeError::from(e).with_timeout_ms(timeout_ms))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ExchangeError::from(e).with_timeout_ms(timeout_ms))?;

        if !status.is_success() {
            return Err(ExchangeError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let envelope: KrakenResponse<T> = serde_json::from_str(&body).map_err(|e| {
            ExchangeError::InvalidResponse(format!("Failed to parse Kraken response: {}", e))
        })?;
        if let Some(err) = classify_errors(&envelope.error, pair) {
            return Err(err);
        }
        envelope
            .result
            .ok_or_else(|| ExchangeError::InvalidResponse("Kraken response has no result".into()))
    }
}

#[async_trait]
impl TickerSource for KrakenConnector {
    fn exchange_id(&self) -> ExchangeId {
        ExchangeId::Kraken
    }

    async fn fetch_ticker(&self, pair: &TradingPair) -> ExchangeResult<RawTicker> {
        let result: HashMap<String, KrakenTickerInfo> = self
            .get_public(self.config.ticker_url(), &[("pair", to_kraken_pair(pair))], pair)
            .await?;
        first_ticker(result)?.to_raw_ticker()
    }
}

#[async_trait]
impl CandleSource for KrakenConnector {
    async fn fetch_candles(
        &self,
        pair: &TradingPair,
        interval_minutes: u32,
    ) -> ExchangeResult<Vec<RawCandle>> {
        let result: HashMap<String, Value> = self
            .get_public(
                self.config.ohlc_url(),
                &[
                    ("pair", to_kraken_pair(pair)),
                    ("interval", interval_minutes.to_string()),
                ],
                pair,
            )
            .await?;
        parse_ohlc_result(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn connector_for(server: &mockito::Server) -> KrakenConnector {
        KrakenConnector::new(KrakenConfig {
            base_url: server.url(),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_fetch_ticker_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/0/public/Ticker")
            .match_query(Matcher::UrlEncoded("pair".into(), "XBTCHF".into()))
            .with_status(200)
            .with_body(
                r#"{"error":[],"result":{"XBTCHF":{"c":["58000.1","0.1"],"v":["10","20"],
                    "l":["57000","56500"],"h":["59000","59500"],"o":"57500.0"}}}"#,
            )
            .create_async()
            .await;

        let ticker = connector_for(&server)
            .fetch_ticker(&TradingPair::new("BTC", "CHF"))
            .await
            .unwrap();
        assert_eq!(ticker.last, 58000.1);
        assert_eq!(ticker.high, Some(59500.0));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_ticker_unknown_pair() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/0/public/Ticker")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"error":["EQuery:Unknown asset pair"]}"#)
            .create_async()
            .await;

        let err = connector_for(&server)
            .fetch_ticker(&TradingPair::new("BTC", "USDT"))
            .await
            .unwrap_err();
        assert!(err.is_pair_not_listed());
    }

    #[tokio::test]
    async fn test_fetch_candles() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/0/public/OHLC")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("pair".into(), "XBTEUR".into()),
                Matcher::UrlEncoded("interval".into(), "1440".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"error":[],"result":{"XXBTZEUR":[
                    [1700000000,"1.0","2.0","0.5","1.5","1.2","3.0",4]
                ],"last":1700000000}}"#,
            )
            .create_async()
            .await;

        let candles = connector_for(&server)
            .fetch_candles(&TradingPair::new("BTC", "EUR"), 1440)
            .await
            .unwrap();
        assert_eq!(candles.len(), 1);
        assert_eq!(candles[0].high, 2.0);
        mock.assert_async().await;
    }
}
