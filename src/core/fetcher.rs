//! Single-exchange rate fetcher
//!
//! Resolves one (crypto, fiat, exchange) request into a `TickerQuote`,
//! walking the exchange's quote-currency fallback chain until a pair answers.
//! Each candidate is attempted exactly once; there is no retry or backoff.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::adapters::traits::{ConnectorFactory, TickerSource};
use crate::adapters::types::{ExchangeId, TradingPair};
use crate::adapters::LiveConnectors;
use crate::config::ExchangesConfig;
use crate::core::quote::TickerQuote;
use crate::error::RateError;

/// Upper-case and validate a currency symbol
pub fn normalize_symbol(symbol: &str) -> Result<String, RateError> {
    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(RateError::InvalidSymbol("symbol cannot be empty".to_string()));
    }
    if !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(RateError::InvalidSymbol(format!(
            "'{}' must be alphanumeric",
            symbol
        )));
    }
    Ok(symbol)
}

/// Fetches quotes from one exchange at a time
pub struct RateFetcher<F> {
    factory: F,
    config: ExchangesConfig,
}

impl RateFetcher<LiveConnectors> {
    /// Fetcher backed by the real exchange REST APIs
    pub fn live(config: ExchangesConfig) -> Self {
        let factory = LiveConnectors::from_config(&config);
        Self::new(factory, config)
    }
}

impl<F: ConnectorFactory> RateFetcher<F> {
    pub fn new(factory: F, config: ExchangesConfig) -> Self {
        Self { factory, config }
    }

    pub fn config(&self) -> &ExchangesConfig {
        &self.config
    }

    /// Fetch a quote for `crypto`/`fiat` from an exchange named by string
    ///
    /// Unknown names fail with `UnsupportedExchange` before any request.
    pub async fn fetch_named(
        &self,
        crypto: &str,
        fiat: &str,
        exchange: &str,
    ) -> Result<TickerQuote, RateError> {
        let exchange: ExchangeId = exchange.parse()?;
        self.fetch(crypto, fiat, exchange).await
    }

    /// Fetch a quote for `crypto`/`fiat` from `exchange`
    ///
    /// The whole fallback chain runs under the configured timeout; expiry
    /// yields `RateError::Timeout`.
    pub async fn fetch(
        &self,
        crypto: &str,
        fiat: &str,
        exchange: ExchangeId,
    ) -> Result<TickerQuote, RateError> {
        let crypto = normalize_symbol(crypto)?;
        let fiat = normalize_symbol(fiat)?;
        let timeout = self.config.request_timeout();

        match tokio::time::timeout(timeout, self.fetch_with_fallback(&crypto, &fiat, exchange)).await
        {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    exchange = %exchange,
                    pair = %format!("{}/{}", crypto, fiat),
                    timeout_ms = timeout.as_millis() as u64,
                    "Rate fetch timed out"
                );
                Err(RateError::Timeout {
                    exchange: exchange.to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
        }
    }

    async fn fetch_with_fallback(
        &self,
        crypto: &str,
        fiat: &str,
        exchange: ExchangeId,
    ) -> Result<TickerQuote, RateError> {
        let source = self.factory.connector(exchange);
        let candidates = self.config.fallback_policy(exchange).candidates(fiat);

        let mut attempted = Vec::with_capacity(candidates.len());
        let mut last_error = String::new();

        for quote_currency in &candidates {
            let pair = TradingPair::new(crypto, quote_currency);
            attempted.push(pair.to_string());

            let outcome = source
                .fetch_ticker(&pair)
                .await
                .and_then(|raw| TickerQuote::from_raw(exchange, &pair, raw, Utc::now()));

            match outcome {
                Ok(quote) => {
                    if quote_currency != fiat {
                        info!(
                            exchange = %exchange,
                            requested = %format!("{}/{}", crypto, fiat),
                            resolved = %quote.pair,
                            "Resolved rate through fallback pair"
                        );
                    }
                    return Ok(quote);
                }
                Err(e) => {
                    debug!(exchange = %exchange, pair = %pair, error = %e, "Candidate pair failed");
                    last_error = e.to_string();
                }
            }
        }

        Err(RateError::RateUnavailable {
            exchange: exchange.to_string(),
            requested: format!("{}/{}", crypto, fiat),
            attempted,
            last_error,
        })
    }
}

/// Fetch one exchange rate with the built-in configuration
///
/// Convenience wrapper over `RateFetcher::live`; services issuing many
/// requests should keep their own fetcher.
pub async fn get_exchange_rate(
    crypto: &str,
    fiat: &str,
    exchange: &str,
) -> Result<TickerQuote, RateError> {
    RateFetcher::live(ExchangesConfig::default())
        .fetch_named(crypto, fiat, exchange)
        .await
}
