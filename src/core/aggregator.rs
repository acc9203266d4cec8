//! Multi-exchange aggregation
//!
//! Fans the rate fetcher out across several exchanges concurrently, waits for
//! every outcome, and reduces the successes into an `AggregateResult`.
//! One exchange failing never prevents the others from being reported.

use futures_util::future::join_all;
use serde::Serialize;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::adapters::traits::ConnectorFactory;
use crate::adapters::types::ExchangeId;
use crate::adapters::LiveConnectors;
use crate::config::ExchangesConfig;
use crate::core::fetcher::{normalize_symbol, RateFetcher};
use crate::core::quote::TickerQuote;
use crate::error::{ExchangeFailure, RateError};

// =============================================================================
// AggregateResult
// =============================================================================

/// Comparative summary of one logical pair across exchanges
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    /// Requested pair label (`CRYPTO/FIAT`)
    pub pair: String,
    /// Successful quotes in exchange query order; never empty
    pub quotes: Vec<TickerQuote>,
    /// Cheapest quote (first one wins ties)
    pub best_price: TickerQuote,
    /// Most expensive quote (first one wins ties)
    pub worst_price: TickerQuote,
    pub average_price: f64,
    pub price_spread: f64,
    pub price_spread_percent: f64,
    /// Exchanges that failed, with reasons
    pub failures: Vec<ExchangeFailure>,
}

impl AggregateResult {
    /// Names of the exchanges that produced no quote
    pub fn missing_exchanges(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.exchange.as_str()).collect()
    }

    /// True when every requested exchange answered
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Requested exchanges absent from `quotes`
    pub fn missing_from(&self, requested: &[ExchangeId]) -> Vec<ExchangeId> {
        requested
            .iter()
            .copied()
            .filter(|id| !self.quotes.iter().any(|q| q.exchange == id.as_str()))
            .collect()
    }
}

/// Reduce quotes into a summary
///
/// Returns `None` when `quotes` is empty. Quotes must already be in exchange
/// query order: ties on best/worst resolve to the earlier quote.
pub fn summarize(
    pair: String,
    quotes: Vec<TickerQuote>,
    failures: Vec<ExchangeFailure>,
) -> Option<AggregateResult> {
    let first = quotes.first()?;

    let mut best = first;
    let mut worst = first;
    let mut sum = 0.0;
    for quote in &quotes {
        if quote.price < best.price {
            best = quote;
        }
        if quote.price > worst.price {
            worst = quote;
        }
        sum += quote.price;
    }

    let average_price = sum / quotes.len() as f64;
    let price_spread = worst.price - best.price;
    // Prices are validated positive, so best.price is never zero
    let price_spread_percent = price_spread / best.price * 100.0;
    let best_price = best.clone();
    let worst_price = worst.clone();

    Some(AggregateResult {
        pair,
        quotes,
        best_price,
        worst_price,
        average_price,
        price_spread,
        price_spread_percent,
        failures,
    })
}

// =============================================================================
// MultiExchangeAggregator
// =============================================================================

/// Concurrent fan-out over the rate fetcher
pub struct MultiExchangeAggregator<F> {
    fetcher: RateFetcher<F>,
    default_exchanges: Vec<ExchangeId>,
}

impl MultiExchangeAggregator<LiveConnectors> {
    /// Aggregator backed by the real exchange REST APIs
    pub fn live(config: ExchangesConfig) -> Self {
        Self::from_fetcher(RateFetcher::live(config))
    }
}

impl<F: ConnectorFactory> MultiExchangeAggregator<F> {
    /// Build from a fetcher; the default exchange set comes from its config
    pub fn from_fetcher(fetcher: RateFetcher<F>) -> Self {
        let default_exchanges = fetcher.config().default.clone();
        Self {
            fetcher,
            default_exchanges,
        }
    }

    pub fn new(factory: F, config: ExchangesConfig) -> Self {
        Self::from_fetcher(RateFetcher::new(factory, config))
    }

    pub fn fetcher(&self) -> &RateFetcher<F> {
        &self.fetcher
    }

    pub fn default_exchanges(&self) -> &[ExchangeId] {
        &self.default_exchanges
    }

    /// Aggregate over the configured default exchange set
    pub async fn aggregate_default(
        &self,
        crypto: &str,
        fiat: &str,
    ) -> Result<AggregateResult, RateError> {
        self.aggregate(crypto, fiat, &self.default_exchanges).await
    }

    /// Aggregate over exchanges named by string
    ///
    /// Every name is parsed before any request; one unknown name fails the
    /// whole call with `UnsupportedExchange`.
    pub async fn aggregate_named(
        &self,
        crypto: &str,
        fiat: &str,
        exchanges: &[&str],
    ) -> Result<AggregateResult, RateError> {
        let ids = exchanges
            .iter()
            .map(|name| name.parse::<ExchangeId>())
            .collect::<Result<Vec<_>, _>>()?;
        self.aggregate(crypto, fiat, &ids).await
    }

    /// Query `exchanges` concurrently and summarize the successes
    ///
    /// # Errors
    /// * `NoExchangesRequested` - `exchanges` is empty
    /// * `InvalidSymbol` - a symbol is empty or malformed
    /// * the exchange's own error when exactly one exchange was requested
    /// * `NoLiquiditySource` - every exchange failed
    pub async fn aggregate(
        &self,
        crypto: &str,
        fiat: &str,
        exchanges: &[ExchangeId],
    ) -> Result<AggregateResult, RateError> {
        if exchanges.is_empty() {
            return Err(RateError::NoExchangesRequested);
        }
        let crypto = normalize_symbol(crypto)?;
        let fiat = normalize_symbol(fiat)?;
        let pair = format!("{}/{}", crypto, fiat);

        let span = info_span!("aggregate", request_id = %Uuid::new_v4(), pair = %pair);
        async {
            // join_all yields outcomes in input order regardless of completion order
            let outcomes = join_all(
                exchanges
                    .iter()
                    .map(|&exchange| self.fetcher.fetch(&crypto, &fiat, exchange)),
            )
            .await;

            let mut quotes = Vec::with_capacity(exchanges.len());
            let mut failures = Vec::new();
            let mut last_error = None;
            for (exchange, outcome) in exchanges.iter().zip(outcomes) {
                match outcome {
                    Ok(quote) => quotes.push(quote),
                    Err(e) => {
                        warn!(exchange = %exchange, error = %e, "Exchange excluded from aggregate");
                        failures.push(ExchangeFailure {
                            exchange: exchange.to_string(),
                            reason: e.to_string(),
                        });
                        last_error = Some(e);
                    }
                }
            }

            if quotes.is_empty() {
                if exchanges.len() == 1 {
                    if let Some(err) = last_error {
                        return Err(err);
                    }
                }
                return Err(RateError::NoLiquiditySource {
                    pair: pair.clone(),
                    failures,
                });
            }

            match summarize(pair.clone(), quotes, failures) {
                Some(result) => {
                    info!(
                        sources = result.quotes.len(),
                        requested = exchanges.len(),
                        best = %result.best_price.exchange,
                        worst = %result.worst_price.exchange,
                        spread_pct = %format!("{:.4}", result.price_spread_percent),
                        "Aggregate computed"
                    );
                    Ok(result)
                }
                None => Err(RateError::NoLiquiditySource {
                    pair: pair.clone(),
                    failures: Vec::new(),
                }),
            }
        }
        .instrument(span)
        .await
    }
}

/// Aggregate over named exchanges with the built-in configuration
pub async fn get_multi_exchange_rate(
    crypto: &str,
    fiat: &str,
    exchanges: &[&str],
) -> Result<AggregateResult, RateError> {
    MultiExchangeAggregator::live(ExchangesConfig::default())
        .aggregate_named(crypto, fiat, exchanges)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn quote(exchange: &str, price: f64) -> TickerQuote {
        TickerQuote {
            exchange: exchange.to_string(),
            pair: "BTC/USDT".to_string(),
            price,
            volume_24h: 1.0,
            high_24h: price,
            low_24h: price,
            change_24h: 0.0,
            change_percent_24h: 0.0,
            timestamp: DateTime::<Utc>::from_timestamp_millis(0).unwrap(),
            last_updated: "1970-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn test_summarize_best_worst_average() {
        let result = summarize(
            "BTC/USDT".to_string(),
            vec![quote("binance", 100.0), quote("coinbase", 105.0), quote("kraken", 98.0)],
            vec![],
        )
        .unwrap();

        assert_eq!(result.best_price.price, 98.0);
        assert_eq!(result.best_price.exchange, "kraken");
        assert_eq!(result.worst_price.price, 105.0);
        assert_eq!(result.worst_price.exchange, "coinbase");
        assert!((result.average_price - 101.0).abs() < 1e-9);
        assert!((result.price_spread - 7.0).abs() < 1e-9);
        assert!((result.price_spread_percent - 7.142857).abs() < 1e-4);
        assert!(result.is_complete());
    }

    #[test]
    fn test_summarize_ties_resolve_to_first_seen() {
        let result = summarize(
            "ETH/USD".to_string(),
            vec![quote("coinbase", 50.0), quote("kraken", 50.0), quote("binance", 60.0)],
            vec![],
        )
        .unwrap();
        assert_eq!(result.best_price.exchange, "coinbase");

        let result = summarize(
            "ETH/USD".to_string(),
            vec![quote("binance", 40.0), quote("kraken", 60.0), quote("coinbase", 60.0)],
            vec![],
        )
        .unwrap();
        assert_eq!(result.worst_price.exchange, "kraken");
    }

    #[test]
    fn test_summarize_single_quote_has_zero_spread() {
        let result = summarize("SOL/EUR".to_string(), vec![quote("kraken", 150.0)], vec![]).unwrap();
        assert_eq!(result.price_spread, 0.0);
        assert_eq!(result.price_spread_percent, 0.0);
        assert_eq!(result.best_price, result.worst_price);
    }

    #[test]
    fn test_summarize_empty_is_none() {
        assert!(summarize("BTC/USD".to_string(), vec![], vec![]).is_none());
    }

    #[test]
    fn test_missing_exchanges_reported() {
        let result = summarize(
            "BTC/USD".to_string(),
            vec![quote("binance", 1.0)],
            vec![ExchangeFailure {
                exchange: "kraken".to_string(),
                reason: "timeout".to_string(),
            }],
        )
        .unwrap();
        assert!(!result.is_complete());
        assert_eq!(result.missing_exchanges(), vec!["kraken"]);
        assert_eq!(
            result.missing_from(&[ExchangeId::Binance, ExchangeId::Coinbase]),
            vec![ExchangeId::Coinbase]
        );
    }
}
