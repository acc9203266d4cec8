//! Side-by-side coin comparison
//!
//! Aggregates several coins against one fiat currency concurrently and ranks
//! the successful ones. Coins that fail are reported, not fatal, unless every
//! coin fails.

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::Serialize;
use tracing::{info, warn};

use crate::adapters::traits::ConnectorFactory;
use crate::config::constants::{MAX_COMPARE_COINS, MIN_COMPARE_COINS};
use crate::core::aggregator::{AggregateResult, MultiExchangeAggregator};
use crate::core::fetcher::normalize_symbol;
use crate::error::{CoinFailure, RateError};

/// Aggregated view of one coin
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinSummary {
    pub coin: String,
    pub pair: String,
    pub average_price: f64,
    pub best_price: f64,
    pub best_exchange: String,
    /// First non-zero 24h volume across the coin's quotes
    #[serde(rename = "volume24h")]
    pub volume_24h: Option<f64>,
    /// First non-zero 24h change percentage across the coin's quotes
    #[serde(rename = "changePercent24h")]
    pub change_percent_24h: Option<f64>,
}

impl CoinSummary {
    pub fn from_aggregate(coin: &str, result: &AggregateResult) -> Self {
        Self {
            coin: coin.to_string(),
            pair: result.pair.clone(),
            average_price: result.average_price,
            best_price: result.best_price.price,
            best_exchange: result.best_price.exchange.clone(),
            volume_24h: result
                .quotes
                .iter()
                .map(|q| q.volume_24h)
                .find(|v| *v != 0.0),
            change_percent_24h: result
                .quotes
                .iter()
                .map(|q| q.change_percent_24h)
                .find(|c| *c != 0.0),
        }
    }
}

/// A coin singled out by one ranking, with the value it was ranked on
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoinHighlight {
    pub coin: String,
    pub value: f64,
}

/// Cross-coin rankings
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonInsights {
    /// Highest 24h change
    pub best_performer: CoinHighlight,
    /// Lowest 24h change
    pub worst_performer: CoinHighlight,
    /// Lowest average price
    pub cheapest: CoinHighlight,
    /// Highest average price
    pub most_expensive: CoinHighlight,
    /// Highest 24h volume
    pub highest_volume: CoinHighlight,
}

/// Pick the summary whose key wins against every later one
///
/// `better(candidate, current)` must be strict so the first-seen summary is
/// kept on ties.
fn pick<'a>(
    summaries: &'a [CoinSummary],
    key: impl Fn(&CoinSummary) -> f64,
    better: impl Fn(f64, f64) -> bool,
) -> Option<CoinHighlight> {
    let mut iter = summaries.iter();
    let mut chosen: &'a CoinSummary = iter.next()?;
    for summary in iter {
        if better(key(summary), key(chosen)) {
            chosen = summary;
        }
    }
    Some(CoinHighlight {
        coin: chosen.coin.clone(),
        value: key(chosen),
    })
}

/// Rank summaries; `None` when `summaries` is empty
///
/// Absent change or volume values rank as 0.
pub fn build_insights(summaries: &[CoinSummary]) -> Option<ComparisonInsights> {
    let change = |s: &CoinSummary| s.change_percent_24h.unwrap_or(0.0);
    let volume = |s: &CoinSummary| s.volume_24h.unwrap_or(0.0);
    let price = |s: &CoinSummary| s.average_price;
    let gt = |a: f64, b: f64| a > b;
    let lt = |a: f64, b: f64| a < b;

    Some(ComparisonInsights {
        best_performer: pick(summaries, change, gt)?,
        worst_performer: pick(summaries, change, lt)?,
        cheapest: pick(summaries, price, lt)?,
        most_expensive: pick(summaries, price, gt)?,
        highest_volume: pick(summaries, volume, gt)?,
    })
}

/// Outcome of a comparison with at least one successful coin
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinComparison {
    pub fiat: String,
    pub timestamp: DateTime<Utc>,
    /// Successful coins in request order
    pub comparison: Vec<CoinSummary>,
    pub insights: ComparisonInsights,
    pub failed: Vec<CoinFailure>,
}

/// Compare `coins` against `fiat` over the aggregator's default exchanges
///
/// # Errors
/// * `InvalidRequest` - fewer than two or more than ten coins
/// * `InvalidSymbol` - the fiat symbol is malformed
/// * `ComparisonFailed` - every coin failed
pub async fn compare_coins<F: ConnectorFactory>(
    aggregator: &MultiExchangeAggregator<F>,
    coins: &[&str],
    fiat: &str,
) -> Result<CoinComparison, RateError> {
    if coins.len() < MIN_COMPARE_COINS || coins.len() > MAX_COMPARE_COINS {
        return Err(RateError::InvalidRequest(format!(
            "between {} and {} coins are required, got {}",
            MIN_COMPARE_COINS,
            MAX_COMPARE_COINS,
            coins.len()
        )));
    }
    let fiat = normalize_symbol(fiat)?;

    let outcomes = join_all(
        coins
            .iter()
            .map(|coin| aggregator.aggregate_default(coin, &fiat)),
    )
    .await;

    let mut comparison = Vec::with_capacity(coins.len());
    let mut failed = Vec::new();
    for (coin, outcome) in coins.iter().zip(outcomes) {
        let coin = coin.trim().to_uppercase();
        match outcome {
            Ok(result) => comparison.push(CoinSummary::from_aggregate(&coin, &result)),
            Err(e) => {
                warn!(coin = %coin, fiat = %fiat, error = %e, "Coin excluded from comparison");
                failed.push(CoinFailure {
                    coin,
                    reason: e.to_string(),
                });
            }
        }
    }

    let Some(insights) = build_insights(&comparison) else {
        return Err(RateError::ComparisonFailed { failures: failed });
    };

    info!(
        fiat = %fiat,
        succeeded = comparison.len(),
        requested = coins.len(),
        "Comparison complete"
    );

    Ok(CoinComparison {
        fiat,
        timestamp: Utc::now(),
        comparison,
        insights,
        failed,
    })
}
