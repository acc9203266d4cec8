//! Arbitrage classification
//!
//! Pure policy over an `AggregateResult`: no I/O, no clock, no state. A
//! spread strictly above the threshold becomes an `ArbitrageSignal`; anything
//! else is `None`, which is an expected outcome rather than an error.

use serde::{Deserialize, Serialize};

use crate::config::ArbitrageConfig;
use crate::core::aggregator::AggregateResult;

/// Spread percentage that must be exceeded by default (0.1%)
pub const DEFAULT_THRESHOLD_PERCENT: f64 = 0.1;

/// Buy-low / sell-high opportunity across two exchanges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArbitrageSignal {
    /// Exchange with the lowest price
    pub buy_on: String,
    /// Exchange with the highest price
    pub sell_on: String,
    pub buy_price: f64,
    pub sell_price: f64,
    pub spread_percent: f64,
    pub spread_amount: f64,
}

impl ArbitrageSignal {
    /// One-line human-readable summary
    pub fn message(&self) -> String {
        format!(
            "Arbitrage opportunity: Buy on {}, sell on {} for {:.2}% profit",
            self.buy_on, self.sell_on, self.spread_percent
        )
    }
}

/// Threshold-based classifier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArbitrageClassifier {
    threshold_percent: f64,
}

impl Default for ArbitrageClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD_PERCENT)
    }
}

impl ArbitrageClassifier {
    pub fn new(threshold_percent: f64) -> Self {
        Self { threshold_percent }
    }

    pub fn from_config(config: &ArbitrageConfig) -> Self {
        Self::new(config.threshold_percent)
    }

    pub fn threshold_percent(&self) -> f64 {
        self.threshold_percent
    }

    /// Signal when the spread is strictly above the threshold
    #[must_use]
    pub fn classify(&self, result: &AggregateResult) -> Option<ArbitrageSignal> {
        detect_arbitrage(result, self.threshold_percent)
    }
}

/// Free-function form of `ArbitrageClassifier::classify`
#[must_use]
pub fn detect_arbitrage(result: &AggregateResult, threshold_percent: f64) -> Option<ArbitrageSignal> {
    if result.price_spread_percent > threshold_percent {
        Some(ArbitrageSignal {
            buy_on: result.best_price.exchange.clone(),
            sell_on: result.worst_price.exchange.clone(),
            buy_price: result.best_price.price,
            sell_price: result.worst_price.price,
            spread_percent: result.price_spread_percent,
            spread_amount: result.price_spread,
        })
    } else {
        None
    }
}
