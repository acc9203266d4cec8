//! Core module - rate fetching, aggregation, arbitrage, comparison, history
//!
//! This module uses **explicit re-exports** instead of glob exports (`pub use module::*`)
//! to provide better API visibility and prevent accidental public API changes.
//!
//! ## Usage
//! Prefer importing from `crate::core`:
//! ```ignore
//! use crate::core::{MultiExchangeAggregator, ArbitrageClassifier, RateReport};
//! ```

pub mod aggregator;
pub mod arbitrage;
pub mod comparison;
pub mod fetcher;
pub mod history;
pub mod quote;
pub mod report;

// Explicit re-exports for quote module
pub use quote::TickerQuote;

// Explicit re-exports for fetcher module
pub use fetcher::{get_exchange_rate, normalize_symbol, RateFetcher};

// Explicit re-exports for aggregator module
pub use aggregator::{get_multi_exchange_rate, summarize, AggregateResult, MultiExchangeAggregator};

// Explicit re-exports for arbitrage module
pub use arbitrage::{detect_arbitrage, ArbitrageClassifier, ArbitrageSignal, DEFAULT_THRESHOLD_PERCENT};

// Explicit re-exports for comparison module
pub use comparison::{
    build_insights, compare_coins, CoinComparison, CoinHighlight, CoinSummary, ComparisonInsights,
};

// Explicit re-exports for history module
pub use history::{
    Candle, CandleSeries, HistoryService, Timeframe, DEFAULT_HISTORY_LIMIT, MAX_KRAKEN_CANDLES,
};

// Explicit re-exports for report module
pub use report::{ArbitrageReport, FailureReport, PriceLine, PricePoint, RateReport, SuccessReport};
