//! Application constants and configuration defaults
//!
//! Values can be overridden via environment variables; the YAML config
//! overrides these in turn where it has a matching field.

use std::time::Duration;

// =============================================================================
// Fetch Configuration
// =============================================================================

/// Per-exchange fetch timeout (default: 10 seconds)
///
/// Environment variable: `RATE_FETCH_TIMEOUT_MS`
pub fn rate_fetch_timeout_ms() -> u64 {
    std::env::var("RATE_FETCH_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(10_000)
}

/// Per-exchange fetch timeout as a `Duration`
pub fn rate_fetch_timeout() -> Duration {
    Duration::from_millis(rate_fetch_timeout_ms())
}

/// Optional Binance API key (raises rate limits, not required)
///
/// Environment variable: `BINANCE_API_KEY`
pub fn binance_api_key() -> Option<String> {
    std::env::var("BINANCE_API_KEY")
        .ok()
        .filter(|key| !key.trim().is_empty())
}

/// Endpoint override for a connector, e.g. `KRAKEN_BASE_URL`
pub fn base_url_override(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|url| !url.trim().is_empty())
}

// =============================================================================
// Arbitrage & Comparison
// =============================================================================

/// Spread above which an arbitrage signal is raised (default: 0.1%)
///
/// Environment variable: `ARBITRAGE_THRESHOLD_PERCENT`
pub fn arbitrage_threshold_percent() -> f64 {
    std::env::var("ARBITRAGE_THRESHOLD_PERCENT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0.1)
}

/// Minimum coins in a comparison
pub const MIN_COMPARE_COINS: usize = 2;
/// Maximum coins in a comparison
pub const MAX_COMPARE_COINS: usize = 10;

// =============================================================================
// Helper Functions
// =============================================================================

/// Print all configuration values (for debugging/startup logs)
pub fn log_configuration() {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("  - Rate fetch timeout: {}ms", rate_fetch_timeout_ms());
    tracing::info!("  - Arbitrage threshold: {}%", arbitrage_threshold_percent());
    tracing::info!("  - Binance API key set: {}", binance_api_key().is_some());
    tracing::info!("==================================");
}
