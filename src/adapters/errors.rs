//! Exchange connector error types
//!
//! All connector-level failures are wrapped in `ExchangeError`. The rate
//! fetcher relies on `PairNotListed` being distinguishable from transport
//! and parsing failures.

use thiserror::Error;

/// Connector-specific error types for ticker and candle requests
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExchangeError {
    /// The exchange does not list the requested trading pair
    #[error("{exchange} does not list {pair}")]
    PairNotListed { exchange: String, pair: String },

    /// Request did not complete in time
    #[error("Network timeout after {0}ms")]
    NetworkTimeout(u64),

    /// Could not reach the exchange
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Invalid or unexpected response from exchange
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Exchange answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl ExchangeError {
    /// True when the failure means "try another quote currency" rather than
    /// "the exchange is unhealthy"
    pub fn is_pair_not_listed(&self) -> bool {
        matches!(self, ExchangeError::PairNotListed { .. })
    }

    /// Stamp a transport timeout with the configured bound
    ///
    /// `reqwest` does not report which limit fired, so timeouts converted
    /// from it carry 0 until the connector fills in its own value.
    pub fn with_timeout_ms(self, timeout_ms: u64) -> Self {
        match self {
            ExchangeError::NetworkTimeout(_) => ExchangeError::NetworkTimeout(timeout_ms),
            other => other,
        }
    }
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ExchangeError::NetworkTimeout(0)
        } else if err.is_decode() {
            ExchangeError::InvalidResponse(err.to_string())
        } else {
            ExchangeError::ConnectionFailed(err.to_string())
        }
    }
}

/// Result type alias for exchange operations
pub type ExchangeResult<T> = std::result::Result<T, ExchangeError>;
