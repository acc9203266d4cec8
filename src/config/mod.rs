//! Configuration module
//!
//! This module provides:
//! - Configuration types (`AppConfig`, `ExchangesConfig`, `ArbitrageConfig`)
//! - YAML loading functionality (`load_config`)
//! - Application constants with environment variable overrides
//! - Logging initialization

pub mod constants;
mod loader;
pub mod logging;
mod types;

// Re-export types
pub use types::{AppConfig, ArbitrageConfig, ExchangeOverride, ExchangesConfig};

// Re-export loader functions
pub use loader::{load_config, load_config_from_str, load_config_or_default};
