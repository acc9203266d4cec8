//! YAML configuration loading
//!
//! Parsing and validation share one path whether the YAML comes from a file
//! or a string; a document that parses but fails validation is rejected.

use std::path::Path;

use crate::error::AppError;

use super::types::AppConfig;

fn parse_and_validate(yaml: &str, origin: Option<&Path>) -> Result<AppConfig, AppError> {
    let config: AppConfig = serde_yaml::from_str(yaml).map_err(|e| match origin {
        Some(path) => AppError::Config(format!("YAML parse error in '{}': {}", path.display(), e)),
        None => AppError::Config(format!("YAML parse error: {}", e)),
    })?;
    config.validate()?;
    Ok(config)
}

/// Read, parse and validate the YAML file at `path`
///
/// # Errors
/// `AppError::Config` when the file is missing, malformed or invalid;
/// `AppError::Io` when it cannot be read.
///
/// ```ignore
/// let config = rate_aggregator::config::load_config(std::path::Path::new("config.yaml"))?;
/// let aggregator = MultiExchangeAggregator::live(config.exchanges);
/// ```
pub fn load_config(path: &Path) -> Result<AppConfig, AppError> {
    if !path.is_file() {
        return Err(AppError::Config(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }
    let yaml = std::fs::read_to_string(path)?;
    let config = parse_and_validate(&yaml, Some(path))?;
    tracing::debug!(path = %path.display(), "Configuration file parsed");
    Ok(config)
}

/// Parse and validate YAML held in memory
pub fn load_config_from_str(yaml_content: &str) -> Result<AppConfig, AppError> {
    parse_and_validate(yaml_content, None)
}

/// Load `path` if it exists, otherwise fall back to built-in defaults
///
/// A file that exists but fails to parse or validate is still an error.
pub fn load_config_or_default(path: &Path) -> Result<AppConfig, AppError> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::info!(path = %path.display(), "No configuration file, using defaults");
        Ok(AppConfig::default())
    }
}

// ============================================================================
// Tests
// ============================================================================
