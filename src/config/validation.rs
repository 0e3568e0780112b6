use crate::config::types::{ApiConfig, AuditConfig, Config, OutputConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_api_config(&config.api)?;
    validate_audit_config(&config.audit)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates API connection settings
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if config.max_rate_limit < 1 {
        return Err(ConfigError::Validation(format!(
            "max-rate-limit must be >= 1, got {}",
            config.max_rate_limit
        )));
    }

    if config.min_read_timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "min-read-timeout must be >= 1 second, got {}",
            config.min_read_timeout
        )));
    }

    if config.remaining_header.trim().is_empty() || config.cost_header.trim().is_empty() {
        return Err(ConfigError::Validation(
            "rate-limit header names cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates course selection settings
fn validate_audit_config(config: &AuditConfig) -> Result<(), ConfigError> {
    if config.term_prefix.is_empty() {
        return Err(ConfigError::Validation(
            "term-prefix cannot be empty".to_string(),
        ));
    }

    if config.target_state.is_empty() {
        return Err(ConfigError::Validation(
            "target-state cannot be empty".to_string(),
        ));
    }

    if config.front_page_view.is_empty() {
        return Err(ConfigError::Validation(
            "front-page-view cannot be empty".to_string(),
        ));
    }

    if config.page_size < 1 || config.page_size > 100 {
        return Err(ConfigError::Validation(format!(
            "page-size must be between 1 and 100, got {}",
            config.page_size
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.report_path.is_empty() {
        return Err(ConfigError::Validation(
            "report-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
