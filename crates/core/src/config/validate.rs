use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Dispatch range is not inverted
/// - An API token is present when submission is enabled
/// - Debrid base URL is set
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.dispatch.end < config.dispatch.start {
        return Err(ConfigError::ValidationError(format!(
            "dispatch.end ({}) cannot be lower than dispatch.start ({})",
            config.dispatch.end, config.dispatch.start
        )));
    }

    if config.dispatch.submit && config.debrid.api_token.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "debrid.api_token is required when dispatch.submit is enabled".to_string(),
        ));
    }

    if config.debrid.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "debrid.base_url cannot be empty".to_string(),
        ));
    }

    Ok(())
}
