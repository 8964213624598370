use crate::config::types::{AppConfig, CrawlerConfig, ServerConfig};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    validate_server_config(&config.server)?;
    validate_crawler_config(&config.crawler)?;

    if config.urls_file.is_empty() {
        return Err(ConfigError::Validation(
            "urls_file cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    if config.host.is_empty() {
        return Err(ConfigError::Validation("host cannot be empty".to_string()));
    }

    if config.port == 0 {
        return Err(ConfigError::Validation("port must be >= 1".to_string()));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.timeout_seconds < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_seconds must be >= 1, got {}",
            config.timeout_seconds
        )));
    }

    if config.max_retries < 1 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be >= 1, got {}",
            config.max_retries
        )));
    }

    if config.pool_workers < 1 || config.pool_workers > 256 {
        return Err(ConfigError::Validation(format!(
            "pool_workers must be between 1 and 256, got {}",
            config.pool_workers
        )));
    }

    if config.concurrent_limit < 1 || config.concurrent_limit > 1000 {
        return Err(ConfigError::Validation(format!(
            "concurrent_limit must be between 1 and 1000, got {}",
            config.concurrent_limit
        )));
    }

    if config.per_host_limit < 1 {
        return Err(ConfigError::Validation(format!(
            "per_host_limit must be >= 1, got {}",
            config.per_host_limit
        )));
    }

    if config.strategies.is_empty() {
        return Err(ConfigError::Validation(
            "at least one strategy must be enabled".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}
