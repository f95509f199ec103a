use super::{types::Config, AuthMethod, ConfigError};

/// Validate configuration beyond what serde enforces.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(invalid("server.port cannot be 0"));
    }

    if matches!(config.auth.method, AuthMethod::ApiKey)
        && config.auth.api_key.as_deref().unwrap_or("").is_empty()
    {
        return Err(invalid("auth.api_key must be set when auth.method = \"api_key\""));
    }

    if config.origin.base_url.trim().is_empty() {
        return Err(invalid("origin.base_url cannot be empty"));
    }
    if config.origin.resolver_url.trim().is_empty() {
        return Err(invalid("origin.resolver_url cannot be empty"));
    }

    if config.downloader.max_parallel == 0 {
        return Err(invalid("downloader.max_parallel must be at least 1"));
    }

    if config.pipeline.max_entries_per_check == 0 {
        return Err(invalid("pipeline.max_entries_per_check must be at least 1"));
    }

    if let Some(telegram) = &config.telegram {
        if telegram.bot_token.trim().is_empty() {
            return Err(invalid("telegram.bot_token cannot be empty"));
        }
    }

    Ok(())
}

fn invalid(msg: &str) -> ConfigError {
    ConfigError::ValidationError(msg.to_string())
}
