use crate::config::types::{Config, CrawlerConfig, OutputConfig, ProviderConfig, StorageChoice};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_provider_config(&config.provider)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_enumerations < 1 || config.max_concurrent_enumerations > 128 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_enumerations must be between 1 and 128, got {}",
            config.max_concurrent_enumerations
        )));
    }

    if config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be <= 10, got {}",
            config.max_retries
        )));
    }

    if config.retry_base_delay_ms < 10 {
        return Err(ConfigError::Validation(format!(
            "retry_base_delay_ms must be >= 10ms, got {}ms",
            config.retry_base_delay_ms
        )));
    }

    Ok(())
}

/// Validates provider and directory-service configuration
fn validate_provider_config(config: &ProviderConfig) -> Result<(), ConfigError> {
    let base = Url::parse(&config.api_base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid api_base_url: {}", e)))?;

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "api_base_url must be http(s), got scheme '{}'",
            base.scheme()
        )));
    }

    if config.directory_credentials_path.is_empty() {
        return Err(ConfigError::Validation(
            "directory_credentials_path cannot be empty".to_string(),
        ));
    }

    validate_email(&config.admin_email)?;

    if config.organization_id.is_empty()
        || !config.organization_id.chars().all(|c| c.is_ascii_digit())
    {
        return Err(ConfigError::Validation(format!(
            "organization_id must be a non-empty numeric id, got '{}'",
            config.organization_id
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.storage == StorageChoice::Sqlite && config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty when storage = \"sqlite\"".to_string(),
        ));
    }

    Ok(())
}

/// Basic email shape check: one '@', non-empty local part and domain with a dot
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");

    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "admin_email '{}' is not a valid email address",
            email
        )));
    }

    Ok(())
}
