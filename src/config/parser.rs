use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;

    let config: Config = toml::from_str(&content)?;

    validate(&config)?;

    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// The hash is recorded against each crawl run so that stored inventory can
/// be traced back to the exact configuration that produced it.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageChoice;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const VALID_CONFIG: &str = r#"
[crawler]
max-concurrent-enumerations = 8
max-retries = 2
retry-base-delay-ms = 100

[provider]
api-base-url = "https://inventory.example.com"
directory-credentials-path = "/etc/orgtrawl/directory.json"
admin-email = "admin@example.com"
organization-id = "660570133860"

[output]
storage = "sqlite"
database-path = "./inventory.db"
"#;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let file = write_config(VALID_CONFIG);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.max_concurrent_enumerations, 8);
        assert_eq!(config.crawler.max_retries, 2);
        assert_eq!(config.provider.organization_id, "660570133860");
        assert_eq!(config.output.storage, StorageChoice::Sqlite);
    }

    #[test]
    fn test_retry_defaults() {
        let content = VALID_CONFIG
            .replace("max-retries = 2\n", "")
            .replace("retry-base-delay-ms = 100\n", "");
        let file = write_config(&content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.max_retries, 3);
        assert_eq!(config.crawler.retry_base_delay_ms, 250);
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config(Path::new("/nonexistent/orgtrawl.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_malformed_toml() {
        let file = write_config("[crawler\nmax-concurrent-enumerations = 8");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_config_hash_is_stable() {
        let file = write_config(VALID_CONFIG);
        let first = compute_config_hash(file.path()).unwrap();
        let second = compute_config_hash(file.path()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn test_config_hash_changes_with_content() {
        let a = write_config(VALID_CONFIG);
        let b = write_config(&VALID_CONFIG.replace("660570133860", "123"));
        assert_ne!(
            compute_config_hash(a.path()).unwrap(),
            compute_config_hash(b.path()).unwrap()
        );
    }
}
