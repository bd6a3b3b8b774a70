use serde::Deserialize;

/// Main configuration structure for orgtrawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub provider: ProviderConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of enumerator calls in flight at once
    #[serde(rename = "max-concurrent-enumerations")]
    pub max_concurrent_enumerations: u32,

    /// Retry attempts for rate-limited or transient enumeration failures
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay for exponential retry backoff (milliseconds)
    #[serde(rename = "retry-base-delay-ms", default = "default_retry_delay")]
    pub retry_base_delay_ms: u64,
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    250
}

/// Provider and directory-service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the inventory API gateway
    #[serde(rename = "api-base-url")]
    pub api_base_url: String,

    /// Path to the directory-service credential file (JSON)
    #[serde(rename = "directory-credentials-path")]
    pub directory_credentials_path: String,

    /// Admin email the directory service is queried as
    #[serde(rename = "admin-email")]
    pub admin_email: String,

    /// The organization id at the traversal root
    #[serde(rename = "organization-id")]
    pub organization_id: String,
}

/// Storage backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageChoice {
    /// In-memory scratch store; nothing survives the process
    Memory,
    /// Durable SQLite store with all-or-nothing sessions
    Sqlite,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Which storage backend a crawl writes into
    pub storage: StorageChoice,

    /// Path to the SQLite database file (required when storage = "sqlite")
    #[serde(rename = "database-path", default)]
    pub database_path: String,
}
