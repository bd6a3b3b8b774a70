//! Orgtrawl: a cloud organization inventory crawler
//!
//! This crate walks a cloud provider's organization hierarchy
//! (organization -> folders -> projects -> per-project resources, plus
//! directory-service groups and users), discovers every live object exactly
//! once per run, and streams each discovered resource through a pluggable
//! storage sink while reporting progress to an observer.

pub mod config;
pub mod crawler;
pub mod enumerator;
pub mod model;
pub mod progress;
pub mod storage;
pub mod template;

use thiserror::Error;

/// Main error type for orgtrawl operations
///
/// Per-branch provider failures are reported to the progresser and swallowed
/// inside the crawler; only errors fatal to the whole run surface here.
#[derive(Debug, Error)]
pub enum TrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Provider error at traversal root: {0}")]
    Root(#[from] enumerator::ProviderError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("No value supplied for template placeholder '{0}'")]
    MissingPlaceholder(String),

    #[error("Unbalanced braces in template at offset {0}")]
    MalformedTemplate(usize),

    #[error("No enumerator registered for kind {0}")]
    UnknownKind(String),
}

/// Directory-credential errors, fatal to a crawl run
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Failed to read credential file {path}: {source}")]
    Unreadable {
        path: String,
        source: std::io::Error,
    },

    #[error("Malformed credential file {path}: {reason}")]
    Malformed { path: String, reason: String },

    #[error("Admin email must not be empty")]
    MissingAdminEmail,
}

/// Result type alias for orgtrawl operations
pub type Result<T> = std::result::Result<T, TrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawler, CrawlOptions};
pub use enumerator::{DirectoryCredentials, InventoryClient, ProviderError};
pub use model::{Resource, ResourceKind};
pub use progress::{LogProgresser, NullProgresser, Progresser, ProgressSummary};
pub use storage::{MemoryStorage, SqliteStorage, Storage};
