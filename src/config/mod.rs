//! Configuration module for orgtrawl
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use orgtrawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("orgtrawl.toml")).unwrap();
//! println!("Crawling organization: {}", config.provider.organization_id);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, ProviderConfig, StorageChoice};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
