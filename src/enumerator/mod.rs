//! Enumerator adapters: one per resource kind
//!
//! An enumerator, given a parent resource, produces that kind's direct
//! children as discovered from the live environment. Cloud kinds go through
//! the inventory API gateway; directory kinds (groups, users, members) go
//! through the directory service with its own credentials. The crawler
//! consumes enumerators purely through the [`Enumerator`] trait and the
//! kind-keyed [`EnumeratorRegistry`].

mod adapters;
mod client;
mod directory;

pub use adapters::{ApiEnumerator, DirectoryEnumerator};
pub use client::{ApiItem, InventoryClient};
pub use directory::{DirectoryClient, DirectoryCredentials};

use crate::model::{Resource, ResourceKind};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by enumerator adapters
///
/// All variants are recoverable per-branch: the crawler reports them to the
/// progresser and continues with sibling subtrees. Only a failure fetching
/// the traversal root is fatal to a run.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Permission denied listing {kind} under {parent}")]
    PermissionDenied { kind: ResourceKind, parent: String },

    #[error("Not found: {kind} listing under {parent}")]
    NotFound { kind: ResourceKind, parent: String },

    #[error("Rate limited listing {kind} under {parent}")]
    RateLimited { kind: ResourceKind, parent: String },

    #[error("Unauthorized: {detail}")]
    Unauthorized { detail: String },

    #[error("Provider returned HTTP {status}: {detail}")]
    Http { status: u16, detail: String },

    #[error("Transport error: {detail}")]
    Transport { detail: String },

    #[error("Malformed provider response: {detail}")]
    Malformed { detail: String },
}

impl ProviderError {
    /// Whether retrying the same call may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Transport { .. } => true,
            Self::Http { status, .. } => (500..=599).contains(status),
            _ => false,
        }
    }
}

/// Result type for enumerator operations
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Adapter producing one resource kind's direct children of a parent
#[async_trait]
pub trait Enumerator: Send + Sync {
    /// The kind this adapter enumerates
    fn kind(&self) -> ResourceKind;

    /// Lists the direct children of `parent` for this adapter's kind
    async fn enumerate(&self, parent: &Resource) -> ProviderResult<Vec<Resource>>;
}

/// Kind-keyed set of enumerator adapters
///
/// Holds one adapter per enumerable kind. The root organization is fetched
/// directly by the crawler and has no adapter.
pub struct EnumeratorRegistry {
    by_kind: HashMap<ResourceKind, Arc<dyn Enumerator>>,
}

impl EnumeratorRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self {
            by_kind: HashMap::new(),
        }
    }

    /// Builds the full adapter set for a provider: API adapters for cloud
    /// kinds, directory adapters for group/user/member kinds
    pub fn for_provider(inventory: InventoryClient, directory: DirectoryClient) -> Self {
        let mut registry = Self::new();
        for kind in ResourceKind::ALL {
            if kind == ResourceKind::Organization {
                continue;
            }
            if kind.is_directory_kind() {
                registry.register(Arc::new(DirectoryEnumerator::new(kind, directory.clone())));
            } else {
                registry.register(Arc::new(ApiEnumerator::new(kind, inventory.clone())));
            }
        }
        registry
    }

    /// Registers an adapter, replacing any existing one for its kind
    pub fn register(&mut self, enumerator: Arc<dyn Enumerator>) {
        self.by_kind.insert(enumerator.kind(), enumerator);
    }

    /// Looks up the adapter for a kind
    pub fn get(&self, kind: ResourceKind) -> Option<&Arc<dyn Enumerator>> {
        self.by_kind.get(&kind)
    }

    /// Number of registered adapters
    pub fn len(&self) -> usize {
        self.by_kind.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.by_kind.is_empty()
    }
}

impl Default for EnumeratorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        let rate_limited = ProviderError::RateLimited {
            kind: ResourceKind::Bucket,
            parent: "projects/p1".to_string(),
        };
        assert!(rate_limited.is_retryable());

        let server_error = ProviderError::Http {
            status: 503,
            detail: "unavailable".to_string(),
        };
        assert!(server_error.is_retryable());

        let denied = ProviderError::PermissionDenied {
            kind: ResourceKind::Bucket,
            parent: "projects/p1".to_string(),
        };
        assert!(!denied.is_retryable());

        let client_error = ProviderError::Http {
            status: 400,
            detail: "bad request".to_string(),
        };
        assert!(!client_error.is_retryable());
    }

    #[test]
    fn test_full_registry_covers_every_enumerable_kind() {
        let inventory = InventoryClient::new("https://inventory.example.com").unwrap();
        let directory = DirectoryClient::new(
            "https://inventory.example.com",
            DirectoryCredentials {
                token: "t".to_string(),
                admin_email: "a@example.com".to_string(),
            },
        )
        .unwrap();

        let registry = EnumeratorRegistry::for_provider(inventory, directory);
        for kind in ResourceKind::ALL {
            if kind == ResourceKind::Organization {
                assert!(registry.get(kind).is_none());
            } else {
                assert!(registry.get(kind).is_some(), "missing adapter for {}", kind);
            }
        }
        assert_eq!(registry.len(), ResourceKind::ALL.len() - 1);
    }
}
