//! Storage trait and error types

use crate::model::{Resource, ResourceKind};
use std::collections::BTreeSet;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Payload serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Stored row is corrupt: {0}")]
    Corrupt(String),

    #[error("Session already closed")]
    SessionClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for inventory storage backends
///
/// A `Storage` value is one open write session. Writes are upserts keyed by
/// (kind, identity key): writing the same key twice replaces the payload and
/// never duplicates. The crawler depends only on this trait; which backend a
/// session uses is decided by configuration.
pub trait Storage: Send {
    /// Upserts a resource into the session, keyed by (kind, key)
    fn write(&mut self, resource: &Resource) -> StorageResult<()>;

    /// Produces a finite sequence of stored resources, optionally filtered
    /// by kind
    ///
    /// The sequence is a snapshot of the session at call time; it is only
    /// restartable by calling `iterate` again.
    fn iterate(
        &self,
        kind: Option<ResourceKind>,
    ) -> StorageResult<Box<dyn Iterator<Item = Resource> + '_>>;

    /// Counts stored resources, optionally filtered by kind
    fn count(&self, kind: Option<ResourceKind>) -> StorageResult<u64>;

    /// The distinct set of kinds present in the session
    fn kinds(&self) -> StorageResult<BTreeSet<ResourceKind>>;

    /// Makes the session's writes durable
    ///
    /// A no-op for the in-memory backend, where everything is already
    /// visible.
    fn commit(&mut self) -> StorageResult<()>;

    /// Discards the session's writes, leaving the backing store unchanged
    /// from its pre-session state
    fn rollback(&mut self) -> StorageResult<()>;
}
