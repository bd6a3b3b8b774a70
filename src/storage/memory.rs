//! In-memory storage backend
//!
//! A keyed mapping from (kind, identity key) to resource. Used by tests and
//! dry runs; nothing survives the process. Commit and rollback are no-ops
//! since every write is immediately visible.

use crate::model::{Resource, ResourceKind};
use crate::storage::traits::{Storage, StorageResult};
use std::collections::{BTreeSet, HashMap};

/// In-memory scratch store
#[derive(Debug, Default)]
pub struct MemoryStorage {
    mem: HashMap<(ResourceKind, String), Resource>,
}

impl MemoryStorage {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored resources
    pub fn len(&self) -> usize {
        self.mem.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.mem.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn write(&mut self, resource: &Resource) -> StorageResult<()> {
        self.mem
            .insert((resource.kind, resource.key.clone()), resource.clone());
        Ok(())
    }

    fn iterate(
        &self,
        kind: Option<ResourceKind>,
    ) -> StorageResult<Box<dyn Iterator<Item = Resource> + '_>> {
        Ok(Box::new(
            self.mem
                .values()
                .filter(move |r| kind.map_or(true, |k| r.kind == k))
                .cloned(),
        ))
    }

    fn count(&self, kind: Option<ResourceKind>) -> StorageResult<u64> {
        Ok(match kind {
            None => self.mem.len() as u64,
            Some(k) => self.mem.keys().filter(|(kind, _)| *kind == k).count() as u64,
        })
    }

    fn kinds(&self) -> StorageResult<BTreeSet<ResourceKind>> {
        Ok(self.mem.keys().map(|(kind, _)| *kind).collect())
    }

    fn commit(&mut self) -> StorageResult<()> {
        Ok(())
    }

    fn rollback(&mut self) -> StorageResult<()> {
        Ok(())
    }
}
