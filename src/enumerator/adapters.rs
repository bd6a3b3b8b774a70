//! Enumerator adapters over the inventory and directory clients
//!
//! Both adapters are generic over kind: the wire call is identical per kind,
//! only the path segment and (for directory kinds) the auth differ.

use crate::enumerator::{
    ApiItem, DirectoryClient, Enumerator, InventoryClient, ProviderResult,
};
use crate::model::{Resource, ResourceKind};
use async_trait::async_trait;

fn to_resources(kind: ResourceKind, parent: &Resource, items: Vec<ApiItem>) -> Vec<Resource> {
    items
        .into_iter()
        .map(|item| Resource::new(kind, item.id, Some(parent.key.clone()), item.data))
        .collect()
}

/// Enumerates one cloud kind through the inventory API gateway
pub struct ApiEnumerator {
    kind: ResourceKind,
    client: InventoryClient,
}

impl ApiEnumerator {
    pub fn new(kind: ResourceKind, client: InventoryClient) -> Self {
        debug_assert!(!kind.is_directory_kind());
        Self { kind, client }
    }
}

#[async_trait]
impl Enumerator for ApiEnumerator {
    fn kind(&self) -> ResourceKind {
        self.kind
    }

    async fn enumerate(&self, parent: &Resource) -> ProviderResult<Vec<Resource>> {
        let items = self.client.list_children(self.kind, &parent.key).await?;
        Ok(to_resources(self.kind, parent, items))
    }
}

/// Enumerates one directory kind through the directory service
pub struct DirectoryEnumerator {
    kind: ResourceKind,
    client: DirectoryClient,
}

impl DirectoryEnumerator {
    pub fn new(kind: ResourceKind, client: DirectoryClient) -> Self {
        debug_assert!(kind.is_directory_kind());
        Self { kind, client }
    }
}

#[async_trait]
impl Enumerator for DirectoryEnumerator {
    fn kind(&self) -> ResourceKind {
        self.kind
    }

    async fn enumerate(&self, parent: &Resource) -> ProviderResult<Vec<Resource>> {
        let items = self.client.list_children(self.kind, &parent.key).await?;
        Ok(to_resources(self.kind, parent, items))
    }
}
