//! The discovered-resource value type

use crate::model::ResourceKind;
use chrono::{DateTime, Utc};
use serde_json::Value;

/// An immutable object discovered during a crawl run
///
/// The `key` is unique within its kind for one run; re-discovery of the same
/// (kind, key) pair overwrites the stored payload rather than duplicating.
/// The `data` payload is retained opaquely for downstream consumers.
#[derive(Debug, Clone)]
pub struct Resource {
    /// The kind of this resource
    pub kind: ResourceKind,

    /// Kind-scoped unique identity key, e.g. "projects/my-proj-1"
    pub key: String,

    /// Identity key of the parent resource; None only for the root
    /// organization
    pub parent_key: Option<String>,

    /// Raw provider-returned payload
    pub data: Value,

    /// When this run discovered the resource
    pub discovered_at: DateTime<Utc>,
}

impl Resource {
    /// Creates a resource discovered now
    pub fn new(kind: ResourceKind, key: impl Into<String>, parent_key: Option<String>, data: Value) -> Self {
        Self {
            kind,
            key: key.into(),
            parent_key,
            data,
            discovered_at: Utc::now(),
        }
    }

    /// The dedup identity of this resource within a run
    pub fn identity(&self) -> (ResourceKind, &str) {
        (self.kind, &self.key)
    }

    /// Whether this kind can have children of its own
    pub fn is_expandable(&self) -> bool {
        !self.kind.children().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_root_has_no_parent() {
        let org = Resource::new(
            ResourceKind::Organization,
            "organizations/42",
            None,
            json!({"displayName": "acme"}),
        );
        assert!(org.parent_key.is_none());
        assert!(org.is_expandable());
    }

    #[test]
    fn test_identity_is_kind_scoped() {
        let bucket = Resource::new(ResourceKind::Bucket, "shared-name", None, json!({}));
        let dataset = Resource::new(ResourceKind::Dataset, "shared-name", None, json!({}));
        assert_ne!(bucket.identity(), dataset.identity());
    }

    #[test]
    fn test_leaf_is_not_expandable() {
        let user = Resource::new(ResourceKind::User, "alice@example.com", None, json!({}));
        assert!(!user.is_expandable());
    }
}
