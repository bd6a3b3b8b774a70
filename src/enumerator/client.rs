//! HTTP client for the cloud inventory API gateway
//!
//! The gateway exposes one listing endpoint per kind:
//! `GET {base}/{kind-path}?parent={parent-key}` returning
//! `{"items": [{"id": ..., "data": {...}}]}`, and
//! `GET {base}/organizations/{id}` for the traversal root.

use crate::enumerator::{ProviderError, ProviderResult};
use crate::model::ResourceKind;
use crate::ConfigError;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// One entry from a listing response
#[derive(Debug, Clone, Deserialize)]
pub struct ApiItem {
    /// The child's identity key, e.g. "folders/123"
    pub id: String,

    /// Opaque provider payload for the child
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    items: Vec<ApiItem>,
}

/// Client for the inventory API gateway
#[derive(Debug, Clone)]
pub struct InventoryClient {
    client: Client,
    base: String,
}

impl InventoryClient {
    /// Creates a client against the given base URL
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        url::Url::parse(base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid api base url: {}", e)))?;

        let client = build_http_client()
            .map_err(|e| ConfigError::Validation(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetches the organization resource at the traversal root
    ///
    /// A failure here is fatal to the run: not-found means the organization
    /// id is wrong, unauthorized means the root credentials are.
    pub async fn get_organization(&self, organization_id: &str) -> ProviderResult<Value> {
        let url = format!("{}/organizations/{}", self.base, organization_id);
        tracing::debug!("Fetching organization: {}", url);

        let response = self.client.get(&url).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(
                status,
                ResourceKind::Organization,
                organization_id,
            ));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ProviderError::Malformed {
                detail: e.to_string(),
            })
    }

    /// Lists the direct children of `parent_key` for `kind`
    pub async fn list_children(
        &self,
        kind: ResourceKind,
        parent_key: &str,
    ) -> ProviderResult<Vec<ApiItem>> {
        let url = format!("{}/{}", self.base, kind.api_path());
        tracing::trace!("Listing {} under {}", kind, parent_key);

        let response = self
            .client
            .get(&url)
            .query(&[("parent", parent_key)])
            .send()
            .await
            .map_err(transport)?;

        read_listing(response, kind, parent_key).await
    }

    /// The normalized base URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.base
    }
}

/// Builds the HTTP client both API clients share
pub(crate) fn build_http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(concat!("orgtrawl/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .build()
}

/// Parses a listing response body, classifying non-success statuses
pub(crate) async fn read_listing(
    response: Response,
    kind: ResourceKind,
    parent_key: &str,
) -> ProviderResult<Vec<ApiItem>> {
    let status = response.status();
    if !status.is_success() {
        return Err(classify_status(status, kind, parent_key));
    }

    let listing: ListResponse = response.json().await.map_err(|e| ProviderError::Malformed {
        detail: format!("listing {} under {}: {}", kind, parent_key, e),
    })?;

    Ok(listing.items)
}

/// Maps an HTTP status onto the provider error taxonomy
pub(crate) fn classify_status(
    status: StatusCode,
    kind: ResourceKind,
    parent: &str,
) -> ProviderError {
    let parent = parent.to_string();
    match status {
        StatusCode::FORBIDDEN => ProviderError::PermissionDenied { kind, parent },
        StatusCode::NOT_FOUND => ProviderError::NotFound { kind, parent },
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited { kind, parent },
        StatusCode::UNAUTHORIZED => ProviderError::Unauthorized {
            detail: format!("listing {} under {}", kind, parent),
        },
        other => ProviderError::Http {
            status: other.as_u16(),
            detail: format!("listing {} under {}", kind, parent),
        },
    }
}

fn transport(e: reqwest::Error) -> ProviderError {
    ProviderError::Transport {
        detail: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_bad_url() {
        assert!(InventoryClient::new("not a url").is_err());
    }

    #[test]
    fn test_base_is_normalized() {
        let client = InventoryClient::new("https://inventory.example.com/").unwrap();
        assert_eq!(client.base_url(), "https://inventory.example.com");
    }

    #[test]
    fn test_status_classification() {
        let kind = ResourceKind::Bucket;
        assert!(matches!(
            classify_status(StatusCode::FORBIDDEN, kind, "p"),
            ProviderError::PermissionDenied { .. }
        ));
        assert!(matches!(
            classify_status(StatusCode::NOT_FOUND, kind, "p"),
            ProviderError::NotFound { .. }
        ));
        assert!(matches!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, kind, "p"),
            ProviderError::RateLimited { .. }
        ));
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, kind, "p"),
            ProviderError::Unauthorized { .. }
        ));
        assert!(matches!(
            classify_status(StatusCode::INTERNAL_SERVER_ERROR, kind, "p"),
            ProviderError::Http { status: 500, .. }
        ));
    }

    #[test]
    fn test_api_item_data_defaults_to_null() {
        let item: ApiItem = serde_json::from_str(r#"{"id": "folders/1"}"#).unwrap();
        assert_eq!(item.id, "folders/1");
        assert!(item.data.is_null());
    }
}
