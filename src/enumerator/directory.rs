//! Directory-service client and credentials
//!
//! Groups, users, and group members come from the directory service rather
//! than the cloud inventory API. Directory calls are authenticated with a
//! bearer token from a credential file and performed on behalf of an admin
//! email. The wire shape mirrors the inventory gateway's listing endpoint.

use crate::enumerator::client::{build_http_client, read_listing};
use crate::enumerator::{ApiItem, ProviderError, ProviderResult};
use crate::model::ResourceKind;
use crate::{AuthError, ConfigError};
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;

/// Credentials for the directory service
#[derive(Debug, Clone)]
pub struct DirectoryCredentials {
    /// Bearer token from the credential file
    pub token: String,

    /// Admin email directory queries are made as
    pub admin_email: String,
}

#[derive(Debug, Deserialize)]
struct CredentialFile {
    token: Option<String>,
}

impl DirectoryCredentials {
    /// Loads credentials from a JSON credential file
    ///
    /// Fails fast: a missing or malformed file, or an empty admin email, is
    /// fatal to the run before any enumeration starts.
    pub fn load(path: &Path, admin_email: &str) -> Result<Self, AuthError> {
        if admin_email.is_empty() {
            return Err(AuthError::MissingAdminEmail);
        }

        let content = std::fs::read_to_string(path).map_err(|e| AuthError::Unreadable {
            path: path.display().to_string(),
            source: e,
        })?;

        let parsed: CredentialFile =
            serde_json::from_str(&content).map_err(|e| AuthError::Malformed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let token = parsed
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuthError::Malformed {
                path: path.display().to_string(),
                reason: "missing 'token' field".to_string(),
            })?;

        Ok(Self {
            token,
            admin_email: admin_email.to_string(),
        })
    }
}

/// Client for the directory service
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    client: Client,
    base: String,
    credentials: DirectoryCredentials,
}

impl DirectoryClient {
    /// Creates a directory client against the given base URL
    pub fn new(base_url: &str, credentials: DirectoryCredentials) -> Result<Self, ConfigError> {
        url::Url::parse(base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid directory base url: {}", e)))?;

        let client = build_http_client()
            .map_err(|e| ConfigError::Validation(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    /// Lists the direct children of `parent_key` for a directory kind
    pub async fn list_children(
        &self,
        kind: ResourceKind,
        parent_key: &str,
    ) -> ProviderResult<Vec<ApiItem>> {
        let url = format!("{}/{}", self.base, kind.api_path());
        tracing::trace!("Directory listing {} under {}", kind, parent_key);

        let response = self
            .client
            .get(&url)
            .query(&[("parent", parent_key)])
            .bearer_auth(&self.credentials.token)
            .header("x-admin-email", &self.credentials.admin_email)
            .send()
            .await
            .map_err(|e| ProviderError::Transport {
                detail: e.to_string(),
            })?;

        read_listing(response, kind, parent_key).await
    }
}
