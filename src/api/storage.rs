//! Blob-backed comment store
//!
//! Each comment is one block blob in the configured container: the blob name
//! is the comment name, the blob body is the comment text as UTF-8. The
//! container is created lazily before uploads and listings.

use std::sync::Arc;

use reqwest::StatusCode;
use serde::Deserialize;

use crate::auth::{self, CredentialCache};
use crate::config::{AzureAdConfig, StorageConfig};
use crate::error::{Error, Result};
use crate::models::Comment;

/// Blob REST API version sent with every request.
const API_VERSION: &str = "2023-11-03";

/// Scope for storage data-plane tokens.
const STORAGE_SCOPE: &str = "https://storage.azure.com/.default";

const SERVICE: &str = "blob storage";

pub struct CommentStore {
    http: reqwest::Client,
    credentials: Arc<CredentialCache>,
    tenant_id: String,
    client_id: String,
    container_url: String,
}

impl CommentStore {
    pub fn new(
        storage: &StorageConfig,
        azure_ad: &AzureAdConfig,
        credentials: Arc<CredentialCache>,
    ) -> Self {
        let endpoint = format!("https://{}.blob.core.windows.net", storage.account_name);
        Self::with_endpoint(&endpoint, storage, azure_ad, credentials)
    }

    /// Point the store at a custom blob endpoint (emulators, tests).
    pub fn with_endpoint(
        endpoint: &str,
        storage: &StorageConfig,
        azure_ad: &AzureAdConfig,
        credentials: Arc<CredentialCache>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            credentials,
            tenant_id: azure_ad.tenant_id.clone(),
            client_id: azure_ad.client_id.clone(),
            container_url: format!(
                "{}/{}",
                endpoint.trim_end_matches('/'),
                storage.container_name
            ),
        }
    }

    /// All comments in the container, every blob downloaded in full.
    pub async fn list(&self) -> Result<Vec<Comment>> {
        let bearer = self.bearer().await?;
        self.ensure_container(&bearer).await?;

        let mut comments = Vec::new();
        let mut marker: Option<String> = None;
        loop {
            let mut url = format!("{}?restype=container&comp=list", self.container_url);
            if let Some(marker) = &marker {
                url.push_str("&marker=");
                url.push_str(&urlencoding::encode(marker));
            }

            let response = self
                .http
                .get(&url)
                .header("Authorization", &bearer)
                .header("x-ms-version", API_VERSION)
                .send()
                .await
                .map_err(|e| Error::transport(SERVICE, e))?;
            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(Error::service(SERVICE, status, body));
            }

            let body = response
                .text()
                .await
                .map_err(|e| Error::transport(SERVICE, e))?;
            let page: ListBlobsResponse = quick_xml::de::from_str(&body).map_err(|e| {
                Error::Transport {
                    service: SERVICE,
                    status: None,
                    message: format!("unreadable blob listing: {e}"),
                }
            })?;

            for name in page.blob_names() {
                let text = self.download(&bearer, &name).await?;
                comments.push(Comment::new(name, text));
            }

            marker = page.next_marker.filter(|m| !m.is_empty());
            if marker.is_none() {
                break;
            }
        }

        Ok(comments)
    }

    /// A single comment by name, or [`Error::NotFound`].
    pub async fn find(&self, name: &str) -> Result<Comment> {
        let bearer = self.bearer().await?;
        let text = self.download(&bearer, name).await?;
        Ok(Comment::new(name, text))
    }

    /// Upload a new comment. Fails with [`Error::AlreadyExists`] when a blob
    /// with the same name is already present.
    pub async fn create(&self, comment: &Comment) -> Result<()> {
        let bearer = self.bearer().await?;
        self.ensure_container(&bearer).await?;

        let response = self
            .http
            .put(self.blob_url(&comment.name))
            .header("Authorization", &bearer)
            .header("x-ms-version", API_VERSION)
            .header("x-ms-blob-type", "BlockBlob")
            .header("If-None-Match", "*")
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(comment.text.clone().into_bytes())
            .send()
            .await
            .map_err(|e| Error::transport(SERVICE, e))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => {
                Err(Error::AlreadyExists(comment.name.clone()))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(Error::service(SERVICE, status, body))
            }
        }
    }

    /// Delete a comment by name. Deleting a name that does not exist is a
    /// no-op.
    pub async fn delete(&self, name: &str) -> Result<()> {
        let bearer = self.bearer().await?;

        let response = self
            .http
            .delete(self.blob_url(name))
            .header("Authorization", &bearer)
            .header("x-ms-version", API_VERSION)
            .send()
            .await
            .map_err(|e| Error::transport(SERVICE, e))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Ok(()),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(Error::service(SERVICE, status, body))
            }
        }
    }

    async fn bearer(&self) -> Result<String> {
        let credential = self
            .credentials
            .get_or_exchange(&self.tenant_id, &self.client_id)
            .await?;
        auth::bearer_token(&credential, &[STORAGE_SCOPE]).await
    }

    fn blob_url(&self, name: &str) -> String {
        format!("{}/{}", self.container_url, urlencoding::encode(name))
    }

    /// Create the container if it does not exist yet.
    async fn ensure_container(&self, bearer: &str) -> Result<()> {
        let url = format!("{}?restype=container", self.container_url);
        let response = self
            .http
            .put(&url)
            .header("Authorization", bearer)
            .header("x-ms-version", API_VERSION)
            .send()
            .await
            .map_err(|e| Error::transport(SERVICE, e))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            // The container was already there, which is what we wanted.
            StatusCode::CONFLICT => Ok(()),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(Error::service(SERVICE, status, body))
            }
        }
    }

    async fn download(&self, bearer: &str, name: &str) -> Result<String> {
        let response = self
            .http
            .get(self.blob_url(name))
            .header("Authorization", bearer)
            .header("x-ms-version", API_VERSION)
            .send()
            .await
            .map_err(|e| Error::transport(SERVICE, e))?;

        match response.status() {
            status if status.is_success() => response
                .text()
                .await
                .map_err(|e| Error::transport(SERVICE, e)),
            StatusCode::NOT_FOUND => Err(Error::NotFound(name.to_string())),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(Error::service(SERVICE, status, body))
            }
        }
    }
}

/// Subset of the List Blobs response the store cares about.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListBlobsResponse {
    blobs: Option<BlobList>,
    next_marker: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BlobList {
    #[serde(rename = "Blob", default)]
    blob: Vec<BlobEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct BlobEntry {
    name: String,
}

impl ListBlobsResponse {
    fn blob_names(&self) -> Vec<String> {
        self.blobs
            .as_ref()
            .map(|list| list.blob.iter().map(|entry| entry.name.clone()).collect())
            .unwrap_or_default()
    }
}
