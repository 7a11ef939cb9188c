//! Microsoft Graph profile client
//!
//! The credential is handed in by the hosting process; this client only
//! issues the profile and photo requests. A missing photo, or any failure
//! while fetching it, collapses to `None` so the page can still render.

use std::sync::Arc;

use azure_core::credentials::TokenCredential;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::auth;
use crate::error::{Error, Result};
use crate::models::Profile;

const GRAPH_ENDPOINT: &str = "https://graph.microsoft.com";

const SERVICE: &str = "graph";

pub struct GraphClient {
    http: reqwest::Client,
    credential: Arc<dyn TokenCredential>,
    scopes: Vec<String>,
    base_url: String,
}

impl GraphClient {
    pub fn new(credential: Arc<dyn TokenCredential>, scopes: Vec<String>) -> Self {
        Self::with_endpoint(GRAPH_ENDPOINT, credential, scopes)
    }

    /// Point the client at a custom Graph endpoint (tests).
    pub fn with_endpoint(
        endpoint: &str,
        credential: Arc<dyn TokenCredential>,
        scopes: Vec<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            credential,
            scopes,
            base_url: endpoint.trim_end_matches('/').to_string(),
        }
    }

    /// Profile of the signed-in identity, with the photo when one exists.
    pub async fn fetch_profile(&self) -> Result<Profile> {
        let bearer = self.bearer().await?;

        let url = format!("{}/v1.0/me?$select=displayName", self.base_url);
        let response = self
            .http
            .get(&url)
            .header("Authorization", &bearer)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| Error::transport(SERVICE, e))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::service(SERVICE, status, body));
        }
        let me: Me = response
            .json()
            .await
            .map_err(|e| Error::transport(SERVICE, e))?;

        let photo_base64 = match self.fetch_photo(&bearer).await {
            Ok(photo) => photo,
            Err(err) => {
                tracing::debug!("profile photo unavailable: {err}");
                None
            }
        };

        Ok(Profile {
            display_name: me.display_name.unwrap_or_default(),
            photo_base64,
        })
    }

    async fn fetch_photo(&self, bearer: &str) -> Result<Option<String>> {
        let url = format!("{}/v1.0/me/photo/$value", self.base_url);
        let response = self
            .http
            .get(&url)
            .header("Authorization", bearer)
            .send()
            .await
            .map_err(|e| Error::transport(SERVICE, e))?;

        match response.status() {
            status if status.is_success() => {
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| Error::transport(SERVICE, e))?;
                Ok(Some(BASE64_STANDARD.encode(&bytes)))
            }
            StatusCode::NOT_FOUND => Ok(None),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(Error::service(SERVICE, status, body))
            }
        }
    }

    async fn bearer(&self) -> Result<String> {
        let scopes: Vec<&str> = self.scopes.iter().map(String::as_str).collect();
        auth::bearer_token(&self.credential, &scopes).await
    }
}

#[derive(Debug, Deserialize)]
struct Me {
    #[serde(rename = "displayName")]
    display_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::testing::StaticCredential;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GraphClient {
        GraphClient::with_endpoint(
            &server.uri(),
            StaticCredential::new("graph-token") as Arc<dyn TokenCredential>,
            vec!["https://graph.microsoft.com/.default".to_string()],
        )
    }

    async fn mount_me(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/v1.0/me"))
            .and(query_param("$select", "displayName"))
            .and(header("Authorization", "Bearer graph-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "displayName": "Megan Bowen",
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn returns_display_name_and_photo() {
        let server = MockServer::start().await;
        mount_me(&server).await;
        Mock::given(method("GET"))
            .and(path("/v1.0/me/photo/$value"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3]))
            .mount(&server)
            .await;

        let profile = client_for(&server).fetch_profile().await.unwrap();
        assert_eq!(profile.display_name, "Megan Bowen");
        assert_eq!(profile.photo_base64.as_deref(), Some("AQID"));
    }

    #[tokio::test]
    async fn missing_photo_collapses_to_none() {
        let server = MockServer::start().await;
        mount_me(&server).await;
        Mock::given(method("GET"))
            .and(path("/v1.0/me/photo/$value"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let profile = client_for(&server).fetch_profile().await.unwrap();
        assert_eq!(profile.photo_base64, None);
    }

    #[tokio::test]
    async fn photo_failures_are_swallowed() {
        let server = MockServer::start().await;
        mount_me(&server).await;
        Mock::given(method("GET"))
            .and(path("/v1.0/me/photo/$value"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let profile = client_for(&server).fetch_profile().await.unwrap();
        assert_eq!(profile.display_name, "Megan Bowen");
        assert_eq!(profile.photo_base64, None);
    }

    #[tokio::test]
    async fn profile_failures_are_typed_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1.0/me"))
            .respond_with(ResponseTemplate::new(401).set_body_string("no token"))
            .mount(&server)
            .await;

        assert!(matches!(
            client_for(&server).fetch_profile().await,
            Err(Error::Transport { .. })
        ));
    }

    #[tokio::test]
    async fn missing_display_name_renders_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1.0/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1.0/me/photo/$value"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let profile = client_for(&server).fetch_profile().await.unwrap();
        assert_eq!(profile.display_name, "");
    }
}
