//! Cross-tenant secret fetch from Key Vault
//!
//! The vault lives in a different tenant than the web app. The exchanged
//! credential is therefore built for the vault's tenant id; that tenant
//! trusts the app identity through a federated credential, so the managed
//! identity assertion is accepted there without any stored secret.

use std::sync::Arc;

use reqwest::StatusCode;
use serde::Deserialize;

use crate::auth::{self, CredentialCache};
use crate::config::{AzureAdConfig, KeyVaultConfig};
use crate::error::{Error, Result};

const SECRETS_API_VERSION: &str = "7.4";

/// Scope for Key Vault data-plane tokens.
const VAULT_SCOPE: &str = "https://vault.azure.net/.default";

const SERVICE: &str = "key vault";

pub struct SecretReader {
    http: reqwest::Client,
    credentials: Arc<CredentialCache>,
    client_id: String,
    config: KeyVaultConfig,
}

impl SecretReader {
    pub fn new(
        config: &KeyVaultConfig,
        azure_ad: &AzureAdConfig,
        credentials: Arc<CredentialCache>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            credentials,
            client_id: azure_ad.client_id.clone(),
            config: config.clone(),
        }
    }

    /// Current value of the configured secret.
    ///
    /// Vault settings are checked here rather than at startup, so a missing
    /// value surfaces on the vault page as a configuration error.
    pub async fn fetch_secret(&self) -> Result<String> {
        let tenant_id = self.config.tenant_id()?;
        let uri = self.config.uri()?;
        let secret_name = self.config.secret_name()?;

        let credential = self
            .credentials
            .get_or_exchange(tenant_id, &self.client_id)
            .await?;
        let bearer = auth::bearer_token(&credential, &[VAULT_SCOPE]).await?;

        let url = format!(
            "{}/secrets/{}?api-version={}",
            uri.trim_end_matches('/'),
            urlencoding::encode(secret_name),
            SECRETS_API_VERSION
        );
        let response = self
            .http
            .get(&url)
            .header("Authorization", bearer)
            .send()
            .await
            .map_err(|e| Error::transport(SERVICE, e))?;

        match response.status() {
            status if status.is_success() => {
                let bundle: SecretBundle = response
                    .json()
                    .await
                    .map_err(|e| Error::transport(SERVICE, e))?;
                Ok(bundle.value)
            }
            StatusCode::NOT_FOUND => Err(Error::NotFound(secret_name.to_string())),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(Error::service(SERVICE, status, body))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct SecretBundle {
    value: String,
}
