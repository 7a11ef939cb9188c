//! Application configuration, loaded once at startup and injected into each
//! component. No ambient/static access after load.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::Error;

/// Default scope requested for downstream Graph calls when none is configured.
const DEFAULT_GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub azure_ad: AzureAdConfig,
    #[serde(default)]
    pub azure_storage: StorageConfig,
    #[serde(default)]
    pub key_vault: KeyVaultConfig,
    #[serde(default)]
    pub downstream_api: DownstreamApiConfig,
}

/// Home-tenant identity of the web app, plus the managed identity used as the
/// federated client credential.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AzureAdConfig {
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_credentials: Vec<ClientCredentialConfig>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ClientCredentialConfig {
    #[serde(default)]
    pub managed_identity_client_id: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub account_name: String,
    #[serde(default)]
    pub container_name: String,
}

/// Key Vault settings are validated lazily, at fetch time, so a missing value
/// shows up on the vault page instead of preventing startup.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct KeyVaultConfig {
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub secret_name: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DownstreamApiConfig {
    #[serde(default)]
    pub scopes: String,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Check the settings required before the server can start. Key Vault
    /// settings are deliberately excluded, see [`KeyVaultConfig`].
    pub fn validate(&self) -> Result<(), Error> {
        if self.azure_ad.tenant_id.is_empty() {
            return Err(Error::Configuration("azure_ad.tenant_id"));
        }
        if self.azure_ad.client_id.is_empty() {
            return Err(Error::Configuration("azure_ad.client_id"));
        }
        if self.azure_ad.managed_identity_client_id().is_empty() {
            return Err(Error::Configuration(
                "azure_ad.client_credentials[0].managed_identity_client_id",
            ));
        }
        if self.azure_storage.account_name.is_empty() {
            return Err(Error::Configuration("azure_storage.account_name"));
        }
        if self.azure_storage.container_name.is_empty() {
            return Err(Error::Configuration("azure_storage.container_name"));
        }
        Ok(())
    }
}

impl AzureAdConfig {
    /// Client id of the managed identity that backs the federated credential.
    pub fn managed_identity_client_id(&self) -> &str {
        self.client_credentials
            .first()
            .map(|c| c.managed_identity_client_id.as_str())
            .unwrap_or_default()
    }
}

impl KeyVaultConfig {
    pub fn tenant_id(&self) -> Result<&str, Error> {
        require(&self.tenant_id, "key_vault.tenant_id")
    }

    pub fn uri(&self) -> Result<&str, Error> {
        require(&self.uri, "key_vault.uri")
    }

    pub fn secret_name(&self) -> Result<&str, Error> {
        require(&self.secret_name, "key_vault.secret_name")
    }
}

impl DownstreamApiConfig {
    /// Space-separated scope list for the Graph credential.
    pub fn scopes(&self) -> Vec<String> {
        if self.scopes.trim().is_empty() {
            return vec![DEFAULT_GRAPH_SCOPE.to_string()];
        }
        self.scopes
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }
}

fn require<'a>(value: &'a str, key: &'static str) -> Result<&'a str, Error> {
    if value.is_empty() {
        Err(Error::Configuration(key))
    } else {
        Ok(value)
    }
}
