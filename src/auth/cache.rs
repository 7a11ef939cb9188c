//! Process-owned cache of exchanged credentials
//!
//! Exchanged credentials are keyed by the tenant they sign into and the
//! application identity they authenticate. The cache is built once at startup
//! and injected into the downstream clients, so repeated page loads reuse the
//! same credential instead of rebuilding the exchange on every call.

use std::collections::HashMap;
use std::sync::Arc;

use azure_core::credentials::TokenCredential;
use tokio::sync::RwLock;

use super::federated;
use crate::error::Result;

/// The identity a credential authenticates, in the tenant it signs into.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CredentialKey {
    pub tenant_id: String,
    pub client_id: String,
}

pub struct CredentialCache {
    managed_identity_client_id: String,
    entries: RwLock<HashMap<CredentialKey, Arc<dyn TokenCredential>>>,
}

impl CredentialCache {
    pub fn new(managed_identity_client_id: impl Into<String>) -> Self {
        Self {
            managed_identity_client_id: managed_identity_client_id.into(),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Get the credential for `(tenant_id, client_id)`, exchanging a new one
    /// on first use.
    pub async fn get_or_exchange(
        &self,
        tenant_id: &str,
        client_id: &str,
    ) -> Result<Arc<dyn TokenCredential>> {
        let key = CredentialKey {
            tenant_id: tenant_id.to_string(),
            client_id: client_id.to_string(),
        };

        if let Some(credential) = self.entries.read().await.get(&key) {
            return Ok(credential.clone());
        }

        let mut entries = self.entries.write().await;
        // Another request may have exchanged while we waited for the lock.
        if let Some(credential) = entries.get(&key) {
            return Ok(credential.clone());
        }

        let credential = federated::exchange_credential(
            &self.managed_identity_client_id,
            tenant_id,
            client_id,
        )?;
        entries.insert(key, credential.clone());
        Ok(credential)
    }

    /// Replace the entry for `(tenant_id, client_id)` with a caller-supplied
    /// credential.
    pub async fn insert(
        &self,
        tenant_id: &str,
        client_id: &str,
        credential: Arc<dyn TokenCredential>,
    ) {
        let key = CredentialKey {
            tenant_id: tenant_id.to_string(),
            client_id: client_id.to_string(),
        };
        self.entries.write().await.insert(key, credential);
    }

    /// Drop the entry so the next use performs a fresh exchange.
    pub async fn invalidate(&self, tenant_id: &str, client_id: &str) {
        let key = CredentialKey {
            tenant_id: tenant_id.to_string(),
            client_id: client_id.to_string(),
        };
        self.entries.write().await.remove(&key);
    }
}
