//! Managed identity token exchange
//!
//! The app holds no client secret. Instead, its managed identity requests a
//! token for the fixed token-exchange audience, and that token is presented
//! as the client assertion when the application identity signs in against the
//! target tenant. The target tenant does not have to be the app's home
//! tenant; trusting the assertion in a foreign tenant is what enables
//! cross-tenant access.

use std::sync::Arc;

use azure_core::credentials::TokenCredential;
use azure_identity::{
    ClientAssertion, ClientAssertionCredential, ManagedIdentityCredential,
    ManagedIdentityCredentialOptions, UserAssignedId,
};

use crate::error::{Error, Result};

/// Audience that marks a managed identity token as eligible for federation.
pub const TOKEN_EXCHANGE_AUDIENCE: &str = "api://AzureADTokenExchange";

/// Build a credential for `client_id` in `tenant_id`, authenticated by a
/// managed identity token instead of a stored secret.
///
/// Construction is cheap and performs no I/O; tokens are first requested when
/// a downstream client uses the credential.
pub fn exchange_credential(
    managed_identity_client_id: &str,
    tenant_id: &str,
    client_id: &str,
) -> Result<Arc<dyn TokenCredential>> {
    if managed_identity_client_id.is_empty() {
        return Err(Error::Configuration("managed_identity_client_id"));
    }
    if tenant_id.is_empty() {
        return Err(Error::Configuration("tenant_id"));
    }
    if client_id.is_empty() {
        return Err(Error::Configuration("client_id"));
    }

    let options = ManagedIdentityCredentialOptions {
        user_assigned_id: Some(UserAssignedId::ClientId(
            managed_identity_client_id.to_string(),
        )),
        ..Default::default()
    };
    let managed_identity = ManagedIdentityCredential::new(Some(options))?;

    let assertion = ManagedIdentityAssertion {
        credential: managed_identity,
    };
    let credential = ClientAssertionCredential::new(
        tenant_id.to_string(),
        client_id.to_string(),
        assertion,
        None,
    )?;

    Ok(credential as Arc<dyn TokenCredential>)
}

/// Client assertion backed by a managed identity token.
#[derive(Debug)]
struct ManagedIdentityAssertion {
    credential: Arc<ManagedIdentityCredential>,
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl ClientAssertion for ManagedIdentityAssertion {
    async fn secret(&self) -> azure_core::Result<String> {
        // The managed identity token must carry the exchange audience or the
        // target tenant will reject the assertion.
        let scope = format!("{TOKEN_EXCHANGE_AUDIENCE}/.default");
        let token = self.credential.get_token(&[&scope], None).await?;
        Ok(token.token.secret().to_string())
    }
}
