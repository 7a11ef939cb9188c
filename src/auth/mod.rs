//! Auth module for managed identity as a federated identity credential
//!
//! Exchanges the app's managed identity for an application credential and
//! keeps the exchanged credentials cached per target tenant.

mod cache;
mod federated;

pub use cache::{CredentialCache, CredentialKey};
pub use federated::{TOKEN_EXCHANGE_AUDIENCE, exchange_credential};

use std::sync::Arc;

use azure_core::credentials::TokenCredential;

use crate::error::Result;

/// Acquire a token for `scopes` and format it as an `Authorization` header
/// value.
pub async fn bearer_token(
    credential: &Arc<dyn TokenCredential>,
    scopes: &[&str],
) -> Result<String> {
    let token = credential.get_token(scopes, None).await?;
    Ok(format!("Bearer {}", token.token.secret()))
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use azure_core::credentials::{AccessToken, Secret, TokenCredential, TokenRequestOptions};

    /// Credential that hands out a fixed token without any network I/O.
    #[derive(Debug)]
    pub(crate) struct StaticCredential {
        token: String,
    }

    impl StaticCredential {
        pub(crate) fn new(token: &str) -> Arc<Self> {
            Arc::new(Self {
                token: token.to_string(),
            })
        }
    }

    #[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
    #[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
    impl TokenCredential for StaticCredential {
        async fn get_token(
            &self,
            _scopes: &[&str],
            _options: Option<TokenRequestOptions>,
        ) -> azure_core::Result<AccessToken> {
            Ok(AccessToken::new(
                Secret::new(self.token.clone()),
                time::OffsetDateTime::now_utc() + time::Duration::hours(1),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::StaticCredential;
    use super::*;

    #[tokio::test]
    async fn bearer_token_formats_the_authorization_value() {
        let credential = StaticCredential::new("token-123") as Arc<dyn TokenCredential>;
        let header = bearer_token(&credential, &["https://storage.azure.com/.default"])
            .await
            .unwrap();
        assert_eq!(header, "Bearer token-123");
    }
}
