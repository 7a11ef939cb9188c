//! Vault page: fetch a secret from another tenant
//!
//! Every failure is rendered into the page as a diagnostic string. That is
//! sample behavior, kept on purpose so the federation setup can be debugged
//! from the browser; a production app would log instead and show a redacted
//! message.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;

use super::{AppState, escape, layout};

pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let secret = match state.secrets.fetch_secret().await {
        Ok(value) => value,
        Err(err) => format!(
            "Error fetching secret from the other tenant: {err}, full trace: {err:?}"
        ),
    };

    let body = format!(
        r#"<p>Secret retrieved with the federated credential, from the vault's own tenant:</p>
<blockquote>{}</blockquote>"#,
        escape(&secret),
    );
    layout("Cross-tenant secret", &body)
}
