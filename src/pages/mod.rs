//! Page handlers for the sample app
//!
//! Thin axum handlers: call a client, map the result into view state, render
//! a small HTML page. Routing and form binding are axum's job; everything
//! here stays close to the shape of the data.

pub mod graph;
pub mod storage;
pub mod vault;

use std::sync::Arc;

use axum::Router;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;

use crate::api::{CommentStore, GraphClient, SecretReader};
use crate::error::Error;

pub struct AppState {
    pub comments: CommentStore,
    pub secrets: SecretReader,
    pub graph: GraphClient,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/storage", get(storage::index))
        .route(
            "/storage/create",
            get(storage::create_form).post(storage::create),
        )
        .route(
            "/storage/delete/{name}",
            get(storage::confirm_delete).post(storage::delete),
        )
        .route("/graph", get(graph::index))
        .route("/vault", get(vault::index))
        .with_state(state)
}

async fn index() -> Html<String> {
    layout(
        "Managed identity as a federated identity credential",
        r#"<p>Demos:</p>
<ul>
  <li><a href="/storage">Storage - comments stored as blobs</a></li>
  <li><a href="/graph">Graph - profile of the signed-in identity</a></li>
  <li><a href="/vault">Key Vault - secret from another tenant</a></li>
</ul>"#,
    )
}

/// Wrap a page body in the shared chrome.
pub(crate) fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body {{ font-family: sans-serif; margin: 2rem auto; max-width: 40rem; }}
table {{ border-collapse: collapse; }}
td, th {{ border: 1px solid #999; padding: 0.3rem 0.6rem; }}
.error {{ color: #a00; }}
nav {{ margin-bottom: 1.5rem; }}
</style>
</head>
<body>
<nav><a href="/">Home</a></nav>
<h1>{title}</h1>
{body}
</body>
</html>"#,
        title = escape(title),
        body = body,
    ))
}

/// Minimal HTML escaping for text interpolated into pages.
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Authentication(_) => StatusCode::BAD_GATEWAY,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::AlreadyExists(_) => StatusCode::CONFLICT,
            Error::Transport { .. } => StatusCode::BAD_GATEWAY,
        };
        tracing::warn!("page request failed: {self}");
        let body = layout(
            "Something went wrong",
            &format!(r#"<p class="error">{}</p>"#, escape(&self.to_string())),
        );
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_neutralizes_markup() {
        assert_eq!(
            escape(r#"<b>&"quoted"'</b>"#),
            "&lt;b&gt;&amp;&quot;quoted&quot;&#39;&lt;/b&gt;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn not_found_renders_as_404() {
        let response = Error::NotFound("ghost".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn duplicate_names_render_as_409() {
        let response = Error::AlreadyExists("alice".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn missing_configuration_renders_as_500() {
        let response = Error::Configuration("azure_ad.tenant_id").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn transport_failures_render_as_502() {
        let response = Error::Transport {
            service: "blob storage",
            status: None,
            message: "connection refused".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
