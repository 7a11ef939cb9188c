//! mific-web - managed identity as a federated identity credential
//!
//! A small web app that exchanges its managed identity for an application
//! credential and uses it against downstream services:
//! - Storage: comments stored one-per-blob in a container
//! - Graph: profile and photo of the signed-in identity
//! - Key Vault: a secret fetched from another tenant

mod api;
mod auth;
mod config;
mod error;
mod models;
mod pages;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::{CommentStore, GraphClient, SecretReader};
use crate::auth::CredentialCache;
use crate::config::AppConfig;
use crate::pages::AppState;

/// mific-web - MI-as-FIC sample pages
#[derive(Parser, Debug)]
#[command(name = "mific-web")]
#[command(about = "Sample pages for managed identity as a federated identity credential")]
#[command(version)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "MIFIC_CONFIG", default_value = "mific.toml")]
    config: PathBuf,

    /// Address to listen on
    #[arg(short, long, env = "MIFIC_BIND", default_value = "127.0.0.1:8080")]
    bind: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (for debugging, set RUST_LOG=debug)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();

    let config = AppConfig::load(&args.config)?;
    config
        .validate()
        .context("Configuration is incomplete; see the sample config")?;

    // One cache for the whole process; every client resolves its exchanged
    // credential through it.
    let credentials = Arc::new(CredentialCache::new(
        config.azure_ad.managed_identity_client_id(),
    ));

    // The Graph client gets the app's home-tenant credential. Interactive
    // sign-in is not part of this sample; the app identity itself calls Graph.
    let graph_credential = credentials
        .get_or_exchange(&config.azure_ad.tenant_id, &config.azure_ad.client_id)
        .await
        .context("Failed to build the Graph credential")?;

    let state = Arc::new(AppState {
        comments: CommentStore::new(&config.azure_storage, &config.azure_ad, credentials.clone()),
        secrets: SecretReader::new(&config.key_vault, &config.azure_ad, credentials.clone()),
        graph: GraphClient::new(graph_credential, config.downstream_api.scopes()),
    });

    let app = pages::router(state);

    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;
    tracing::info!("listening on http://{}", args.bind);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
