//! Error taxonomy shared by the credential helper, the REST clients and the
//! page layer.

use reqwest::StatusCode;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures surfaced to the page layer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required configuration value is missing or empty.
    #[error("missing or empty configuration value `{0}`")]
    Configuration(&'static str),

    /// Credential exchange or token acquisition failed.
    #[error("credential exchange failed: {0}")]
    Authentication(#[from] azure_core::Error),

    /// The requested comment or secret does not exist.
    #[error("`{0}` was not found")]
    NotFound(String),

    /// A comment with the same name already exists.
    #[error("a comment named `{0}` already exists")]
    AlreadyExists(String),

    /// The downstream service could not be reached, or rejected the request.
    #[error("{service} request failed{}: {message}", status_suffix(.status))]
    Transport {
        service: &'static str,
        status: Option<StatusCode>,
        message: String,
    },
}

impl Error {
    /// Transport failure from a reqwest error (request never completed).
    pub fn transport(service: &'static str, err: reqwest::Error) -> Self {
        Error::Transport {
            service,
            status: err.status(),
            message: err.to_string(),
        }
    }

    /// Transport failure from a non-success service response.
    pub fn service(service: &'static str, status: StatusCode, body: String) -> Self {
        Error::Transport {
            service,
            status: Some(status),
            message: body,
        }
    }
}

fn status_suffix(status: &Option<StatusCode>) -> String {
    match status {
        Some(status) => format!(" with status {status}"),
        None => String::new(),
    }
}
