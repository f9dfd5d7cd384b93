//! Errors raised while setting up the client or authenticating.
//!
//! Failures of individual API calls are reported as
//! [`playedit_store::SyncError`] so the reconciliation engine can propagate
//! them unchanged.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Invalid proxy URL '{url}': {source}")]
    InvalidProxy {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("Unable to read service account {path}: {source}")]
    ServiceAccountIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid service account file: {0}")]
    ServiceAccountFormat(#[from] serde_json::Error),

    #[error("Unable to sign token request: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid token response: {0}")]
    TokenResponse(#[source] serde_json::Error),

    #[error("Token request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The token endpoint answered with an OAuth error.
    #[error("Authentication rejected ({error}): {description}")]
    AuthRejected { error: String, description: String },
}
