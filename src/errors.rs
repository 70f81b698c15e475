//! Typed error hierarchy for the store.
//!
//! Two top-level enums cover the two components:
//! - `StoreError`: record store and GitHub tracker failures
//! - `CatalogError`: catalog snapshot persistence failures

use std::path::PathBuf;

use thiserror::Error;

/// Errors from the record store and the issue tracker beneath it.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No credential was available; raised before any request is sent.
    #[error("GitHub token required for record store operations")]
    AuthRequired,

    #[error("GitHub API error {status}: {body}")]
    RemoteWrite { status: u16, body: String },

    #[error("GitHub request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// HTTP status carried by a `RemoteWrite`, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            StoreError::RemoteWrite { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors from reading or writing the catalog snapshot.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to access snapshot at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize catalog snapshot: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Snapshot store lock poisoned")]
    LockPoisoned,
}
