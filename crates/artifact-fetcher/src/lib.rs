//! Model Artifact Fetcher
//!
//! Makes sure the serialized model exists on local storage, downloading it
//! once when it is absent. Subsequent calls (including across restarts) are
//! a single filesystem check.

mod fetcher;

pub use fetcher::{ArtifactFetcher, FetcherConfig};

use std::path::PathBuf;
use thiserror::Error;

/// Errors while fetching the model artifact
#[derive(Debug, Error)]
pub enum FetchError {
    /// Remote host unreachable, connection reset, or body read interrupted
    #[error("Network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Artifact is absent and no source URL is configured
    #[error("Artifact missing at {} and no source URL is configured", path.display())]
    NoSource { path: PathBuf },

    /// Remote answered with a non-success status
    #[error("Remote returned {status} for {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// Artifact could not be written completely
    #[error("Failed to write artifact to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
