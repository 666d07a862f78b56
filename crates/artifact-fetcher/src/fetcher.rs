//! Artifact Fetcher Implementation

use crate::FetchError;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Fetcher configuration
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Overall request timeout; `None` waits as long as the remote keeps the
    /// connection alive
    pub timeout: Option<Duration>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(600)),
        }
    }
}

/// Downloads the model artifact once and leaves it on disk
#[derive(Debug, Clone)]
pub struct ArtifactFetcher {
    client: reqwest::Client,
}

impl ArtifactFetcher {
    /// Create a fetcher with its own HTTP client
    pub fn new(config: &FetcherConfig) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(FetchError::Client)?;

        Ok(Self { client })
    }

    /// Create a fetcher around an existing client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Ensure `destination` exists, downloading `source_url` if it does not.
    ///
    /// An existing file is never touched and no request is made. A new file
    /// only appears at `destination` once the whole body has been written.
    /// A blank `source_url` is only accepted when the file already exists.
    pub async fn ensure_artifact(
        &self,
        source_url: &str,
        destination: &Path,
    ) -> Result<(), FetchError> {
        let exists = fs::try_exists(destination)
            .await
            .map_err(|source| FetchError::Write {
                path: destination.to_path_buf(),
                source,
            })?;
        if exists {
            debug!("Artifact already present at {}", destination.display());
            return Ok(());
        }

        if source_url.trim().is_empty() {
            return Err(FetchError::NoSource {
                path: destination.to_path_buf(),
            });
        }

        info!("Fetching artifact from {}", redact(source_url));
        let data = self.download(source_url).await?;

        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| FetchError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        write_atomically(destination, &data)
            .await
            .map_err(|source| FetchError::Write {
                path: destination.to_path_buf(),
                source,
            })?;

        info!(
            "Artifact written to {} ({} bytes)",
            destination.display(),
            data.len()
        );
        Ok(())
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let network = |source| FetchError::Network {
            url: redact(url),
            source,
        };

        let response = self.client.get(url).send().await.map_err(network)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: redact(url),
                status,
            });
        }

        let body = response.bytes().await.map_err(network)?;
        Ok(body.to_vec())
    }
}

/// Write to a sibling `.part` file and rename it into place
async fn write_atomically(destination: &Path, data: &[u8]) -> std::io::Result<()> {
    let partial = partial_path(destination);

    let result = async {
        let mut file = fs::File::create(&partial).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&partial, destination).await
    }
    .await;

    if result.is_err() {
        // Best effort; the write error is reported
        let _ = fs::remove_file(&partial).await;
    }
    result
}

fn partial_path(destination: &Path) -> PathBuf {
    let mut name = OsString::from(destination.as_os_str());
    name.push(".part");
    PathBuf::from(name)
}

/// Strip the query string so API keys never reach the logs
fn redact(url: &str) -> String {
    match url.split_once('?') {
        Some((base, _)) => format!("{}?…", base),
        None => url.to_string(),
    }
}
