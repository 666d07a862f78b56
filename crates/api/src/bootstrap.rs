//! One-time startup: fetch the artifact, then load it
//!
//! The listener is only bound with the returned predictor in hand, so no
//! request can observe a partially loaded model.

use crate::config::ArtifactConfig;
use artifact_fetcher::{ArtifactFetcher, FetchError};
use inference_engine::{LoadError, ModelLoader, Predictor};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::info;

/// Fatal startup failures
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Artifact fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("Model load failed: {0}")]
    Load(#[from] LoadError),
    #[error("Model load task aborted: {0}")]
    Task(String),
    #[error("Bootstrap was already attempted")]
    AlreadyAttempted,
}

/// Fetch-then-load sequence, runnable once
pub struct Bootstrap {
    fetcher: ArtifactFetcher,
    loader: Arc<dyn ModelLoader>,
    source_url: String,
    directory: PathBuf,
    artifact_name: String,
    attempted: AtomicBool,
}

impl Bootstrap {
    pub fn new(fetcher: ArtifactFetcher, loader: Arc<dyn ModelLoader>, artifact: &ArtifactConfig) -> Self {
        Self {
            fetcher,
            loader,
            source_url: artifact.url.clone(),
            directory: artifact.directory.clone(),
            artifact_name: artifact.file_name.clone(),
            attempted: AtomicBool::new(false),
        }
    }

    /// Ensure the artifact exists and load it.
    ///
    /// Only the first call does any work; later calls fail with
    /// [`BootstrapError::AlreadyAttempted`] whatever the first outcome was.
    pub async fn run(&self) -> Result<Arc<dyn Predictor>, BootstrapError> {
        if self.attempted.swap(true, Ordering::SeqCst) {
            return Err(BootstrapError::AlreadyAttempted);
        }

        let start = Instant::now();
        let destination = self.directory.join(&self.artifact_name);
        self.fetcher
            .ensure_artifact(&self.source_url, &destination)
            .await?;
        info!("Artifact ready after {}ms", start.elapsed().as_millis());

        let loader = self.loader.clone();
        let directory = self.directory.clone();
        let artifact_name = self.artifact_name.clone();
        let predictor = tokio::task::spawn_blocking(move || loader.load(&directory, &artifact_name))
            .await
            .map_err(|e| BootstrapError::Task(e.to_string()))??;

        info!(
            "Bootstrap complete in {}ms ({} classes)",
            start.elapsed().as_millis(),
            predictor.class_count()
        );
        Ok(predictor)
    }
}
