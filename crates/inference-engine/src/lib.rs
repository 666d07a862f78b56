//! Bird Species Inference Engine
//!
//! Loads the ONNX classifier with tract and turns uploaded image bytes into a
//! presentable species name.

mod categories;
mod classifier;
mod labels;
mod loader;
mod predictor;
mod preprocess;

pub use categories::{is_known_category, CATEGORIES};
pub use classifier::{Classifier, PredictionResult};
pub use labels::{normalize_label, LabelTable, LABEL_SEPARATOR};
pub use loader::{ModelLoader, OnnxModelLoader};
pub use predictor::{Prediction, Predictor, TractPredictor};
pub use preprocess::Preprocess;

use std::path::PathBuf;
use thiserror::Error;
use tract_onnx::prelude::TractError;

/// Operator guidance attached to environment incompatibility failures
pub const ENVIRONMENT_HINT: &str = "This model artifact needs an execution environment \
that is not available on this machine (for example GPU-only operators or an unsupported opset). \
Export the model again from a CPU-compatible training environment and replace the artifact.";

/// Errors while running the model on one input
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid model output: {0}")]
    InvalidOutput(String),
    #[error("Class index {index} is outside the label table ({classes} labels)")]
    UnknownClass { index: usize, classes: usize },
}

/// Errors while deserializing the model artifact
#[derive(Debug, Error)]
pub enum LoadError {
    /// Artifact missing or unreadable
    #[error("Cannot read model artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Artifact was produced for an environment this process cannot provide
    #[error("{hint}\n\nArtifact: {}\nCause: {detail}", path.display(), hint = ENVIRONMENT_HINT)]
    EnvironmentIncompatible { path: PathBuf, detail: String },

    /// Label sidecar present but unusable
    #[error("Invalid label table {}: {reason}", path.display())]
    Labels { path: PathBuf, reason: String },

    /// Any other deserialization failure, as reported by tract
    #[error("Failed to load model from {}: {source:#}", path.display())]
    Other {
        path: PathBuf,
        #[source]
        source: TractError,
    },
}

impl LoadError {
    /// Whether the failure is an environment mismatch rather than a broken artifact
    pub fn is_environment_incompatible(&self) -> bool {
        matches!(self, LoadError::EnvironmentIncompatible { .. })
    }
}

/// Request-scoped classification errors
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// Bytes are not a decodable image
    #[error("Invalid image: {0}")]
    InvalidImage(String),
    /// Decoded image but the predictor faulted
    #[error(transparent)]
    Inference(#[from] InferenceError),
}
