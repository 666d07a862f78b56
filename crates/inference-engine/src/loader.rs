//! Model artifact loading

use crate::{LabelTable, LoadError, Predictor, Preprocess, TractPredictor};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};
use tract_onnx::prelude::*;

/// Fragments (lower-case) in tract's error chain that mean the graph needs an
/// execution environment this build cannot provide rather than being corrupt
const INCOMPATIBILITY_MARKERS: &[&str] = &["cuda", "gpu", "unimplemented", "opset"];

/// Deserializes a model artifact into a shareable predictor
pub trait ModelLoader: Send + Sync {
    fn load(&self, directory: &Path, artifact_name: &str) -> Result<Arc<dyn Predictor>, LoadError>;
}

/// Loads ONNX artifacts with tract on the CPU
#[derive(Debug, Clone, Default)]
pub struct OnnxModelLoader {
    preprocess: Preprocess,
}

impl OnnxModelLoader {
    pub fn new(preprocess: Preprocess) -> Self {
        Self { preprocess }
    }
}

impl ModelLoader for OnnxModelLoader {
    fn load(&self, directory: &Path, artifact_name: &str) -> Result<Arc<dyn Predictor>, LoadError> {
        let path = directory.join(artifact_name);
        let start = Instant::now();
        info!("Loading model from {}", path.display());

        std::fs::metadata(&path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;

        let labels = LabelTable::for_artifact(&path)?;
        let plan = build_plan(&path, &self.preprocess).map_err(|e| translate(&path, e))?;

        info!(
            "Model loaded in {}ms ({} classes)",
            start.elapsed().as_millis(),
            labels.len()
        );
        Ok(Arc::new(TractPredictor::new(plan, labels, self.preprocess)))
    }
}

fn build_plan(path: &Path, preprocess: &Preprocess) -> TractResult<TypedRunnableModel<TypedModel>> {
    tract_onnx::onnx()
        .model_for_path(path)?
        .with_input_fact(0, f32::fact(preprocess.shape()).into())?
        .into_optimized()?
        .into_runnable()
}

/// Split tract failures into environment mismatches and everything else
fn translate(path: &Path, err: TractError) -> LoadError {
    let detail = format!("{:#}", err);
    if is_incompatibility(&detail) {
        error!("Model is incompatible with this environment: {}", detail);
        LoadError::EnvironmentIncompatible {
            path: path.to_path_buf(),
            detail,
        }
    } else {
        LoadError::Other {
            path: path.to_path_buf(),
            source: err,
        }
    }
}

fn is_incompatibility(detail: &str) -> bool {
    let detail = detail.to_lowercase();
    INCOMPATIBILITY_MARKERS
        .iter()
        .any(|marker| detail.contains(marker))
}
