//! Classification pipeline: decode → predict → normalize

use crate::{is_known_category, normalize_label, ClassifyError, Predictor};
use std::sync::Arc;
use tracing::debug;

/// Outcome of classifying one image
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    /// Label exactly as emitted by the model
    pub raw_label: String,
    /// Presentable label; also the reference lookup query
    pub normalized_label: String,
    /// Softmax probability of the prediction
    pub confidence: f32,
}

/// Classifies encoded images against a shared predictor
#[derive(Clone)]
pub struct Classifier {
    predictor: Arc<dyn Predictor>,
}

impl Classifier {
    pub fn new(predictor: Arc<dyn Predictor>) -> Self {
        Self { predictor }
    }

    /// Decode `image_bytes`, run the predictor, and normalize its label.
    ///
    /// CPU-bound; async callers should run it on a blocking thread.
    pub fn classify(&self, image_bytes: &[u8]) -> Result<PredictionResult, ClassifyError> {
        let image = image::load_from_memory(image_bytes)
            .map_err(|e| ClassifyError::InvalidImage(e.to_string()))?;

        let prediction = self.predictor.predict(&image)?;
        if !is_known_category(&prediction.label) {
            debug!("Predicted label {:?} is outside the bundled categories", prediction.label);
        }

        Ok(PredictionResult {
            normalized_label: normalize_label(&prediction.label),
            raw_label: prediction.label,
            confidence: prediction.confidence,
        })
    }

    pub fn predictor(&self) -> &Arc<dyn Predictor> {
        &self.predictor
    }
}
