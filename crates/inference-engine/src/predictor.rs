//! Predictor abstraction and the tract-backed implementation

use crate::{InferenceError, LabelTable, Preprocess};
use image::DynamicImage;
use std::time::Instant;
use tracing::debug;
use tract_onnx::prelude::*;

/// Top-1 output of a predictor
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Raw label as found in the label table
    pub label: String,
    /// Softmax probability of the winning class
    pub confidence: f32,
}

/// A loaded model that maps a decoded image to a raw label.
///
/// Implementations are read-only after construction and shared across
/// concurrent requests without locking.
pub trait Predictor: Send + Sync {
    fn predict(&self, image: &DynamicImage) -> Result<Prediction, InferenceError>;

    /// Number of classes the predictor can emit
    fn class_count(&self) -> usize;
}

/// Runnable tract plan plus the metadata needed to interpret its output
pub struct TractPredictor {
    plan: TypedRunnableModel<TypedModel>,
    labels: LabelTable,
    preprocess: Preprocess,
}

impl TractPredictor {
    pub fn new(plan: TypedRunnableModel<TypedModel>, labels: LabelTable, preprocess: Preprocess) -> Self {
        Self {
            plan,
            labels,
            preprocess,
        }
    }
}

impl Predictor for TractPredictor {
    fn predict(&self, image: &DynamicImage) -> Result<Prediction, InferenceError> {
        let start = Instant::now();
        let input = self.preprocess.to_tensor(image);

        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| InferenceError::InferenceFailed(format!("{:#}", e)))?;

        let output = outputs
            .first()
            .ok_or_else(|| InferenceError::InvalidOutput("model produced no outputs".to_string()))?;
        let logits = output
            .to_array_view::<f32>()
            .map_err(|e| InferenceError::InvalidOutput(e.to_string()))?;
        let logits: Vec<f32> = logits.iter().copied().collect();

        let (index, confidence) = top1(&logits)
            .ok_or_else(|| InferenceError::InvalidOutput("empty output vector".to_string()))?;
        let label = self.labels.get(index).ok_or(InferenceError::UnknownClass {
            index,
            classes: self.labels.len(),
        })?;

        debug!(
            "Predicted {} (p={:.3}) in {}ms",
            label,
            confidence,
            start.elapsed().as_millis()
        );

        Ok(Prediction {
            label: label.to_string(),
            confidence,
        })
    }

    fn class_count(&self) -> usize {
        self.labels.len()
    }
}

/// Index and softmax probability of the largest logit
pub(crate) fn top1(logits: &[f32]) -> Option<(usize, f32)> {
    let (index, max) = logits
        .iter()
        .copied()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.total_cmp(b))?;

    let sum: f32 = logits.iter().map(|v| (v - max).exp()).sum();
    Some((index, 1.0 / sum))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top1_picks_largest() {
        let (index, p) = top1(&[0.1, 3.0, -2.0, 1.0]).unwrap();
        assert_eq!(index, 1);
        assert!(p > 0.5 && p < 1.0);
    }

    #[test]
    fn test_top1_uniform() {
        let (_, p) = top1(&[2.0; 4]).unwrap();
        assert!((p - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_top1_empty() {
        assert!(top1(&[]).is_none());
    }
}
