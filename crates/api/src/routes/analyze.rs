//! Image Analysis Route

use axum::{
    body::Bytes,
    extract::{Multipart, State},
    Json,
};
use metrics::{counter, histogram};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::config::LinkPolicy;
use crate::error::ApiError;
use crate::AppState;

/// Multipart field carrying the image
const FILE_FIELD: &str = "file";

/// Response for the analyze endpoint
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    /// Normalized species name
    pub result: String,
    /// Reference page; `null` only under the lenient link policy
    pub url: Option<String>,
}

/// Classify an uploaded image and attach a reference link
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let outcome = run_analysis(&state, multipart).await;
    let label = if outcome.is_ok() { "ok" } else { "error" };
    counter!("analyze_requests_total", "outcome" => label).increment(1);
    outcome.map(Json)
}

async fn run_analysis(state: &AppState, mut multipart: Multipart) -> Result<AnalyzeResponse, ApiError> {
    let image = read_file_field(&mut multipart).await?;

    let classifier = state.classifier.clone();
    let start = Instant::now();
    let prediction = tokio::task::spawn_blocking(move || classifier.classify(&image))
        .await
        .map_err(|e| ApiError::Internal(format!("inference task failed: {}", e)))??;
    histogram!("inference_latency_ms").record(start.elapsed().as_secs_f64() * 1000.0);

    info!(
        "Classified upload as {} (p={:.3})",
        prediction.normalized_label, prediction.confidence
    );

    let url = match state.lookup.lookup(&prediction.normalized_label).await {
        Ok(link) => Some(link.url),
        Err(e) => {
            counter!("lookup_failures_total", "kind" => e.kind()).increment(1);
            match state.link_policy {
                LinkPolicy::Strict => return Err(e.into()),
                LinkPolicy::Lenient => {
                    warn!("Answering without reference link: {}", e);
                    None
                }
            }
        }
    };

    Ok(AnalyzeResponse {
        result: prediction.normalized_label,
        url,
    })
}

async fn read_file_field(multipart: &mut Multipart) -> Result<Bytes, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() == Some(FILE_FIELD) {
            return field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)));
        }
    }

    Err(ApiError::BadRequest(format!("Missing form field `{}`", FILE_FIELD)))
}
