//! Landing page

use axum::{extract::State, response::Html};
use std::sync::Arc;

use crate::error::ApiError;
use crate::AppState;

const INDEX_FILE: &str = "index.html";

/// Serve `index.html` from the view directory
pub async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    let path = state.view_dir.join(INDEX_FILE);
    tokio::fs::read_to_string(&path)
        .await
        .map(Html)
        .map_err(|e| ApiError::Internal(format!("cannot read {}: {}", path.display(), e)))
}
