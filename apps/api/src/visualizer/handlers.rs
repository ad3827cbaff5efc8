//! Axum route handlers for the Visualize API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::visualizer::generator::{Provenance, VisualizeError};

/// Longest concept accepted, in characters.
pub const MAX_PROMPT_CHARS: usize = 500;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct VisualizeRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct VisualizeResponse {
    pub visual_description: String,
    pub success: bool,
    pub source: Provenance,
    pub truncated: bool,
}

impl From<VisualizeError> for AppError {
    fn from(err: VisualizeError) -> Self {
        AppError::Validation(err.to_string())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/visualize
///
/// Turns an abstract concept into an artistic description. Always answers with
/// text on success; `source` says whether it came from the model or the fallback library.
pub async fn handle_visualize(
    State(state): State<AppState>,
    Json(request): Json<VisualizeRequest>,
) -> Result<Json<VisualizeResponse>, AppError> {
    validate_prompt(&request.prompt)?;

    let request_id = Uuid::new_v4();
    let span = info_span!("visualize", %request_id);
    let visualizer = state.visualizer.clone();

    // Own task so a panic inside generation becomes a 500 instead of a dropped connection.
    let outcome = tokio::spawn(
        async move { visualizer.generate(&request.prompt).await }.instrument(span),
    )
    .await
    .map_err(|e| {
        error!("Visualize task for request {request_id} failed: {e}");
        AppError::Internal(anyhow::anyhow!("visualize task failed: {e}"))
    })??;

    info!(
        "Request {} answered from {:?} (truncated={})",
        request_id, outcome.provenance, outcome.truncated
    );

    Ok(Json(VisualizeResponse {
        visual_description: outcome.text,
        success: true,
        source: outcome.provenance,
        truncated: outcome.truncated,
    }))
}

fn validate_prompt(prompt: &str) -> Result<(), AppError> {
    if prompt.trim().is_empty() {
        return Err(VisualizeError::EmptyConcept.into());
    }
    let chars = prompt.chars().count();
    if chars > MAX_PROMPT_CHARS {
        return Err(AppError::Validation(format!(
            "Prompt must be at most {MAX_PROMPT_CHARS} characters (got {chars})"
        )));
    }
    Ok(())
}
