//! Dream submission and history endpoints.

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use oneiro_core::{DreamError, DreamRecord};

use crate::error::AppError;
use crate::state::AppState;

const HISTORY_LIMIT: i64 = 20;

#[derive(Deserialize)]
pub struct SubmitDreamRequest {
    pub user_id: String,
    #[serde(default)]
    pub dream_text: String,
}

#[derive(Serialize)]
pub struct SubmitDreamResponse {
    pub dream_id: Option<Uuid>,
    pub interpretation: String,
    pub credits: i32,
}

#[derive(Serialize)]
pub struct DreamListResponse {
    pub dreams: Vec<DreamRecord>,
}

/// POST /api/dreams — run one full submission.
pub async fn submit_dream(
    State(state): State<AppState>,
    Json(req): Json<SubmitDreamRequest>,
) -> Result<Json<SubmitDreamResponse>, AppError> {
    if req.user_id.trim().is_empty() {
        return Err(DreamError::InvalidInput("user_id is required".into()).into());
    }

    let outcome = state
        .service
        .submit_dream(&req.user_id, &req.dream_text)
        .await?;

    Ok(Json(SubmitDreamResponse {
        dream_id: outcome.dream_id,
        interpretation: outcome.interpretation,
        credits: outcome.credits,
    }))
}

/// GET /api/dreams/:user_id — recent submissions, most recent first.
pub async fn list_dreams(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<DreamListResponse>, AppError> {
    let dreams = state.service.recent_dreams(&user_id, HISTORY_LIMIT).await?;
    Ok(Json(DreamListResponse { dreams }))
}
