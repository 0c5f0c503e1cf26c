//! Credit balance endpoint.

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Serialize;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct CreditsResponse {
    pub credits: i32,
}

/// GET /api/credits/:user_id — current balance, creating the profile with
/// the default grant on first access.
pub async fn get_credits(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<CreditsResponse>, AppError> {
    let credits = state.service.fetch_credits(&user_id).await?;
    Ok(Json(CreditsResponse { credits }))
}
