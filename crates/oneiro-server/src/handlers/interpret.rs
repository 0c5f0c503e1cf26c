//! POST /interpret-dream — the interpretation gateway endpoint.
//!
//! Pure request/response over the interpreter: no credits are checked and
//! no dream record is written here. Wire contract: `{ dreamText }` in,
//! `{ interpretation }` out, `{ error, details? }` with a non-2xx status
//! on failure.

use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};

use oneiro_core::DreamError;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct InterpretRequest {
    #[serde(rename = "dreamText", default)]
    pub dream_text: String,
}

#[derive(Serialize)]
pub struct InterpretResponse {
    pub interpretation: String,
}

pub async fn interpret_dream(
    State(state): State<AppState>,
    Json(req): Json<InterpretRequest>,
) -> Result<Json<InterpretResponse>, AppError> {
    let text = req.dream_text.trim();
    if text.is_empty() {
        return Err(DreamError::InvalidInput("Dream text is required".into()).into());
    }

    tracing::info!("interpreting dream, text length {}", text.len());
    let interpretation = state.interpreter.interpret(text).await?;

    Ok(Json(InterpretResponse { interpretation }))
}
