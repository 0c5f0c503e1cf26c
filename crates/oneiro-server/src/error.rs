//! Error-to-response mapping for all handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

use oneiro_core::DreamError;

/// Wrapper giving `DreamError` an HTTP rendering; handlers return
/// `Result<Json<_>, AppError>` and use `?`.
pub struct AppError(pub DreamError);

impl From<DreamError> for AppError {
    fn from(err: DreamError) -> Self {
        Self(err)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let (error, details) = match &self.0 {
            // Upstream detail goes into `details`, mirroring the gateway
            // wire contract.
            DreamError::Interpretation(detail) => {
                ("Failed to interpret dream".to_string(), Some(detail.clone()))
            }
            // Transport internals stay in the logs, not the response.
            DreamError::Storage(e) => {
                tracing::error!("storage failure: {}", e);
                ("Storage failure".to_string(), None)
            }
            other => (other.to_string(), None),
        };

        (status, Json(ErrorBody { error, details })).into_response()
    }
}
