//! Router construction.

use axum::{
    http::{header, HeaderName, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers;
use crate::state::AppState;

/// Build the full axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    // Matches the gateway's published CORS contract: any origin, and the
    // auth/apikey headers a browser client sends alongside content-type.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ]);

    Router::new()
        .route("/health", get(handlers::health::health))
        .route(
            "/interpret-dream",
            post(handlers::interpret::interpret_dream),
        )
        .route("/api/dreams", post(handlers::dreams::submit_dream))
        .route("/api/dreams/:user_id", get(handlers::dreams::list_dreams))
        .route("/api/credits/:user_id", get(handlers::credits::get_credits))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
