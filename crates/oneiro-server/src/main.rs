//! Dream Interpreter Server
//!
//! Serves the interpretation gateway endpoint and the dream submission API.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use oneiro_core::{DreamService, Interpreter};
use oneiro_llm::{
    create_llm_client, DreamInterpreter, GatewayClient, InterpreterBackend,
    UnconfiguredInterpreter,
};
use oneiro_postgres::PgStores;
use oneiro_server::{config::Config, router::build_router, state::AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "oneiro_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Dream Interpreter Server");

    let config = Config::from_env();

    // Database connection
    let pool = match sqlx::PgPool::connect(&config.database_url).await {
        Ok(p) => {
            tracing::info!("Database connection established");
            p
        }
        Err(e) => {
            tracing::error!(
                "Failed to connect to database at {}: {}",
                config.database_url,
                e
            );
            tracing::error!(
                "Please check DATABASE_URL environment variable and ensure PostgreSQL is running"
            );
            return Err(format!("Database connection failed: {}", e).into());
        }
    };

    let stores = PgStores::new(pool);
    let interpreter = build_interpreter(&config);

    let service = Arc::new(DreamService::new(
        stores.profiles,
        stores.dreams,
        stores.logs,
        interpreter.clone(),
    ));
    let state = AppState::new(service, interpreter);

    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Dream interpreter server running on http://{}", addr);
    tracing::info!("API Endpoints:");
    tracing::info!("  POST /interpret-dream        - interpretation gateway");
    tracing::info!("  POST /api/dreams             - submit a dream");
    tracing::info!("  GET  /api/dreams/:user_id    - recent submissions");
    tracing::info!("  GET  /api/credits/:user_id   - credit balance");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to {}: {}", addr, e);
            return Err(format!("Failed to bind to {}: {}", addr, e).into());
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        return Err(format!("Server error: {}", e).into());
    }

    Ok(())
}

/// Pick the interpreter implementation from configuration. A missing
/// provider key degrades to a responder that reports the configuration
/// error per request; startup itself never fails over it.
fn build_interpreter(config: &Config) -> Arc<dyn Interpreter> {
    if let Some(url) = &config.gateway_url {
        tracing::info!("Using remote interpretation gateway at {}", url);
        return Arc::new(GatewayClient::new(url.clone()));
    }

    let key = match config.backend {
        InterpreterBackend::OpenAi => config.openai_api_key.clone(),
        InterpreterBackend::Anthropic => config.anthropic_api_key.clone(),
    };

    match key {
        Some(key) => {
            tracing::info!("Using {} interpretation backend", config.backend.name());
            Arc::new(DreamInterpreter::new(create_llm_client(
                config.backend,
                key,
            )))
        }
        None => {
            let reason = format!("{} API key not configured", config.backend.name());
            tracing::warn!("{}; interpretation requests will fail", reason);
            Arc::new(UnconfiguredInterpreter::new(reason))
        }
    }
}
