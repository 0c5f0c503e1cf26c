//! Server configuration from environment variables.

use oneiro_llm::InterpreterBackend;

pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub backend: InterpreterBackend,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    /// When set, the workflow calls this remote interpret endpoint instead
    /// of an in-process provider client.
    pub gateway_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        let backend = InterpreterBackend::from_env().unwrap_or_else(|e| {
            tracing::warn!("invalid INTERPRETER_BACKEND, using default: {}", e);
            InterpreterBackend::default()
        });

        Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgresql:///oneiro".to_string()),
            port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            backend,
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY").ok(),
            gateway_url: std::env::var("GATEWAY_URL").ok(),
        }
    }
}
