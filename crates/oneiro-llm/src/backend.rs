//! Backend Selection
//!
//! Enum for selecting between LLM providers (OpenAI, Anthropic).

use anyhow::{anyhow, Result};
use std::str::FromStr;
use std::sync::Arc;

use crate::anthropic_client::AnthropicClient;
use crate::llm_client::LlmClient;
use crate::openai_client::OpenAiClient;

/// LLM backend provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpreterBackend {
    /// OpenAI GPT (default)
    #[default]
    OpenAi,
    /// Anthropic Claude
    Anthropic,
}

impl InterpreterBackend {
    /// Create from the INTERPRETER_BACKEND environment variable
    ///
    /// Valid values: "openai", "gpt", "anthropic", "claude"
    /// Defaults to OpenAI if not set
    pub fn from_env() -> Result<Self> {
        let value = std::env::var("INTERPRETER_BACKEND").unwrap_or_else(|_| "openai".to_string());
        value
            .parse()
            .map_err(|e: ParseBackendError| anyhow!("{}", e))
    }

    /// Get display name
    pub fn name(&self) -> &'static str {
        match self {
            InterpreterBackend::OpenAi => "OpenAI",
            InterpreterBackend::Anthropic => "Anthropic",
        }
    }
}

/// Error type for parsing InterpreterBackend
#[derive(Debug)]
pub struct ParseBackendError(String);

impl std::fmt::Display for ParseBackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ParseBackendError {}

impl FromStr for InterpreterBackend {
    type Err = ParseBackendError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" | "gpt" => Ok(InterpreterBackend::OpenAi),
            "anthropic" | "claude" => Ok(InterpreterBackend::Anthropic),
            other => Err(ParseBackendError(format!(
                "unknown interpreter backend: {} (expected openai or anthropic)",
                other
            ))),
        }
    }
}

/// Build the LLM client for a backend, taking the key from the caller.
pub fn create_llm_client(
    backend: InterpreterBackend,
    api_key: String,
) -> Arc<dyn LlmClient> {
    match backend {
        InterpreterBackend::OpenAi => Arc::new(OpenAiClient::new(api_key)),
        InterpreterBackend::Anthropic => Arc::new(AnthropicClient::new(api_key)),
    }
}
