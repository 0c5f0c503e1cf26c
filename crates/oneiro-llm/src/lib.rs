//! LLM clients and interpretation adapters.
//!
//! This crate turns a provider chat API into the `oneiro_core::Interpreter`
//! port. It has no database dependencies — orchestration with storage stays
//! in the consumer.
//!
//! ## Backend Selection
//!
//! Set the `INTERPRETER_BACKEND` environment variable:
//! - `openai` (default): OpenAI API
//! - `anthropic`: Anthropic Claude API

// LLM client abstraction
pub mod anthropic_client;
pub mod backend;
pub mod llm_client;
pub mod openai_client;

// Interpreter-port adapters
pub mod interpreter;

// Re-exports for convenience
pub use anthropic_client::AnthropicClient;
pub use backend::{create_llm_client, InterpreterBackend};
pub use interpreter::{DreamInterpreter, GatewayClient, UnconfiguredInterpreter};
pub use llm_client::LlmClient;
pub use openai_client::OpenAiClient;

use std::time::Duration;

/// Bound on every outbound provider/gateway call. A single attempt per
/// submission — retries could double-charge.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
