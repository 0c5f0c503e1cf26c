//! Adapters onto the core `Interpreter` port.
//!
//! `DreamInterpreter` drives a provider client in-process;
//! `GatewayClient` calls a remote interpretation endpoint over HTTP;
//! `UnconfiguredInterpreter` stands in when no provider key is available,
//! turning every request into a configuration error instead of a crash.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use oneiro_core::error::{DreamError, Result};
use oneiro_core::ports::Interpreter;

use crate::llm_client::LlmClient;
use crate::REQUEST_TIMEOUT;

/// System prompt handed to the provider. The content is an external
/// collaborator's concern; only the contract (text in, text out) matters
/// here.
pub const INTERPRETER_SYSTEM_PROMPT: &str = "You are a skilled dream interpreter with deep knowledge of psychology, symbolism, and dream analysis. Consider both universal symbols and personal context, offer multiple possible interpretations when appropriate, and acknowledge the subjective nature of dream interpretation. Format your response in clear paragraphs.";

/// Interpreter backed by an in-process LLM client.
pub struct DreamInterpreter {
    client: Arc<dyn LlmClient>,
}

impl DreamInterpreter {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Interpreter for DreamInterpreter {
    async fn interpret(&self, dream_text: &str) -> Result<String> {
        tracing::debug!(
            "requesting interpretation from {} ({})",
            self.client.provider_name(),
            self.client.model_name()
        );

        let interpretation = self
            .client
            .chat(INTERPRETER_SYSTEM_PROMPT, dream_text)
            .await
            .map_err(|e| DreamError::Interpretation(e.to_string()))?;

        if interpretation.trim().is_empty() {
            return Err(DreamError::Interpretation(
                "no interpretation received from the model".into(),
            ));
        }
        Ok(interpretation)
    }
}

/// Interpreter that calls a remote interpretation endpoint speaking the
/// `{dreamText}` → `{interpretation}` / `{error, details}` wire contract.
pub struct GatewayClient {
    endpoint: String,
    client: reqwest::Client,
}

impl GatewayClient {
    /// `endpoint` is the full URL of the remote interpret function.
    pub fn new(endpoint: String) -> Self {
        Self {
            endpoint,
            client: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[derive(Serialize)]
struct GatewayRequest<'a> {
    #[serde(rename = "dreamText")]
    dream_text: &'a str,
}

#[derive(Deserialize)]
struct GatewayResponse {
    interpretation: Option<String>,
}

#[derive(Deserialize)]
struct GatewayErrorBody {
    error: String,
    details: Option<String>,
}

#[async_trait]
impl Interpreter for GatewayClient {
    async fn interpret(&self, dream_text: &str) -> Result<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .timeout(REQUEST_TIMEOUT)
            .json(&GatewayRequest { dream_text })
            .send()
            .await
            .map_err(|e| DreamError::Interpretation(format!("gateway request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let message = match response.json::<GatewayErrorBody>().await {
                Ok(body) => match body.details {
                    Some(details) => format!("{} ({})", body.error, details),
                    None => body.error,
                },
                Err(_) => format!("gateway returned {}", status),
            };
            return Err(DreamError::Interpretation(message));
        }

        let body: GatewayResponse = response
            .json()
            .await
            .map_err(|e| DreamError::Interpretation(format!("invalid gateway response: {}", e)))?;

        body.interpretation
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| {
                DreamError::Interpretation("no interpretation received from the gateway".into())
            })
    }
}

/// Placeholder used when no provider API key is configured. Requests fail
/// with a configuration error response rather than aborting the process.
pub struct UnconfiguredInterpreter {
    reason: String,
}

impl UnconfiguredInterpreter {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Interpreter for UnconfiguredInterpreter {
    async fn interpret(&self, _dream_text: &str) -> Result<String> {
        Err(DreamError::Config(self.reason.clone()))
    }
}
