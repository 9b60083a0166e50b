//! Model Provider Trait
//!
//! Defines the interface to the model server that backs every subject.

use async_trait::async_trait;
use tokio::sync::mpsc;

use study_buddy_core::ChatStreamEvent;

use super::types::{ChatTurn, LlmError, LlmResult};

/// Trait that model providers must implement.
///
/// Provides a unified interface for:
/// - Single completions (chat)
/// - Streaming completions (stream_chat)
/// - Provisioning a subject-bound model (create_model)
/// - Health checking
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Returns the provider name for identification.
    fn name(&self) -> &'static str;

    /// Send a transcript to `model` and get the complete reply.
    async fn chat(&self, model: &str, turns: Vec<ChatTurn>) -> LlmResult<String>;

    /// Stream a reply via a channel.
    ///
    /// Emits one `TextDelta` per received chunk and `Complete` once the model
    /// is done, then returns the full reply. A stream that breaks off is an
    /// error, not a short reply.
    async fn stream_chat(
        &self,
        model: &str,
        turns: Vec<ChatTurn>,
        tx: mpsc::Sender<ChatStreamEvent>,
    ) -> LlmResult<String>;

    /// Provision `model` from `base_model` with a fixed system prompt.
    async fn create_model(
        &self,
        model: &str,
        base_model: &str,
        system_prompt: &str,
    ) -> LlmResult<()>;

    /// Check if the model server is reachable.
    async fn health_check(&self) -> LlmResult<()>;
}

/// Helper function to parse HTTP error status codes
pub fn parse_http_error(status: u16, body: &str, model: &str) -> LlmError {
    match status {
        404 => LlmError::ModelNotFound {
            model: model.to_string(),
        },
        400 => LlmError::InvalidRequest {
            message: body.to_string(),
        },
        500..=599 => LlmError::ServerError {
            message: body.to_string(),
            status: Some(status),
        },
        _ => LlmError::Other {
            message: format!("HTTP {}: {}", status, body),
        },
    }
}
