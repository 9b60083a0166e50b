//! Ollama Provider
//!
//! Implementation of the ModelProvider trait for Ollama local inference
//! using the ollama-rs native SDK. Chat and streaming chat go through the
//! SDK; provisioning a subject model posts to `/api/create` directly.

use async_trait::async_trait;
use ollama_rs::generation::chat::request::ChatMessageRequest;
use ollama_rs::generation::chat::{ChatMessage, MessageRole as OllamaRole};
use ollama_rs::models::ModelOptions;
use ollama_rs::Ollama;
use serde_json::json;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};

use study_buddy_core::ChatStreamEvent;

use super::provider::{parse_http_error, ModelProvider};
use super::types::{ChatRole, ChatTurn, LlmError, LlmResult, ProviderConfig};

/// Default Ollama port when the base URL carries none
const OLLAMA_DEFAULT_PORT: u16 = 11434;

/// Ollama provider for local inference using the native ollama-rs SDK
pub struct OllamaProvider {
    config: ProviderConfig,
    client: Ollama,
    http: reqwest::Client,
}

impl OllamaProvider {
    /// Create a new Ollama provider with the given configuration
    pub fn new(config: ProviderConfig) -> Self {
        let client = Self::create_client(&config.base_url);
        Self {
            config,
            client,
            http: reqwest::Client::new(),
        }
    }

    /// Create an Ollama SDK client from a base URL string.
    ///
    /// Parses the URL to extract host and port for `Ollama::new()`.
    /// Falls back to `Ollama::default()` if parsing fails.
    fn create_client(base_url: &str) -> Ollama {
        if let Ok(parsed) = url::Url::parse(base_url) {
            let scheme = parsed.scheme();
            let host = parsed.host_str().unwrap_or("localhost");
            let port = parsed.port().unwrap_or(OLLAMA_DEFAULT_PORT);
            // Ollama::new takes host and port separately
            Ollama::new(format!("{}://{}", scheme, host), port)
        } else {
            Ollama::default()
        }
    }

    /// Get the base URL for the Ollama server (used in error messages)
    fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Map an SDK error message onto an LlmError
    fn classify_error(&self, model: &str, msg: String) -> LlmError {
        if msg.contains("connect") || msg.contains("Connection refused") {
            LlmError::ProviderUnavailable {
                message: format!("Cannot connect to Ollama at {}: {}", self.base_url(), msg),
            }
        } else if msg.contains("not found") || msg.contains("404") {
            LlmError::ModelNotFound {
                model: model.to_string(),
            }
        } else {
            LlmError::NetworkError { message: msg }
        }
    }

    /// Build a ChatMessageRequest from our chat turns
    fn build_chat_request(&self, model: &str, turns: &[ChatTurn]) -> ChatMessageRequest {
        let messages: Vec<ChatMessage> = turns
            .iter()
            .map(|turn| {
                let role = match turn.role {
                    ChatRole::User => OllamaRole::User,
                    ChatRole::Assistant => OllamaRole::Assistant,
                };
                ChatMessage::new(role, turn.content.clone())
            })
            .collect();

        ChatMessageRequest::new(model.to_string(), messages)
            .options(ModelOptions::default().temperature(self.config.temperature))
    }

    fn endpoint(&self, path: &str) -> LlmResult<url::Url> {
        url::Url::parse(self.base_url())
            .and_then(|base| base.join(path))
            .map_err(|e| LlmError::InvalidRequest {
                message: format!("Invalid Ollama URL {}: {}", self.base_url(), e),
            })
    }
}

#[async_trait]
impl ModelProvider for OllamaProvider {
    fn name(&self) -> &'static str {
        "ollama"
    }

    async fn chat(&self, model: &str, turns: Vec<ChatTurn>) -> LlmResult<String> {
        let request = self.build_chat_request(model, &turns);

        let response = self
            .client
            .send_chat_messages(request)
            .await
            .map_err(|e| self.classify_error(model, e.to_string()))?;

        Ok(response.message.content)
    }

    async fn stream_chat(
        &self,
        model: &str,
        turns: Vec<ChatTurn>,
        tx: mpsc::Sender<ChatStreamEvent>,
    ) -> LlmResult<String> {
        let request = self.build_chat_request(model, &turns);

        let mut stream = self
            .client
            .send_chat_messages_stream(request)
            .await
            .map_err(|e| self.classify_error(model, e.to_string()))?;

        let mut accumulated = String::new();
        while let Some(chunk_result) = stream.next().await {
            match chunk_result {
                Ok(response) => {
                    if !response.message.content.is_empty() {
                        accumulated.push_str(&response.message.content);
                        let _ = tx
                            .send(ChatStreamEvent::text(response.message.content.clone()))
                            .await;
                    }
                    if response.done {
                        break;
                    }
                }
                Err(_) => {
                    warn!(model, received = accumulated.len(), "stream error from Ollama");
                    let _ = tx
                        .send(ChatStreamEvent::Error {
                            message: "Stream error from Ollama".to_string(),
                            code: None,
                        })
                        .await;
                    return Err(LlmError::StreamInterrupted {
                        message: format!("Ollama stream for {} broke off", model),
                    });
                }
            }
        }

        let _ = tx.send(ChatStreamEvent::Complete).await;
        debug!(model, length = accumulated.len(), "stream complete");
        Ok(accumulated)
    }

    async fn create_model(
        &self,
        model: &str,
        base_model: &str,
        system_prompt: &str,
    ) -> LlmResult<()> {
        let url = self.endpoint("api/create")?;
        let body = json!({
            "model": model,
            "from": base_model,
            "system": system_prompt,
            "stream": false,
        });

        info!(model, base_model, "creating Ollama model");
        let response = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify_error(model, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(parse_http_error(status.as_u16(), &text, model));
        }

        Ok(())
    }

    async fn health_check(&self) -> LlmResult<()> {
        // Use the SDK's list_local_models as a health check
        self.client.list_local_models().await.map_err(|e| {
            let msg = e.to_string();
            if msg.contains("connect") || msg.contains("Connection refused") {
                LlmError::ProviderUnavailable {
                    message: format!("Cannot connect to Ollama at {}", self.base_url()),
                }
            } else {
                LlmError::NetworkError { message: msg }
            }
        })?;

        Ok(())
    }
}
