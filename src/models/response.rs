//! Response Types
//!
//! Standard response types returned by command handlers to front ends.

use serde::{Deserialize, Serialize};

use study_buddy_core::{Flashcard, Message, SubjectId};

/// Generic command response for all commands
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> CommandResponse<T> {
    /// Create a successful response with data
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response with message
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

impl<T> From<Result<T, crate::utils::error::AppError>> for CommandResponse<T> {
    fn from(result: Result<T, crate::utils::error::AppError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::err(e.to_string()),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub service: String,
    pub config: bool,
    pub model_server: bool,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            service: "study-buddy".to_string(),
            config: false,
            model_server: false,
        }
    }
}

/// The primary subject as a front end shows it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectView {
    pub id: SubjectId,
    pub name: String,
    pub description: String,
    pub model: String,
    pub messages: Vec<Message>,
    pub flashcards: Vec<Flashcard>,
}
