//! Error Handling
//!
//! Unified error types for the application.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

use study_buddy_core::{CoreError, SubjectId};

use crate::services::llm::LlmError;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Requested subject is absent from storage, or not resident when residency is required
    #[error("Subject not found: {0}")]
    SubjectNotFound(SubjectId),

    /// The model server rejected a request or its stream broke off
    #[error("Model communication error: {0}")]
    ModelCommunication(String),

    /// The flashcard segment of a reply is missing a piece or holds malformed JSON
    #[error("Flashcard format error: {0}")]
    FlashcardFormat(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create a model communication error
    pub fn model_communication(msg: impl Into<String>) -> Self {
        Self::ModelCommunication(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::FlashcardFormat(msg) => Self::FlashcardFormat(msg),
        }
    }
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        Self::ModelCommunication(err.to_string())
    }
}

/// Convert AppError to a string suitable for front-end responses
impl From<AppError> for String {
    fn from(err: AppError) -> String {
        err.to_string()
    }
}
