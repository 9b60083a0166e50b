//! Core Error Types
//!
//! Errors raised by the dependency-light core crate. The application crate
//! folds these into its own `AppError`.

use thiserror::Error;

/// Core error type for the Study Buddy workspace.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The delimited flashcard segment is ill-formed or holds malformed JSON
    #[error("Flashcard format error: {0}")]
    FlashcardFormat(String),
}

/// Result type alias for core errors
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Create a flashcard format error
    pub fn flashcard_format(msg: impl Into<String>) -> Self {
        Self::FlashcardFormat(msg.into())
    }
}

/// Convert CoreError to a string
impl From<CoreError> for String {
    fn from(err: CoreError) -> String {
        err.to_string()
    }
}
