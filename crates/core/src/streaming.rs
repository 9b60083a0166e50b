//! Chat Stream Events
//!
//! Provider-agnostic events emitted while a model reply streams in. Model
//! providers send these over a channel; the subject entity folds them into
//! the accumulated reply.

use serde::{Deserialize, Serialize};

/// Streaming event emitted by a model provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatStreamEvent {
    /// Text content delta from the model
    TextDelta { content: String },

    /// Error during streaming
    Error {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        code: Option<String>,
    },

    /// Stream complete
    Complete,
}

impl ChatStreamEvent {
    /// Create a text delta event
    pub fn text(content: impl Into<String>) -> Self {
        Self::TextDelta {
            content: content.into(),
        }
    }
}
