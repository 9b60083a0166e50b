//! LLM Provider Module
//!
//! Interface to the model server that hosts one dedicated model per subject.
//! Ollama (local inference) is the only implementation.

pub mod ollama;
pub mod provider;
pub mod types;

// Re-export main types
pub use ollama::OllamaProvider;
pub use provider::ModelProvider;
pub use types::*;
