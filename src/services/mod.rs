//! Services
//!
//! Business logic of the study assistant: the subject entity, the loader
//! cache around it, and the catalog and chat flows built on top.

pub mod catalog;
pub mod chat;
pub mod llm;
pub mod loader;
pub mod persist_queue;
pub mod subject;

pub use catalog::SubjectCatalog;
pub use chat::{streaming_display, ChatChunk, ChatExchange, ChatService};
pub use llm::{ModelProvider, OllamaProvider};
pub use loader::{SubjectLoader, MAX_RESIDENT_SUBJECTS};
pub use persist_queue::PersistQueue;
pub use subject::Subject;
