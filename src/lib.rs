//! Study Buddy - Rust Backend Library
//!
//! Backend of a study assistant that keeps one tutoring model per subject.
//! It includes:
//! - Command handlers for front ends
//! - The subject entity, the bounded subject cache and the chat flow
//! - Storage layer (subject records, JSON config)
//! - Model server client (Ollama)
//! - Data models and utilities

pub mod commands;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;

// Re-export commonly used items from commands
pub use commands::{
    // Init commands
    init_app, get_version,
    // Health commands
    get_health,
    // Settings commands
    get_settings, update_settings,
    // Subject commands
    list_subjects, create_subject, select_subject, get_primary_subject, list_flashcards,
    save_primary_subject,
    // Chat commands
    send_chat_message, generate_flashcards,
    // Terminal input
    parse_input, TerminalCommand,
};
pub use models::response::{CommandResponse, HealthResponse, SubjectView};
pub use models::settings::{AppConfig, SettingsUpdate};
pub use services::{
    ChatExchange, ChatService, ModelProvider, OllamaProvider, Subject, SubjectCatalog,
    SubjectLoader, MAX_RESIDENT_SUBJECTS,
};
pub use state::AppState;
pub use storage::{ConfigService, JsonSubjectStore, SubjectStore};
pub use utils::error::{AppError, AppResult};
