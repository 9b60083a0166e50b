//! Study Buddy Core
//!
//! Foundational types for the Study Buddy workspace. This crate has no
//! dependency on storage, the async runtime or any model provider, so the
//! data model and the flashcard protocol can be tested in isolation.
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `models` - Subject, message and flashcard data model
//! - `flashcards` - The `<<<` / `>>>` flashcard extraction protocol
//! - `notify` - Callback registries with scoped subscriptions
//! - `streaming` - Chat stream event type shared with model providers

pub mod error;
pub mod flashcards;
pub mod models;
pub mod notify;
pub mod streaming;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Data Model ─────────────────────────────────────────────────────────
pub use models::{
    model_identifier, Flashcard, Message, Sender, SubjectId, SubjectRecord, SubjectSignature,
};

// ── Flashcard Protocol ─────────────────────────────────────────────────
pub use flashcards::{
    contains_flashcard_marker, extract_flashcards, strip_flashcard_segment, tutor_system_prompt,
    FlashcardDraft, CLOSE_MARKER, OPEN_MARKER,
};

// ── Notifications ──────────────────────────────────────────────────────
pub use notify::{Subscribers, Subscription, SubscriptionId};

// ── Streaming Types ────────────────────────────────────────────────────
pub use streaming::ChatStreamEvent;
