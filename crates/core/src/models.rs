//! Subject Data Model
//!
//! Messages, flashcards and the persisted subject record.

use serde::{Deserialize, Serialize};

/// Identifier of a subject, unique across all subjects.
pub type SubjectId = u32;

/// Author of a transcript message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

impl Sender {
    /// Chat role understood by the model server
    pub fn role(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Ai => "assistant",
        }
    }
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Ai => write!(f, "ai"),
        }
    }
}

/// One entry of a subject's chat transcript.
///
/// `id` is the message's position in the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: usize,
    pub sender: Sender,
    pub content: String,
}

impl Message {
    /// Create a user message; the id is assigned when it is appended
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: 0,
            sender: Sender::User,
            content: content.into(),
        }
    }

    /// Create a model reply message
    pub fn ai(content: impl Into<String>) -> Self {
        Self {
            id: 0,
            sender: Sender::Ai,
            content: content.into(),
        }
    }
}

/// A question/answer pair attached to a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub id: usize,
    pub question: String,
    pub answer: String,
}

/// Lightweight listing projection of a subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectSignature {
    pub id: SubjectId,
    pub name: String,
    pub description: String,
}

impl SubjectSignature {
    pub fn new(id: SubjectId, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Persisted form of a subject.
///
/// Older records carry only `id`, `name` and `desc`; the transcript and
/// flashcards then default to empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRecord {
    pub id: SubjectId,
    pub name: String,
    #[serde(rename = "desc", default)]
    pub description: String,
    #[serde(rename = "conversations", default)]
    pub messages: Vec<Message>,
    #[serde(rename = "cards", default)]
    pub flashcards: Vec<Flashcard>,
}

impl SubjectRecord {
    /// Create a record for a brand new subject
    pub fn new(id: SubjectId, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            messages: Vec::new(),
            flashcards: Vec::new(),
        }
    }

    /// Listing projection of this record
    pub fn signature(&self) -> SubjectSignature {
        SubjectSignature::new(self.id, self.name.clone(), self.description.clone())
    }
}

/// Name of the model bound to a subject.
///
/// First three characters of the name with spaces removed, a dash, then the id.
pub fn model_identifier(name: &str, id: SubjectId) -> String {
    let prefix: String = name.chars().filter(|c| *c != ' ').take(3).collect();
    format!("{}-{}", prefix, id)
}
