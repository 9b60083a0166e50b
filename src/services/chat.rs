//! Chat Flow
//!
//! One chat exchange on the primary subject: stream the tutor's reply, pull
//! any flashcards out of it once, and queue the subject for saving.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use study_buddy_core::{
    contains_flashcard_marker, strip_flashcard_segment, Flashcard, Message, SubjectId,
    OPEN_MARKER,
};

use crate::services::loader::SubjectLoader;
use crate::utils::error::{AppError, AppResult};

/// Progress of a reply that is still streaming
#[derive(Debug, Clone, Copy)]
pub struct ChatChunk<'a> {
    /// Reply text so far, without any flashcard segment
    pub text: &'a str,
    /// The reply has started emitting flashcards
    pub generating_flashcards: bool,
}

/// Outcome of one exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatExchange {
    pub subject_id: SubjectId,
    /// Reply exactly as the model produced it
    pub raw_reply: String,
    /// Reply with the flashcard segment removed
    pub display_reply: String,
    /// Flashcards added by this exchange
    pub flashcards: Vec<Flashcard>,
}

/// Display text for a partial reply.
///
/// Hides a complete flashcard segment, and everything after an opening marker
/// whose closing marker has not streamed in yet.
pub fn streaming_display(text: &str) -> String {
    let stripped = strip_flashcard_segment(text);
    match stripped.find(OPEN_MARKER) {
        Some(open) => stripped[..open].to_string(),
        None => stripped,
    }
}

/// Runs chat exchanges against whichever subject is primary
#[derive(Debug, Clone)]
pub struct ChatService {
    loader: Arc<SubjectLoader>,
}

impl ChatService {
    pub fn new(loader: Arc<SubjectLoader>) -> Self {
        Self { loader }
    }

    /// Send `content` to the primary subject.
    ///
    /// `on_chunk` sees the display form of the reply as it grows. Flashcards
    /// are extracted exactly once from the finished reply; a malformed
    /// flashcard segment is logged and yields no cards rather than failing
    /// the exchange.
    pub async fn send<F>(&self, content: &str, mut on_chunk: F) -> AppResult<ChatExchange>
    where
        F: FnMut(ChatChunk<'_>) + Send,
    {
        let subject = self.loader.get_primary().await?;

        let raw_reply = subject
            .send_message(Message::user(content), |partial| {
                let display = streaming_display(partial);
                on_chunk(ChatChunk {
                    text: &display,
                    generating_flashcards: contains_flashcard_marker(partial),
                });
            })
            .await?;

        let flashcards = match subject.parse_flashcards(&raw_reply).await {
            Ok(cards) => cards,
            Err(AppError::FlashcardFormat(message)) => {
                warn!(
                    subject_id = subject.id(),
                    error = %message,
                    "ignoring malformed flashcards in reply"
                );
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        self.loader.schedule_save(subject.id()).await?;
        debug!(
            subject_id = subject.id(),
            flashcards = flashcards.len(),
            "chat exchange complete"
        );

        Ok(ChatExchange {
            subject_id: subject.id(),
            display_reply: strip_flashcard_segment(&raw_reply),
            raw_reply,
            flashcards,
        })
    }

    /// Ask the primary subject's model for flashcards about `topic`
    pub async fn generate_flashcards(&self, topic: &str) -> AppResult<Vec<Flashcard>> {
        let subject = self.loader.get_primary().await?;
        let cards = subject.request_flashcards(topic).await?;
        if !cards.is_empty() {
            self.loader.schedule_save(subject.id()).await?;
        }
        Ok(cards)
    }
}
