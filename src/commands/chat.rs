//! Chat Commands
//!
//! Commands for talking to the primary subject's tutor.

use study_buddy_core::Flashcard;

use crate::models::response::CommandResponse;
use crate::services::{ChatChunk, ChatExchange};
use crate::state::AppState;

/// Send a message to the primary subject, streaming the reply to `on_chunk`
pub async fn send_chat_message<F>(
    state: &AppState,
    content: &str,
    on_chunk: F,
) -> CommandResponse<ChatExchange>
where
    F: FnMut(ChatChunk<'_>) + Send,
{
    match state.chat().await {
        Ok(chat) => chat.send(content, on_chunk).await.into(),
        Err(e) => CommandResponse::err(e.to_string()),
    }
}

/// Ask the primary subject's tutor for flashcards about a topic
pub async fn generate_flashcards(state: &AppState, topic: &str) -> CommandResponse<Vec<Flashcard>> {
    match state.chat().await {
        Ok(chat) => chat.generate_flashcards(topic).await.into(),
        Err(e) => CommandResponse::err(e.to_string()),
    }
}
