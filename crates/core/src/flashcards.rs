//! Flashcard Extraction Protocol
//!
//! Subject models are told to wrap flashcards in a single delimited segment:
//! `<<<` followed by a JSON array of `{"question", "answer"}` objects, then
//! `>>>`. The rest of the reply is free-form teaching prose.
//!
//! Only the first `<<<` and the first `>>>` are considered. A reply without
//! either marker simply carries no flashcards; a closing marker ahead of the
//! opening one, or a payload that is not the expected JSON, is a format error.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Marker opening a flashcard segment
pub const OPEN_MARKER: &str = "<<<";

/// Marker closing a flashcard segment
pub const CLOSE_MARKER: &str = ">>>";

/// A flashcard as emitted by the model, before it is numbered by a subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashcardDraft {
    pub question: String,
    pub answer: String,
}

impl FlashcardDraft {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Byte offsets of the first opening marker and the first closing marker.
///
/// `Ok(None)` when either marker is missing.
fn segment_bounds(text: &str) -> CoreResult<Option<(usize, usize)>> {
    let (Some(open), Some(close)) = (text.find(OPEN_MARKER), text.find(CLOSE_MARKER)) else {
        return Ok(None);
    };

    if close < open + OPEN_MARKER.len() {
        return Err(CoreError::flashcard_format(format!(
            "closing marker at byte {} precedes opening marker at byte {}",
            close, open
        )));
    }

    Ok(Some((open, close)))
}

/// Extract the flashcards carried by a model reply.
///
/// Returns an empty list when the reply has no delimited segment.
pub fn extract_flashcards(text: &str) -> CoreResult<Vec<FlashcardDraft>> {
    let Some((open, close)) = segment_bounds(text)? else {
        return Ok(Vec::new());
    };

    let payload = &text[open + OPEN_MARKER.len()..close];
    serde_json::from_str::<Vec<FlashcardDraft>>(payload.trim()).map_err(|e| {
        CoreError::flashcard_format(format!("invalid flashcard payload: {}", e))
    })
}

/// Whether the reply has started a flashcard segment.
///
/// Useful while a reply is still streaming and the closing marker has not
/// arrived yet.
pub fn contains_flashcard_marker(text: &str) -> bool {
    text.contains(OPEN_MARKER)
}

/// Remove the flashcard segment (markers included) from a reply for display.
///
/// Text without a well-formed segment is returned unchanged.
pub fn strip_flashcard_segment(text: &str) -> String {
    match segment_bounds(text) {
        Ok(Some((open, close))) => {
            let mut stripped = String::with_capacity(text.len());
            stripped.push_str(&text[..open]);
            stripped.push_str(&text[close + CLOSE_MARKER.len()..]);
            stripped
        }
        _ => text.to_string(),
    }
}

/// System prompt for a subject's dedicated model.
pub fn tutor_system_prompt(subject_name: &str) -> String {
    format!(
        "You are a patient tutor for the subject \"{name}\". Guide the student towards \
answers instead of handing them over, keep explanations short unless a longer one is \
needed, and follow instructions closely. When you create flashcards, emit them once, \
as a JSON array of objects with \"question\" and \"answer\" keys wrapped in triple \
angle brackets, exactly like this example: {open}[{{\"question\": \"What is 1 + 1?\", \"answer\": \
\"2\"}}, {{\"question\": \"What is 2 + 2?\", \"answer\": \"4\"}}]{close}",
        name = subject_name,
        open = OPEN_MARKER,
        close = CLOSE_MARKER,
    )
}
