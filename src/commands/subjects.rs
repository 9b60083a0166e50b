//! Subject Commands
//!
//! Commands for listing, creating and switching subjects.

use study_buddy_core::{Flashcard, SubjectId, SubjectSignature};

use crate::models::response::{CommandResponse, SubjectView};
use crate::services::Subject;
use crate::state::AppState;
use crate::utils::error::AppResult;

async fn subject_view(subject: &Subject) -> SubjectView {
    SubjectView {
        id: subject.id(),
        name: subject.name().to_string(),
        description: subject.description().to_string(),
        model: subject.model_identifier().to_string(),
        messages: subject.messages().await,
        flashcards: subject.flashcards().await,
    }
}

/// List every stored subject
pub async fn list_subjects(state: &AppState) -> CommandResponse<Vec<SubjectSignature>> {
    async fn run(state: &AppState) -> AppResult<Vec<SubjectSignature>> {
        state.catalog().await?.list_subjects().await
    }
    run(state).await.into()
}

/// Create a subject and its tutor model
pub async fn create_subject(
    state: &AppState,
    name: &str,
    description: &str,
) -> CommandResponse<SubjectSignature> {
    async fn run(state: &AppState, name: &str, description: &str) -> AppResult<SubjectSignature> {
        state
            .catalog()
            .await?
            .create_subject(name, description)
            .await
    }
    run(state, name, description).await.into()
}

/// Make a subject primary and return it
pub async fn select_subject(state: &AppState, id: SubjectId) -> CommandResponse<SubjectView> {
    async fn run(state: &AppState, id: SubjectId) -> AppResult<SubjectView> {
        let subject = state.loader().await?.set_primary(id).await?;
        Ok(subject_view(&subject).await)
    }
    run(state, id).await.into()
}

/// Get the primary subject
pub async fn get_primary_subject(state: &AppState) -> CommandResponse<SubjectView> {
    async fn run(state: &AppState) -> AppResult<SubjectView> {
        let subject = state.loader().await?.get_primary().await?;
        Ok(subject_view(&subject).await)
    }
    run(state).await.into()
}

/// Flashcards of the primary subject
pub async fn list_flashcards(state: &AppState) -> CommandResponse<Vec<Flashcard>> {
    async fn run(state: &AppState) -> AppResult<Vec<Flashcard>> {
        let subject = state.loader().await?.get_primary().await?;
        Ok(subject.flashcards().await)
    }
    run(state).await.into()
}

/// Write the primary subject to disk now
pub async fn save_primary_subject(state: &AppState) -> CommandResponse<()> {
    async fn run(state: &AppState) -> AppResult<()> {
        state.loader().await?.save_primary().await
    }
    run(state).await.into()
}
