//! App Flow Integration Tests
//!
//! Subject creation, chat exchanges and shutdown through `AppState` and the
//! command handlers.

use std::sync::Arc;

use study_buddy::commands;
use study_buddy::state::AppState;
use study_buddy::storage::{ConfigService, JsonSubjectStore, SubjectStore};

use crate::support::ScriptedTutor;

async fn app(dir: &tempfile::TempDir, tutor: Arc<ScriptedTutor>) -> AppState {
    let state = AppState::new();
    let config = ConfigService::with_path(dir.path().join("config.json")).unwrap();
    let store = Arc::new(JsonSubjectStore::with_dir(dir.path().join("subjects")));
    state.initialize_with(config, store, tutor).await.unwrap();
    state
}

#[tokio::test]
async fn test_create_select_chat_and_restart() {
    let dir = tempfile::tempdir().unwrap();
    let tutor = Arc::new(ScriptedTutor::new());
    tutor.queue_reply(
        "Photosynthesis turns light into sugar. \
         <<<[{\"question\":\"Photosynthesis makes?\",\"answer\":\"Sugar\"}]>>>",
    );

    {
        let state = app(&dir, tutor.clone()).await;

        let created = commands::create_subject(&state, "Plant Biology", "Botany")
            .await
            .data
            .unwrap();
        assert_eq!(created.id, 1);
        assert_eq!(*tutor.created_models.lock().unwrap(), vec!["Pla-1".to_string()]);

        let view = commands::select_subject(&state, 1).await.data.unwrap();
        assert_eq!(view.model, "Pla-1");

        let mut chunks = 0;
        let exchange = commands::send_chat_message(&state, "Explain photosynthesis", |_| {
            chunks += 1
        })
        .await
        .data
        .unwrap();

        assert!(chunks > 1);
        assert_eq!(
            exchange.display_reply.trim(),
            "Photosynthesis turns light into sugar."
        );
        assert_eq!(exchange.flashcards.len(), 1);

        let (model, turns) = tutor.requests.lock().unwrap()[0].clone();
        assert_eq!(model, "Pla-1");
        assert_eq!(turns.len(), 1);

        state.shutdown().await.unwrap();
    }

    let state = app(&dir, tutor.clone()).await;
    let cards = {
        commands::select_subject(&state, 1).await;
        commands::list_flashcards(&state).await.data.unwrap()
    };
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].answer, "Sugar");

    let view = commands::get_primary_subject(&state).await.data.unwrap();
    assert_eq!(view.messages.len(), 2);
}

#[tokio::test]
async fn test_offline_model_server() {
    let dir = tempfile::tempdir().unwrap();
    let tutor = Arc::new(ScriptedTutor::offline());
    let state = app(&dir, tutor).await;

    let response = commands::create_subject(&state, "Biology", "").await;
    assert!(!response.success);
    assert!(commands::list_subjects(&state).await.data.unwrap().is_empty());

    let health = commands::get_health(&state).await.data.unwrap();
    assert_eq!(health.status, "degraded");
    assert!(!health.model_server);
}

#[tokio::test]
async fn test_failed_send_keeps_user_message() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonSubjectStore::with_dir(dir.path().join("subjects"));
    store
        .write(&study_buddy_core::SubjectRecord::new(1, "Biology", ""))
        .await
        .unwrap();

    let state = app(&dir, Arc::new(ScriptedTutor::offline())).await;
    commands::select_subject(&state, 1).await.data.unwrap();

    let response = commands::send_chat_message(&state, "hello?", |_| {}).await;
    assert!(!response.success);
    assert!(response.error.unwrap().contains("Model communication"));

    let view = commands::get_primary_subject(&state).await.data.unwrap();
    assert_eq!(view.messages.len(), 1);
    assert_eq!(view.messages[0].content, "hello?");
}

#[tokio::test]
async fn test_generate_flashcards_command() {
    let dir = tempfile::tempdir().unwrap();
    let tutor = Arc::new(ScriptedTutor::new());
    let state = app(&dir, tutor.clone()).await;
    commands::create_subject(&state, "Chemistry", "").await.data.unwrap();
    commands::select_subject(&state, 1).await.data.unwrap();

    tutor.queue_reply("<<<[{\"question\":\"pH of water?\",\"answer\":\"7\"}]>>>");
    let cards = commands::generate_flashcards(&state, "acids")
        .await
        .data
        .unwrap();

    assert_eq!(cards.len(), 1);
    let view = commands::get_primary_subject(&state).await.data.unwrap();
    assert!(view.messages.is_empty());
    assert_eq!(view.flashcards.len(), 1);
}
