//! Flashcard Extraction Integration Tests
//!
//! Extraction through a loaded subject, with listeners attached.

use std::sync::{Arc, Mutex};

use study_buddy::services::SubjectLoader;
use study_buddy::AppError;
use study_buddy_core::Flashcard;

use crate::support::{seeded_store, ScriptedTutor};

async fn loaded_subject(
    dir: &tempfile::TempDir,
) -> (SubjectLoader, Arc<study_buddy::services::Subject>) {
    let store = seeded_store(dir, 1).await;
    let loader = SubjectLoader::new(store, Arc::new(ScriptedTutor::new()));
    let subject = loader.load_subject(1).await.unwrap();
    (loader, subject)
}

#[tokio::test]
async fn test_ids_follow_collection_length() {
    let dir = tempfile::tempdir().unwrap();
    let (_loader, subject) = loaded_subject(&dir).await;

    let text = "Cards: <<<[{\"question\":\"H2O?\",\"answer\":\"Water\"},\
                {\"question\":\"NaCl?\",\"answer\":\"Salt\"}]>>>";
    subject.parse_flashcards(text).await.unwrap();
    subject
        .parse_flashcards("<<<[{\"question\":\"CO2?\",\"answer\":\"Carbon dioxide\"}]>>>")
        .await
        .unwrap();

    let ids: Vec<usize> = subject.flashcards().await.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![0, 1, 2]);
}

#[tokio::test]
async fn test_listener_gets_whole_batch_once() {
    let dir = tempfile::tempdir().unwrap();
    let (_loader, subject) = loaded_subject(&dir).await;
    let batches: Arc<Mutex<Vec<Vec<Flashcard>>>> = Arc::new(Mutex::new(Vec::new()));
    let _subscription = {
        let batches = batches.clone();
        subject.add_flashcard_change_callback(move |batch| {
            batches.lock().unwrap().push(batch.clone())
        })
    };

    subject
        .parse_flashcards(
            "<<<[{\"question\":\"a\",\"answer\":\"1\"},{\"question\":\"b\",\"answer\":\"2\"},\
             {\"question\":\"c\",\"answer\":\"3\"}]>>>",
        )
        .await
        .unwrap();
    subject.parse_flashcards("plain reply").await.unwrap();

    let batches = batches.lock().unwrap();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].len(), 3);
}

#[tokio::test]
async fn test_reversed_markers_are_a_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let (_loader, subject) = loaded_subject(&dir).await;

    let err = subject
        .parse_flashcards(">>> oops <<<")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::FlashcardFormat(_)));
    assert!(subject.flashcards().await.is_empty());
}

#[tokio::test]
async fn test_repeated_parse_appends_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let (_loader, subject) = loaded_subject(&dir).await;
    let text = "<<<[{\"question\":\"Q\",\"answer\":\"A\"}]>>>";

    subject.parse_flashcards(text).await.unwrap();
    subject.parse_flashcards(text).await.unwrap();

    assert_eq!(subject.flashcards().await.len(), 2);
}
