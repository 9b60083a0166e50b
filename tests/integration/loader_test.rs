//! Subject Loader Integration Tests
//!
//! Cache bounds, write-before-evict and the primary pointer against the JSON
//! store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use study_buddy::services::{SubjectLoader, MAX_RESIDENT_SUBJECTS};
use study_buddy::storage::SubjectStore;
use study_buddy::AppError;
use study_buddy_core::{FlashcardDraft, Message, SubjectId};

use crate::support::{seeded_store, ScriptedTutor};

async fn resident_ids(loader: &SubjectLoader) -> Vec<SubjectId> {
    loader.get_subjects().await.iter().map(|s| s.id()).collect()
}

// ============================================================================
// Cache Bounds
// ============================================================================

#[tokio::test]
async fn test_cache_never_exceeds_limit() {
    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store(&dir, 8).await;
    let loader = SubjectLoader::new(store, Arc::new(ScriptedTutor::new()));

    for id in 1..=8 {
        loader.load_subject(id).await.unwrap();
        assert!(loader.get_subjects().await.len() <= MAX_RESIDENT_SUBJECTS);
    }

    assert_eq!(resident_ids(&loader).await, vec![4, 5, 6, 7, 8]);
}

#[tokio::test]
async fn test_evicted_changes_survive_reload() {
    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store(&dir, 6).await;
    let tutor = Arc::new(ScriptedTutor::new());
    tutor.queue_reply("Mitochondria make ATP.");
    let loader = SubjectLoader::new(store.clone(), tutor);

    let first = loader.load_subject(1).await.unwrap();
    first
        .send_message(Message::user("What do mitochondria do?"), |_| {})
        .await
        .unwrap();
    for id in 2..=6 {
        loader.load_subject(id).await.unwrap();
    }
    assert!(!resident_ids(&loader).await.contains(&1));

    // Persisted before eviction, so the store already has it
    let stored = store.read(1).await.unwrap();
    assert_eq!(stored.messages.len(), 2);
    assert_eq!(stored.messages[1].content, "Mitochondria make ATP.");

    let reloaded = loader.load_subject(1).await.unwrap();
    assert_eq!(reloaded.messages().await, first.messages().await);
}

#[tokio::test]
async fn test_missing_subject_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store(&dir, 1).await;
    let loader = SubjectLoader::new(store, Arc::new(ScriptedTutor::new()));

    assert!(matches!(
        loader.load_subject(77).await,
        Err(AppError::SubjectNotFound(77))
    ));
}

#[tokio::test]
async fn test_concurrent_loads_yield_one_entity() {
    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store(&dir, 1).await;
    let loader = Arc::new(SubjectLoader::new(store, Arc::new(ScriptedTutor::new())));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let loader = loader.clone();
            tokio::spawn(async move { loader.load_subject(1).await })
        })
        .collect();

    let mut subjects = Vec::new();
    for handle in handles {
        subjects.push(handle.await.unwrap().unwrap());
    }

    assert!(subjects.iter().all(|s| Arc::ptr_eq(s, &subjects[0])));
    assert_eq!(resident_ids(&loader).await, vec![1]);
}

// ============================================================================
// Cache Clear
// ============================================================================

#[tokio::test]
async fn test_clear_cache_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store(&dir, 2).await;
    let loader = SubjectLoader::new(store, Arc::new(ScriptedTutor::new()));

    let subject = loader.set_primary(2).await.unwrap();
    subject
        .add_flashcard(FlashcardDraft::new("Capital of France?", "Paris"), true)
        .await;
    let before_cards = subject.flashcards().await;

    loader.clear_cache().await.unwrap();
    assert!(loader.get_subjects().await.is_empty());
    assert_eq!(loader.primary_id(), 2);

    let after = loader.get_primary().await.unwrap();
    assert_eq!(after.flashcards().await, before_cards);
    assert_eq!(after.name(), "Subject 2");
}

// ============================================================================
// Primary Subject
// ============================================================================

#[tokio::test]
async fn test_set_primary_then_get_primary() {
    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store(&dir, 3).await;
    let loader = SubjectLoader::new(store, Arc::new(ScriptedTutor::new()));

    let seen = Arc::new(Mutex::new(Vec::new()));
    let _subscription = {
        let seen = seen.clone();
        loader.register_primary_change_callback(move |id| seen.lock().unwrap().push(*id))
    };

    loader.set_primary(3).await.unwrap();
    loader.set_primary(1).await.unwrap();

    assert_eq!(loader.get_primary().await.unwrap().id(), 1);
    assert_eq!(*seen.lock().unwrap(), vec![3, 1]);
}

#[tokio::test]
async fn test_dropped_subscription_stops_notifications() {
    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store(&dir, 2).await;
    let loader = SubjectLoader::new(store, Arc::new(ScriptedTutor::new()));
    let calls = Arc::new(AtomicUsize::new(0));

    {
        let calls = calls.clone();
        let _subscription = loader.register_primary_change_callback(move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
        });
        loader.set_primary(1).await.unwrap();
    }
    loader.set_primary(2).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_switching_primary_saves_previous() {
    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store(&dir, 2).await;
    let loader = SubjectLoader::new(store.clone(), Arc::new(ScriptedTutor::new()));

    let first = loader.set_primary(1).await.unwrap();
    first
        .send_message(Message::user("hello"), |_| {})
        .await
        .unwrap();
    loader.set_primary(2).await.unwrap();
    loader.flush().await.unwrap();

    assert_eq!(store.read(1).await.unwrap().messages.len(), 2);
}
