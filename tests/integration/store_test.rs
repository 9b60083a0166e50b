//! JSON Subject Store Integration Tests

use study_buddy::storage::{JsonSubjectStore, SubjectStore};
use study_buddy::AppError;
use study_buddy_core::{Flashcard, Message, SubjectRecord, SubjectSignature};

#[tokio::test]
async fn test_record_round_trip_preserves_order() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonSubjectStore::with_dir(dir.path());

    let mut record = SubjectRecord::new(4, "Statistics", "Probability and inference");
    for (i, text) in ["mean?", "the average", "median?", "the middle"].iter().enumerate() {
        let mut message = if i % 2 == 0 {
            Message::user(*text)
        } else {
            Message::ai(*text)
        };
        message.id = i;
        record.messages.push(message);
    }
    record.flashcards.push(Flashcard {
        id: 0,
        question: "Mode?".to_string(),
        answer: "Most frequent value".to_string(),
    });

    store.write(&record).await.unwrap();
    assert_eq!(store.read(4).await.unwrap(), record);
}

#[tokio::test]
async fn test_file_layout_and_field_names() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonSubjectStore::with_dir(dir.path());
    store
        .write(&SubjectRecord::new(2, "Music", "Theory"))
        .await
        .unwrap();

    let raw = std::fs::read_to_string(dir.path().join("subject-2.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["desc"], "Theory");
    assert!(value["conversations"].is_array());
    assert!(value["cards"].is_array());
    assert!(!dir.path().join("subject-2.json.tmp").exists());
}

#[tokio::test]
async fn test_enumerate_skips_corrupt_records() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonSubjectStore::with_dir(dir.path());
    store
        .write(&SubjectRecord::new(1, "History", "Rome"))
        .await
        .unwrap();
    std::fs::write(dir.path().join("subject-2.json"), "{ not json").unwrap();
    std::fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();

    let list = store.enumerate().await.unwrap();
    assert_eq!(list, vec![SubjectSignature::new(1, "History", "Rome")]);

    assert!(matches!(
        store.read(2).await,
        Err(AppError::Serialization(_))
    ));
}
