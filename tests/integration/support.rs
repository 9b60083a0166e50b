//! Shared fixtures for the integration tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use study_buddy::services::llm::{ChatTurn, LlmError, LlmResult, ModelProvider};
use study_buddy::storage::{JsonSubjectStore, SubjectStore};
use study_buddy_core::{ChatStreamEvent, SubjectId, SubjectRecord};

/// A model provider that answers with queued replies, streamed word by word.
///
/// When the queue is empty it answers "ok".
#[derive(Default)]
pub struct ScriptedTutor {
    replies: Mutex<VecDeque<String>>,
    pub created_models: Mutex<Vec<String>>,
    pub requests: Mutex<Vec<(String, Vec<ChatTurn>)>>,
    pub offline: bool,
}

impl ScriptedTutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    pub fn queue_reply(&self, reply: &str) {
        self.replies.lock().unwrap().push_back(reply.to_string());
    }

    fn next_reply(&self, model: &str, turns: Vec<ChatTurn>) -> LlmResult<String> {
        self.requests.lock().unwrap().push((model.to_string(), turns));
        if self.offline {
            return Err(LlmError::ProviderUnavailable {
                message: "connection refused".to_string(),
            });
        }
        Ok(self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| "ok".to_string()))
    }
}

#[async_trait]
impl ModelProvider for ScriptedTutor {
    fn name(&self) -> &'static str {
        "scripted-tutor"
    }

    async fn chat(&self, model: &str, turns: Vec<ChatTurn>) -> LlmResult<String> {
        self.next_reply(model, turns)
    }

    async fn stream_chat(
        &self,
        model: &str,
        turns: Vec<ChatTurn>,
        tx: mpsc::Sender<ChatStreamEvent>,
    ) -> LlmResult<String> {
        let reply = self.next_reply(model, turns)?;
        for word in reply.split_inclusive(' ') {
            let _ = tx.send(ChatStreamEvent::text(word)).await;
        }
        let _ = tx.send(ChatStreamEvent::Complete).await;
        Ok(reply)
    }

    async fn create_model(&self, model: &str, _base: &str, _system: &str) -> LlmResult<()> {
        if self.offline {
            return Err(LlmError::ProviderUnavailable {
                message: "connection refused".to_string(),
            });
        }
        self.created_models.lock().unwrap().push(model.to_string());
        Ok(())
    }

    async fn health_check(&self) -> LlmResult<()> {
        if self.offline {
            return Err(LlmError::ProviderUnavailable {
                message: "connection refused".to_string(),
            });
        }
        Ok(())
    }
}

/// A JSON store in `dir` seeded with subjects `1..=count`
pub async fn seeded_store(dir: &tempfile::TempDir, count: SubjectId) -> Arc<JsonSubjectStore> {
    let store = Arc::new(JsonSubjectStore::with_dir(dir.path().join("subjects")));
    for id in 1..=count {
        store
            .write(&SubjectRecord::new(id, format!("Subject {}", id), "seeded"))
            .await
            .unwrap();
    }
    store
}
