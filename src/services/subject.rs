//! Subject Entity
//!
//! One subject's identity, transcript and flashcards, plus the two protocols
//! layered on top of its dedicated model: sending a chat message with a
//! streamed reply, and pulling flashcards out of model text.
//!
//! Subjects are shared as `Arc<Subject>` out of the loader cache. All
//! mutation goes through the methods below; the state lock is never held
//! while the model is being called, so the transcript stays readable during a
//! streamed reply.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, warn};

use study_buddy_core::{
    extract_flashcards, model_identifier, ChatStreamEvent, Flashcard, FlashcardDraft, Message,
    SubjectId, SubjectRecord, SubjectSignature, Subscribers, Subscription, SubscriptionId,
};

use crate::services::llm::{ChatTurn, ModelProvider};
use crate::utils::error::{AppError, AppResult};

/// Capacity of the channel carrying streamed chunks
const STREAM_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Default)]
struct SubjectState {
    messages: Vec<Message>,
    flashcards: Vec<Flashcard>,
}

/// A study subject with its own transcript, flashcards and model binding
pub struct Subject {
    id: SubjectId,
    name: String,
    description: String,
    model: String,
    state: RwLock<SubjectState>,
    dirty: AtomicBool,
    flashcard_listeners: Subscribers<Vec<Flashcard>>,
    provider: Arc<dyn ModelProvider>,
}

impl Subject {
    /// Create a fresh subject with an empty transcript and no flashcards
    pub fn new(
        id: SubjectId,
        name: impl Into<String>,
        description: impl Into<String>,
        provider: Arc<dyn ModelProvider>,
    ) -> Self {
        Self::from_record(SubjectRecord::new(id, name, description), provider)
    }

    /// Rebuild a subject from its persisted record
    pub fn from_record(record: SubjectRecord, provider: Arc<dyn ModelProvider>) -> Self {
        let model = model_identifier(&record.name, record.id);
        Self {
            id: record.id,
            name: record.name,
            description: record.description,
            model,
            state: RwLock::new(SubjectState {
                messages: record.messages,
                flashcards: record.flashcards,
            }),
            dirty: AtomicBool::new(false),
            flashcard_listeners: Subscribers::new(),
            provider,
        }
    }

    pub fn id(&self) -> SubjectId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Name of the model bound to this subject
    pub fn model_identifier(&self) -> &str {
        &self.model
    }

    pub fn signature(&self) -> SubjectSignature {
        SubjectSignature::new(self.id, self.name.clone(), self.description.clone())
    }

    /// Snapshot of the transcript, in send order
    pub async fn messages(&self) -> Vec<Message> {
        self.state.read().await.messages.clone()
    }

    /// Snapshot of the flashcards, in insertion order
    pub async fn flashcards(&self) -> Vec<Flashcard> {
        self.state.read().await.flashcards.clone()
    }

    /// Whether the subject changed since it was loaded or last persisted
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    pub(crate) fn mark_clean(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }

    pub(crate) fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }

    /// Snapshot of the subject in its persisted form
    pub async fn to_record(&self) -> SubjectRecord {
        let state = self.state.read().await;
        SubjectRecord {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            messages: state.messages.clone(),
            flashcards: state.flashcards.clone(),
        }
    }

    /// Append a message, renumbering it to its transcript position.
    ///
    /// Returns the transcript as chat turns, including the new message.
    async fn append_message(&self, mut message: Message) -> Vec<ChatTurn> {
        let mut state = self.state.write().await;
        message.id = state.messages.len();
        state.messages.push(message);
        self.mark_dirty();
        state.messages.iter().map(ChatTurn::from).collect()
    }

    /// Send a message to this subject's model and stream the reply.
    ///
    /// The message is appended before the model is contacted. `on_chunk`
    /// receives the accumulated reply after every chunk. Once the stream
    /// completes the reply is appended as an `ai` message and returned.
    ///
    /// On `AppError::ModelCommunication` the sent message stays in the
    /// transcript and no reply is appended.
    pub async fn send_message<F>(&self, message: Message, mut on_chunk: F) -> AppResult<String>
    where
        F: FnMut(&str) + Send,
    {
        let turns = self.append_message(message).await;
        debug!(
            subject_id = self.id,
            model = %self.model,
            turns = turns.len(),
            "sending transcript to model"
        );

        let (tx, mut rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);
        let stream = self.provider.stream_chat(&self.model, turns, tx);
        let consume = async {
            let mut accumulated = String::new();
            let mut stream_error = None;
            while let Some(event) = rx.recv().await {
                match event {
                    ChatStreamEvent::TextDelta { content } => {
                        accumulated.push_str(&content);
                        on_chunk(&accumulated);
                    }
                    ChatStreamEvent::Error { message, .. } => stream_error = Some(message),
                    ChatStreamEvent::Complete => {}
                }
            }
            (accumulated, stream_error)
        };

        let (result, (accumulated, stream_error)) = tokio::join!(stream, consume);

        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                warn!(subject_id = self.id, error = %e, "model reply failed");
                return Err(e.into());
            }
        };
        if let Some(message) = stream_error {
            warn!(subject_id = self.id, error = %message, "model stream reported an error");
            return Err(AppError::model_communication(message));
        }
        if reply != accumulated && !accumulated.is_empty() {
            debug!(
                subject_id = self.id,
                streamed = accumulated.len(),
                aggregate = reply.len(),
                "streamed chunks differ from the aggregate reply"
            );
        }

        self.append_message(Message::ai(reply.clone())).await;
        Ok(reply)
    }

    /// Ask the model, without streaming, for flashcards about `topic`.
    ///
    /// The request is not recorded in the transcript. Cards in the reply are
    /// appended through `parse_flashcards`.
    pub async fn request_flashcards(&self, topic: &str) -> AppResult<Vec<Flashcard>> {
        let mut turns: Vec<ChatTurn> = self
            .state
            .read()
            .await
            .messages
            .iter()
            .map(ChatTurn::from)
            .collect();
        turns.push(ChatTurn::user(format!(
            "Create flashcards for: {}. Reply with the flashcards only, in the flashcard \
             format from your instructions.",
            topic
        )));

        let reply = self.provider.chat(&self.model, turns).await?;
        self.parse_flashcards(&reply).await
    }

    /// Extract flashcards from model text and append them.
    ///
    /// Each card gets the collection length as its id. Listeners receive the
    /// whole new batch once. Text without a flashcard segment yields nothing;
    /// a malformed segment is an `AppError::FlashcardFormat` and leaves the
    /// collection untouched. Calling this twice on the same text appends the
    /// cards twice.
    pub async fn parse_flashcards(&self, text: &str) -> AppResult<Vec<Flashcard>> {
        let drafts = extract_flashcards(text)?;
        if drafts.is_empty() {
            return Ok(Vec::new());
        }

        let batch = self.append_flashcards(drafts).await;
        info!(subject_id = self.id, count = batch.len(), "flashcards extracted");
        self.flashcard_listeners.notify(&batch);
        Ok(batch)
    }

    /// Append a single flashcard, bypassing extraction.
    ///
    /// Listeners receive a one-card batch unless `notify` is false.
    pub async fn add_flashcard(&self, draft: FlashcardDraft, notify: bool) -> Flashcard {
        let card = {
            let mut state = self.state.write().await;
            let card = Flashcard {
                id: state.flashcards.len(),
                question: draft.question,
                answer: draft.answer,
            };
            state.flashcards.push(card.clone());
            card
        };
        self.mark_dirty();
        if notify {
            self.flashcard_listeners.notify(&vec![card.clone()]);
        }
        card
    }

    async fn append_flashcards(&self, drafts: Vec<FlashcardDraft>) -> Vec<Flashcard> {
        let mut state = self.state.write().await;
        let mut batch = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let card = Flashcard {
                id: state.flashcards.len(),
                question: draft.question,
                answer: draft.answer,
            };
            state.flashcards.push(card.clone());
            batch.push(card);
        }
        self.mark_dirty();
        batch
    }

    /// Register a callback receiving every newly added batch of flashcards
    pub fn add_flashcard_change_callback<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Vec<Flashcard>) + Send + Sync + 'static,
    {
        self.flashcard_listeners.subscribe(callback)
    }

    /// Remove a flashcard callback by identity
    pub fn remove_flashcard_change_callback(&self, id: SubscriptionId) -> bool {
        self.flashcard_listeners.unsubscribe(id)
    }
}

impl std::fmt::Debug for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subject")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("model", &self.model)
            .field("dirty", &self.is_dirty())
            .finish()
    }
}
