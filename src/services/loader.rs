//! Subject Loader
//!
//! Bounded cache of resident subjects plus the primary-subject pointer.
//!
//! ## Cache policy
//!
//! At most [`MAX_RESIDENT_SUBJECTS`] subjects stay resident. When a new one is
//! loaded into a full cache the oldest-inserted subject is written to the
//! store (if it changed) and only then dropped. Concurrent loads of the same
//! absent id share a single store read.
//!
//! ## Persistence
//!
//! Chat-path saves go through the background [`PersistQueue`]. Eviction,
//! explicit saves, cache clears and shutdown flush that queue first and then
//! write directly, so a record never goes back in time on disk. A subject is
//! only left clean once its snapshot has been written; a failed background
//! write marks it dirty again.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::{OnceCell, RwLock};
use tracing::{debug, info, warn};

use study_buddy_core::{SubjectId, Subscribers, Subscription, SubscriptionId};

use crate::services::llm::ModelProvider;
use crate::services::persist_queue::PersistQueue;
use crate::services::subject::Subject;
use crate::storage::SubjectStore;
use crate::utils::error::{AppError, AppResult};

/// Maximum number of subjects kept in memory
pub const MAX_RESIDENT_SUBJECTS: usize = 5;

type LoadCell = Arc<OnceCell<Arc<Subject>>>;

/// Loads, caches and persists subjects; owns the primary-subject pointer
pub struct SubjectLoader {
    store: Arc<dyn SubjectStore>,
    provider: Arc<dyn ModelProvider>,
    loaded: RwLock<VecDeque<Arc<Subject>>>,
    primary: AtomicU32,
    primary_listeners: Subscribers<SubjectId>,
    in_flight: Mutex<HashMap<SubjectId, LoadCell>>,
    persist: PersistQueue,
}

impl SubjectLoader {
    /// Create a loader with an empty cache and primary id 0.
    ///
    /// Starts the background persistence worker, so this must run inside a
    /// tokio runtime.
    pub fn new(store: Arc<dyn SubjectStore>, provider: Arc<dyn ModelProvider>) -> Self {
        let persist = PersistQueue::start(store.clone());
        Self {
            store,
            provider,
            loaded: RwLock::new(VecDeque::with_capacity(MAX_RESIDENT_SUBJECTS)),
            primary: AtomicU32::new(0),
            primary_listeners: Subscribers::new(),
            in_flight: Mutex::new(HashMap::new()),
            persist,
        }
    }

    async fn resident(&self, id: SubjectId) -> Option<Arc<Subject>> {
        self.loaded
            .read()
            .await
            .iter()
            .find(|s| s.id() == id)
            .cloned()
    }

    fn in_flight_map(
        &self,
    ) -> AppResult<std::sync::MutexGuard<'_, HashMap<SubjectId, LoadCell>>> {
        self.in_flight
            .lock()
            .map_err(|e| AppError::internal(format!("in-flight load map poisoned: {}", e)))
    }

    /// Return the subject with `id`, reading it from the store on a miss.
    ///
    /// Unknown ids fail with `AppError::SubjectNotFound`.
    pub async fn load_subject(&self, id: SubjectId) -> AppResult<Arc<Subject>> {
        if let Some(subject) = self.resident(id).await {
            debug!(subject_id = id, "subject cache hit");
            return Ok(subject);
        }

        let cell = self
            .in_flight_map()?
            .entry(id)
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        let result = cell
            .get_or_try_init(|| self.fetch_and_insert(id))
            .await
            .cloned();

        let mut in_flight = self.in_flight_map()?;
        if in_flight
            .get(&id)
            .is_some_and(|pending| Arc::ptr_eq(pending, &cell))
        {
            in_flight.remove(&id);
        }

        result
    }

    async fn fetch_and_insert(&self, id: SubjectId) -> AppResult<Arc<Subject>> {
        // Another path may have inserted it between the cache check and here
        if let Some(subject) = self.resident(id).await {
            return Ok(subject);
        }

        let record = self.store.read(id).await?;
        let subject = Arc::new(Subject::from_record(record, self.provider.clone()));
        self.insert(subject.clone()).await?;
        info!(subject_id = id, name = %subject.name(), "subject loaded");
        Ok(subject)
    }

    async fn insert(&self, subject: Arc<Subject>) -> AppResult<()> {
        loop {
            let oldest = {
                let mut loaded = self.loaded.write().await;
                if loaded.len() < MAX_RESIDENT_SUBJECTS {
                    loaded.push_back(subject);
                    return Ok(());
                }
                match loaded.front() {
                    Some(oldest) => oldest.clone(),
                    None => {
                        loaded.push_back(subject);
                        return Ok(());
                    }
                }
            };

            // A queued write that fails marks the subject dirty again
            self.persist.flush().await?;
            if oldest.is_dirty() {
                self.persist_now(&oldest).await?;
            }

            let mut loaded = self.loaded.write().await;
            if let Some(pos) = loaded.iter().position(|s| Arc::ptr_eq(s, &oldest)) {
                loaded.remove(pos);
                info!(subject_id = oldest.id(), "subject evicted");
            }
        }
    }

    /// Write a resident subject to the store after draining queued writes
    async fn persist_now(&self, subject: &Subject) -> AppResult<()> {
        self.persist.flush().await?;
        subject.mark_clean();
        let record = subject.to_record().await;
        if let Err(e) = self.store.write(&record).await {
            subject.mark_dirty();
            warn!(subject_id = subject.id(), error = %e, "failed to persist subject");
            return Err(e);
        }
        info!(subject_id = subject.id(), "subject saved");
        Ok(())
    }

    /// Id of the primary subject, without loading it
    pub fn primary_id(&self) -> SubjectId {
        self.primary.load(Ordering::SeqCst)
    }

    /// Load the primary subject
    pub async fn get_primary(&self) -> AppResult<Arc<Subject>> {
        self.load_subject(self.primary_id()).await
    }

    /// Make `id` the primary subject.
    ///
    /// The outgoing primary is queued for saving if resident. The new subject
    /// is loaded before the pointer moves, so on failure the pointer is
    /// unchanged and no subscriber is called. Subscribers receive `id`
    /// synchronously once the pointer has moved.
    pub async fn set_primary(&self, id: SubjectId) -> AppResult<Arc<Subject>> {
        let previous = self.primary_id();
        if let Some(current) = self.resident(previous).await {
            self.enqueue_save(&current).await?;
        }

        let subject = self.load_subject(id).await?;
        self.primary.store(id, Ordering::SeqCst);
        info!(from = previous, to = id, "primary subject changed");
        self.primary_listeners.notify(&id);
        Ok(subject)
    }

    /// Resident subjects in insertion order
    pub async fn get_subjects(&self) -> Vec<Arc<Subject>> {
        self.loaded.read().await.iter().cloned().collect()
    }

    /// Persist every changed resident subject, then empty the cache.
    ///
    /// If a write fails the cache is left as it was. The primary id is kept.
    pub async fn clear_cache(&self) -> AppResult<()> {
        self.persist_dirty().await?;
        let count = {
            let mut loaded = self.loaded.write().await;
            let count = loaded.len();
            loaded.clear();
            count
        };
        info!(count, "subject cache cleared");
        Ok(())
    }

    async fn persist_dirty(&self) -> AppResult<()> {
        self.persist.flush().await?;
        for subject in self.get_subjects().await {
            if subject.is_dirty() {
                self.persist_now(&subject).await?;
            }
        }
        Ok(())
    }

    /// Drop a subject from the cache without saving it
    pub async fn remove_subject(&self, id: SubjectId) -> Option<Arc<Subject>> {
        let mut loaded = self.loaded.write().await;
        let pos = loaded.iter().position(|s| s.id() == id)?;
        let removed = loaded.remove(pos);
        debug!(subject_id = id, "subject removed from cache");
        removed
    }

    /// Discard the resident copy and read the subject from the store again
    pub async fn reload_subject(&self, id: SubjectId) -> AppResult<Arc<Subject>> {
        self.remove_subject(id).await;
        self.load_subject(id).await
    }

    /// Register a callback receiving every new primary id
    pub fn register_primary_change_callback<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&SubjectId) + Send + Sync + 'static,
    {
        self.primary_listeners.subscribe(callback)
    }

    /// Remove a primary-change callback by identity
    pub fn unregister_primary_change_callback(&self, id: SubscriptionId) -> bool {
        self.primary_listeners.unsubscribe(id)
    }

    /// Write a resident subject to the store now
    pub async fn save_subject(&self, id: SubjectId) -> AppResult<()> {
        let subject = self
            .resident(id)
            .await
            .ok_or(AppError::SubjectNotFound(id))?;
        self.persist_now(&subject).await
    }

    /// Write the primary subject to the store now
    pub async fn save_primary(&self) -> AppResult<()> {
        self.save_subject(self.primary_id()).await
    }

    /// Queue a background write of a resident subject
    pub async fn schedule_save(&self, id: SubjectId) -> AppResult<()> {
        let subject = self
            .resident(id)
            .await
            .ok_or(AppError::SubjectNotFound(id))?;
        self.enqueue_save(&subject).await
    }

    async fn enqueue_save(&self, subject: &Arc<Subject>) -> AppResult<()> {
        subject.mark_clean();
        let record = subject.to_record().await;
        if let Err(e) = self.persist.enqueue(record, Some(subject)) {
            subject.mark_dirty();
            return Err(e);
        }
        Ok(())
    }

    /// Wait until every queued write has landed
    pub async fn flush(&self) -> AppResult<()> {
        self.persist.flush().await
    }

    /// Persist every changed resident subject and stop the background writer
    pub async fn shutdown(&self) -> AppResult<()> {
        let result = self.persist_dirty().await;
        self.persist.shutdown().await?;
        info!("subject loader shut down");
        result
    }
}

impl std::fmt::Debug for SubjectLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubjectLoader")
            .field("primary", &self.primary_id())
            .field("persist", &self.persist)
            .finish()
    }
}
