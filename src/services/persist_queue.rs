//! Background Persistence Queue
//!
//! Writes subject records in a background tokio task so callers on the chat
//! path never wait on disk. Writes land in enqueue order; `flush` waits for
//! everything queued before it.
//!
//! A write queued on behalf of a resident subject carries a weak handle to it.
//! If that write fails the subject is marked dirty again, so the next save,
//! eviction or shutdown retries it.

use std::sync::{Arc, Mutex, Weak};

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use study_buddy_core::SubjectRecord;

use crate::services::subject::Subject;
use crate::storage::SubjectStore;
use crate::utils::error::{AppError, AppResult};

enum PersistCommand {
    Write {
        record: SubjectRecord,
        owner: Option<Weak<Subject>>,
    },
    Flush(oneshot::Sender<()>),
}

/// Queue of pending subject writes drained by a single worker task
pub struct PersistQueue {
    tx: Mutex<Option<mpsc::UnboundedSender<PersistCommand>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl PersistQueue {
    /// Spawn the worker task. Must be called from within a tokio runtime.
    pub fn start(store: Arc<dyn SubjectStore>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<PersistCommand>();

        let worker = tokio::spawn(async move {
            debug!("persist queue: worker started");
            while let Some(command) = rx.recv().await {
                match command {
                    PersistCommand::Write { record, owner } => {
                        let id = record.id;
                        match store.write(&record).await {
                            Ok(()) => debug!(subject_id = id, "persist queue: record written"),
                            Err(e) => {
                                warn!(
                                    subject_id = id,
                                    error = %e,
                                    "persist queue: background write failed"
                                );
                                if let Some(subject) = owner.and_then(|owner| owner.upgrade()) {
                                    subject.mark_dirty();
                                }
                            }
                        }
                    }
                    PersistCommand::Flush(done) => {
                        let _ = done.send(());
                    }
                }
            }
            info!("persist queue: worker stopped");
        });

        Self {
            tx: Mutex::new(Some(tx)),
            worker: Mutex::new(Some(worker)),
        }
    }

    fn sender(&self) -> AppResult<Option<mpsc::UnboundedSender<PersistCommand>>> {
        let guard = self
            .tx
            .lock()
            .map_err(|e| AppError::internal(format!("persist queue lock poisoned: {}", e)))?;
        Ok(guard.clone())
    }

    /// Queue a record for writing.
    ///
    /// When `owner` is given, a failed write marks that subject dirty again.
    pub fn enqueue(&self, record: SubjectRecord, owner: Option<&Arc<Subject>>) -> AppResult<()> {
        let owner = owner.map(Arc::downgrade);
        let id = record.id;
        let tx = self
            .sender()?
            .ok_or_else(|| AppError::internal("persist queue is shut down"))?;
        tx.send(PersistCommand::Write { record, owner })
            .map_err(|_| AppError::internal("persist queue worker is gone"))?;
        debug!(subject_id = id, "persist queue: write enqueued");
        Ok(())
    }

    /// Wait until every write queued before this call has been applied
    pub async fn flush(&self) -> AppResult<()> {
        let Some(tx) = self.sender()? else {
            return Ok(());
        };
        let (done_tx, done_rx) = oneshot::channel();
        tx.send(PersistCommand::Flush(done_tx))
            .map_err(|_| AppError::internal("persist queue worker is gone"))?;
        done_rx
            .await
            .map_err(|_| AppError::internal("persist queue worker stopped before flushing"))
    }

    /// Whether the queue still accepts writes
    pub fn is_running(&self) -> bool {
        matches!(self.sender(), Ok(Some(_)))
    }

    /// Close the queue, apply every pending write and stop the worker
    pub async fn shutdown(&self) -> AppResult<()> {
        let tx = self
            .tx
            .lock()
            .map_err(|e| AppError::internal(format!("persist queue lock poisoned: {}", e)))?
            .take();
        drop(tx);

        let worker = self
            .worker
            .lock()
            .map_err(|e| AppError::internal(format!("persist queue lock poisoned: {}", e)))?
            .take();
        if let Some(worker) = worker {
            worker
                .await
                .map_err(|e| AppError::internal(format!("persist queue worker panicked: {}", e)))?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for PersistQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistQueue")
            .field("running", &self.is_running())
            .finish()
    }
}
