//! Subject Catalog
//!
//! Lists every stored subject and creates new ones. Creating a subject
//! provisions its dedicated tutor model before the record is written, so a
//! stored subject always has a model to talk to.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use study_buddy_core::{model_identifier, tutor_system_prompt, SubjectRecord, SubjectSignature};

use crate::services::llm::ModelProvider;
use crate::storage::SubjectStore;
use crate::utils::error::{AppError, AppResult};

/// Catalog of all stored subjects, resident or not
pub struct SubjectCatalog {
    store: Arc<dyn SubjectStore>,
    provider: Arc<dyn ModelProvider>,
    base_model: String,
    creating: Mutex<()>,
}

impl SubjectCatalog {
    pub fn new(
        store: Arc<dyn SubjectStore>,
        provider: Arc<dyn ModelProvider>,
        base_model: impl Into<String>,
    ) -> Self {
        Self {
            store,
            provider,
            base_model: base_model.into(),
            creating: Mutex::new(()),
        }
    }

    /// Base model new subject models are derived from
    pub fn base_model(&self) -> &str {
        &self.base_model
    }

    /// Signatures of every stored subject, sorted by id
    pub async fn list_subjects(&self) -> AppResult<Vec<SubjectSignature>> {
        self.store.enumerate().await
    }

    /// Create a subject and provision its tutor model.
    ///
    /// The new id is one past the highest stored id, counting records that
    /// can no longer be read. If the model server
    /// rejects the model, nothing is written.
    pub async fn create_subject(
        &self,
        name: &str,
        description: &str,
    ) -> AppResult<SubjectSignature> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Subject name cannot be empty"));
        }

        // Serializes id allocation between concurrent creations
        let _creating = self.creating.lock().await;

        // Unreadable records still hold their id
        let id = self.store.ids().await?.last().copied().unwrap_or(0) + 1;
        let model = model_identifier(name, id);

        self.provider
            .create_model(&model, &self.base_model, &tutor_system_prompt(name))
            .await
            .map_err(|e| {
                warn!(subject_id = id, model = %model, error = %e, "model provisioning failed");
                AppError::from(e)
            })?;

        let record = SubjectRecord::new(id, name, description.trim());
        self.store.write(&record).await?;
        info!(subject_id = id, model = %model, "subject created");
        Ok(record.signature())
    }
}

impl std::fmt::Debug for SubjectCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubjectCatalog")
            .field("provider", &self.provider.name())
            .field("base_model", &self.base_model)
            .finish()
    }
}
