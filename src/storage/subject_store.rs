//! Subject Persistence
//!
//! One record per subject, keyed by subject id. The JSON implementation keeps
//! each record in its own `subject-{id}.json` file inside the subjects
//! directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use study_buddy_core::{SubjectId, SubjectRecord, SubjectSignature};

use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::ensure_subjects_dir;

/// File name prefix of subject records
const RECORD_PREFIX: &str = "subject-";

/// File name extension of subject records
const RECORD_EXTENSION: &str = ".json";

/// Stable storage for subject records.
#[async_trait]
pub trait SubjectStore: Send + Sync {
    /// List every stored subject, ordered by id.
    async fn enumerate(&self) -> AppResult<Vec<SubjectSignature>>;

    /// Read the full record of a subject.
    ///
    /// Fails with `AppError::SubjectNotFound` when no record exists.
    async fn read(&self, id: SubjectId) -> AppResult<SubjectRecord>;

    /// Write a record, replacing any previous record with the same id.
    async fn write(&self, record: &SubjectRecord) -> AppResult<()>;

    /// Every id that has a stored record, readable or not, in ascending order.
    async fn ids(&self) -> AppResult<Vec<SubjectId>> {
        Ok(self.enumerate().await?.into_iter().map(|s| s.id).collect())
    }
}

/// Recover the subject id from a record file name (`subject-{id}.json`).
pub fn parse_record_file_name(file_name: &str) -> Option<SubjectId> {
    file_name
        .strip_prefix(RECORD_PREFIX)?
        .strip_suffix(RECORD_EXTENSION)?
        .parse()
        .ok()
}

/// Subject store backed by one JSON file per subject
#[derive(Debug, Clone)]
pub struct JsonSubjectStore {
    dir: PathBuf,
}

impl JsonSubjectStore {
    /// Create a store in the default subjects directory (~/.study-buddy/subjects/)
    pub fn new() -> AppResult<Self> {
        Ok(Self::with_dir(ensure_subjects_dir()?))
    }

    /// Create a store in an explicit directory; it is created on first use
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the record files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the record file for a subject
    pub fn record_path(&self, id: SubjectId) -> PathBuf {
        self.dir
            .join(format!("{}{}{}", RECORD_PREFIX, id, RECORD_EXTENSION))
    }

    async fn ensure_dir(&self) -> AppResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }
}

#[async_trait]
impl SubjectStore for JsonSubjectStore {
    async fn enumerate(&self) -> AppResult<Vec<SubjectSignature>> {
        let mut signatures = Vec::new();
        for id in self.ids().await? {
            match self.read(id).await {
                Ok(record) => signatures.push(record.signature()),
                Err(e) => warn!(subject_id = id, error = %e, "skipping unreadable subject record"),
            }
        }

        signatures.sort_by_key(|s| s.id);
        debug!(count = signatures.len(), "enumerated subjects");
        Ok(signatures)
    }

    async fn ids(&self) -> AppResult<Vec<SubjectId>> {
        self.ensure_dir().await?;

        let mut ids = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if let Some(id) = entry.file_name().to_str().and_then(parse_record_file_name) {
                ids.push(id);
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }

    async fn read(&self, id: SubjectId) -> AppResult<SubjectRecord> {
        let path = self.record_path(id);
        let data = match tokio::fs::read_to_string(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::SubjectNotFound(id));
            }
            Err(e) => return Err(e.into()),
        };

        let mut record: SubjectRecord = serde_json::from_str(&data)?;
        if record.id != id {
            warn!(
                subject_id = id,
                record_id = record.id,
                "record id does not match its file name, using the file name"
            );
            record.id = id;
        }
        Ok(record)
    }

    async fn write(&self, record: &SubjectRecord) -> AppResult<()> {
        self.ensure_dir().await?;

        let final_path = self.record_path(record.id);
        let tmp_path = self.dir.join(format!(
            "{}{}{}.tmp",
            RECORD_PREFIX, record.id, RECORD_EXTENSION
        ));
        let bytes = serde_json::to_vec_pretty(record)?;

        tokio::fs::write(&tmp_path, bytes).await?;
        tokio::fs::rename(&tmp_path, &final_path).await?;
        debug!(subject_id = record.id, path = %final_path.display(), "subject record written");
        Ok(())
    }
}
