//! The durable task index: the single source of truth for which task ids
//! live in which document.
//!
//! In-memory state is authoritative immediately; durability is
//! write-behind. Every mutation schedules a debounced flush so bursts of
//! edits collapse into one write, and only the most recently scheduled
//! flush runs. Callers that must guarantee durability before reporting
//! success (the plan executor does) await [`DurableIndex::flush`] instead
//! of trusting the timer.

pub mod format;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::warn;

use crate::error::ReconcileError;
use crate::ports::{Clock, StorageProvider};

pub use format::{FileDetail, IndexDocument, IndexMeta, TaskRecord, INDEX_FORMAT_VERSION};

/// How long a scheduled flush waits for further mutations before writing.
pub const FLUSH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Persisted id→location mapping with an in-memory cache and debounced
/// write-behind flush.
pub struct DurableIndex {
    storage: Arc<dyn StorageProvider>,
    clock: Arc<dyn Clock>,
    path: PathBuf,
    debounce: Duration,
    state: Arc<Mutex<IndexDocument>>,
    pending_flush: Mutex<Option<JoinHandle<()>>>,
}

impl DurableIndex {
    /// Loads the index from `path`, or starts empty.
    ///
    /// A missing document is normal (first run). A document that cannot be
    /// read or parsed is absorbed into an empty default and logged; the
    /// caller always gets a usable index.
    #[must_use]
    pub fn load(
        storage: Arc<dyn StorageProvider>,
        clock: Arc<dyn Clock>,
        path: impl Into<PathBuf>,
    ) -> Self {
        let path = path.into();
        let document = if storage.exists(&path) {
            match storage.read_to_string(&path) {
                Ok(contents) => match serde_json::from_str::<IndexDocument>(&contents) {
                    Ok(document) => document,
                    Err(error) => {
                        warn!(path = %path.display(), %error, "index document corrupt, starting empty");
                        IndexDocument::default()
                    }
                },
                Err(error) => {
                    warn!(path = %path.display(), %error, "index document unreadable, starting empty");
                    IndexDocument::default()
                }
            }
        } else {
            IndexDocument::default()
        };

        Self {
            storage,
            clock,
            path,
            debounce: FLUSH_DEBOUNCE,
            state: Arc::new(Mutex::new(document)),
            pending_flush: Mutex::new(None),
        }
    }

    /// Overrides the debounce window (test hook).
    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Returns the first file path whose metadata references `task_id`.
    ///
    /// Linear scan in path order; with a consistent index at most one path
    /// matches, and during reconciliation the first match is the default
    /// canonical location.
    #[must_use]
    pub fn get_location(&self, task_id: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .file_metadata
            .iter()
            .find(|(_, detail)| detail.task_ids.iter().any(|id| id == task_id))
            .map(|(path, _)| path.clone())
    }

    /// Returns a copy of the task record for `task_id`, if indexed.
    #[must_use]
    pub fn task_record(&self, task_id: &str) -> Option<TaskRecord> {
        let state = self.state.lock().unwrap();
        state.tasks.iter().find(|record| record.id == task_id).cloned()
    }

    /// Returns a copy of the metadata entry for `path`, if present.
    #[must_use]
    pub fn file_detail(&self, path: &str) -> Option<FileDetail> {
        let state = self.state.lock().unwrap();
        state.file_metadata.get(path).cloned()
    }

    /// Returns a copy of the whole in-memory document.
    #[must_use]
    pub fn snapshot(&self) -> IndexDocument {
        self.state.lock().unwrap().clone()
    }

    /// Replaces the metadata entry for `path` and schedules a flush.
    pub fn set_file_metadata(&self, path: &str, detail: FileDetail) {
        {
            let mut state = self.state.lock().unwrap();
            if detail.task_ids.is_empty() {
                state.file_metadata.remove(path);
            } else {
                state.file_metadata.insert(path.to_string(), detail);
            }
        }
        self.schedule_flush();
    }

    /// Drops the `task_id` mapping for `path` and schedules a flush.
    ///
    /// Keeps task records consistent with the mappings: a record owned by
    /// the removed path is repointed at the remaining location, and a task
    /// no document claims any more is dropped entirely.
    pub fn remove_task_from_file(&self, path: &str, task_id: &str) {
        {
            let mut state = self.state.lock().unwrap();

            let emptied = if let Some(detail) = state.file_metadata.get_mut(path) {
                detail.task_ids.retain(|id| id != task_id);
                detail.task_ids.is_empty()
            } else {
                false
            };
            if emptied {
                state.file_metadata.remove(path);
            }

            let remaining = state
                .file_metadata
                .iter()
                .find(|(_, detail)| detail.task_ids.iter().any(|id| id == task_id))
                .map(|(remaining_path, _)| remaining_path.clone());

            match remaining {
                Some(remaining_path) => {
                    if let Some(record) =
                        state.tasks.iter_mut().find(|record| record.id == task_id)
                    {
                        if record.path == path {
                            record.path = remaining_path;
                        }
                    }
                }
                None => state.tasks.retain(|record| record.id != task_id),
            }
        }
        self.schedule_flush();
    }

    /// Inserts or replaces a task record by id and schedules a flush.
    pub fn upsert_task(&self, record: TaskRecord) {
        {
            let mut state = self.state.lock().unwrap();
            if let Some(existing) = state.tasks.iter_mut().find(|r| r.id == record.id) {
                *existing = record;
            } else {
                state.tasks.push(record);
            }
        }
        self.schedule_flush();
    }

    /// Records this device's identity in the bookkeeping metadata.
    pub fn set_device(&self, device_id: &str, device_name: &str) {
        {
            let mut state = self.state.lock().unwrap();
            state.meta.device_id = Some(device_id.to_string());
            state.meta.device_name = Some(device_name.to_string());
        }
        self.schedule_flush();
    }

    /// Records the last remote payload write (checkpoint hash + time).
    pub fn set_remote_checkpoint(&self, payload_hash: &str) {
        {
            let mut state = self.state.lock().unwrap();
            state.meta.last_payload_hash = Some(payload_hash.to_string());
            state.meta.last_payload_write_ts = Some(self.clock.now());
        }
        self.schedule_flush();
    }

    /// Writes the in-memory state to storage now.
    ///
    /// Cancels any pending debounced flush first, then waits for it to
    /// settle so the explicit write cannot interleave with the timer's.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::Io`] if serialization or the storage
    /// write fails.
    pub async fn flush(&self) -> Result<(), ReconcileError> {
        let pending = self.pending_flush.lock().unwrap().take();
        if let Some(handle) = pending {
            handle.abort();
            let _ = handle.await;
        }
        write_document(&*self.storage, &*self.clock, &self.path, &self.state)
    }

    /// Schedules the debounced write-behind flush, superseding any flush
    /// already scheduled. Must be called from within a tokio runtime.
    fn schedule_flush(&self) {
        let state = Arc::clone(&self.state);
        let storage = Arc::clone(&self.storage);
        let clock = Arc::clone(&self.clock);
        let path = self.path.clone();
        let debounce = self.debounce;

        let mut pending = self.pending_flush.lock().unwrap();
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if let Err(error) = write_document(&*storage, &*clock, &path, &state) {
                warn!(path = %path.display(), %error, "debounced index flush failed");
            }
        }));
    }
}

/// Serializes the document and writes it through the storage port,
/// stamping the schema version and save time.
fn write_document(
    storage: &dyn StorageProvider,
    clock: &dyn Clock,
    path: &std::path::Path,
    state: &Mutex<IndexDocument>,
) -> Result<(), ReconcileError> {
    let serialized = {
        let mut state = state.lock().unwrap();
        state.version = INDEX_FORMAT_VERSION;
        state.meta.last_saved = Some(clock.now());
        serde_json::to_string_pretty(&*state).map_err(|e| ReconcileError::SchemaMismatch {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?
    };
    storage
        .write(path, &serialized)
        .map_err(|e| ReconcileError::io(path.display().to_string(), e))
}
