//! Serde model of the persisted index document.
//!
//! Every field carries a default so documents written by older builds (or
//! hand-edited ones missing fields) still load; unknown extra fields are
//! ignored by serde. Wire names are camelCase to match the host format.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current schema version written on every flush.
pub const INDEX_FORMAT_VERSION: u32 = 2;

/// One indexed task: identity, semantic fields, location, fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    /// Stable external task identifier.
    pub id: String,
    /// Task title.
    pub title: String,
    /// Task body text.
    #[serde(default)]
    pub content: String,
    /// Ids of child items observed under this task, in document order.
    #[serde(default)]
    pub child_ids: Vec<String>,
    /// Path of the document currently owning this task.
    pub path: String,
    /// Content fingerprint at last ingestion.
    #[serde(default)]
    pub checksum: String,
}

/// The task ids a document is believed to contain, one entry per
/// occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDetail {
    /// Task ids in document order; repeats mean repeated occurrences.
    #[serde(default)]
    pub task_ids: Vec<String>,
}

/// Small bookkeeping persisted alongside the mappings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexMeta {
    /// When the index was last flushed.
    #[serde(default)]
    pub last_saved: Option<DateTime<Utc>>,
    /// Id of the task used to track sync state remotely, if any.
    #[serde(default)]
    pub tracking_task_id: Option<String>,
    /// Identity of this device.
    #[serde(default)]
    pub device_id: Option<String>,
    /// Human-readable name of this device.
    #[serde(default)]
    pub device_name: Option<String>,
    /// When the last remote payload write happened.
    #[serde(default)]
    pub last_payload_write_ts: Option<DateTime<Utc>>,
    /// Hash of the last remote payload written (remote checkpoint).
    #[serde(default)]
    pub last_payload_hash: Option<String>,
}

/// The whole persisted index document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDocument {
    /// Schema version of the document.
    #[serde(default = "default_version")]
    pub version: u32,
    /// All known task records.
    #[serde(default)]
    pub tasks: Vec<TaskRecord>,
    /// Per-document task-id metadata, keyed by path.
    #[serde(default)]
    pub file_metadata: BTreeMap<String, FileDetail>,
    /// Bookkeeping.
    #[serde(default)]
    pub meta: IndexMeta,
}

impl Default for IndexDocument {
    fn default() -> Self {
        Self {
            version: INDEX_FORMAT_VERSION,
            tasks: Vec::new(),
            file_metadata: BTreeMap::new(),
            meta: IndexMeta::default(),
        }
    }
}

fn default_version() -> u32 {
    INDEX_FORMAT_VERSION
}
