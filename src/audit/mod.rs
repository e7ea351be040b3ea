//! Append-only journal of reconciliation operations.
//!
//! The journal is the authoritative trail for every backup the executor
//! created and every mutation it made. Entries are never edited or
//! removed. Appending is read-modify-rewrite of the whole JSON array,
//! which is only safe for a single writer; the executor serializes all
//! appends by construction.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ReconcileError;
use crate::ports::StorageProvider;

/// Who initiated a reconciliation operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    /// A user explicitly asked for this operation.
    #[serde(rename = "manual")]
    Manual,
    /// The operation ran as part of an automatic pass.
    #[serde(rename = "auto")]
    Automatic,
}

/// One recorded mutation within an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditAction {
    /// Kind of mutation, e.g. `"delete"`.
    #[serde(rename = "type")]
    pub action_type: String,
    /// Document the mutation touched.
    pub file: String,
    /// Structured context (task id, line range, backup path).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// An immutable record of one reconciliation operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    /// Unique operation id.
    pub op_id: String,
    /// When the operation ran.
    pub ts: DateTime<Utc>,
    /// Who initiated it.
    pub user_action: Origin,
    /// Free-form operation summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Backup files created before mutations, in creation order.
    #[serde(default)]
    pub backups: Vec<String>,
    /// Mutations applied, in execution order.
    #[serde(default)]
    pub actions: Vec<AuditAction>,
}

/// Derives the backup path for a document about to be mutated.
///
/// A `.md` source swaps its extension for
/// `.tickticksync-dup-bak-<timestamp>.bkup`; any other path gets the same
/// suffix appended. The timestamp is the operation time with `:` and `.`
/// replaced by `-`, so backup names stay filesystem-safe and sort
/// chronologically.
#[must_use]
pub fn backup_path_for(source: &str, at: DateTime<Utc>) -> String {
    let stamp = at.to_rfc3339_opts(SecondsFormat::Millis, true).replace([':', '.'], "-");
    let suffix = format!(".tickticksync-dup-bak-{stamp}.bkup");
    match source.strip_suffix(".md") {
        Some(stem) => format!("{stem}{suffix}"),
        None => format!("{source}{suffix}"),
    }
}

/// The persisted journal, stored as a single JSON array.
pub struct AuditLog {
    storage: Arc<dyn StorageProvider>,
    path: PathBuf,
}

impl AuditLog {
    /// Creates a journal handle writing to `path`.
    #[must_use]
    pub fn new(storage: Arc<dyn StorageProvider>, path: impl Into<PathBuf>) -> Self {
        Self { storage, path: path.into() }
    }

    /// Reads every entry, oldest first. A missing journal is empty.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::Io`] if the journal cannot be read, or
    /// [`ReconcileError::SchemaMismatch`] if it cannot be parsed.
    pub fn read_all(&self) -> Result<Vec<AuditEntry>, ReconcileError> {
        if !self.storage.exists(&self.path) {
            return Ok(Vec::new());
        }
        let contents = self
            .storage
            .read_to_string(&self.path)
            .map_err(|e| ReconcileError::io(self.path.display().to_string(), e))?;
        serde_json::from_str(&contents).map_err(|e| ReconcileError::SchemaMismatch {
            path: self.path.display().to_string(),
            detail: e.to_string(),
        })
    }

    /// Appends one entry and rewrites the journal.
    ///
    /// # Errors
    ///
    /// Fails without touching the journal if the existing document cannot
    /// be read or parsed: a corrupt journal must never be clobbered,
    /// since it references backups that would otherwise become orphans.
    /// Also fails if the rewrite itself fails.
    pub fn append(&self, entry: AuditEntry) -> Result<(), ReconcileError> {
        let mut entries = self.read_all()?;
        entries.push(entry);
        let serialized =
            serde_json::to_string_pretty(&entries).map_err(|e| ReconcileError::SchemaMismatch {
                path: self.path.display().to_string(),
                detail: e.to_string(),
            })?;
        self.storage
            .write(&self.path, &serialized)
            .map_err(|e| ReconcileError::io(self.path.display().to_string(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemStorage;
    use std::path::Path;

    const JOURNAL_PATH: &str = ".ticksync/journal.json";

    fn ts(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc)
    }

    fn entry(op_id: &str) -> AuditEntry {
        AuditEntry {
            op_id: op_id.to_string(),
            ts: ts("2024-06-15T10:30:00Z"),
            user_action: Origin::Manual,
            description: None,
            backups: vec!["B.tickticksync-dup-bak-x.bkup".to_string()],
            actions: vec![AuditAction {
                action_type: "delete".to_string(),
                file: "B.md".to_string(),
                details: Some(serde_json::json!({"taskId": "T-1"})),
            }],
        }
    }

    // --- backup_path_for tests ---

    #[test]
    fn markdown_source_swaps_extension() {
        let at = ts("2024-06-15T10:30:00.000Z");
        assert_eq!(
            backup_path_for("notes/B.md", at),
            "notes/B.tickticksync-dup-bak-2024-06-15T10-30-00-000Z.bkup"
        );
    }

    #[test]
    fn other_extension_gets_suffix_appended() {
        let at = ts("2024-06-15T10:30:00.000Z");
        assert_eq!(
            backup_path_for("notes/B.txt", at),
            "notes/B.txt.tickticksync-dup-bak-2024-06-15T10-30-00-000Z.bkup"
        );
    }

    #[test]
    fn backup_stamp_contains_no_colons_or_dots() {
        let at = ts("2024-06-15T10:30:00.123Z");
        let path = backup_path_for("B.md", at);
        let stamp = path
            .strip_prefix("B.tickticksync-dup-bak-")
            .and_then(|rest| rest.strip_suffix(".bkup"))
            .unwrap();
        assert!(!stamp.contains(':') && !stamp.contains('.'));
    }

    // --- AuditLog tests ---

    #[test]
    fn read_all_on_missing_journal_is_empty() {
        let log = AuditLog::new(Arc::new(MemStorage::new()), JOURNAL_PATH);
        assert!(log.read_all().unwrap().is_empty());
    }

    #[test]
    fn append_creates_and_extends_journal_in_order() {
        let storage = Arc::new(MemStorage::new());
        let log = AuditLog::new(storage.clone(), JOURNAL_PATH);

        log.append(entry("op-1")).unwrap();
        log.append(entry("op-2")).unwrap();

        let entries = log.read_all().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].op_id, "op-1");
        assert_eq!(entries[1].op_id, "op-2");
    }

    #[test]
    fn append_refuses_to_clobber_corrupt_journal() {
        let storage = Arc::new(MemStorage::with_files(&[(JOURNAL_PATH, "{oops")]));
        let log = AuditLog::new(storage.clone(), JOURNAL_PATH);

        let result = log.append(entry("op-1"));
        assert!(matches!(result, Err(ReconcileError::SchemaMismatch { .. })));
        assert_eq!(storage.read_to_string(Path::new(JOURNAL_PATH)).unwrap(), "{oops");
    }

    #[test]
    fn wire_format_matches_contract() {
        let storage = Arc::new(MemStorage::new());
        let log = AuditLog::new(storage.clone(), JOURNAL_PATH);
        log.append(entry("op-1")).unwrap();

        let raw = storage.read_to_string(Path::new(JOURNAL_PATH)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let first = &value.as_array().unwrap()[0];
        assert_eq!(first["opId"], "op-1");
        assert_eq!(first["userAction"], "manual");
        assert_eq!(first["actions"][0]["type"], "delete");
        assert_eq!(first["ts"], "2024-06-15T10:30:00Z");
    }

    #[test]
    fn origin_serializes_to_short_names() {
        assert_eq!(serde_json::to_string(&Origin::Manual).unwrap(), "\"manual\"");
        assert_eq!(serde_json::to_string(&Origin::Automatic).unwrap(), "\"auto\"");
    }
}
