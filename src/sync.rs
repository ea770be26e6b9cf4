//! Structural sync: forward-fill master structure into every translation.
//!
//! The master language is the structural template. For every master `.json`
//! file, the matching file of a target language is merged with it so that
//! every key and array index of the master exists in the target too. Values
//! the target already has are never overwritten: this is structure sync, not
//! content sync, so an *updated* master string does not reach translators.
//!
//! ## Merge rules
//!
//! Checked in order by [`sync`]:
//!
//! 1. Target absent (`null`): a marked copy of the master, one change.
//!    A `null` master adds nothing.
//! 2. Kind mismatch (string vs number, array vs object, ...): the target is
//!    replaced by a marked copy of the master, one change.
//! 3. Arrays: walk master indices. Missing indices get a marked copy (one
//!    change each), shared indices recurse. Extra target elements stay.
//! 4. Objects: missing keys get a marked copy (one change each), shared keys
//!    recurse.
//! 5. Primitives: the target value is kept.
//!
//! Arrays merge by index, so a target whose blocks are in a different order
//! than the master's gets structure from the wrong block. This is a known
//! limitation of index-based merging.
//!
//! Copied strings are prefixed with the translation marker (`[TODO] `) unless
//! they look like a URL or path, or are too short to be prose.

use crate::config::{SyncConfig, is_valid_language_code};
use crate::editor::{FieldPath, structural_drift};
use crate::store::{ContentStore, StoreError, list_files};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("'{0}' is the master language and cannot be a sync target")]
    MasterTarget(String),
    #[error("master language '{0}' has no content directory")]
    MasterMissing(String),
}

/// Policy for marking strings copied from the master.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationMarker {
    pub marker: String,
    pub min_length: usize,
}

impl Default for TranslationMarker {
    fn default() -> Self {
        Self::from(&SyncConfig::default())
    }
}

impl From<&SyncConfig> for TranslationMarker {
    fn from(config: &SyncConfig) -> Self {
        Self {
            marker: config.marker.clone(),
            min_length: config.min_length,
        }
    }
}

impl TranslationMarker {
    /// URLs, absolute paths and very short strings are copied unmarked.
    pub fn should_mark(&self, s: &str) -> bool {
        !(s.starts_with("http") || s.starts_with('/') || s.chars().count() < self.min_length)
    }

    pub fn mark(&self, s: &str) -> String {
        if self.should_mark(s) {
            format!("{} {}", self.marker, s)
        } else {
            s.to_string()
        }
    }

    /// Deep copy of `value` with every markable string marked.
    pub fn mark_value(&self, value: &Value) -> Value {
        match value {
            Value::String(s) => Value::String(self.mark(s)),
            Value::Array(items) => Value::Array(items.iter().map(|v| self.mark_value(v)).collect()),
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), self.mark_value(v)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}

/// Result of merging one master value into one target value.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncOutcome {
    pub merged: Value,
    pub changes: usize,
}

impl SyncOutcome {
    fn unchanged(target: &Value) -> Self {
        Self {
            merged: target.clone(),
            changes: 0,
        }
    }
}

/// True when both values are the same JSON kind.
pub(crate) fn same_kind(a: &Value, b: &Value) -> bool {
    std::mem::discriminant(a) == std::mem::discriminant(b)
}

/// Merge master structure into `target`. `Value::Null` means absent.
pub fn sync(master: &Value, target: &Value, marker: &TranslationMarker) -> SyncOutcome {
    if master.is_null() {
        return SyncOutcome::unchanged(target);
    }
    if target.is_null() || !same_kind(master, target) {
        return SyncOutcome {
            merged: marker.mark_value(master),
            changes: 1,
        };
    }
    match (master, target) {
        (Value::Array(master_items), Value::Array(target_items)) => {
            let mut merged = target_items.clone();
            let mut changes = 0;
            for (index, item) in master_items.iter().enumerate() {
                match target_items.get(index) {
                    None => {
                        merged.push(marker.mark_value(item));
                        changes += 1;
                    }
                    Some(existing) => {
                        let outcome = sync(item, existing, marker);
                        if outcome.changes > 0 {
                            merged[index] = outcome.merged;
                            changes += outcome.changes;
                        }
                    }
                }
            }
            SyncOutcome {
                merged: Value::Array(merged),
                changes,
            }
        }
        (Value::Object(master_map), Value::Object(target_map)) => {
            let mut merged = target_map.clone();
            let mut changes = 0;
            for (key, value) in master_map {
                match target_map.get(key) {
                    None => {
                        merged.insert(key.clone(), marker.mark_value(value));
                        changes += 1;
                    }
                    Some(existing) => {
                        let outcome = sync(value, existing, marker);
                        if outcome.changes > 0 {
                            merged.insert(key.clone(), outcome.merged);
                            changes += outcome.changes;
                        }
                    }
                }
            }
            SyncOutcome {
                merged: Value::Object(merged),
                changes,
            }
        }
        _ => SyncOutcome::unchanged(target),
    }
}

// ============================================================================
// File-level sync
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    pub marker: TranslationMarker,
    /// Compute changes without writing any file.
    pub dry_run: bool,
}

/// What happened to one target file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    Unchanged,
    Updated,
    /// The target file did not exist.
    Created,
    /// The target file was not valid JSON and was rebuilt from the master.
    Replaced,
    /// The master file could not be read or parsed, or the write failed.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSync {
    /// Language-relative path (`products/d501.json`).
    pub path: String,
    pub changes: usize,
    pub status: FileStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageSyncReport {
    pub language: String,
    pub dry_run: bool,
    pub files: Vec<FileSync>,
}

impl LanguageSyncReport {
    pub fn total_changes(&self) -> usize {
        self.files.iter().map(|f| f.changes).sum()
    }

    /// Files that were (or, in a dry run, would be) written.
    pub fn files_changed(&self) -> usize {
        self.files.iter().filter(|f| f.changes > 0).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileSync> {
        self.files
            .iter()
            .filter(|f| matches!(f.status, FileStatus::Failed(_)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub languages: Vec<LanguageSyncReport>,
    /// Languages that could not be synced at all, with the reason.
    pub failed: Vec<(String, String)>,
}

impl SyncReport {
    pub fn total_changes(&self) -> usize {
        self.languages.iter().map(|l| l.total_changes()).sum()
    }
}

/// Master `.json` files as language-relative paths.
fn master_files(store: &ContentStore) -> Result<Vec<String>, SyncError> {
    let master_dir = store.root().join(store.master());
    if !master_dir.is_dir() {
        return Err(SyncError::MasterMissing(store.master().to_string()));
    }
    Ok(list_files(&master_dir, &["json"]))
}

/// Sync every master file into one target language.
///
/// Errors on individual files are logged and recorded; the run continues.
pub fn sync_language(
    store: &ContentStore,
    language: &str,
    options: &SyncOptions,
) -> Result<LanguageSyncReport, SyncError> {
    if language == store.master() {
        return Err(SyncError::MasterTarget(language.to_string()));
    }
    if !is_valid_language_code(language) {
        return Err(StoreError::InvalidLanguage(language.to_string()).into());
    }

    let mut files = Vec::new();
    for rel in master_files(store)? {
        let file = sync_file(store, language, &rel, options);
        match &file.status {
            FileStatus::Failed(reason) => error!(language, file = %rel, "sync failed: {reason}"),
            _ if file.changes > 0 => info!(
                language,
                file = %rel,
                changes = file.changes,
                dry_run = options.dry_run,
                "synced"
            ),
            _ => {}
        }
        files.push(file);
    }
    Ok(LanguageSyncReport {
        language: language.to_string(),
        dry_run: options.dry_run,
        files,
    })
}

fn sync_file(store: &ContentStore, language: &str, rel: &str, options: &SyncOptions) -> FileSync {
    let failed = |reason: String| FileSync {
        path: rel.to_string(),
        changes: 0,
        status: FileStatus::Failed(reason),
    };

    let master = match store.read_json(&format!("{}/{}", store.master(), rel)) {
        Ok(value) => value,
        Err(e) => return failed(format!("master file: {e}")),
    };

    let target_rel = format!("{language}/{rel}");
    let (target, mut status) = match store.read_json(&target_rel) {
        Ok(value) => (value, FileStatus::Updated),
        Err(StoreError::NotFound(_)) => (Value::Object(Default::default()), FileStatus::Created),
        Err(StoreError::Json(e)) => {
            warn!(file = %target_rel, "target file is corrupted ({e}), rebuilding from master");
            (Value::Object(Default::default()), FileStatus::Replaced)
        }
        Err(e) => return failed(format!("target file: {e}")),
    };

    let outcome = sync(&master, &target, &options.marker);
    if outcome.changes == 0 {
        status = FileStatus::Unchanged;
    } else if !options.dry_run {
        if let Err(e) = store.write_json(&target_rel, &outcome.merged) {
            return failed(format!("write: {e}"));
        }
    }
    FileSync {
        path: rel.to_string(),
        changes: outcome.changes,
        status,
    }
}

/// Sync the given target languages. A language that fails entirely is
/// logged and recorded, and the remaining languages still run.
pub fn sync_languages(
    store: &ContentStore,
    languages: &[String],
    options: &SyncOptions,
) -> SyncReport {
    let mut report = SyncReport::default();
    for language in languages {
        match sync_language(store, language, options) {
            Ok(lang_report) => report.languages.push(lang_report),
            Err(e) => {
                error!(language = %language, "failed to sync: {e}");
                report.failed.push((language.clone(), e.to_string()));
            }
        }
    }
    report
}

/// Sync every non-master language.
pub fn sync_all(store: &ContentStore, options: &SyncOptions) -> Result<SyncReport, SyncError> {
    let targets = store.target_languages()?;
    info!(master = store.master(), targets = ?targets, "starting structural sync");
    Ok(sync_languages(store, &targets, options))
}

// ============================================================================
// Drift check
// ============================================================================

/// Master structure missing from one target file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileDrift {
    pub path: String,
    /// Missing paths. Empty with `unreadable` set when the file is absent or
    /// not valid JSON.
    pub missing: Vec<FieldPath>,
    pub unreadable: Option<String>,
}

/// Report structural drift for every master file of one target language
/// without writing anything. Files in parity are omitted.
pub fn check_language(store: &ContentStore, language: &str) -> Result<Vec<FileDrift>, SyncError> {
    if language == store.master() {
        return Err(SyncError::MasterTarget(language.to_string()));
    }
    if !is_valid_language_code(language) {
        return Err(StoreError::InvalidLanguage(language.to_string()).into());
    }
    let mut drifts = Vec::new();
    for rel in master_files(store)? {
        let master = match store.read_json(&format!("{}/{}", store.master(), rel)) {
            Ok(value) => value,
            Err(e) => {
                warn!(file = %rel, "skipping unreadable master file: {e}");
                continue;
            }
        };
        let drift = match store.read_json(&format!("{language}/{rel}")) {
            Ok(target) => FileDrift {
                path: rel.clone(),
                missing: structural_drift(&master, &target),
                unreadable: None,
            },
            Err(e) => FileDrift {
                path: rel.clone(),
                missing: Vec::new(),
                unreadable: Some(e.to_string()),
            },
        };
        if !drift.missing.is_empty() || drift.unreadable.is_some() {
            drifts.push(drift);
        }
    }
    Ok(drifts)
}
