//! Visual editor: the in-memory model behind the authoring pages.
//!
//! One document is open at a time in an [`EditorSession`]. The session keeps
//! the stored original, a working copy that every edit applies to, and a raw
//! JSON buffer that mirrors the working copy. Nothing reaches the content
//! store until [`EditorSession::save`].
//!
//! ## Submodules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`path`] | JSON-pointer field addressing |
//! | [`form`] | Document → form tree (schema inference + block registry) |
//! | [`ops`] | Field and structure edits (blocks, images, records, lines) |
//! | [`html`] | Form tree and pages → HTML |
//! | [`preview`] | Block and Markdown preview |
//!
//! ## Edit safety
//!
//! Every edit runs against a copy of the working document and only replaces
//! it on success, so a rejected edit (bad number, stale index) leaves the
//! document untouched. Raw-mode text that does not parse keeps the last good
//! value and flags the buffer invalid. Saving a document that lost top-level
//! keys, or whose root changed kind, needs explicit confirmation.

pub mod form;
pub mod html;
pub mod ops;
pub mod path;
pub mod preview;

pub use form::{EditableForm, Field, Widget, render};
pub use ops::{
    Direction, add_image_slot, add_record, append_block, apply_input, move_block,
    on_field_change, remove_block, remove_image_slot, remove_record, set_lines,
};
pub use path::FieldPath;

use crate::config::EditorConfig;
use crate::schema::DEFAULT_TEXTAREA_THRESHOLD;
use crate::store::{ContentStore, StoreError, split_language, to_pretty_json};
use crate::sync::{TranslationMarker, same_kind, sync};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid field path: {0:?}")]
    InvalidPath(String),
    #[error("no value at {0}")]
    PathNotFound(String),
    #[error("index {index} is out of range for {path}")]
    IndexOutOfRange { path: String, index: usize },
    #[error("{path} is not a list")]
    NotAList { path: String },
    #[error("{input:?} is not a valid number")]
    InvalidNumber { path: String, input: String },
    #[error("{0} cannot be edited as a single value")]
    NotEditable(String),
    #[error("unknown block type: {0}")]
    UnknownBlockType(String),
    #[error("confirmation required: {0}")]
    ConfirmationRequired(String),
    #[error("the raw buffer is not valid JSON; fix it before saving")]
    InvalidBuffer,
    #[error("visual editing is not available for this document")]
    NotStructured,
}

/// Rendering knobs taken from the `[editor]` config section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorOptions {
    pub grid_columns: usize,
    pub textarea_threshold: usize,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            grid_columns: 4,
            textarea_threshold: DEFAULT_TEXTAREA_THRESHOLD,
        }
    }
}

impl From<&EditorConfig> for EditorOptions {
    fn from(config: &EditorConfig) -> Self {
        Self {
            grid_columns: config.grid_columns,
            textarea_threshold: config.textarea_threshold,
        }
    }
}

// ============================================================================
// Raw mode
// ============================================================================

/// Editable JSON text bound to a last-known-good value.
#[derive(Debug, Clone)]
pub struct RawEditor {
    text: String,
    value: Value,
    error: Option<String>,
}

impl RawEditor {
    pub fn new(value: &Value) -> Self {
        Self {
            text: pretty(value),
            value: value.clone(),
            error: None,
        }
    }

    /// Replace the text and parse it. Invalid text keeps the previous value.
    pub fn edit(&mut self, text: &str) -> bool {
        self.text = text.to_string();
        match serde_json::from_str::<Value>(text) {
            Ok(value) => {
                self.value = value;
                self.error = None;
                true
            }
            Err(e) => {
                self.error = Some(e.to_string());
                false
            }
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The last value the buffer parsed to.
    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Regenerate the text from a value edited elsewhere.
    pub fn reload(&mut self, value: &Value) {
        *self = Self::new(value);
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

// ============================================================================
// Save validation and drift
// ============================================================================

/// Why a save needs confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveWarning {
    /// The root changed kind (object ↔ array, ...).
    RootTypeMismatch { from: &'static str, to: &'static str },
    /// Top-level keys present in the stored document are gone.
    MissingKeys(Vec<String>),
}

impl fmt::Display for SaveWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveWarning::RootTypeMismatch { from, to } => {
                write!(f, "Root type mismatch: the document was {from} and is now {to}")
            }
            SaveWarning::MissingKeys(keys) => {
                write!(f, "Missing critical keys: {}", keys.join(", "))
            }
        }
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Check a pending save against the stored document.
pub fn validate_save(original: &Value, current: &Value) -> Option<SaveWarning> {
    if !same_kind(original, current) {
        return Some(SaveWarning::RootTypeMismatch {
            from: kind_name(original),
            to: kind_name(current),
        });
    }
    let (Value::Object(before), Value::Object(after)) = (original, current) else {
        return None;
    };
    let missing: Vec<String> = before
        .keys()
        .filter(|k| !after.contains_key(*k))
        .cloned()
        .collect();
    (!missing.is_empty()).then_some(SaveWarning::MissingKeys(missing))
}

/// Paths a structural sync from `master` would add to or replace in `doc`.
pub fn structural_drift(master: &Value, doc: &Value) -> Vec<FieldPath> {
    let mut missing = Vec::new();
    collect_drift(master, doc, FieldPath::root(), &mut missing);
    missing
}

fn collect_drift(master: &Value, doc: &Value, at: FieldPath, out: &mut Vec<FieldPath>) {
    if master.is_null() {
        return;
    }
    if doc.is_null() || !same_kind(master, doc) {
        out.push(at);
        return;
    }
    match (master, doc) {
        (Value::Array(master_items), Value::Array(items)) => {
            for (index, item) in master_items.iter().enumerate() {
                match items.get(index) {
                    Some(existing) => collect_drift(item, existing, at.index(index), out),
                    None => out.push(at.index(index)),
                }
            }
        }
        (Value::Object(master_map), Value::Object(map)) => {
            for (key, value) in master_map {
                match map.get(key) {
                    Some(existing) => collect_drift(value, existing, at.key(key), out),
                    None => out.push(at.key(key)),
                }
            }
        }
        _ => {}
    }
}

// ============================================================================
// Session
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorMode {
    #[default]
    Visual,
    Raw,
    Preview,
}

impl EditorMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "visual" => Some(EditorMode::Visual),
            "raw" => Some(EditorMode::Raw),
            "preview" => Some(EditorMode::Preview),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EditorMode::Visual => "visual",
            EditorMode::Raw => "raw",
            EditorMode::Preview => "preview",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Json,
    Markdown,
}

impl DocumentKind {
    pub fn of(file: &str) -> Self {
        if file.to_lowercase().ends_with(".md") {
            DocumentKind::Markdown
        } else {
            DocumentKind::Json
        }
    }
}

/// The single open document.
#[derive(Debug, Clone)]
pub struct EditorSession {
    file: String,
    kind: DocumentKind,
    original: Value,
    working: Value,
    raw: RawEditor,
    pub mode: EditorMode,
    pub options: EditorOptions,
}

impl EditorSession {
    /// Load `file` (store-relative) into a new session.
    ///
    /// A JSON file that does not parse still opens, in raw mode with the
    /// parse error showing, so it can be repaired.
    pub fn open(store: &ContentStore, file: &str, options: EditorOptions) -> Result<Self, EditError> {
        let text = store.read(file)?;
        let kind = DocumentKind::of(file);
        let session = match kind {
            DocumentKind::Markdown => {
                let value = Value::String(text.clone());
                Self {
                    file: file.to_string(),
                    kind,
                    raw: RawEditor {
                        text,
                        value: value.clone(),
                        error: None,
                    },
                    original: value.clone(),
                    working: value,
                    mode: EditorMode::Raw,
                    options,
                }
            }
            DocumentKind::Json => {
                let mut session = Self::from_value(file, Value::Null, options);
                match serde_json::from_str::<Value>(&text) {
                    Ok(value) => {
                        session.original = value.clone();
                        session.raw.reload(&value);
                        session.working = value;
                    }
                    Err(_) => {
                        tracing::warn!(file, "opened a file that is not valid JSON");
                        session.raw.edit(&text);
                        session.mode = EditorMode::Raw;
                    }
                }
                session
            }
        };
        Ok(session)
    }

    /// A JSON session over an in-memory value, as if just loaded.
    pub fn from_value(file: &str, value: Value, options: EditorOptions) -> Self {
        Self {
            file: file.to_string(),
            kind: DocumentKind::Json,
            raw: RawEditor::new(&value),
            original: value.clone(),
            working: value,
            mode: EditorMode::Visual,
            options,
        }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn original(&self) -> &Value {
        &self.original
    }

    pub fn working(&self) -> &Value {
        &self.working
    }

    pub fn raw(&self) -> &RawEditor {
        &self.raw
    }

    pub fn is_dirty(&self) -> bool {
        self.working != self.original || !self.raw.is_valid()
    }

    /// The language code this file belongs to (`en` for `en/home.json`).
    pub fn language(&self) -> Option<&str> {
        split_language(&self.file).map(|(lang, _)| lang)
    }

    /// Apply a structured edit to the working copy. On error the working
    /// copy is left exactly as it was.
    pub fn apply<T>(
        &mut self,
        edit: impl FnOnce(&mut Value) -> Result<T, EditError>,
    ) -> Result<T, EditError> {
        if self.kind == DocumentKind::Markdown {
            return Err(EditError::NotStructured);
        }
        if !self.raw.is_valid() {
            return Err(EditError::InvalidBuffer);
        }
        let mut draft = self.working.clone();
        let result = edit(&mut draft)?;
        self.raw.reload(&draft);
        self.working = draft;
        Ok(result)
    }

    /// Replace the raw buffer. JSON that parses becomes the working copy;
    /// JSON that does not keeps the last good value.
    pub fn edit_raw(&mut self, text: &str) -> bool {
        match self.kind {
            DocumentKind::Markdown => {
                self.raw.text = text.to_string();
                self.working = Value::String(text.to_string());
                true
            }
            DocumentKind::Json => {
                let valid = self.raw.edit(text);
                if valid {
                    self.working = self.raw.value().clone();
                }
                valid
            }
        }
    }

    /// Form tree for the visual mode.
    pub fn form(&self) -> EditableForm {
        match self.kind {
            DocumentKind::Json => render(&self.working, &self.options),
            DocumentKind::Markdown => EditableForm::RawOnly,
        }
    }

    fn master_document(&self, store: &ContentStore) -> Option<Value> {
        if self.kind != DocumentKind::Json {
            return None;
        }
        let (lang, rel) = split_language(&self.file)?;
        if lang == store.master() {
            return None;
        }
        store.read_json(&format!("{}/{}", store.master(), rel)).ok()
    }

    /// Master structure missing from the working copy. `None` for master
    /// files, Markdown, or when the master has no counterpart.
    pub fn master_drift(&self, store: &ContentStore) -> Option<Vec<FieldPath>> {
        let master = self.master_document(store)?;
        Some(structural_drift(&master, &self.working))
    }

    /// Forward-fill master structure into the working copy. Not saved.
    pub fn sync_from_master(
        &mut self,
        store: &ContentStore,
        marker: &TranslationMarker,
    ) -> Result<usize, EditError> {
        let master = self
            .master_document(store)
            .ok_or_else(|| EditError::PathNotFound(format!("master counterpart of {}", self.file)))?;
        self.apply(|doc| {
            let outcome = sync(&master, doc, marker);
            *doc = outcome.merged;
            Ok(outcome.changes)
        })
    }

    /// Pending confirmation for saving the working copy, if any.
    pub fn save_warning(&self) -> Option<SaveWarning> {
        match self.kind {
            DocumentKind::Json if !self.original.is_null() => {
                validate_save(&self.original, &self.working)
            }
            _ => None,
        }
    }

    /// Write the working copy. Needs `confirmed` when [`Self::save_warning`]
    /// reports something.
    pub fn save(&mut self, store: &ContentStore, confirmed: bool) -> Result<(), EditError> {
        if !self.raw.is_valid() {
            return Err(EditError::InvalidBuffer);
        }
        if let Some(warning) = self.save_warning()
            && !confirmed
        {
            return Err(EditError::ConfirmationRequired(warning.to_string()));
        }
        match &self.working {
            Value::String(text) if self.kind == DocumentKind::Markdown => {
                store.write(&self.file, text)?
            }
            value => store.write(&self.file, &to_pretty_json(value)?)?,
        }
        self.original = self.working.clone();
        tracing::info!(file = %self.file, "saved");
        Ok(())
    }

    /// Discard unsaved edits.
    pub fn reset(&mut self) {
        self.working = self.original.clone();
        match self.kind {
            DocumentKind::Json => self.raw.reload(&self.original),
            DocumentKind::Markdown => {
                self.raw.text = self.original.as_str().unwrap_or_default().to_string();
            }
        }
    }
}
