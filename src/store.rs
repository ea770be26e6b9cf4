//! Content store: the language-partitioned tree of JSON and Markdown files.
//!
//! ```text
//! public/data/
//! ├── zh/                  # master language
//! │   ├── home.json
//! │   ├── products.json    # index document
//! │   └── products/
//! │       └── d501.json    # detail document
//! └── en/
//!     └── ...
//! ```
//!
//! Every path handed to the store is relative to the data root
//! (`en/home.json`). Absolute paths and `..` components are refused so a
//! request can never reach outside the tree. Reads and writes are whole-file
//! and synchronous; the last writer wins.

use crate::config::is_valid_language_code;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Extensions of editable content files.
pub const CONTENT_EXTENSIONS: &[&str] = &["json", "md"];

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("access denied: {0}")]
    AccessDenied(String),
    #[error("invalid language code: {0:?}")]
    InvalidLanguage(String),
    #[error("language '{0}' already exists")]
    LanguageExists(String),
    #[error("language not found: {0}")]
    LanguageNotFound(String),
    #[error("master language '{0}' does not exist")]
    MasterMissing(String),
    #[error("cannot delete master language '{0}'")]
    MasterProtected(String),
}

/// One language directory under the data root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    pub code: String,
    pub is_master: bool,
}

/// Handle on the content tree rooted at the data directory.
#[derive(Debug, Clone)]
pub struct ContentStore {
    root: PathBuf,
    master: String,
}

impl ContentStore {
    pub fn new(data_root: impl Into<PathBuf>, master: impl Into<String>) -> Self {
        Self {
            root: data_root.into(),
            master: master.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn master(&self) -> &str {
        &self.master
    }

    /// Map a store-relative path to a filesystem path inside the data root.
    pub fn resolve(&self, rel: &str) -> Result<PathBuf, StoreError> {
        let rel_path = Path::new(rel);
        if rel.trim().is_empty() {
            return Err(StoreError::AccessDenied("empty path".into()));
        }
        for component in rel_path.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => return Err(StoreError::AccessDenied(rel.to_string())),
            }
        }
        Ok(self.root.join(rel_path))
    }

    /// Raw text of a file.
    pub fn read(&self, rel: &str) -> Result<String, StoreError> {
        let path = self.resolve(rel)?;
        if !path.is_file() {
            return Err(StoreError::NotFound(rel.to_string()));
        }
        Ok(fs::read_to_string(path)?)
    }

    pub fn read_json(&self, rel: &str) -> Result<Value, StoreError> {
        let text = self.read(rel)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Write raw text, creating parent directories as needed.
    pub fn write(&self, rel: &str, content: &str) -> Result<(), StoreError> {
        let path = self.resolve(rel)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Write a JSON document pretty-printed with two-space indentation.
    pub fn write_json(&self, rel: &str, value: &Value) -> Result<(), StoreError> {
        self.write(rel, &to_pretty_json(value)?)
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.resolve(rel).map(|p| p.is_file()).unwrap_or(false)
    }

    pub fn delete(&self, rel: &str) -> Result<(), StoreError> {
        let path = self.resolve(rel)?;
        if !path.is_file() {
            return Err(StoreError::NotFound(rel.to_string()));
        }
        fs::remove_file(path)?;
        Ok(())
    }

    /// Content files (`.json`, `.md`) under a language, or under the whole
    /// data root when `lang` is `None`. Paths are relative to that directory,
    /// `/`-separated and sorted. Hidden files and directories are skipped.
    /// A missing directory lists as empty.
    pub fn list(&self, lang: Option<&str>) -> Result<Vec<String>, StoreError> {
        let dir = match lang {
            Some(code) => self.language_dir(code)?,
            None => self.root.clone(),
        };
        Ok(list_files(&dir, CONTENT_EXTENSIONS))
    }

    // =========================================================================
    // Languages
    // =========================================================================

    fn language_dir(&self, code: &str) -> Result<PathBuf, StoreError> {
        if !is_valid_language_code(code) {
            return Err(StoreError::InvalidLanguage(code.to_string()));
        }
        Ok(self.root.join(code))
    }

    /// Language directories under the data root, sorted by code.
    pub fn languages(&self) -> Result<Vec<Language>, StoreError> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }
        let mut languages = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let code = entry.file_name().to_string_lossy().into_owned();
            if code.starts_with('.') {
                continue;
            }
            languages.push(Language {
                is_master: code == self.master,
                code,
            });
        }
        languages.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(languages)
    }

    /// Codes of every language other than the master.
    pub fn target_languages(&self) -> Result<Vec<String>, StoreError> {
        Ok(self
            .languages()?
            .into_iter()
            .filter(|l| !l.is_master)
            .map(|l| l.code)
            .collect())
    }

    /// Create a language by cloning the master tree verbatim.
    pub fn create_language(&self, code: &str) -> Result<(), StoreError> {
        let dest = self.language_dir(code)?;
        if dest.exists() {
            return Err(StoreError::LanguageExists(code.to_string()));
        }
        let src = self.root.join(&self.master);
        if !src.is_dir() {
            return Err(StoreError::MasterMissing(self.master.clone()));
        }
        copy_tree(&src, &dest)?;
        Ok(())
    }

    /// Remove a language's entire tree. The master is protected.
    pub fn delete_language(&self, code: &str) -> Result<(), StoreError> {
        if code == self.master {
            return Err(StoreError::MasterProtected(code.to_string()));
        }
        let dir = self.language_dir(code)?;
        if !dir.is_dir() {
            return Err(StoreError::LanguageNotFound(code.to_string()));
        }
        fs::remove_dir_all(dir)?;
        Ok(())
    }

    /// Raw text of a master-language file, by language-relative path.
    pub fn read_master(&self, rel: &str) -> Result<String, StoreError> {
        self.read(&format!("{}/{}", self.master, rel))
    }
}

/// Serialize with two-space indentation and a trailing newline.
pub fn to_pretty_json(value: &Value) -> Result<String, serde_json::Error> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    Ok(text)
}

/// Split a store path into its language and the language-relative rest:
/// `en/products/d501.json` → `("en", "products/d501.json")`.
pub fn split_language(rel: &str) -> Option<(&str, &str)> {
    let (lang, rest) = rel.split_once('/')?;
    if lang.is_empty() || rest.is_empty() {
        return None;
    }
    Some((lang, rest))
}

/// Files under `dir` with one of `extensions` (case-insensitive), as sorted
/// `/`-separated paths relative to `dir`.
pub(crate) fn list_files(dir: &Path, extensions: &[&str]) -> Vec<String> {
    if !dir.is_dir() {
        return Vec::new();
    }
    let mut files: Vec<String> = WalkDir::new(dir)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .map(|ext| {
                    let ext = ext.to_string_lossy().to_lowercase();
                    extensions.contains(&ext.as_str())
                })
                .unwrap_or(false)
        })
        .filter_map(|e| {
            let rel = e.path().strip_prefix(dir).ok()?;
            let parts: Vec<String> = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            Some(parts.join("/"))
        })
        .collect();
    files.sort();
    files
}

/// Copy the directory tree at `src` into `dest`, creating `dest` as needed.
pub fn copy_tree(src: &Path, dest: &Path) -> Result<(), std::io::Error> {
    for entry in WalkDir::new(src) {
        let entry = entry.map_err(std::io::Error::other)?;
        let Ok(rel) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dest.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
