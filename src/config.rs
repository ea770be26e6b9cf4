//! Project configuration module.
//!
//! Handles loading, validating, and merging `sitedesk.toml`. Every key is
//! optional: stock defaults are serialized to a TOML table and the user file
//! is merged on top of it, so a config file only needs the values it changes.
//!
//! ## Config File Location
//!
//! Place `sitedesk.toml` in the project root, next to the public web root:
//!
//! ```text
//! site/
//! ├── sitedesk.toml            # Project config (overrides stock defaults)
//! └── public/
//!     ├── data/                # Content store: one directory per language
//!     │   ├── zh/              # Master language
//!     │   └── en/
//!     └── images/              # Image store
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! data_dir = "public/data"   # Content store root, relative to the project root
//! public_dir = "public"      # Web root; image paths are public relative to it
//! images_dir = "images"      # Image store, relative to public_dir
//!
//! [languages]
//! master = "zh"              # Structural source of truth for every translation
//!
//! [sync]
//! marker = "[TODO]"          # Prefix for copied strings awaiting translation
//! min_length = 2             # Strings shorter than this are copied unmarked
//!
//! [index]
//! collections = ["products", "solutions"]
//!
//! [editor]
//! grid_columns = 4           # Max columns shown in record grids
//! textarea_threshold = 100   # Strings longer than this edit as a textarea
//!
//! [server]
//! bind = "127.0.0.1:4173"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::index::IndexKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the config file looked up in the project root.
pub const CONFIG_FILENAME: &str = "sitedesk.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Project configuration loaded from `sitedesk.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CmsConfig {
    /// Content store root, relative to the project root.
    pub data_dir: String,
    /// Public web root, relative to the project root.
    pub public_dir: String,
    /// Image store directory, relative to `public_dir`.
    pub images_dir: String,
    /// Master language settings.
    pub languages: LanguagesConfig,
    /// Structural sync settings.
    pub sync: SyncConfig,
    /// Index rebuild settings.
    pub index: IndexConfig,
    /// Visual editor settings.
    pub editor: EditorConfig,
    /// HTTP server settings.
    pub server: ServerConfig,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            data_dir: "public/data".to_string(),
            public_dir: "public".to_string(),
            images_dir: "images".to_string(),
            languages: LanguagesConfig::default(),
            sync: SyncConfig::default(),
            index: IndexConfig::default(),
            editor: EditorConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl CmsConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_valid_language_code(&self.languages.master) {
            return Err(ConfigError::Validation(format!(
                "languages.master must be a language code, got {:?}",
                self.languages.master
            )));
        }
        if self.sync.marker.trim().is_empty() {
            return Err(ConfigError::Validation(
                "sync.marker must not be empty".into(),
            ));
        }
        if self.editor.grid_columns == 0 {
            return Err(ConfigError::Validation(
                "editor.grid_columns must be at least 1".into(),
            ));
        }
        for name in &self.index.collections {
            if IndexKind::parse(name).is_none() {
                return Err(ConfigError::Validation(format!(
                    "index.collections: unknown collection {name:?} (expected products or solutions)"
                )));
            }
        }
        if self.server.bind.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::Validation(format!(
                "server.bind must be an address like 127.0.0.1:4173, got {:?}",
                self.server.bind
            )));
        }
        Ok(())
    }

    /// Absolute content store root for a project rooted at `root`.
    pub fn data_root(&self, root: &Path) -> PathBuf {
        root.join(&self.data_dir)
    }

    /// Absolute public web root for a project rooted at `root`.
    pub fn public_root(&self, root: &Path) -> PathBuf {
        root.join(&self.public_dir)
    }

    /// Absolute image store directory for a project rooted at `root`.
    pub fn images_root(&self, root: &Path) -> PathBuf {
        self.public_root(root).join(&self.images_dir)
    }

    /// Index collections as typed kinds. Unknown names were rejected by
    /// [`CmsConfig::validate`], so they are skipped here.
    pub fn index_kinds(&self) -> Vec<IndexKind> {
        self.index
            .collections
            .iter()
            .filter_map(|name| IndexKind::parse(name))
            .collect()
    }
}

/// Language codes are short directory names: ASCII letters, digits, `-`, `_`.
pub fn is_valid_language_code(code: &str) -> bool {
    !code.is_empty()
        && code.len() <= 16
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LanguagesConfig {
    /// Code of the master language directory.
    pub master: String,
}

impl Default for LanguagesConfig {
    fn default() -> Self {
        Self {
            master: "zh".to_string(),
        }
    }
}

/// Structural sync settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Prefix put in front of strings copied from the master.
    pub marker: String,
    /// Strings with fewer characters than this are copied unmarked.
    pub min_length: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            marker: "[TODO]".to_string(),
            min_length: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexConfig {
    /// Collections rebuilt by `rebuild-index` when no type is given.
    pub collections: Vec<String>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            collections: vec!["products".to_string(), "solutions".to_string()],
        }
    }
}

/// Visual editor settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    /// Maximum number of columns a record grid shows.
    pub grid_columns: usize,
    /// Strings longer than this many characters edit as a textarea.
    pub textarea_threshold: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_columns: 4,
            textarea_threshold: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address the editor server listens on.
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:4173".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    // A struct of strings, integers and string arrays always serializes.
    toml::Value::try_from(CmsConfig::default())
        .unwrap_or_else(|_| toml::Value::Table(toml::map::Map::new()))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `sitedesk.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no config file exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<CmsConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: CmsConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `sitedesk.toml` in the given project root.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<CmsConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `sitedesk.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# sitedesk configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# Content store root, relative to this file. One directory per language:
#   public/data/zh/home.json, public/data/en/home.json, ...
data_dir = "public/data"

# Public web root. Image paths stored in content are relative to it
# (an image at public/images/logo.png is referenced as /images/logo.png).
public_dir = "public"

# Image store directory, relative to public_dir.
images_dir = "images"

# ---------------------------------------------------------------------------
# Languages
# ---------------------------------------------------------------------------
[languages]
# The master language is the structural template for every translation.
# It cannot be deleted from the editor.
master = "zh"

# ---------------------------------------------------------------------------
# Structural sync (sitedesk sync)
# ---------------------------------------------------------------------------
[sync]
# Strings copied from the master into a translation get this prefix so
# translators can find them. URLs, absolute paths and very short strings
# are copied unmarked.
marker = "[TODO]"

# Strings with fewer characters than this are never marked.
min_length = 2

# ---------------------------------------------------------------------------
# Index rebuild (sitedesk rebuild-index)
# ---------------------------------------------------------------------------
[index]
# Collections whose index file ({name}.json) is rebuilt from {name}/*.json.
collections = ["products", "solutions"]

# ---------------------------------------------------------------------------
# Visual editor
# ---------------------------------------------------------------------------
[editor]
# Maximum number of columns shown in a record grid.
grid_columns = 4

# Strings longer than this many characters are edited in a textarea.
textarea_threshold = 100

# ---------------------------------------------------------------------------
# Server (sitedesk serve)
# ---------------------------------------------------------------------------
[server]
bind = "127.0.0.1:4173"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_layout() {
        let config = CmsConfig::default();
        assert_eq!(config.data_dir, "public/data");
        assert_eq!(config.public_dir, "public");
        assert_eq!(config.images_dir, "images");
        assert_eq!(config.languages.master, "zh");
    }

    #[test]
    fn default_config_sync_and_editor() {
        let config = CmsConfig::default();
        assert_eq!(config.sync.marker, "[TODO]");
        assert_eq!(config.sync.min_length, 2);
        assert_eq!(config.editor.grid_columns, 4);
        assert_eq!(config.editor.textarea_threshold, 100);
        assert_eq!(
            config.index_kinds(),
            vec![IndexKind::Products, IndexKind::Solutions]
        );
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[languages]
master = "en"
"#;
        let config: CmsConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.languages.master, "en");
        // Default values preserved
        assert_eq!(config.sync.marker, "[TODO]");
        assert_eq!(config.data_dir, "public/data");
    }

    #[test]
    fn data_and_public_roots_join_project_root() {
        let config = CmsConfig::default();
        let root = Path::new("/srv/site");
        assert_eq!(config.data_root(root), Path::new("/srv/site/public/data"));
        assert_eq!(config.public_root(root), Path::new("/srv/site/public"));
        assert_eq!(
            config.images_root(root),
            Path::new("/srv/site/public/images")
        );
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.languages.master, "zh");
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            r#"
data_dir = "content"

[sync]
marker = "[TRANSLATE]"
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.data_dir, "content");
        assert_eq!(config.sync.marker, "[TRANSLATE]");
        // Unspecified values keep their defaults
        assert_eq!(config.sync.min_length, 2);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "this is not valid toml [[[").unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str(
            r#"
[sync]
marker = "[TODO]"
min_length = 2
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[sync]
min_length = 3
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let sync = merged.get("sync").unwrap();
        assert_eq!(sync.get("min_length").unwrap().as_integer(), Some(3));
        assert_eq!(sync.get("marker").unwrap().as_str(), Some("[TODO]"));
    }

    #[test]
    fn merge_toml_array_replaces() {
        let base: toml::Value =
            toml::from_str(r#"collections = ["products", "solutions"]"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"collections = ["products"]"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(
            merged.get("collections").unwrap().as_array().unwrap().len(),
            1
        );
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let toml_str = r#"
[sync]
markr = "x"
"#;
        let result: Result<CmsConfig, _> = toml::from_str(toml_str);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<CmsConfig, _> = toml::from_str("[theme]\ncolor = \"red\"\n");
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(CmsConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_master_code() {
        let mut config = CmsConfig::default();
        config.languages.master = "../zh".to_string();
        assert!(config.validate().is_err());

        config.languages.master = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_marker() {
        let mut config = CmsConfig::default();
        config.sync.marker = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("marker"));
    }

    #[test]
    fn validate_rejects_zero_grid_columns() {
        let mut config = CmsConfig::default();
        config.editor.grid_columns = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_unknown_collection() {
        let mut config = CmsConfig::default();
        config.index.collections.push("news".to_string());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("news"));
    }

    #[test]
    fn validate_rejects_bad_bind_address() {
        let mut config = CmsConfig::default();
        config.server.bind = "localhost".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            "[editor]\ngrid_columns = 0\n",
        )
        .unwrap();
        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn language_code_rules() {
        assert!(is_valid_language_code("en"));
        assert!(is_valid_language_code("zh-TW"));
        assert!(is_valid_language_code("pt_BR"));
        assert!(!is_valid_language_code(""));
        assert!(!is_valid_language_code("en/us"));
        assert!(!is_valid_language_code(".."));
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: CmsConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config.data_dir, "public/data");
        assert_eq!(config.languages.master, "zh");
        assert_eq!(config.sync.marker, "[TODO]");
        assert_eq!(config.editor.grid_columns, 4);
        assert_eq!(config.server.bind, "127.0.0.1:4173");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value();
        assert!(val.is_table());
        for section in ["languages", "sync", "index", "editor", "server"] {
            assert!(val.get(section).is_some(), "missing section {section}");
        }
    }
}
