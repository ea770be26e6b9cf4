//! Index rebuild: regenerate collection index documents from detail files.
//!
//! A collection has an index document (`products.json`) whose `items` array
//! summarizes the detail documents in the sibling directory
//! (`products/d501.json`). Detail files are authoritative for membership: the
//! rebuilt `items` holds exactly one entry per detail file, in file-name
//! order. Every other top-level field of the index document is kept.
//!
//! Each summary field falls back from the detail file, to the entry the
//! index held before for the same id, to a fixed default. Empty strings count
//! as absent at every step, so hand-set index values such as an icon survive
//! until the detail file provides one.

use crate::store::{ContentStore, StoreError};
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::fs;
use thiserror::Error;
use tracing::{info, warn};

/// Characters of `fullDescription` used when a product has no `metaDesc`.
const DESCRIPTION_EXCERPT_CHARS: usize = 100;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("detail directory not found: {0}")]
    DetailsMissing(String),
    #[error("index document {0} is not a JSON object")]
    InvalidIndex(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKind {
    Products,
    Solutions,
}

impl IndexKind {
    pub const ALL: [IndexKind; 2] = [IndexKind::Products, IndexKind::Solutions];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "products" => Some(IndexKind::Products),
            "solutions" => Some(IndexKind::Solutions),
            _ => None,
        }
    }

    /// Collection name; also the detail directory name.
    pub fn as_str(self) -> &'static str {
        match self {
            IndexKind::Products => "products",
            IndexKind::Solutions => "solutions",
        }
    }

    /// Index document name (`products.json`).
    pub fn index_file(self) -> String {
        format!("{}.json", self.as_str())
    }

    fn project(self, id: &str, detail: &Value, prior: &Value) -> Value {
        let field = |name: &str| text(detail.get(name)).or_else(|| text(prior.get(name)));
        match self {
            IndexKind::Products => {
                let description = text(detail.get("metaDesc"))
                    .or_else(|| {
                        text(detail.get("fullDescription"))
                            .map(|full| full.chars().take(DESCRIPTION_EXCERPT_CHARS).collect())
                    })
                    .or_else(|| text(prior.get("description")));
                let image = text(detail.get("images").and_then(|images| images.get(0)))
                    .or_else(|| text(prior.get("image")));
                json!({
                    "id": id,
                    "categoryId": field("categoryId").unwrap_or_else(|| "uncategorized".into()),
                    "title": field("title").unwrap_or_else(|| id.to_string()),
                    "description": description.unwrap_or_default(),
                    "image": image.unwrap_or_default(),
                    "icon": field("icon").unwrap_or_else(|| "Box".into()),
                })
            }
            IndexKind::Solutions => {
                let image = text(hero_block(detail).and_then(|hero| hero.get("backgroundImage")))
                    .or_else(|| text(prior.get("image")));
                json!({
                    "id": id,
                    "categoryId": field("categoryId").unwrap_or_else(|| "uncategorized".into()),
                    "title": field("title").unwrap_or_else(|| id.to_string()),
                    "summary": text(detail.get("metaDesc"))
                        .or_else(|| text(prior.get("summary")))
                        .unwrap_or_default(),
                    "image": image.unwrap_or_default(),
                    "icon": field("icon").unwrap_or_else(|| "Layers".into()),
                    "color": field("color").unwrap_or_else(|| "blue".into()),
                })
            }
        }
    }
}

/// A non-empty string value. Numbers are accepted as their decimal text.
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn hero_block(detail: &Value) -> Option<&Value> {
    detail
        .get("blocks")?
        .as_array()?
        .iter()
        .find(|block| block.get("type").and_then(Value::as_str) == Some("hero"))
}

/// The freshly computed index document.
#[derive(Debug, Clone, PartialEq)]
pub struct RebuildOutcome {
    pub document: Value,
    pub items: usize,
    /// Ids seen more than once; only the first detail file was used.
    pub duplicates: Vec<String>,
}

/// Rebuild an index document from `(file_stem, detail)` pairs.
///
/// Pure: the caller supplies the detail documents in the order entries
/// should appear, and the prior index document (`Value::Null` if none).
pub fn rebuild(kind: IndexKind, details: &[(String, Value)], existing: &Value) -> RebuildOutcome {
    let mut document = match existing {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };

    let empty = Value::Object(Map::new());
    let prior: HashMap<String, &Value> = document
        .get("items")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| text(item.get("id")).map(|id| (id, item)))
                .collect()
        })
        .unwrap_or_default();

    let mut items = Vec::with_capacity(details.len());
    let mut seen = std::collections::HashSet::new();
    let mut duplicates = Vec::new();
    for (stem, detail) in details {
        let id = text(detail.get("id")).unwrap_or_else(|| stem.clone());
        if !seen.insert(id.clone()) {
            duplicates.push(id);
            continue;
        }
        let prior_entry = prior.get(&id).copied().unwrap_or(&empty);
        items.push(kind.project(&id, detail, prior_entry));
    }

    let count = items.len();
    document.insert("items".to_string(), Value::Array(items));
    RebuildOutcome {
        document: Value::Object(document),
        items: count,
        duplicates,
    }
}

/// Summary of one index rebuild on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuildReport {
    pub language: String,
    pub kind: IndexKind,
    pub detail_files: usize,
    pub items: usize,
    /// Detail files that could not be read, with the reason.
    pub skipped: Vec<(String, String)>,
    pub duplicates: Vec<String>,
    /// The index document did not exist and was created.
    pub created: bool,
}

/// Rebuild `{lang}/{kind}.json` from `{lang}/{kind}/*.json` and write it.
///
/// Unreadable detail files are logged and skipped. A missing index document
/// is created; one that exists but is not a JSON object is an error.
pub fn rebuild_index(
    store: &ContentStore,
    language: &str,
    kind: IndexKind,
) -> Result<RebuildReport, IndexError> {
    let index_rel = format!("{language}/{}", kind.index_file());
    let (existing, created) = match store.read_json(&index_rel) {
        Ok(value) if value.is_object() => (value, false),
        Ok(_) => return Err(IndexError::InvalidIndex(index_rel)),
        Err(StoreError::NotFound(_)) => {
            info!(file = %index_rel, "index document missing, creating it");
            (Value::Null, true)
        }
        Err(e) => return Err(e.into()),
    };

    let details_rel = format!("{language}/{}", kind.as_str());
    let details_dir = store.resolve(&details_rel)?;
    if !details_dir.is_dir() {
        return Err(IndexError::DetailsMissing(details_rel));
    }

    let mut names: Vec<String> = Vec::new();
    for entry in fs::read_dir(&details_dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type()?.is_file() && name.ends_with(".json") && !name.starts_with('.') {
            names.push(name);
        }
    }
    names.sort();

    let mut details = Vec::with_capacity(names.len());
    let mut skipped = Vec::new();
    for name in &names {
        let rel = format!("{details_rel}/{name}");
        match store.read_json(&rel) {
            Ok(detail) => {
                let stem = name.trim_end_matches(".json").to_string();
                details.push((stem, detail));
            }
            Err(e) => {
                warn!(file = %rel, "skipping detail file: {e}");
                skipped.push((name.clone(), e.to_string()));
            }
        }
    }

    let outcome = rebuild(kind, &details, &existing);
    for id in &outcome.duplicates {
        warn!(collection = kind.as_str(), id = %id, "duplicate id, keeping the first detail file");
    }
    store.write_json(&index_rel, &outcome.document)?;
    info!(file = %index_rel, items = outcome.items, "rebuilt index");

    Ok(RebuildReport {
        language: language.to_string(),
        kind,
        detail_files: names.len(),
        items: outcome.items,
        skipped,
        duplicates: outcome.duplicates,
        created,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn detail(stem: &str, value: Value) -> (String, Value) {
        (stem.to_string(), value)
    }

    // =========================================================================
    // Products projection
    // =========================================================================

    #[test]
    fn product_projection_from_detail() {
        let details = vec![detail(
            "d501",
            json!({
                "id": "d501",
                "categoryId": "dashcam",
                "title": "D501 AI Dashcam",
                "metaDesc": "Short",
                "fullDescription": "Long text",
                "images": ["/images/d501.png", "/images/d501-2.png"],
                "icon": "Camera"
            }),
        )];
        let outcome = rebuild(IndexKind::Products, &details, &Value::Null);
        assert_eq!(
            outcome.document["items"][0],
            json!({
                "id": "d501",
                "categoryId": "dashcam",
                "title": "D501 AI Dashcam",
                "description": "Short",
                "image": "/images/d501.png",
                "icon": "Camera"
            })
        );
    }

    #[test]
    fn product_defaults_when_nothing_known() {
        let outcome = rebuild(IndexKind::Products, &[detail("x1", json!({}))], &Value::Null);
        assert_eq!(
            outcome.document["items"][0],
            json!({
                "id": "x1",
                "categoryId": "uncategorized",
                "title": "x1",
                "description": "",
                "image": "",
                "icon": "Box"
            })
        );
    }

    #[test]
    fn product_description_falls_back_to_excerpt() {
        let full = "字".repeat(150);
        let outcome = rebuild(
            IndexKind::Products,
            &[detail("p", json!({"metaDesc": "", "fullDescription": full}))],
            &Value::Null,
        );
        let description = outcome.document["items"][0]["description"].as_str().unwrap();
        assert_eq!(description.chars().count(), 100);
    }

    #[test]
    fn prior_entry_fills_gaps() {
        let existing = json!({
            "title": "Products",
            "items": [{"id": "d501", "icon": "Truck", "image": "/images/old.png", "description": "Old"}]
        });
        let details = vec![detail("d501", json!({"title": "D501", "images": [], "icon": ""}))];
        let outcome = rebuild(IndexKind::Products, &details, &existing);
        let item = &outcome.document["items"][0];
        assert_eq!(item["icon"], "Truck");
        assert_eq!(item["image"], "/images/old.png");
        assert_eq!(item["description"], "Old");
        assert_eq!(item["title"], "D501");
        assert_eq!(outcome.document["title"], "Products");
    }

    #[test]
    fn detail_files_decide_membership() {
        let existing = json!({"items": [{"id": "gone"}, {"id": "a"}]});
        let details = vec![detail("a", json!({})), detail("b", json!({}))];
        let outcome = rebuild(IndexKind::Products, &details, &existing);
        let ids: Vec<&str> = outcome.document["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(outcome.items, 2);
    }

    #[test]
    fn internal_id_wins_and_duplicates_are_dropped() {
        let details = vec![
            detail("file-a", json!({"id": "same", "title": "First"})),
            detail("file-b", json!({"id": "same", "title": "Second"})),
            detail("file-c", json!({})),
        ];
        let outcome = rebuild(IndexKind::Products, &details, &Value::Null);
        assert_eq!(outcome.items, 2);
        assert_eq!(outcome.duplicates, vec!["same"]);
        assert_eq!(outcome.document["items"][0]["title"], "First");
        assert_eq!(outcome.document["items"][1]["id"], "file-c");
    }

    // =========================================================================
    // Solutions projection
    // =========================================================================

    #[test]
    fn solution_projection() {
        let details = vec![detail(
            "fleet",
            json!({
                "title": "Fleet",
                "metaDesc": "Track vehicles",
                "blocks": [
                    {"type": "features"},
                    {"type": "hero", "backgroundImage": "/images/fleet.jpg"}
                ]
            }),
        )];
        let existing = json!({"items": [{"id": "fleet", "color": "green"}]});
        let outcome = rebuild(IndexKind::Solutions, &details, &existing);
        assert_eq!(
            outcome.document["items"][0],
            json!({
                "id": "fleet",
                "categoryId": "uncategorized",
                "title": "Fleet",
                "summary": "Track vehicles",
                "image": "/images/fleet.jpg",
                "icon": "Layers",
                "color": "green"
            })
        );
    }

    #[test]
    fn solution_defaults() {
        let outcome = rebuild(IndexKind::Solutions, &[detail("s", json!({}))], &Value::Null);
        let item = &outcome.document["items"][0];
        assert_eq!(item["icon"], "Layers");
        assert_eq!(item["color"], "blue");
        assert_eq!(item["summary"], "");
        assert_eq!(item["image"], "");
    }

    #[test]
    fn kind_names() {
        for kind in IndexKind::ALL {
            assert_eq!(IndexKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(IndexKind::Products.index_file(), "products.json");
        assert_eq!(IndexKind::parse("news"), None);
    }

    // =========================================================================
    // rebuild_index on disk
    // =========================================================================

    fn store_with(files: &[(&str, &str)]) -> (TempDir, ContentStore) {
        let tmp = TempDir::new().unwrap();
        let store = ContentStore::new(tmp.path(), "zh");
        for (rel, content) in files {
            store.write(rel, content).unwrap();
        }
        (tmp, store)
    }

    #[test]
    fn rebuild_index_writes_document() {
        let (_tmp, store) = store_with(&[
            ("en/products.json", r#"{"heading": "All products", "items": []}"#),
            ("en/products/b.json", r#"{"title": "B"}"#),
            ("en/products/a.json", r#"{"title": "A"}"#),
            ("en/products/broken.json", "{"),
            ("en/products/notes.md", "ignored"),
        ]);
        let report = rebuild_index(&store, "en", IndexKind::Products).unwrap();
        assert_eq!(report.detail_files, 3);
        assert_eq!(report.items, 2);
        assert_eq!(report.skipped.len(), 1);
        assert!(!report.created);

        let doc = store.read_json("en/products.json").unwrap();
        assert_eq!(doc["heading"], "All products");
        assert_eq!(doc["items"][0]["id"], "a");
        assert_eq!(doc["items"][1]["id"], "b");
    }

    #[test]
    fn rebuild_index_creates_missing_index() {
        let (_tmp, store) = store_with(&[("en/solutions/s.json", "{}")]);
        let report = rebuild_index(&store, "en", IndexKind::Solutions).unwrap();
        assert!(report.created);
        assert_eq!(store.read_json("en/solutions.json").unwrap()["items"][0]["id"], "s");
    }

    #[test]
    fn rebuild_index_errors() {
        let (_tmp, store) = store_with(&[("en/products.json", "[]")]);
        assert!(matches!(
            rebuild_index(&store, "en", IndexKind::Products),
            Err(IndexError::InvalidIndex(_))
        ));
        assert!(matches!(
            rebuild_index(&store, "en", IndexKind::Solutions),
            Err(IndexError::DetailsMissing(_))
        ));
    }

    #[test]
    fn rebuild_is_stable() {
        let (_tmp, store) = store_with(&[
            ("en/products.json", r#"{"items": []}"#),
            ("en/products/a.json", r#"{"title": "A", "icon": "Truck"}"#),
        ]);
        rebuild_index(&store, "en", IndexKind::Products).unwrap();
        let first = store.read("en/products.json").unwrap();
        rebuild_index(&store, "en", IndexKind::Products).unwrap();
        assert_eq!(store.read("en/products.json").unwrap(), first);
    }
}
