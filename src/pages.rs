//! Page templates for creating new content files.
//!
//! Product and solution pages land in their collection's detail directory
//! (`{lang}/products/{name}.json`) with a starter document; blank pages take
//! any path under the language and start as `{}`. Creation never overwrites.

use crate::blocks::BlockKind;
use crate::store::{ContentStore, StoreError};
use serde_json::{Value, json};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PageError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("a file already exists at {0}")]
    Exists(String),
    #[error("invalid page name: {0:?}")]
    InvalidName(String),
    #[error("unknown page template: {0}")]
    UnknownTemplate(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTemplate {
    Product,
    Solution,
    Blank,
}

impl PageTemplate {
    pub const ALL: [PageTemplate; 3] = [
        PageTemplate::Product,
        PageTemplate::Solution,
        PageTemplate::Blank,
    ];

    pub fn parse(s: &str) -> Result<Self, PageError> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| PageError::UnknownTemplate(s.to_string()))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PageTemplate::Product => "product",
            PageTemplate::Solution => "solution",
            PageTemplate::Blank => "blank",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PageTemplate::Product => "Product Page",
            PageTemplate::Solution => "Solution Page",
            PageTemplate::Blank => "Blank JSON",
        }
    }

    /// Detail directory under the language, `None` for blank pages.
    pub fn folder(self) -> Option<&'static str> {
        match self {
            PageTemplate::Product => Some("products"),
            PageTemplate::Solution => Some("solutions"),
            PageTemplate::Blank => None,
        }
    }
}

/// Lowercase `name` and replace everything outside `[a-z0-9-]` with `-`.
pub fn safe_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' => c,
            _ => '-',
        })
        .collect()
}

/// Store path for a new page.
///
/// Templated pages use the sanitized name as file stem. Blank pages keep
/// `name` as a path, gaining `.json` and the language prefix when missing.
pub fn page_path(lang: &str, template: PageTemplate, name: &str) -> Result<String, PageError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PageError::InvalidName(name.to_string()));
    }
    match template.folder() {
        Some(folder) => Ok(format!("{lang}/{folder}/{}.json", safe_name(name))),
        None => {
            let name = name.trim_start_matches('/');
            let file = if name.ends_with(".json") {
                name.to_string()
            } else {
                format!("{name}.json")
            };
            if file.starts_with(&format!("{lang}/")) {
                Ok(file)
            } else {
                Ok(format!("{lang}/{file}"))
            }
        }
    }
}

/// Starter document for `template`, with `id` as the page id.
pub fn skeleton(template: PageTemplate, id: &str) -> Value {
    match template {
        PageTemplate::Product => json!({
            "id": id,
            "categoryId": "generic",
            "title": "New Product Title",
            "metaTitle": "New Product",
            "metaDesc": "Product description...",
            "fullDescription": "Detailed product description goes here...",
            "images": ["/images/placeholder.png"],
            "features": ["Feature 1", "Feature 2"],
            "parameters": [{"label": "Spec 1", "value": "Value 1"}],
            "downloads": [],
            "packaging": "Standard box",
            "gradient": "from-blue-600 to-cyan-500",
            "icon": "Box"
        }),
        PageTemplate::Solution => {
            let mut hero = BlockKind::Hero.skeleton();
            hero["title"] = json!("Solution Headline");
            hero["subtitle"] = json!("Compelling subtitle goes here.");
            hero["ctaText"] = json!("Learn More");
            hero["ctaLink"] = json!("/contact");
            let mut features = BlockKind::Features.skeleton();
            features["title"] = json!("Key Features");
            features["items"] = json!([{"title": "Feature 1", "desc": "Description..."}]);
            json!({
                "id": id,
                "categoryId": "solution",
                "title": "New Solution Title",
                "metaTitle": "New Solution",
                "metaDesc": "Solution description...",
                "image": "",
                "color": "blue",
                "blocks": [hero, features]
            })
        }
        PageTemplate::Blank => json!({}),
    }
}

/// Create a page in an existing language. Returns its store path.
pub fn create_page(
    store: &ContentStore,
    lang: &str,
    template: PageTemplate,
    name: &str,
) -> Result<String, PageError> {
    if !store.languages()?.iter().any(|l| l.code == lang) {
        return Err(StoreError::LanguageNotFound(lang.to_string()).into());
    }
    let path = page_path(lang, template, name)?;
    if store.exists(&path) {
        return Err(PageError::Exists(path));
    }
    let id = path
        .rsplit('/')
        .next()
        .and_then(|f| f.strip_suffix(".json"))
        .unwrap_or_default();
    store.write_json(&path, &skeleton(template, id))?;
    tracing::info!(path = %path, template = template.as_str(), "created page");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn store() -> (TempDir, ContentStore) {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("en")).unwrap();
        let store = ContentStore::new(tmp.path(), "en");
        (tmp, store)
    }

    #[test]
    fn safe_name_maps_everything_else_to_dash() {
        assert_eq!(safe_name("GPS Tracker V2"), "gps-tracker-v2");
        assert_eq!(safe_name("d501_pro!"), "d501-pro-");
        assert_eq!(safe_name("Ünit"), "-nit");
    }

    #[test]
    fn page_paths() {
        assert_eq!(
            page_path("en", PageTemplate::Product, "D501 Pro").unwrap(),
            "en/products/d501-pro.json"
        );
        assert_eq!(
            page_path("en", PageTemplate::Solution, "fleet").unwrap(),
            "en/solutions/fleet.json"
        );
        assert_eq!(page_path("en", PageTemplate::Blank, "legal/terms").unwrap(), "en/legal/terms.json");
        assert_eq!(page_path("en", PageTemplate::Blank, "en/about.json").unwrap(), "en/about.json");
        assert!(page_path("en", PageTemplate::Blank, "  ").is_err());
    }

    #[test]
    fn solution_skeleton_uses_registry_blocks() {
        let doc = skeleton(PageTemplate::Solution, "fleet");
        assert_eq!(doc["id"], "fleet");
        assert_eq!(doc["blocks"][0]["type"], "hero");
        assert_eq!(doc["blocks"][0]["title"], "Solution Headline");
        assert_eq!(doc["blocks"][1]["type"], "features");
        assert_eq!(doc["blocks"][1]["layout"], "grid");
    }

    #[test]
    fn create_page_refuses_to_overwrite() {
        let (_tmp, store) = store();
        let path = create_page(&store, "en", PageTemplate::Product, "D501").unwrap();
        assert_eq!(path, "en/products/d501.json");
        assert_eq!(store.read_json(&path).unwrap()["id"], "d501");
        assert!(matches!(
            create_page(&store, "en", PageTemplate::Product, "d501"),
            Err(PageError::Exists(_))
        ));
    }

    #[test]
    fn create_page_needs_language_and_safe_path() {
        let (_tmp, store) = store();
        assert!(matches!(
            create_page(&store, "fr", PageTemplate::Blank, "x"),
            Err(PageError::Store(StoreError::LanguageNotFound(_)))
        ));
        assert!(matches!(
            create_page(&store, "en", PageTemplate::Blank, "../escape"),
            Err(PageError::Store(StoreError::AccessDenied(_)))
        ));
    }

    #[test]
    fn unknown_template() {
        assert!(PageTemplate::parse("landing").is_err());
        assert_eq!(PageTemplate::parse("blank").unwrap(), PageTemplate::Blank);
    }
}
