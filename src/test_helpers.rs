//! Shared test utilities for the sitedesk test suite.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let store = fixture_store(&tmp);
//! assert_eq!(store.master(), "zh");
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::config::load_config;
use crate::store::{ContentStore, copy_tree};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_tree(&fixtures, tmp.path()).unwrap();
    tmp
}

/// Content store over a fixture copy, configured from its `sitedesk.toml`.
pub fn fixture_store(tmp: &TempDir) -> ContentStore {
    let config = load_config(tmp.path()).unwrap();
    ContentStore::new(config.data_root(tmp.path()), config.languages.master)
}

// =========================================================================
// Fixture tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_site_has_master_and_translation() {
        let tmp = setup_fixtures();
        let store = fixture_store(&tmp);
        let codes: Vec<String> = store.languages().unwrap().into_iter().map(|l| l.code).collect();
        assert_eq!(codes, vec!["en", "zh"]);
        assert_eq!(store.target_languages().unwrap(), vec!["en"]);
    }
}
