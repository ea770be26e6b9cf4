//! End-to-end runs of the batch tools over a copy of `fixtures/site/`.
//!
//! The fixture site has `zh` as master and a partially translated `en`:
//! `en/home.json` lacks the hero background and the stats block, and the
//! product `x200`, the solution `fleet` and the products index exist only in
//! the master.

use serde_json::json;
use sitedesk::config::load_config;
use sitedesk::index::{IndexKind, rebuild_index};
use sitedesk::output::{format_drift, format_sync_report};
use sitedesk::pages::{PageTemplate, create_page};
use sitedesk::store::{ContentStore, copy_tree};
use sitedesk::sync::{FileStatus, SyncOptions, TranslationMarker, check_language, sync_all};
use std::path::Path;
use tempfile::TempDir;

fn setup_site() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_tree(&fixtures, tmp.path()).unwrap();
    tmp
}

fn open_store(root: &Path) -> (ContentStore, SyncOptions) {
    let config = load_config(root).unwrap();
    let options = SyncOptions {
        marker: TranslationMarker::from(&config.sync),
        dry_run: false,
    };
    (
        ContentStore::new(config.data_root(root), config.languages.master),
        options,
    )
}

// =========================================================================
// Structural sync
// =========================================================================

#[test]
fn sync_fills_missing_structure_and_keeps_translations() {
    let tmp = setup_site();
    let (store, options) = open_store(tmp.path());

    let report = sync_all(&store, &options).unwrap();
    assert_eq!(report.languages.len(), 1);
    let en = &report.languages[0];
    assert_eq!(en.language, "en");
    assert_eq!(en.total_changes(), 5);
    assert_eq!(en.files_changed(), 4);

    let status = |path: &str| {
        en.files
            .iter()
            .find(|f| f.path == path)
            .map(|f| f.status.clone())
            .unwrap()
    };
    assert_eq!(status("home.json"), FileStatus::Updated);
    assert_eq!(status("products/d501.json"), FileStatus::Unchanged);
    assert_eq!(status("products/x200.json"), FileStatus::Created);
    assert_eq!(status("solutions/fleet.json"), FileStatus::Created);

    let home = store.read_json("en/home.json").unwrap();
    assert_eq!(home["title"], "Home");
    assert_eq!(home["blocks"][0]["title"], "Welcome");
    assert_eq!(home["blocks"][0]["backgroundImage"], "/images/hero.svg");
    assert_eq!(home["blocks"][1]["items"][0]["label"], "[TODO] 在线率");
    assert_eq!(home["blocks"][1]["items"][1]["value"], 24);

    let x200 = store.read_json("en/products/x200.json").unwrap();
    assert_eq!(x200["title"], "[TODO] X200 网关");
}

#[test]
fn second_sync_is_a_no_op() {
    let tmp = setup_site();
    let (store, options) = open_store(tmp.path());

    sync_all(&store, &options).unwrap();
    let before = store.read("en/home.json").unwrap();
    let report = sync_all(&store, &options).unwrap();
    assert_eq!(report.total_changes(), 0);
    assert_eq!(store.read("en/home.json").unwrap(), before);
    assert!(check_language(&store, "en").unwrap().is_empty());
}

#[test]
fn dry_run_writes_nothing() {
    let tmp = setup_site();
    let (store, mut options) = open_store(tmp.path());
    options.dry_run = true;

    let before = store.read("en/home.json").unwrap();
    let report = sync_all(&store, &options).unwrap();
    assert_eq!(report.total_changes(), 5);
    assert_eq!(store.read("en/home.json").unwrap(), before);
    assert!(!store.exists("en/products/x200.json"));

    let lines = format_sync_report(&report);
    assert_eq!(lines[0], "en (dry run: 5 changes in 4 files)");
    assert_eq!(lines.last().unwrap(), "Would sync 5 changes across 1 language");
}

#[test]
fn corrupted_target_is_rebuilt_from_master() {
    let tmp = setup_site();
    let (store, options) = open_store(tmp.path());
    store.write("en/products/d501.json", "{ not json").unwrap();

    let report = sync_all(&store, &options).unwrap();
    let d501 = report.languages[0]
        .files
        .iter()
        .find(|f| f.path == "products/d501.json")
        .unwrap();
    assert_eq!(d501.status, FileStatus::Replaced);
    assert_eq!(
        store.read_json("en/products/d501.json").unwrap()["title"],
        "[TODO] D501 定位器"
    );
}

// =========================================================================
// Drift check
// =========================================================================

#[test]
fn check_reports_drift_without_writing() {
    let tmp = setup_site();
    let (store, _) = open_store(tmp.path());

    let drift = check_language(&store, "en").unwrap();
    let paths: Vec<&str> = drift.iter().map(|d| d.path.as_str()).collect();
    assert_eq!(
        paths,
        vec!["home.json", "products.json", "products/x200.json", "solutions/fleet.json"]
    );
    let lines = format_drift("en", &drift);
    assert_eq!(lines[1], "    home.json: 2 missing");
    assert_eq!(lines[2], "        blocks[0].backgroundImage");
    assert_eq!(lines[3], "        blocks[1]");
    assert!(!store.exists("en/products.json"));
}

// =========================================================================
// Index rebuild
// =========================================================================

#[test]
fn rebuild_products_index_from_details() {
    let tmp = setup_site();
    let (store, _) = open_store(tmp.path());

    let report = rebuild_index(&store, "zh", IndexKind::Products).unwrap();
    assert_eq!(report.items, 2);
    assert!(!report.created);

    let index = store.read_json("zh/products.json").unwrap();
    assert_eq!(index["title"], "产品中心");
    assert_eq!(
        index["items"][0],
        json!({
            "id": "d501",
            "categoryId": "gps",
            "title": "D501 定位器",
            "description": "车载定位终端",
            "image": "/images/d501.svg",
            "icon": "Cpu"
        })
    );
    assert_eq!(index["items"][1]["id"], "x200");
    assert_eq!(index["items"][1]["categoryId"], "uncategorized");
    assert_eq!(index["items"][1]["description"], "工业物联网网关");
    assert_eq!(index["items"][1]["icon"], "Box");
}

#[test]
fn rebuild_creates_missing_solutions_index() {
    let tmp = setup_site();
    let (store, _) = open_store(tmp.path());

    let report = rebuild_index(&store, "zh", IndexKind::Solutions).unwrap();
    assert!(report.created);
    let index = store.read_json("zh/solutions.json").unwrap();
    assert_eq!(index["items"][0]["summary"], "实时掌握每一辆车");
    assert_eq!(index["items"][0]["image"], "/images/fleet.svg");
    assert_eq!(index["items"][0]["color"], "green");
}

// =========================================================================
// Languages and pages
// =========================================================================

#[test]
fn new_language_then_page_then_sync() {
    let tmp = setup_site();
    let (store, options) = open_store(tmp.path());

    store.create_language("de").unwrap();
    assert_eq!(
        store.read("de/home.json").unwrap(),
        store.read("zh/home.json").unwrap()
    );

    let path = create_page(&store, "zh", PageTemplate::Product, "G7 Mini").unwrap();
    assert_eq!(path, "zh/products/g7-mini.json");

    let report = sync_all(&store, &options).unwrap();
    let languages: Vec<&str> = report.languages.iter().map(|l| l.language.as_str()).collect();
    assert_eq!(languages, vec!["de", "en"]);
    assert_eq!(
        store.read_json("de/products/g7-mini.json").unwrap()["title"],
        "[TODO] New Product Title"
    );
}
