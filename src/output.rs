//! CLI output formatting for the batch tools.
//!
//! Output leads with the language and the file, in the form an author
//! recognizes from the content tree. Details are indented 4 spaces per
//! level. Files with nothing to report are left out.
//!
//! # Output Format
//!
//! ## Sync
//!
//! ```text
//! en (3 changes in 2 files)
//!     home.json: 2 added
//!     products/d501.json: created, 1 added
//!     legal.json: failed (invalid JSON: ...)
//!
//! Synced 3 changes across 1 language
//! ```
//!
//! ## Rebuild index
//!
//! ```text
//! zh products.json: 12 items from 13 detail files
//!     Skipped: products/broken.json (invalid JSON: ...)
//!     Duplicate id: d501
//! ```
//!
//! ## Check
//!
//! ```text
//! en
//!     home.json: 2 missing
//!         title
//!         blocks[1].items
//! ```
//!
//! # Architecture
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::index::RebuildReport;
use crate::store::Language;
use crate::sync::{FileDrift, FileStatus, LanguageSyncReport, SyncReport};

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Sync
// ============================================================================

fn file_line(path: &str, changes: usize, status: &FileStatus) -> Option<String> {
    let detail = match status {
        FileStatus::Unchanged if changes == 0 => return None,
        FileStatus::Unchanged | FileStatus::Updated => format!("{changes} added"),
        FileStatus::Created => format!("created, {changes} added"),
        FileStatus::Replaced => "replaced (target was not valid JSON)".to_string(),
        FileStatus::Failed(reason) => format!("failed ({reason})"),
    };
    Some(format!("{}{path}: {detail}", indent(1)))
}

pub fn format_language_sync(report: &LanguageSyncReport) -> Vec<String> {
    let summary = format!(
        "{} in {}",
        plural(report.total_changes(), "change"),
        plural(report.files_changed(), "file")
    );
    let header = if report.dry_run {
        format!("{} (dry run: {summary})", report.language)
    } else {
        format!("{} ({summary})", report.language)
    };
    let mut lines = vec![header];
    lines.extend(
        report
            .files
            .iter()
            .filter_map(|f| file_line(&f.path, f.changes, &f.status)),
    );
    lines
}

/// Format a whole sync run: one block per language, then a summary line.
pub fn format_sync_report(report: &SyncReport) -> Vec<String> {
    let mut lines = Vec::new();
    for language in &report.languages {
        lines.extend(format_language_sync(language));
    }
    for (language, reason) in &report.failed {
        lines.push(format!("{language}: skipped ({reason})"));
    }
    if report.languages.is_empty() && report.failed.is_empty() {
        lines.push("No target languages to sync".to_string());
        return lines;
    }
    let dry_run = report.languages.iter().any(|l| l.dry_run);
    let verb = if dry_run { "Would sync" } else { "Synced" };
    lines.push(String::new());
    lines.push(format!(
        "{verb} {} across {}",
        plural(report.total_changes(), "change"),
        plural(report.languages.len(), "language")
    ));
    lines
}

pub fn print_sync_report(report: &SyncReport) {
    for line in format_sync_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Index rebuild
// ============================================================================

pub fn format_rebuild_report(report: &RebuildReport) -> Vec<String> {
    let mut lines = vec![format!(
        "{} {}: {} from {}",
        report.language,
        report.kind.index_file(),
        plural(report.items, "item"),
        plural(report.detail_files, "detail file")
    )];
    if report.created {
        lines.push(format!("{}Created: {}", indent(1), report.kind.index_file()));
    }
    for (path, reason) in &report.skipped {
        lines.push(format!("{}Skipped: {path} ({reason})", indent(1)));
    }
    for id in &report.duplicates {
        lines.push(format!("{}Duplicate id: {id}", indent(1)));
    }
    lines
}

pub fn print_rebuild_report(report: &RebuildReport) {
    for line in format_rebuild_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Languages
// ============================================================================

pub fn format_languages(languages: &[Language]) -> Vec<String> {
    if languages.is_empty() {
        return vec!["No languages".to_string()];
    }
    languages
        .iter()
        .map(|l| {
            if l.is_master {
                format!("{} (master)", l.code)
            } else {
                l.code.clone()
            }
        })
        .collect()
}

pub fn print_languages(languages: &[Language]) {
    for line in format_languages(languages) {
        println!("{}", line);
    }
}

// ============================================================================
// Drift check
// ============================================================================

pub fn format_drift(language: &str, drift: &[FileDrift]) -> Vec<String> {
    if drift.is_empty() {
        return vec![format!("{language}: in parity with master")];
    }
    let mut lines = vec![language.to_string()];
    for file in drift {
        match &file.unreadable {
            Some(reason) => lines.push(format!("{}{}: unreadable ({reason})", indent(1), file.path)),
            None => {
                lines.push(format!("{}{}: {} missing", indent(1), file.path, file.missing.len()));
                for path in &file.missing {
                    lines.push(format!("{}{}", indent(2), path.dotted()));
                }
            }
        }
    }
    lines
}

pub fn print_drift(language: &str, drift: &[FileDrift]) {
    for line in format_drift(language, drift) {
        println!("{}", line);
    }
}
