//! # sitedesk
//!
//! A flat-file content desk for multi-language marketing sites. The content
//! directory is the database: one directory per language, one JSON (or
//! Markdown) file per page or collection, and a master language that every
//! translation follows structurally.
//!
//! # Architecture
//!
//! ```text
//! public/data/{lang}/**/*.json  ──►  store    (path-safe reads and writes)
//!                                    │
//!         ┌──────────────────────────┼──────────────────────────┐
//!         ▼                          ▼                          ▼
//!      editor                      sync                       index
//!  (visual form, raw,      (master → targets,          ({kind}/*.json →
//!   preview, save)          forward-fill only)          {kind}.json items)
//!         │                          │                          │
//!         ▼                          ▼                          ▼
//!      server (axum)            main (clap CLI) ◄──────── output (reports)
//! ```
//!
//! The editor never needs a schema. [`schema`] infers an edit widget from
//! each value's JSON type, its key name and its length; [`blocks`] adds the
//! small registry of known page block types on top.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `sitedesk.toml` loading: stock defaults, merge, validation |
//! | [`store`] | Content store rooted at the data directory; languages |
//! | [`images`] | Image library listing and base64 uploads |
//! | [`schema`] | Edit-type inference for arbitrary JSON values |
//! | [`blocks`] | Block registry: skeletons, labels, field hints, media sources |
//! | [`editor`] | Editing session, field paths, structural edits, form and page rendering |
//! | [`sync`] | Structural forward-fill from the master into target languages |
//! | [`index`] | Rebuild collection index documents from their detail files |
//! | [`pages`] | New-page templates |
//! | [`output`] | CLI report formatting |
//! | [`server`] | HTTP file API and editor pages |
//!
//! # Design Decisions
//!
//! ## Structure Syncs, Values Don't
//!
//! The master language owns the shape of every document. Sync only adds what
//! a translation is missing, copying master strings with a marker prefix so
//! translators can find them. It never removes keys and never overwrites a
//! translated value, so running it is always safe.
//!
//! ## Server-Rendered Editor
//!
//! The editor holds one working copy on the server and re-renders the page
//! after each action with Maud. Every edit is a plain form post, so the page
//! works with a few lines of JavaScript for conveniences and nothing else.

pub mod blocks;
pub mod config;
pub mod editor;
pub mod images;
pub mod index;
pub mod output;
pub mod pages;
pub mod schema;
pub mod server;
pub mod store;
pub mod sync;

#[cfg(test)]
pub(crate) mod test_helpers;
