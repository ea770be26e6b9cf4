//! HTML rendering for the authoring pages.
//!
//! Pages are built with maud. Every edit control is a small form posting to
//! `/admin/edit` with an `action` and the field's JSON pointer in `path`, so
//! the editor works without JavaScript. `static/editor.js` adds image upload
//! and submit-on-change for checkboxes and selects.

use super::form::{BlockCard, EditableForm, Field, ImageSlot, RecordGrid, Widget};
use super::path::FieldPath;
use super::preview;
use super::{DocumentKind, EditorMode, EditorSession};
use crate::blocks::BlockKind;
use crate::store::Language;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use url::form_urlencoded;

const CSS: &str = include_str!("../../static/editor.css");
const JS: &str = include_str!("../../static/editor.js");

/// Drift paths listed in the banner before it collapses to a count.
const DRIFT_SHOWN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// One-shot message shown at the top of the next page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// An action that needs a second, confirmed submit. `fields` are the form
/// fields to repost alongside `confirm=true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConfirm {
    pub message: String,
    pub fields: Vec<(String, String)>,
}

/// Everything the editor page shows besides the session itself.
pub struct EditorView<'a> {
    pub session: &'a EditorSession,
    /// Master structure missing from this document, for translations.
    pub drift: Option<&'a [FieldPath]>,
    pub images: &'a [String],
    pub query: &'a str,
    pub notice: Option<&'a Notice>,
    pub confirm: Option<&'a PendingConfirm>,
}

/// `/admin/edit` link with an encoded query.
pub fn edit_url(file: Option<&str>, mode: EditorMode) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    if let Some(file) = file {
        query.append_pair("file", file);
    }
    query.append_pair("mode", mode.as_str());
    format!("/admin/edit?{}", query.finish())
}

fn base_document(title: &str, body_class: Option<&str>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(CSS)) }
            }
            body class=[body_class] {
                (content)
                script { (PreEscaped(JS)) }
            }
        }
    }
}

fn site_header(crumbs: Markup) -> Markup {
    html! {
        header.site-header {
            nav.breadcrumb {
                a href="/admin" { "sitedesk" }
                (crumbs)
            }
        }
    }
}

fn notice_banner(notice: Option<&Notice>) -> Markup {
    html! {
        @if let Some(notice) = notice {
            div.notice.notice-error[notice.level == NoticeLevel::Error] role="status" {
                (notice.message)
            }
        }
    }
}

// ============================================================================
// Pages
// ============================================================================

/// The language and file browser.
pub fn admin_index(languages: &[(Language, Vec<String>)], notice: Option<&Notice>) -> Markup {
    let content = html! {
        (site_header(html! {}))
        main.index {
            (notice_banner(notice))
            @if languages.is_empty() {
                p.empty { "No languages found in the content directory." }
            }
            @for (language, files) in languages {
                section.language {
                    h2 {
                        (language.code)
                        @if language.is_master {
                            span.badge { "master" }
                        }
                    }
                    ul.files {
                        @for file in files {
                            @let rel = format!("{}/{}", language.code, file);
                            li { a href=(edit_url(Some(&rel), EditorMode::Visual)) { (file) } }
                        }
                    }
                }
            }
        }
    };
    base_document("Content", Some("admin-index"), content)
}

pub fn error_page(title: &str, message: &str) -> Markup {
    let content = html! {
        (site_header(html! {}))
        main {
            h1 { (title) }
            p.notice.notice-error { (message) }
            p { a href="/admin" { "Back to files" } }
        }
    };
    base_document(title, Some("error"), content)
}

/// The editor for the open session.
pub fn editor_page(view: &EditorView) -> Markup {
    let session = view.session;
    let file = session.file();
    let crumbs = html! {
        span.sep { "/" }
        span.file { (file) }
        @if session.is_dirty() {
            span.dirty title="Unsaved changes" { "●" }
        }
    };
    let content = html! {
        (site_header(crumbs))
        main.editor {
            (notice_banner(view.notice))
            @if let Some(confirm) = view.confirm {
                (confirm_box(confirm))
            }
            (toolbar(session))
            @if let Some(drift) = view.drift.filter(|d| !d.is_empty()) {
                (drift_banner(drift))
            }
            (mode_tabs(session))
            @match session.mode {
                EditorMode::Visual => (visual_mode(view)),
                EditorMode::Raw => (raw_mode(session)),
                EditorMode::Preview => (preview_mode(session)),
            }
        }
    };
    base_document(&format!("Edit {file}"), Some("admin-editor"), content)
}

fn toolbar(session: &EditorSession) -> Markup {
    html! {
        div.toolbar {
            (action_form("reset", None, html! { button type="submit" { "Reset" } }))
            (action_form("save", None, html! {
                button.primary type="submit" disabled[!session.raw().is_valid()] { "Save Changes" }
            }))
        }
    }
}

fn confirm_box(confirm: &PendingConfirm) -> Markup {
    html! {
        div.confirm role="alertdialog" {
            p { (confirm.message) }
            form method="post" action="/admin/edit" {
                @for (name, value) in &confirm.fields {
                    input type="hidden" name=(name) value=(value);
                }
                input type="hidden" name="confirm" value="true";
                button.danger type="submit" { "Proceed" }
                a.button href=(edit_url(None, EditorMode::Visual)) { "Cancel" }
            }
        }
    }
}

fn drift_banner(drift: &[FieldPath]) -> Markup {
    html! {
        div.drift role="status" {
            p {
                strong { (drift.len()) }
                " field(s) exist in the master language but not in this file."
            }
            ul {
                @for path in drift.iter().take(DRIFT_SHOWN) {
                    li { code { (path.dotted()) } }
                }
                @if drift.len() > DRIFT_SHOWN {
                    li { "and " (drift.len() - DRIFT_SHOWN) " more" }
                }
            }
            (action_form("sync-master", None, html! { button type="submit" { "Sync now" } }))
        }
    }
}

fn mode_tabs(session: &EditorSession) -> Markup {
    let modes: &[EditorMode] = match session.kind() {
        DocumentKind::Json => &[EditorMode::Visual, EditorMode::Raw, EditorMode::Preview],
        DocumentKind::Markdown => &[EditorMode::Raw, EditorMode::Preview],
    };
    html! {
        nav.tabs {
            @for mode in modes {
                a.tab.active[*mode == session.mode] href=(edit_url(None, *mode)) {
                    (mode_label(*mode))
                }
            }
        }
    }
}

fn mode_label(mode: EditorMode) -> &'static str {
    match mode {
        EditorMode::Visual => "Visual",
        EditorMode::Raw => "Source",
        EditorMode::Preview => "Preview",
    }
}

fn visual_mode(view: &EditorView) -> Markup {
    let session = view.session;
    if !session.raw().is_valid() {
        return html! {
            p.notice.notice-error {
                "The source is not valid JSON. Fix it in the Source tab to use the visual editor."
            }
        };
    }
    html! {
        div.visual {
            div.form-pane { (render_form(&session.form())) }
            (image_library(view.images, view.query))
        }
    }
}

/// The source pane. For JSON, `editor.js` re-parses on every keystroke and
/// keeps the indicator and the Apply button in step with the text.
fn raw_mode(session: &EditorSession) -> Markup {
    let raw = session.raw();
    let json = session.kind() == DocumentKind::Json;
    html! {
        form.raw method="post" action="/admin/edit" {
            input type="hidden" name="action" value="raw";
            p.syntax-error hidden[raw.is_valid()] {
                @if let Some(error) = raw.error() {
                    "Invalid JSON: " (error)
                }
            }
            textarea.source name="value" spellcheck="false" rows="30" data-json[json] { (raw.text()) }
            button type="submit" disabled[!raw.is_valid()] { "Apply" }
        }
    }
}

fn preview_mode(session: &EditorSession) -> Markup {
    match session.kind() {
        DocumentKind::Markdown => {
            preview::render_markdown(session.working().as_str().unwrap_or_default())
        }
        DocumentKind::Json => preview::render_blocks(session.working()),
    }
}

fn image_library(images: &[String], query: &str) -> Markup {
    html! {
        aside.image-library {
            h3 { "Images" }
            form.filter method="get" action="/admin/edit" {
                input type="hidden" name="mode" value="visual";
                input type="search" name="q" value=(query) placeholder="Filter images";
            }
            form.upload data-endpoint="/api/admin/upload-image" {
                input type="file" accept="image/*" name="file";
                button type="submit" { "Upload" }
                p.upload-status {}
            }
            datalist #image-library {
                @for image in images {
                    option value=(image) {}
                }
            }
            ul.thumbs {
                @for image in images {
                    li {
                        button.pick type="button" data-path=(image) title=(image) {
                            img src=(image) alt="" loading="lazy";
                        }
                    }
                }
            }
        }
    }
}

// ============================================================================
// Form tree
// ============================================================================

fn action_form(action: &str, path: Option<&FieldPath>, content: Markup) -> Markup {
    html! {
        form.action method="post" action="/admin/edit" {
            input type="hidden" name="action" value=(action);
            @if let Some(path) = path {
                input type="hidden" name="path" value=(path.to_string());
            }
            (content)
        }
    }
}

fn index_input(index: usize) -> Markup {
    html! { input type="hidden" name="index" value=(index); }
}

pub fn render_form(form: &EditableForm) -> Markup {
    match form {
        EditableForm::Collection(grid) => html! {
            section.collection {
                h2 { "List View" }
                (record_grid(grid))
            }
        },
        EditableForm::CollectionPage { items, page_info } => html! {
            nav.subtabs {
                a href="#items" { "Items" }
                a href="#page-info" { "Page Info" }
            }
            section #items {
                h2 { "Items" }
                (record_grid(items))
            }
            section #page-info {
                h2 { "Page Info" }
                @for field in page_info {
                    (render_field(field))
                }
            }
        },
        EditableForm::Form(fields) => html! {
            @for field in fields {
                (render_field(field))
            }
        },
        EditableForm::RawOnly => html! {
            p.notice { "This document can only be edited in the Source tab." }
        },
    }
}

pub fn render_field(field: &Field) -> Markup {
    html! {
        div.field data-type=(field.edit_type.as_str()) {
            @if let Widget::Group(children) = &field.widget {
                fieldset.group {
                    legend { (field.label) }
                    @for child in children {
                        (render_field(child))
                    }
                }
            } @else {
                label.field-label { (field.label) }
                @if let Some(help) = field.help {
                    p.help { (help) }
                }
                (widget(field))
            }
        }
    }
}

fn set_field(path: &FieldPath, control: Markup) -> Markup {
    action_form(
        "set-field",
        Some(path),
        html! {
            (control)
            button type="submit" { "Set" }
        },
    )
}

fn widget(field: &Field) -> Markup {
    let path = &field.path;
    match &field.widget {
        Widget::Group(children) => html! {
            @for child in children {
                (render_field(child))
            }
        },
        Widget::BlockList(cards) => block_list(path, cards),
        Widget::ImageGrid(slots) => image_grid(path, slots),
        Widget::PrimitiveList { text } => action_form(
            "set-lines",
            Some(path),
            html! {
                textarea name="value" rows="5" placeholder="One value per line" { (text) }
                button type="submit" { "Set" }
            },
        ),
        Widget::Records(grid) => record_grid(grid),
        Widget::Checkbox { checked } => set_field(
            path,
            html! { input.autosubmit type="checkbox" name="value" value="true" checked[*checked]; },
        ),
        Widget::NumberInput { value } => set_field(
            path,
            html! { input type="text" inputmode="decimal" name="value" value=(value); },
        ),
        Widget::TextInput { value } => set_field(
            path,
            html! { input type="text" name="value" value=(value); },
        ),
        Widget::TextArea { value } => set_field(
            path,
            html! { textarea name="value" rows="4" { (value) } },
        ),
        Widget::ColorInput { value } => set_field(
            path,
            html! {
                span.swatch style=(format!("background: {value}")) {}
                input type="text" name="value" value=(value);
            },
        ),
        Widget::ImageInput { value } => image_input(path, value),
        Widget::Select { value, options } => set_field(
            path,
            html! {
                select.autosubmit name="value" {
                    @for option in options {
                        option value=(option) selected[option == value] { (option) }
                    }
                }
            },
        ),
    }
}

fn image_input(path: &FieldPath, value: &str) -> Markup {
    set_field(
        path,
        html! {
            @if !value.is_empty() {
                img.thumb src=(value) alt="";
            }
            input.image-input type="text" name="value" value=(value) list="image-library"
                placeholder="/images/...";
        },
    )
}

fn block_list(path: &FieldPath, cards: &[BlockCard]) -> Markup {
    html! {
        div.blocks {
            @for card in cards {
                div.block-card data-block=(card.label) {
                    header {
                        span.block-index { "#" (card.index + 1) }
                        span.block-label { (card.label) }
                        div.block-actions {
                            (action_form("move-block", Some(path), html! {
                                (index_input(card.index))
                                input type="hidden" name="direction" value="up";
                                button type="submit" title="Move up" disabled[card.index == 0] { "↑" }
                            }))
                            (action_form("move-block", Some(path), html! {
                                (index_input(card.index))
                                input type="hidden" name="direction" value="down";
                                button type="submit" title="Move down" disabled[card.index + 1 == cards.len()] { "↓" }
                            }))
                            (action_form("remove-block", Some(path), html! {
                                (index_input(card.index))
                                button.danger type="submit" title="Remove block" { "✕" }
                            }))
                        }
                    }
                    @if card.fields.is_empty() {
                        p.empty { "No editable fields." }
                    }
                    @for field in &card.fields {
                        (render_field(field))
                    }
                }
            }
            (action_form("add-block", Some(path), html! {
                select name="block_type" {
                    @for kind in BlockKind::ALL {
                        option value=(kind.as_str()) { (kind.label()) }
                    }
                }
                button type="submit" { "+ Add Block" }
            }))
        }
    }
}

fn image_grid(path: &FieldPath, slots: &[ImageSlot]) -> Markup {
    html! {
        div.image-grid {
            @for slot in slots {
                div.slot {
                    (image_input(&slot.path, &slot.value))
                    (action_form("remove-image", Some(path), html! {
                        (index_input(slot.index))
                        button.danger type="submit" { "Remove" }
                    }))
                }
            }
            (action_form("add-image", Some(path), html! {
                button type="submit" { "+ Add Image" }
            }))
        }
    }
}

fn record_grid(grid: &RecordGrid) -> Markup {
    let path = &grid.path;
    html! {
        table.records {
            thead {
                tr {
                    @for column in &grid.columns {
                        th { (column) }
                    }
                    @if grid.columns.is_empty() && !grid.rows.is_empty() {
                        th { "Value" }
                    }
                    th.actions { "Actions" }
                }
            }
            tbody {
                @for row in &grid.rows {
                    tr {
                        @for cell in &row.cells {
                            td { (cell) }
                        }
                        td.actions {
                            details {
                                summary { "Edit" }
                                div.row-form {
                                    @for field in &row.fields {
                                        (render_field(field))
                                    }
                                }
                            }
                            (action_form("remove-row", Some(path), html! {
                                (index_input(row.index))
                                button.danger type="submit" { "Delete" }
                            }))
                        }
                    }
                }
            }
        }
        @if grid.rows.is_empty() {
            p.empty { "No items yet." }
        }
        (action_form("add-row", Some(path), html! {
            button type="submit" { "+ Add Item" }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::EditorOptions;
    use serde_json::json;

    fn session(doc: serde_json::Value) -> EditorSession {
        EditorSession::from_value("en/home.json", doc, EditorOptions::default())
    }

    fn page(session: &EditorSession) -> String {
        let view = EditorView {
            session,
            drift: None,
            images: &[],
            query: "",
            notice: None,
            confirm: None,
        };
        editor_page(&view).into_string()
    }

    #[test]
    fn edit_url_encodes_query() {
        assert_eq!(
            edit_url(Some("en/about us.json"), EditorMode::Raw),
            "/admin/edit?file=en%2Fabout+us.json&mode=raw"
        );
        assert_eq!(edit_url(None, EditorMode::Visual), "/admin/edit?mode=visual");
    }

    #[test]
    fn fields_post_their_pointer() {
        let html = page(&session(json!({"title": "Hello", "blocks": [{"type": "hero", "title": "Hi"}]})));
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"value="/title""#));
        assert!(html.contains(r#"value="/blocks/0/title""#));
        assert!(html.contains("Hero Banner"));
        assert!(html.contains("+ Add Block"));
    }

    #[test]
    fn checkbox_reflects_state() {
        let html = page(&session(json!({"visible": true})));
        assert!(html.contains(r#"type="checkbox" name="value" value="true" checked"#));
    }

    #[test]
    fn select_marks_current_option() {
        let html = page(&session(json!({"blocks": [{"type": "stats", "background": "blue"}]})));
        assert!(html.contains(r#"<option value="blue" selected>blue</option>"#));
        assert!(html.contains(r#"<option value="default">default</option>"#));
    }

    #[test]
    fn collection_page_has_both_views() {
        let html = page(&session(json!({"title": "Products", "items": [{"id": "a", "title": "A"}]})));
        assert!(html.contains("Page Info"));
        assert!(html.contains("<th>id</th>"));
        assert!(html.contains("+ Add Item"));
    }

    #[test]
    fn raw_mode_flags_invalid_json() {
        let mut s = session(json!({"a": 1}));
        s.mode = EditorMode::Raw;
        assert!(!s.edit_raw("{\"a\": "));
        let html = page(&s);
        assert!(html.contains("Invalid JSON: "));
        assert!(html.contains("disabled>Apply</button>"));
        assert_eq!(s.working(), &json!({"a": 1}));

        assert!(s.edit_raw("{\"a\": 2}"));
        let html = page(&s);
        assert!(html.contains("hidden></p>"));
        assert!(!html.contains("Invalid JSON: "));
        assert!(!html.contains("disabled>Apply</button>"));
    }

    #[test]
    fn raw_mode_parses_json_as_you_type() {
        let mut s = session(json!({"a": 1}));
        s.mode = EditorMode::Raw;
        assert!(page(&s).contains("data-json"));
        assert!(JS.contains("source.addEventListener('input'"));
    }

    #[test]
    fn drift_banner_offers_sync() {
        let s = session(json!({}));
        let drift = vec![FieldPath::root().key("title")];
        let view = EditorView {
            session: &s,
            drift: Some(drift.as_slice()),
            images: &[],
            query: "",
            notice: None,
            confirm: None,
        };
        let html = editor_page(&view).into_string();
        assert!(html.contains("sync-master"));
        assert!(html.contains("Sync now"));
        assert!(html.contains("<code>title</code>"));
    }

    #[test]
    fn confirm_box_reposts_fields() {
        let s = session(json!({"a": 1}));
        let confirm = PendingConfirm {
            message: "Missing critical keys: a".into(),
            fields: vec![("action".into(), "save".into())],
        };
        let view = EditorView {
            session: &s,
            drift: None,
            images: &[],
            query: "",
            notice: None,
            confirm: Some(&confirm),
        };
        let html = editor_page(&view).into_string();
        assert!(html.contains(r#"name="confirm" value="true""#));
        assert!(html.contains("Missing critical keys: a"));
    }

    #[test]
    fn index_lists_files_per_language() {
        let languages = vec![(
            Language {
                code: "zh".into(),
                is_master: true,
            },
            vec!["home.json".to_string()],
        )];
        let html = admin_index(&languages, None).into_string();
        assert!(html.contains("master"));
        assert!(html.contains("file=zh%2Fhome.json"));
    }
}
