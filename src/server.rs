//! HTTP server: the admin file API and the editor pages.
//!
//! ```text
//! /api/admin/languages        GET list · POST {code} · DELETE {code}
//! /api/admin/files            GET ?lang= · DELETE ?file=
//! /api/admin/content          GET ?file= · POST {file, content}
//! /api/admin/master-content   GET ?file=
//! /api/admin/images           GET ?q=
//! /api/admin/upload-image     POST {filename, content}
//! /api/admin/sync             POST {languages?, dryRun?}
//! /api/admin/rebuild-index    POST {type, lang?}
//! /api/admin/pages            POST {template, name, lang?}
//! /admin                      language and file browser
//! /admin/edit                 GET open/render · POST form action
//! /images/*, /data/*          static files
//! ```
//!
//! There is no authentication. The server is meant for a single author on
//! a local machine and binds to loopback by default.

use crate::blocks::BlockKind;
use crate::config::CmsConfig;
use crate::editor::html::{self, EditorView, Notice, PendingConfirm, edit_url};
use crate::editor::{
    Direction, DocumentKind, EditError, EditorMode, EditorOptions, EditorSession, FieldPath,
    add_image_slot, add_record, append_block, apply_input, move_block, remove_block,
    remove_image_slot, remove_record, set_lines,
};
use crate::images::{ImageError, ImageStore};
use crate::index::{IndexError, IndexKind, RebuildReport, rebuild_index};
use crate::pages::{PageError, PageTemplate, create_page};
use crate::store::{ContentStore, StoreError, to_pretty_json};
use crate::sync::{
    FileStatus, SyncError, SyncOptions, SyncReport, TranslationMarker, sync_languages,
};
use axum::{
    Form, Json, Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Image(#[from] ImageError),
    #[error(transparent)]
    Edit(#[from] EditError),
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error(transparent)]
    Index(#[from] IndexError),
    #[error(transparent)]
    Page(#[from] PageError),
    #[error("{0}")]
    BadRequest(String),
    #[error("no document is open")]
    NoSession,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn store_status(e: &StoreError) -> StatusCode {
    match e {
        StoreError::NotFound(_) | StoreError::LanguageNotFound(_) | StoreError::MasterMissing(_) => {
            StatusCode::NOT_FOUND
        }
        StoreError::AccessDenied(_) | StoreError::MasterProtected(_) => StatusCode::FORBIDDEN,
        StoreError::InvalidLanguage(_) => StatusCode::BAD_REQUEST,
        StoreError::LanguageExists(_) => StatusCode::CONFLICT,
        StoreError::Io(_) | StoreError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Store(e) => store_status(e),
            ServerError::Image(ImageError::Io(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Image(_) => StatusCode::BAD_REQUEST,
            ServerError::Edit(EditError::Store(e)) => store_status(e),
            ServerError::Edit(EditError::ConfirmationRequired(_)) => StatusCode::CONFLICT,
            ServerError::Edit(EditError::PathNotFound(_)) => StatusCode::NOT_FOUND,
            ServerError::Edit(_) => StatusCode::BAD_REQUEST,
            ServerError::Sync(SyncError::Store(e)) => store_status(e),
            ServerError::Sync(SyncError::MasterTarget(_)) => StatusCode::BAD_REQUEST,
            ServerError::Sync(SyncError::MasterMissing(_)) => StatusCode::NOT_FOUND,
            ServerError::Index(IndexError::Store(e)) => store_status(e),
            ServerError::Index(IndexError::DetailsMissing(_)) => StatusCode::NOT_FOUND,
            ServerError::Index(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Page(PageError::Store(e)) => store_status(e),
            ServerError::Page(PageError::Exists(_)) => StatusCode::CONFLICT,
            ServerError::Page(_) => StatusCode::BAD_REQUEST,
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NoSession => StatusCode::NOT_FOUND,
            ServerError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The error as an HTML page, for the editor routes.
    fn into_page(self) -> Response {
        let status = self.status_code();
        let title = status.canonical_reason().unwrap_or("Error");
        (status, Html(html::error_page(title, &self.to_string()).into_string())).into_response()
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{self}");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

// ============================================================================
// State
// ============================================================================

/// The open editor session plus the one-shot messages for its next render.
#[derive(Debug, Default)]
pub struct Desk {
    pub session: Option<EditorSession>,
    notice: Option<Notice>,
    confirm: Option<PendingConfirm>,
}

pub struct AppState {
    pub config: CmsConfig,
    pub store: ContentStore,
    pub images: ImageStore,
    pub desk: Mutex<Desk>,
}

impl AppState {
    pub fn new(root: &Path, config: CmsConfig) -> Self {
        let store = ContentStore::new(config.data_root(root), config.languages.master.clone());
        let images = ImageStore::new(config.public_root(root), config.images_dir.clone());
        Self {
            config,
            store,
            images,
            desk: Mutex::new(Desk::default()),
        }
    }

    fn desk(&self) -> MutexGuard<'_, Desk> {
        self.desk.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn editor_options(&self) -> EditorOptions {
        EditorOptions::from(&self.config.editor)
    }

    fn marker(&self) -> TranslationMarker {
        TranslationMarker::from(&self.config.sync)
    }
}

type SharedState = Arc<AppState>;

pub fn router(state: SharedState) -> Router {
    let images_root = state.images.dir();
    let data_root = state.store.root().to_path_buf();
    let api = Router::new()
        .route(
            "/languages",
            get(list_languages).post(add_language).delete(remove_language),
        )
        .route("/files", get(list_files).delete(delete_file))
        .route("/content", get(get_content).post(put_content))
        .route("/master-content", get(get_master_content))
        .route("/images", get(list_images))
        .route("/upload-image", post(upload_image))
        .route("/sync", post(run_sync))
        .route("/rebuild-index", post(run_rebuild))
        .route("/pages", post(new_page));

    Router::new()
        .route("/", get(|| async { Redirect::to("/admin") }))
        .route("/admin", get(admin_index))
        .route("/admin/edit", get(editor_get).post(editor_post))
        .nest("/api/admin", api)
        .nest_service("/images", ServeDir::new(images_root))
        .nest_service("/data", ServeDir::new(data_root))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until Ctrl-C.
pub async fn serve(state: SharedState, addr: SocketAddr) -> Result<(), ServerError> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on http://{}/admin", addr);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {e}");
    }
}

// ============================================================================
// File API
// ============================================================================

#[derive(Deserialize)]
struct LanguageBody {
    code: Option<String>,
}

#[derive(Deserialize, Default)]
struct FileQuery {
    file: Option<String>,
    lang: Option<String>,
    q: Option<String>,
}

impl FileQuery {
    fn file(&self) -> Result<&str, ServerError> {
        self.file
            .as_deref()
            .filter(|f| !f.is_empty())
            .ok_or_else(|| ServerError::BadRequest("Missing file parameter".into()))
    }
}

fn required_code(body: LanguageBody) -> Result<String, ServerError> {
    body.code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ServerError::BadRequest("Language code is required".into()))
}

async fn list_languages(State(state): State<SharedState>) -> Result<Json<Value>, ServerError> {
    Ok(Json(json!({ "languages": state.store.languages()? })))
}

async fn add_language(
    State(state): State<SharedState>,
    Json(body): Json<LanguageBody>,
) -> Result<Json<Value>, ServerError> {
    let code = required_code(body)?;
    state.store.create_language(&code)?;
    tracing::info!(language = %code, "created language from master");
    Ok(Json(json!({ "success": true, "message": format!("Created {code}") })))
}

async fn remove_language(
    State(state): State<SharedState>,
    Json(body): Json<LanguageBody>,
) -> Result<Json<Value>, ServerError> {
    let code = required_code(body)?;
    state.store.delete_language(&code)?;
    tracing::info!(language = %code, "deleted language");
    Ok(Json(json!({ "success": true })))
}

async fn list_files(
    State(state): State<SharedState>,
    Query(query): Query<FileQuery>,
) -> Result<Json<Value>, ServerError> {
    let files = state.store.list(query.lang.as_deref().filter(|l| !l.is_empty()))?;
    Ok(Json(json!({ "files": files })))
}

async fn delete_file(
    State(state): State<SharedState>,
    Query(query): Query<FileQuery>,
) -> Result<Json<Value>, ServerError> {
    let file = query.file()?;
    state.store.delete(file)?;
    tracing::info!(file, "deleted");
    Ok(Json(json!({ "success": true })))
}

fn raw_file(file: &str, text: String) -> Response {
    let content_type = match DocumentKind::of(file) {
        DocumentKind::Markdown => "text/markdown; charset=utf-8",
        DocumentKind::Json => "application/json",
    };
    ([(header::CONTENT_TYPE, content_type)], text).into_response()
}

async fn get_content(
    State(state): State<SharedState>,
    Query(query): Query<FileQuery>,
) -> Result<Response, ServerError> {
    let file = query.file()?;
    Ok(raw_file(file, state.store.read(file)?))
}

#[derive(Deserialize)]
struct ContentBody {
    file: Option<String>,
    #[serde(default)]
    content: Value,
}

async fn put_content(
    State(state): State<SharedState>,
    Json(body): Json<ContentBody>,
) -> Result<Json<Value>, ServerError> {
    let file = body.file.filter(|f| !f.is_empty());
    let (Some(file), false) = (file, body.content.is_null()) else {
        return Err(ServerError::BadRequest("Missing file or content".into()));
    };
    let text = match &body.content {
        Value::String(s) => s.clone(),
        other => to_pretty_json(other).map_err(StoreError::from)?,
    };
    state.store.write(&file, &text)?;
    tracing::info!(file = %file, "written");
    Ok(Json(json!({ "success": true })))
}

async fn get_master_content(
    State(state): State<SharedState>,
    Query(query): Query<FileQuery>,
) -> Result<Response, ServerError> {
    let file = query.file()?;
    Ok(raw_file(file, state.store.read_master(file)?))
}

async fn list_images(
    State(state): State<SharedState>,
    Query(query): Query<FileQuery>,
) -> Json<Value> {
    Json(json!({ "images": state.images.list(query.q.as_deref()) }))
}

#[derive(Deserialize)]
struct UploadBody {
    #[serde(default)]
    filename: String,
    #[serde(default)]
    content: String,
}

async fn upload_image(
    State(state): State<SharedState>,
    Json(body): Json<UploadBody>,
) -> Result<Json<Value>, ServerError> {
    let path = state.images.upload(&body.filename, &body.content)?;
    Ok(Json(json!({ "success": true, "path": path })))
}

// ============================================================================
// Batch tools
// ============================================================================

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct SyncBody {
    languages: Option<Vec<String>>,
    #[serde(default)]
    dry_run: bool,
}

fn status_name(status: &FileStatus) -> &'static str {
    match status {
        FileStatus::Unchanged => "unchanged",
        FileStatus::Updated => "updated",
        FileStatus::Created => "created",
        FileStatus::Replaced => "replaced",
        FileStatus::Failed(_) => "failed",
    }
}

fn sync_report_json(report: &SyncReport) -> Value {
    let languages: Vec<Value> = report
        .languages
        .iter()
        .map(|lang| {
            let files: Vec<Value> = lang
                .files
                .iter()
                .map(|f| {
                    let mut entry = json!({
                        "path": f.path,
                        "changes": f.changes,
                        "status": status_name(&f.status),
                    });
                    if let FileStatus::Failed(reason) = &f.status {
                        entry["error"] = json!(reason);
                    }
                    entry
                })
                .collect();
            json!({
                "language": lang.language,
                "dryRun": lang.dry_run,
                "changes": lang.total_changes(),
                "files": files,
            })
        })
        .collect();
    let failed: Vec<Value> = report
        .failed
        .iter()
        .map(|(language, error)| json!({ "language": language, "error": error }))
        .collect();
    json!({
        "languages": languages,
        "failed": failed,
        "totalChanges": report.total_changes(),
    })
}

async fn run_sync(
    State(state): State<SharedState>,
    Json(body): Json<SyncBody>,
) -> Result<Json<Value>, ServerError> {
    let languages = match body.languages.filter(|l| !l.is_empty()) {
        Some(languages) => languages,
        None => state.store.target_languages()?,
    };
    let options = SyncOptions {
        marker: state.marker(),
        dry_run: body.dry_run,
    };
    let report = sync_languages(&state.store, &languages, &options);
    Ok(Json(sync_report_json(&report)))
}

#[derive(Deserialize)]
struct RebuildBody {
    #[serde(rename = "type", default = "all_kinds")]
    kind: String,
    lang: Option<String>,
}

fn all_kinds() -> String {
    "all".to_string()
}

fn rebuild_report_json(report: &RebuildReport) -> Value {
    json!({
        "language": report.language,
        "type": report.kind.as_str(),
        "items": report.items,
        "detailFiles": report.detail_files,
        "created": report.created,
        "duplicates": report.duplicates,
        "skipped": report
            .skipped
            .iter()
            .map(|(path, error)| json!({ "path": path, "error": error }))
            .collect::<Vec<_>>(),
    })
}

async fn run_rebuild(
    State(state): State<SharedState>,
    Json(body): Json<RebuildBody>,
) -> Result<Json<Value>, ServerError> {
    let lang = body
        .lang
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| state.store.master().to_string());
    if body.kind != "all" {
        let kind = IndexKind::parse(&body.kind)
            .ok_or_else(|| ServerError::BadRequest(format!("unknown index type: {}", body.kind)))?;
        let report = rebuild_index(&state.store, &lang, kind)?;
        return Ok(Json(json!({ "reports": [rebuild_report_json(&report)], "errors": [] })));
    }
    let mut reports = Vec::new();
    let mut errors = Vec::new();
    for kind in state.config.index_kinds() {
        match rebuild_index(&state.store, &lang, kind) {
            Ok(report) => reports.push(rebuild_report_json(&report)),
            Err(e) => {
                tracing::error!(language = %lang, kind = kind.as_str(), "index rebuild failed: {e}");
                errors.push(json!({ "type": kind.as_str(), "error": e.to_string() }));
            }
        }
    }
    Ok(Json(json!({ "reports": reports, "errors": errors })))
}

#[derive(Deserialize)]
struct PageBody {
    template: String,
    name: String,
    lang: Option<String>,
}

async fn new_page(
    State(state): State<SharedState>,
    Json(body): Json<PageBody>,
) -> Result<Json<Value>, ServerError> {
    let template = PageTemplate::parse(&body.template)?;
    let lang = body
        .lang
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| state.store.master().to_string());
    let path = create_page(&state.store, &lang, template, &body.name)?;
    Ok(Json(json!({ "success": true, "path": path })))
}

// ============================================================================
// Editor pages
// ============================================================================

fn index_page(state: &AppState) -> Result<Html<String>, ServerError> {
    let mut listing = Vec::new();
    for language in state.store.languages()? {
        let files = state.store.list(Some(&language.code))?;
        listing.push((language, files));
    }
    let notice = state.desk().notice.take();
    Ok(Html(html::admin_index(&listing, notice.as_ref()).into_string()))
}

async fn admin_index(State(state): State<SharedState>) -> Response {
    match index_page(&state) {
        Ok(page) => page.into_response(),
        Err(e) => e.into_page(),
    }
}

#[derive(Deserialize, Default)]
struct EditQuery {
    file: Option<String>,
    mode: Option<String>,
    #[serde(default)]
    q: String,
}

async fn editor_get(State(state): State<SharedState>, Query(query): Query<EditQuery>) -> Response {
    let mut desk = state.desk();
    if let Some(file) = query.file.as_deref().filter(|f| !f.is_empty()) {
        let reopen = desk.session.as_ref().is_none_or(|s| s.file() != file);
        if reopen {
            if let Some(previous) = desk.session.as_ref().filter(|s| s.is_dirty()) {
                tracing::warn!(file = previous.file(), "discarding unsaved changes");
            }
            match EditorSession::open(&state.store, file, state.editor_options()) {
                Ok(session) => {
                    desk.session = Some(session);
                    desk.confirm = None;
                }
                Err(e) => return ServerError::from(e).into_page(),
            }
        }
    }
    let Desk {
        session,
        notice,
        confirm,
    } = &mut *desk;
    let Some(session) = session.as_mut() else {
        return Redirect::to("/admin").into_response();
    };
    if let Some(mode) = query.mode.as_deref().and_then(EditorMode::parse) {
        session.mode = match (session.kind(), mode) {
            (DocumentKind::Markdown, EditorMode::Visual) => EditorMode::Raw,
            (_, mode) => mode,
        };
    }

    let drift = session.master_drift(&state.store);
    let filter = Some(query.q.as_str()).filter(|q| !q.is_empty());
    let images = state.images.list(filter);
    let notice = notice.take();
    let confirm = confirm.take();
    let view = EditorView {
        session,
        drift: drift.as_deref(),
        images: &images,
        query: &query.q,
        notice: notice.as_ref(),
        confirm: confirm.as_ref(),
    };
    Html(html::editor_page(&view).into_string()).into_response()
}

/// A form action on the open document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EditAction {
    SetField,
    Raw,
    AddBlock,
    RemoveBlock,
    MoveBlock,
    AddRow,
    RemoveRow,
    AddImage,
    RemoveImage,
    SetLines,
    Save,
    SyncMaster,
    Reset,
}

impl EditAction {
    fn as_str(self) -> &'static str {
        match self {
            EditAction::SetField => "set-field",
            EditAction::Raw => "raw",
            EditAction::AddBlock => "add-block",
            EditAction::RemoveBlock => "remove-block",
            EditAction::MoveBlock => "move-block",
            EditAction::AddRow => "add-row",
            EditAction::RemoveRow => "remove-row",
            EditAction::AddImage => "add-image",
            EditAction::RemoveImage => "remove-image",
            EditAction::SetLines => "set-lines",
            EditAction::Save => "save",
            EditAction::SyncMaster => "sync-master",
            EditAction::Reset => "reset",
        }
    }
}

/// The editor's form body. Which fields matter depends on `action`.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionForm {
    pub action: EditAction,
    #[serde(default)]
    pub path: String,
    pub value: Option<String>,
    pub index: Option<usize>,
    pub direction: Option<String>,
    pub block_type: Option<String>,
    #[serde(default)]
    pub confirm: bool,
}

impl ActionForm {
    fn path(&self) -> Result<FieldPath, ServerError> {
        Ok(FieldPath::parse(&self.path)?)
    }

    fn index(&self) -> Result<usize, ServerError> {
        self.index
            .ok_or_else(|| ServerError::BadRequest("missing index".into()))
    }

    fn value(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }

    fn direction(&self) -> Result<Direction, ServerError> {
        match self.direction.as_deref() {
            Some("up") => Ok(Direction::Up),
            Some("down") => Ok(Direction::Down),
            other => Err(ServerError::BadRequest(format!("invalid direction: {other:?}"))),
        }
    }

    /// Form fields to resubmit for a confirmation.
    fn fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            ("action".to_string(), self.action.as_str().to_string()),
            ("path".to_string(), self.path.clone()),
        ];
        let optional = [
            ("value", self.value.clone()),
            ("index", self.index.map(|i| i.to_string())),
            ("direction", self.direction.clone()),
            ("block_type", self.block_type.clone()),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                fields.push((name.to_string(), value));
            }
        }
        fields
    }
}

/// Run one action. Returns a message for the next page, if any.
fn perform(
    state: &AppState,
    session: &mut EditorSession,
    form: &ActionForm,
) -> Result<Option<String>, ServerError> {
    let options = session.options;
    let message = match form.action {
        EditAction::SetField => {
            let path = form.path()?;
            session.apply(|doc| apply_input(doc, &path, form.value(), &options))?;
            None
        }
        EditAction::Raw => {
            session.edit_raw(form.value());
            None
        }
        EditAction::AddBlock => {
            let path = form.path()?;
            let tag = form.block_type.as_deref().unwrap_or("");
            let kind = BlockKind::parse(tag)
                .ok_or_else(|| EditError::UnknownBlockType(tag.to_string()))?;
            session.apply(|doc| append_block(doc, &path, kind))?;
            Some(format!("Added {}", kind.label()))
        }
        EditAction::RemoveBlock => {
            let (path, index) = (form.path()?, form.index()?);
            session.apply(|doc| remove_block(doc, &path, index, form.confirm))?;
            Some("Block removed".to_string())
        }
        EditAction::MoveBlock => {
            let (path, index, direction) = (form.path()?, form.index()?, form.direction()?);
            session.apply(|doc| move_block(doc, &path, index, direction))?;
            None
        }
        EditAction::AddRow => {
            let path = form.path()?;
            session.apply(|doc| add_record(doc, &path, options.grid_columns))?;
            None
        }
        EditAction::RemoveRow => {
            let (path, index) = (form.path()?, form.index()?);
            session.apply(|doc| remove_record(doc, &path, index, form.confirm))?;
            Some("Item deleted".to_string())
        }
        EditAction::AddImage => {
            let path = form.path()?;
            session.apply(|doc| add_image_slot(doc, &path))?;
            None
        }
        EditAction::RemoveImage => {
            let (path, index) = (form.path()?, form.index()?);
            session.apply(|doc| remove_image_slot(doc, &path, index))?;
            None
        }
        EditAction::SetLines => {
            let path = form.path()?;
            session.apply(|doc| set_lines(doc, &path, form.value()))?;
            None
        }
        EditAction::Save => {
            session.save(&state.store, form.confirm)?;
            Some(format!("Saved {}", session.file()))
        }
        EditAction::SyncMaster => {
            let added = session.sync_from_master(&state.store, &state.marker())?;
            Some(format!("Added {added} field(s) from the master language. Review and save."))
        }
        EditAction::Reset => {
            session.reset();
            Some("Unsaved changes discarded".to_string())
        }
    };
    Ok(message)
}

async fn editor_post(State(state): State<SharedState>, Form(form): Form<ActionForm>) -> Response {
    let mut desk = state.desk();
    let Desk {
        session,
        notice,
        confirm,
    } = &mut *desk;
    let Some(session) = session.as_mut() else {
        return ServerError::NoSession.into_page();
    };
    match perform(&state, session, &form) {
        Ok(message) => *notice = message.map(Notice::info),
        Err(ServerError::Edit(EditError::ConfirmationRequired(message))) => {
            *confirm = Some(PendingConfirm {
                message,
                fields: form.fields(),
            });
        }
        Err(e) => {
            tracing::warn!(file = session.file(), action = form.action.as_str(), "{e}");
            *notice = Some(Notice::error(e.to_string()));
        }
    }
    Redirect::to(&edit_url(None, session.mode)).into_response()
}
