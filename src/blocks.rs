//! Block registry: the closed catalogue of page content blocks.
//!
//! A page body is an ordered `blocks` array. Each element is an object whose
//! `type` field names one of the [`BlockKind`]s below. The registry gives each
//! kind a display label, a starter skeleton for newly added blocks, and field
//! hints that override [`crate::schema`] inference where a value's shape is
//! ambiguous.
//!
//! Data may contain block types the registry does not know. Those parse as
//! [`BlockType::Unknown`] and are edited through the generic form.

use crate::schema::{EditType, FieldHint};
use regex::Regex;
use serde_json::{Value, json};
use std::sync::LazyLock;

/// Field name holding the block discriminant.
pub const TYPE_KEY: &str = "type";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Hero,
    PainPoints,
    Features,
    Media,
    Stats,
    ProductList,
    LogoWall,
    Cta,
    RichText,
}

impl BlockKind {
    /// Every kind, in the order the "add block" menu lists them.
    pub const ALL: [BlockKind; 9] = [
        BlockKind::Hero,
        BlockKind::PainPoints,
        BlockKind::Features,
        BlockKind::Media,
        BlockKind::Stats,
        BlockKind::ProductList,
        BlockKind::LogoWall,
        BlockKind::Cta,
        BlockKind::RichText,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }

    /// The discriminant as stored in the `type` field.
    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::Hero => "hero",
            BlockKind::PainPoints => "pain_points",
            BlockKind::Features => "features",
            BlockKind::Media => "media",
            BlockKind::Stats => "stats",
            BlockKind::ProductList => "product_list",
            BlockKind::LogoWall => "logo_wall",
            BlockKind::Cta => "cta",
            BlockKind::RichText => "rich_text",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BlockKind::Hero => "Hero Banner",
            BlockKind::PainPoints => "Pain Points",
            BlockKind::Features => "Features",
            BlockKind::Media => "Image / Video",
            BlockKind::Stats => "Stats",
            BlockKind::ProductList => "Product List",
            BlockKind::LogoWall => "Logo Wall",
            BlockKind::Cta => "Call to Action",
            BlockKind::RichText => "Rich Text",
        }
    }

    /// Starter document for a newly added block.
    ///
    /// Built fresh on every call, so two inserted blocks never share state.
    pub fn skeleton(self) -> Value {
        let ty = self.as_str();
        match self {
            BlockKind::Hero => json!({
                "type": ty,
                "title": "",
                "subtitle": "",
                "backgroundImage": "",
                "ctaText": "",
                "ctaLink": "",
            }),
            BlockKind::PainPoints => json!({
                "type": ty,
                "title": "",
                "items": [{ "title": "", "desc": "" }],
            }),
            BlockKind::Features => json!({
                "type": ty,
                "layout": "grid",
                "title": "",
                "items": [{ "title": "", "desc": "", "image": "" }],
            }),
            BlockKind::Media => json!({
                "type": ty,
                "mediaType": "image",
                "url": "",
                "width": "full",
                "caption": "",
            }),
            BlockKind::Stats => json!({
                "type": ty,
                "background": "default",
                "items": [{ "value": "", "label": "" }],
            }),
            BlockKind::ProductList => json!({
                "type": ty,
                "title": "",
                "productIds": [""],
            }),
            BlockKind::LogoWall => json!({
                "type": ty,
                "title": "",
                "logos": [],
            }),
            BlockKind::Cta => json!({
                "type": ty,
                "title": "",
                "buttonText": "",
                "link": "",
            }),
            BlockKind::RichText => json!({
                "type": ty,
                "align": "left",
                "content": "",
            }),
        }
    }

    /// Per-field overrides of schema inference for this kind.
    pub fn field_hints(self) -> &'static [(&'static str, FieldHint)] {
        match self {
            BlockKind::Features => FEATURES_HINTS,
            BlockKind::Media => MEDIA_HINTS,
            BlockKind::Stats => STATS_HINTS,
            BlockKind::RichText => RICH_TEXT_HINTS,
            BlockKind::ProductList => PRODUCT_LIST_HINTS,
            _ => &[],
        }
    }
}

static FEATURES_HINTS: &[(&str, FieldHint)] =
    &[("layout", FieldHint::select(&["grid", "alternating"]))];

static MEDIA_HINTS: &[(&str, FieldHint)] = &[
    ("mediaType", FieldHint::select(&["image", "video"])),
    (
        "url",
        FieldHint::of(EditType::Image)
            .with_help("Image path, YouTube link or direct video file URL"),
    ),
    (
        "width",
        FieldHint::select(&["full", "container"]).with_help("container keeps the media at text width"),
    ),
];

static STATS_HINTS: &[(&str, FieldHint)] = &[("background", FieldHint::select(&["default", "blue"]))];

static RICH_TEXT_HINTS: &[(&str, FieldHint)] = &[
    ("align", FieldHint::select(&["left", "center"])),
    ("content", FieldHint::of(EditType::Textarea)),
];

static PRODUCT_LIST_HINTS: &[(&str, FieldHint)] = &[(
    "productIds",
    FieldHint::of(EditType::Array).with_help("One product id per line"),
)];

/// The type of a block as found in data: a registry kind or an unknown tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockType {
    Known(BlockKind),
    /// Unrecognized or missing `type`. Holds the raw tag (empty if missing).
    Unknown(String),
}

impl BlockType {
    pub fn of(block: &Value) -> Self {
        let tag = block.get(TYPE_KEY).and_then(Value::as_str).unwrap_or("");
        match BlockKind::parse(tag) {
            Some(kind) => BlockType::Known(kind),
            None => BlockType::Unknown(tag.to_string()),
        }
    }

    pub fn label(&self) -> String {
        match self {
            BlockType::Known(kind) => kind.label().to_string(),
            BlockType::Unknown(tag) if tag.is_empty() => "Untyped block".to_string(),
            BlockType::Unknown(tag) => format!("Unknown block ({tag})"),
        }
    }
}

/// The registry hint for `key` inside a block of `block_type`, if any.
pub fn hint_for(block_type: &BlockType, key: &str) -> Option<&'static FieldHint> {
    match block_type {
        BlockType::Known(kind) => kind
            .field_hints()
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, hint)| hint),
        BlockType::Unknown(_) => None,
    }
}

// ============================================================================
// Media resolution
// ============================================================================

static YOUTUBE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.*(youtu.be/|v/|u/\w/|embed/|watch\?v=|&v=)([^#&?]*).*")
        .expect("valid regex")
});

/// Extract an 11-character YouTube video id from any of the common URL forms.
pub fn youtube_id(url: &str) -> Option<String> {
    let caps = YOUTUBE_RE.captures(url)?;
    let id = caps.get(2)?.as_str();
    (id.chars().count() == 11).then(|| id.to_string())
}

/// What a `media` block displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    YouTube { id: String },
    /// A video whose URL is not a recognizable YouTube link.
    VideoFile { url: String },
    Image { url: String },
}

impl MediaSource {
    /// Resolve a media block. `None` when the block has no url.
    pub fn resolve(block: &Value) -> Option<Self> {
        let url = block.get("url").and_then(Value::as_str).unwrap_or("");
        if url.is_empty() {
            return None;
        }
        let is_video = block.get("mediaType").and_then(Value::as_str) == Some("video");
        if !is_video {
            return Some(MediaSource::Image {
                url: url.to_string(),
            });
        }
        Some(match youtube_id(url) {
            Some(id) => MediaSource::YouTube { id },
            None => MediaSource::VideoFile {
                url: url.to_string(),
            },
        })
    }
}
