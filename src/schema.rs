//! Edit-type inference for arbitrary JSON content.
//!
//! Content documents carry no schema. Every field is classified at render
//! time from its key name and value into exactly one [`EditType`], which the
//! editor maps to a single widget. Classification is total: any JSON value
//! maps to some type, and novel shapes degrade to plain text.
//!
//! ## Priority order
//!
//! 1. An explicit [`FieldHint`] for the key wins.
//! 2. Scalar slots (strings, `null`) whose key ends in an image-ish suffix
//!    (`image`, `img`, `icon`, `logo`, `poster`) are images.
//! 3. `null` is text.
//! 4. Booleans and numbers map to themselves.
//! 5. Long strings are textareas, color-ish keys are colors, the rest text.
//! 6. Arrays are arrays (see [`classify_array`] for the sub-kind).
//! 7. Objects are objects.

use serde_json::Value;

/// Strings longer than this many characters are edited in a textarea.
pub const DEFAULT_TEXTAREA_THRESHOLD: usize = 100;

const IMAGE_SUFFIXES: &[&str] = &["image", "img", "icon", "logo", "poster"];
const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".webp", ".svg", ".gif"];

/// The closed set of presentation/edit types a field can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditType {
    Object,
    Array,
    Boolean,
    Number,
    Text,
    Textarea,
    Image,
    Select,
    Color,
}

impl EditType {
    pub fn as_str(self) -> &'static str {
        match self {
            EditType::Object => "object",
            EditType::Array => "array",
            EditType::Boolean => "boolean",
            EditType::Number => "number",
            EditType::Text => "text",
            EditType::Textarea => "textarea",
            EditType::Image => "image",
            EditType::Select => "select",
            EditType::Color => "color",
        }
    }
}

/// Field-level override of the inferred edit type.
///
/// Declared by the block registry for fields whose shape alone is ambiguous,
/// such as a `layout` string that only takes a fixed set of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldHint {
    pub edit_type: EditType,
    /// Allowed values for [`EditType::Select`]. Empty otherwise.
    pub options: &'static [&'static str],
    pub help: Option<&'static str>,
}

impl FieldHint {
    pub const fn select(options: &'static [&'static str]) -> Self {
        Self {
            edit_type: EditType::Select,
            options,
            help: None,
        }
    }

    pub const fn of(edit_type: EditType) -> Self {
        Self {
            edit_type,
            options: &[],
            help: None,
        }
    }

    pub const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

/// How the editor should present an array value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayKind {
    /// The reserved `blocks` key: an ordered list of typed page blocks.
    Blocks,
    /// A list of image paths, edited as a thumbnail grid.
    Images,
    /// A non-empty list of strings/numbers/booleans, edited one per line.
    Primitives,
    /// Objects or anything mixed, edited as a record grid. Also empty arrays.
    Records,
}

/// Classify `value` under `key` using the default textarea threshold.
pub fn infer_edit_type(key: &str, value: &Value, hint: Option<&FieldHint>) -> EditType {
    infer_edit_type_with(key, value, hint, DEFAULT_TEXTAREA_THRESHOLD)
}

/// Classify `value` under `key`; strings longer than `textarea_threshold`
/// characters become [`EditType::Textarea`].
pub fn infer_edit_type_with(
    key: &str,
    value: &Value,
    hint: Option<&FieldHint>,
    textarea_threshold: usize,
) -> EditType {
    if let Some(hint) = hint {
        return hint.edit_type;
    }
    if is_image_key(key) && matches!(value, Value::String(_) | Value::Null) {
        return EditType::Image;
    }
    match value {
        Value::Null => EditType::Text,
        Value::Bool(_) => EditType::Boolean,
        Value::Number(_) => EditType::Number,
        Value::String(s) => {
            if s.chars().count() > textarea_threshold {
                EditType::Textarea
            } else if is_color_key(key) {
                EditType::Color
            } else {
                EditType::Text
            }
        }
        Value::Array(_) => EditType::Array,
        Value::Object(_) => EditType::Object,
    }
}

/// Sub-classify an array for the editor.
///
/// Checked in order: the reserved `blocks` key, image collections (image-ish
/// key holding only strings, or a first element that looks like an image
/// path), non-empty primitive lists, then records.
pub fn classify_array(key: &str, items: &[Value]) -> ArrayKind {
    if key == "blocks" {
        return ArrayKind::Blocks;
    }
    if is_image_collection(key, items) {
        return ArrayKind::Images;
    }
    if !items.is_empty() && items.iter().all(is_primitive) {
        return ArrayKind::Primitives;
    }
    ArrayKind::Records
}

fn is_image_collection(key: &str, items: &[Value]) -> bool {
    let all_strings = items
        .iter()
        .all(|v| matches!(v, Value::String(_) | Value::Null));
    if !all_strings {
        return false;
    }
    let key = key.to_lowercase();
    if IMAGE_SUFFIXES.iter().any(|s| key.contains(s)) {
        return true;
    }
    matches!(items.first(), Some(Value::String(s)) if looks_like_image_path(s))
}

fn is_primitive(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

/// True if the key name ends with an image-ish suffix, case-insensitively
/// (`backgroundImage`, `thumb_img`, `icon`, `partnerLogo`).
pub fn is_image_key(key: &str) -> bool {
    let key = key.to_lowercase();
    IMAGE_SUFFIXES.iter().any(|s| key.ends_with(s))
}

/// True if the key name mentions a color or background.
pub fn is_color_key(key: &str) -> bool {
    let key = key.to_lowercase();
    key.contains("color") || key.contains("background")
}

/// True for paths under `/images/` or with a known image extension.
pub fn looks_like_image_path(s: &str) -> bool {
    if s.starts_with("/images/") {
        return true;
    }
    let lower = s.to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Turn a JSON key into a form label: `backgroundImage` → `Background Image`,
/// `cta_text` → `Cta Text`.
pub fn humanize_key(key: &str) -> String {
    let mut spaced = String::with_capacity(key.len() + 4);
    for (i, c) in key.chars().enumerate() {
        if c == '_' || c == '-' {
            spaced.push(' ');
        } else if c.is_uppercase() && i > 0 {
            spaced.push(' ');
            spaced.push(c);
        } else {
            spaced.push(c);
        }
    }
    spaced
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // =========================================================================
    // infer_edit_type
    // =========================================================================

    #[test]
    fn hint_wins_over_everything() {
        let hint = FieldHint::select(&["grid", "alternating"]);
        assert_eq!(
            infer_edit_type("layout", &json!("grid"), Some(&hint)),
            EditType::Select
        );
        let image = FieldHint::of(EditType::Image);
        assert_eq!(
            infer_edit_type("url", &json!("https://youtu.be/x"), Some(&image)),
            EditType::Image
        );
    }

    #[test]
    fn image_suffix_on_scalar_slots() {
        assert_eq!(
            infer_edit_type("backgroundImage", &json!("/images/a.jpg"), None),
            EditType::Image
        );
        assert_eq!(infer_edit_type("icon", &json!("Box"), None), EditType::Image);
        assert_eq!(infer_edit_type("partnerLogo", &Value::Null, None), EditType::Image);
        assert_eq!(infer_edit_type("poster", &json!(""), None), EditType::Image);
    }

    #[test]
    fn image_suffix_does_not_capture_structured_values() {
        assert_eq!(
            infer_edit_type("image", &json!(["/images/a.jpg"]), None),
            EditType::Array
        );
        assert_eq!(
            infer_edit_type("heroImage", &json!({"src": "/a.png"}), None),
            EditType::Object
        );
        assert_eq!(infer_edit_type("icon", &json!(3), None), EditType::Number);
    }

    #[test]
    fn null_is_text() {
        assert_eq!(infer_edit_type("subtitle", &Value::Null, None), EditType::Text);
    }

    #[test]
    fn booleans_and_numbers() {
        assert_eq!(infer_edit_type("visible", &json!(true), None), EditType::Boolean);
        assert_eq!(infer_edit_type("price", &json!(12.5), None), EditType::Number);
        assert_eq!(infer_edit_type("count", &json!(-3), None), EditType::Number);
    }

    #[test]
    fn long_strings_are_textareas() {
        let long = "x".repeat(101);
        assert_eq!(infer_edit_type("desc", &json!(long), None), EditType::Textarea);
        let exact = "x".repeat(100);
        assert_eq!(infer_edit_type("desc", &json!(exact), None), EditType::Text);
    }

    #[test]
    fn textarea_threshold_counts_characters_not_bytes() {
        // 60 CJK characters are 180 bytes.
        let cjk = "你".repeat(60);
        assert_eq!(infer_edit_type("desc", &json!(cjk), None), EditType::Text);
    }

    #[test]
    fn custom_textarea_threshold() {
        assert_eq!(
            infer_edit_type_with("desc", &json!("hello world"), None, 5),
            EditType::Textarea
        );
    }

    #[test]
    fn color_keys() {
        assert_eq!(infer_edit_type("color", &json!("blue"), None), EditType::Color);
        assert_eq!(
            infer_edit_type("background", &json!("blue"), None),
            EditType::Color
        );
        assert_eq!(
            infer_edit_type("textColor", &json!("#fff"), None),
            EditType::Color
        );
        // Long strings stay textareas even under a color key.
        let long = "x".repeat(150);
        assert_eq!(
            infer_edit_type("backgroundNote", &json!(long), None),
            EditType::Textarea
        );
    }

    #[test]
    fn containers() {
        assert_eq!(infer_edit_type("items", &json!([]), None), EditType::Array);
        assert_eq!(infer_edit_type("meta", &json!({}), None), EditType::Object);
    }

    #[test]
    fn inference_is_total() {
        let samples = [
            Value::Null,
            json!(false),
            json!(0),
            json!(""),
            json!([null, 1, "a", {}]),
            json!({"nested": {"deep": []}}),
        ];
        for key in ["", "image", "color", "blocks", "x"] {
            for value in &samples {
                // Any value maps to exactly one type without panicking.
                let _ = infer_edit_type(key, value, None);
            }
        }
    }

    // =========================================================================
    // classify_array
    // =========================================================================

    #[test]
    fn blocks_key_is_reserved() {
        assert_eq!(classify_array("blocks", &[]), ArrayKind::Blocks);
        assert_eq!(
            classify_array("blocks", &[json!({"type": "hero"})]),
            ArrayKind::Blocks
        );
    }

    #[test]
    fn image_collections() {
        assert_eq!(classify_array("images", &[]), ArrayKind::Images);
        assert_eq!(
            classify_array("logos", &[json!("/images/a.png"), json!("")]),
            ArrayKind::Images
        );
        assert_eq!(
            classify_array("gallery", &[json!("/images/a.png")]),
            ArrayKind::Images
        );
        assert_eq!(
            classify_array("files", &[json!("/docs/manual.png")]),
            ArrayKind::Images
        );
    }

    #[test]
    fn image_key_holding_objects_is_records() {
        assert_eq!(
            classify_array("images", &[json!({"src": "/images/a.png"})]),
            ArrayKind::Records
        );
    }

    #[test]
    fn primitive_lists() {
        assert_eq!(
            classify_array("features", &[json!("Fast"), json!("Small")]),
            ArrayKind::Primitives
        );
        assert_eq!(
            classify_array("sizes", &[json!(1), json!(2)]),
            ArrayKind::Primitives
        );
    }

    #[test]
    fn empty_and_object_arrays_are_records() {
        assert_eq!(classify_array("features", &[]), ArrayKind::Records);
        assert_eq!(
            classify_array("parameters", &[json!({"label": "a", "value": "b"})]),
            ArrayKind::Records
        );
        assert_eq!(
            classify_array("mixed", &[json!("a"), json!({"b": 1})]),
            ArrayKind::Records
        );
    }

    // =========================================================================
    // Key helpers
    // =========================================================================

    #[test]
    fn image_key_suffixes() {
        assert!(is_image_key("image"));
        assert!(is_image_key("heroImage"));
        assert!(is_image_key("thumb_img"));
        assert!(is_image_key("ICON"));
        assert!(!is_image_key("images"));
        assert!(!is_image_key("imageCaption"));
    }

    #[test]
    fn image_path_detection() {
        assert!(looks_like_image_path("/images/hero.jpg"));
        assert!(looks_like_image_path("/images/no-extension"));
        assert!(looks_like_image_path("https://cdn.example.com/a.WEBP"));
        assert!(!looks_like_image_path("/docs/manual.pdf"));
        assert!(!looks_like_image_path("Box"));
    }

    #[test]
    fn humanize_labels() {
        assert_eq!(humanize_key("backgroundImage"), "Background Image");
        assert_eq!(humanize_key("cta_text"), "Cta Text");
        assert_eq!(humanize_key("title"), "Title");
        assert_eq!(humanize_key("metaDesc"), "Meta Desc");
    }
}
