//! Document → form tree.
//!
//! [`render`] walks a document and produces an [`EditableForm`]: a tree of
//! [`Field`]s, each carrying its JSON path and the [`Widget`] that edits it.
//! The tree is plain data; [`super::html`] turns it into markup.
//!
//! Top-level dispatch:
//!
//! - array root → record grid ("list view")
//! - object with an `items` array → record grid for the items plus a form
//!   for the remaining page fields ("page & items view")
//! - any other object → form
//! - primitive root → raw mode only

use super::EditorOptions;
use super::path::FieldPath;
use crate::blocks::{BlockType, TYPE_KEY, hint_for};
use crate::schema::{
    ArrayKind, EditType, FieldHint, classify_array, humanize_key, infer_edit_type_with,
};
use serde_json::{Map, Value};

/// Longest cell text shown in a record grid before truncation.
const CELL_CHARS: usize = 60;

#[derive(Debug, Clone, PartialEq)]
pub enum EditableForm {
    Collection(RecordGrid),
    CollectionPage {
        items: RecordGrid,
        page_info: Vec<Field>,
    },
    Form(Vec<Field>),
    RawOnly,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: String,
    pub label: String,
    pub path: FieldPath,
    pub edit_type: EditType,
    pub widget: Widget,
    pub help: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Widget {
    /// Nested object, rendered as a sub-form.
    Group(Vec<Field>),
    BlockList(Vec<BlockCard>),
    ImageGrid(Vec<ImageSlot>),
    /// One value per line.
    PrimitiveList { text: String },
    Records(RecordGrid),
    Checkbox { checked: bool },
    NumberInput { value: String },
    TextInput { value: String },
    TextArea { value: String },
    ColorInput { value: String },
    ImageInput { value: String },
    Select { value: String, options: Vec<String> },
}

/// One block in a block list.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockCard {
    pub index: usize,
    pub path: FieldPath,
    pub block_type: BlockType,
    pub label: String,
    /// Editable fields; the `type` discriminant is never among them.
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageSlot {
    pub index: usize,
    pub path: FieldPath,
    pub value: String,
}

/// A list of records shown as a table with a per-row edit form.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordGrid {
    pub path: FieldPath,
    pub columns: Vec<String>,
    pub rows: Vec<RecordRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordRow {
    pub index: usize,
    pub path: FieldPath,
    /// Display text per column.
    pub cells: Vec<String>,
    pub fields: Vec<Field>,
}

/// Build the form tree for a whole document.
pub fn render(doc: &Value, options: &EditorOptions) -> EditableForm {
    match doc {
        Value::Array(items) => EditableForm::Collection(record_grid(&FieldPath::root(), items, options)),
        Value::Object(map) => match map.get("items") {
            Some(Value::Array(items)) => {
                let page_info = object_fields(map, &FieldPath::root(), None, options)
                    .into_iter()
                    .filter(|f| f.key != "items")
                    .collect();
                EditableForm::CollectionPage {
                    items: record_grid(&FieldPath::root().key("items"), items, options),
                    page_info,
                }
            }
            _ => EditableForm::Form(object_fields(map, &FieldPath::root(), None, options)),
        },
        _ => EditableForm::RawOnly,
    }
}

/// Union of record keys in first-seen order, capped at `max`.
pub fn record_columns(items: &[Value], max: usize) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for item in items {
        if let Value::Object(map) = item {
            for key in map.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }
    }
    columns.truncate(max);
    columns
}

/// The effective edit type of the value at `path`, including block hints.
pub fn edit_type_at(doc: &Value, path: &FieldPath, options: &EditorOptions) -> Option<EditType> {
    let value = path.get(doc)?;
    let key = path.last().unwrap_or("");
    let hint = block_hint_at(doc, path);
    Some(effective_type(key, value, hint, options))
}

/// Whether `path` addresses the `type` tag of a block in a `blocks` list.
pub fn is_block_type_path(path: &FieldPath) -> bool {
    let tokens = path.tokens();
    tokens.len() >= 3 && tokens[tokens.len() - 3] == "blocks" && tokens[tokens.len() - 1] == TYPE_KEY
}

/// The registry hint for a field directly inside a block of a `blocks` list.
pub fn block_hint_at(doc: &Value, path: &FieldPath) -> Option<&'static FieldHint> {
    let tokens = path.tokens();
    if tokens.len() < 3 || tokens[tokens.len() - 3] != "blocks" {
        return None;
    }
    let (block_path, key) = path.split_last()?;
    let block = block_path.get(doc)?;
    hint_for(&BlockType::of(block), key)
}

fn hint_applies(hint: &FieldHint, value: &Value) -> bool {
    match hint.edit_type {
        EditType::Array => value.is_array(),
        EditType::Object => value.is_object(),
        EditType::Boolean => value.is_boolean() || value.is_null(),
        EditType::Number => value.is_number() || value.is_null(),
        _ => !value.is_array() && !value.is_object(),
    }
}

fn effective_type(
    key: &str,
    value: &Value,
    hint: Option<&FieldHint>,
    options: &EditorOptions,
) -> EditType {
    let hint = hint.filter(|h| hint_applies(h, value));
    infer_edit_type_with(key, value, hint, options.textarea_threshold)
}

fn object_fields(
    map: &Map<String, Value>,
    at: &FieldPath,
    block_type: Option<&BlockType>,
    options: &EditorOptions,
) -> Vec<Field> {
    map.iter()
        .filter(|(key, _)| block_type.is_none() || key.as_str() != TYPE_KEY)
        .map(|(key, value)| {
            let hint = block_type.and_then(|ty| hint_for(ty, key));
            build_field(key, value, at.key(key), hint, options)
        })
        .collect()
}

fn build_field(
    key: &str,
    value: &Value,
    path: FieldPath,
    hint: Option<&FieldHint>,
    options: &EditorOptions,
) -> Field {
    let applied = hint.filter(|h| hint_applies(h, value));
    let edit_type = effective_type(key, value, applied, options);
    let widget = match edit_type {
        EditType::Object => match value {
            Value::Object(map) => Widget::Group(object_fields(map, &path, None, options)),
            _ => Widget::TextInput {
                value: scalar_text(value),
            },
        },
        EditType::Array => {
            let items = value.as_array().map(Vec::as_slice).unwrap_or(&[]);
            array_widget(key, items, &path, options)
        }
        EditType::Boolean => Widget::Checkbox {
            checked: value.as_bool().unwrap_or(false),
        },
        EditType::Number => Widget::NumberInput {
            value: scalar_text(value),
        },
        EditType::Text => Widget::TextInput {
            value: scalar_text(value),
        },
        EditType::Textarea => Widget::TextArea {
            value: scalar_text(value),
        },
        EditType::Color => Widget::ColorInput {
            value: scalar_text(value),
        },
        EditType::Image => Widget::ImageInput {
            value: scalar_text(value),
        },
        EditType::Select => {
            let current = scalar_text(value);
            let mut choices: Vec<String> = applied
                .map(|h| h.options.iter().map(|o| o.to_string()).collect())
                .unwrap_or_default();
            if !current.is_empty() && !choices.contains(&current) {
                choices.insert(0, current.clone());
            }
            Widget::Select {
                value: current,
                options: choices,
            }
        }
    };
    Field {
        key: key.to_string(),
        label: humanize_key(key),
        path,
        edit_type,
        widget,
        help: applied.and_then(|h| h.help),
    }
}

fn array_widget(key: &str, items: &[Value], path: &FieldPath, options: &EditorOptions) -> Widget {
    match classify_array(key, items) {
        ArrayKind::Blocks => Widget::BlockList(
            items
                .iter()
                .enumerate()
                .map(|(index, block)| block_card(index, block, path.index(index), options))
                .collect(),
        ),
        ArrayKind::Images => Widget::ImageGrid(
            items
                .iter()
                .enumerate()
                .map(|(index, item)| ImageSlot {
                    index,
                    path: path.index(index),
                    value: scalar_text(item),
                })
                .collect(),
        ),
        ArrayKind::Primitives => Widget::PrimitiveList {
            text: items.iter().map(scalar_text).collect::<Vec<_>>().join("\n"),
        },
        ArrayKind::Records => Widget::Records(record_grid(path, items, options)),
    }
}

fn block_card(index: usize, block: &Value, path: FieldPath, options: &EditorOptions) -> BlockCard {
    let block_type = BlockType::of(block);
    let fields = match block {
        Value::Object(map) => object_fields(map, &path, Some(&block_type), options),
        _ => Vec::new(),
    };
    BlockCard {
        index,
        label: block_type.label(),
        block_type,
        path,
        fields,
    }
}

fn record_grid(path: &FieldPath, items: &[Value], options: &EditorOptions) -> RecordGrid {
    let columns = record_columns(items, options.grid_columns);
    let rows = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let row_path = path.index(index);
            let (cells, fields) = match item {
                Value::Object(map) => (
                    columns
                        .iter()
                        .map(|c| map.get(c).map(cell_text).unwrap_or_default())
                        .collect(),
                    object_fields(map, &row_path, None, options),
                ),
                other => (
                    vec![cell_text(other)],
                    vec![build_field(&index.to_string(), other, row_path.clone(), None, options)],
                ),
            };
            RecordRow {
                index,
                path: row_path,
                cells,
                fields,
            }
        })
        .collect();
    RecordGrid {
        path: path.clone(),
        columns,
        rows,
    }
}

/// Editable text for a scalar; `null` is empty.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn cell_text(value: &Value) -> String {
    let text = match value {
        Value::Array(items) => format!("[{} items]", items.len()),
        Value::Object(map) => format!("{{{} fields}}", map.len()),
        other => scalar_text(other),
    };
    if text.chars().count() > CELL_CHARS {
        let mut cut: String = text.chars().take(CELL_CHARS).collect();
        cut.push('…');
        cut
    } else {
        text
    }
}
