//! Field and structure edits on a working document.
//!
//! [`on_field_change`] is the pure primitive: it returns an updated copy.
//! The structural helpers edit in place and are meant to run inside
//! [`super::EditorSession::apply`], which discards the draft on error.

use super::form::{edit_type_at, is_block_type_path, record_columns};
use super::path::FieldPath;
use super::{EditError, EditorOptions};
use crate::blocks::{BlockKind, BlockType};
use crate::schema::EditType;
use serde_json::{Map, Number, Value, json};
use std::time::{SystemTime, UNIX_EPOCH};

/// Return `doc` with `value` stored at `path`.
pub fn on_field_change(doc: &Value, path: &FieldPath, value: Value) -> Result<Value, EditError> {
    let mut updated = doc.clone();
    path.set(&mut updated, value)?;
    Ok(updated)
}

/// Store form text at `path`, parsed according to the field's edit type.
///
/// Numbers must parse; otherwise the document is left unchanged. Checkboxes
/// read `true`/`on`/`1` as checked. Everything else is stored as a string.
/// A block's `type` tag is never editable.
pub fn apply_input(
    doc: &mut Value,
    path: &FieldPath,
    raw: &str,
    options: &EditorOptions,
) -> Result<(), EditError> {
    if is_block_type_path(path) {
        return Err(EditError::NotEditable(path.to_string()));
    }
    let edit_type = edit_type_at(doc, path, options).unwrap_or(EditType::Text);
    let value = match edit_type {
        EditType::Number => parse_number(raw).ok_or_else(|| EditError::InvalidNumber {
            path: path.to_string(),
            input: raw.to_string(),
        })?,
        EditType::Boolean => Value::Bool(matches!(raw.trim(), "true" | "on" | "1")),
        EditType::Object | EditType::Array => {
            return Err(EditError::NotEditable(path.to_string()));
        }
        EditType::Text
        | EditType::Textarea
        | EditType::Image
        | EditType::Select
        | EditType::Color => Value::String(raw.to_string()),
    };
    path.set(doc, value)
}

fn parse_number(raw: &str) -> Option<Value> {
    let raw = raw.trim();
    if let Ok(int) = raw.parse::<i64>() {
        return Some(Value::from(int));
    }
    let float = raw.parse::<f64>().ok()?;
    Number::from_f64(float).map(Value::Number)
}

fn list_mut<'a>(doc: &'a mut Value, path: &FieldPath) -> Result<&'a mut Vec<Value>, EditError> {
    match path.get_mut(doc) {
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(EditError::NotAList {
            path: path.to_string(),
        }),
        None => Err(EditError::PathNotFound(path.to_string())),
    }
}

/// The list at `path`, created empty if the key is missing from its object.
fn list_or_create<'a>(
    doc: &'a mut Value,
    path: &FieldPath,
) -> Result<&'a mut Vec<Value>, EditError> {
    if path.get(doc).is_none() {
        path.set(doc, Value::Array(Vec::new()))?;
    }
    list_mut(doc, path)
}

fn check_index(items: &[Value], index: usize, path: &FieldPath) -> Result<(), EditError> {
    if index < items.len() {
        Ok(())
    } else {
        Err(EditError::IndexOutOfRange {
            path: path.to_string(),
            index,
        })
    }
}

// ============================================================================
// Blocks
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Append a fresh skeleton of `kind`. Returns the new block's index.
pub fn append_block(doc: &mut Value, blocks: &FieldPath, kind: BlockKind) -> Result<usize, EditError> {
    let items = list_or_create(doc, blocks)?;
    items.push(kind.skeleton());
    Ok(items.len() - 1)
}

/// Remove a block. Needs `confirmed`; returns the removed block.
pub fn remove_block(
    doc: &mut Value,
    blocks: &FieldPath,
    index: usize,
    confirmed: bool,
) -> Result<Value, EditError> {
    let items = list_mut(doc, blocks)?;
    check_index(items, index, blocks)?;
    if !confirmed {
        let label = BlockType::of(&items[index]).label();
        return Err(EditError::ConfirmationRequired(format!(
            "remove block {} ({label})",
            index + 1
        )));
    }
    blocks.index(index).remove(doc)
}

/// Swap a block with its neighbour. Returns the block's new index; moving
/// past either end is a no-op.
pub fn move_block(
    doc: &mut Value,
    blocks: &FieldPath,
    index: usize,
    direction: Direction,
) -> Result<usize, EditError> {
    let items = list_mut(doc, blocks)?;
    check_index(items, index, blocks)?;
    let target = match direction {
        Direction::Up if index > 0 => index - 1,
        Direction::Down if index + 1 < items.len() => index + 1,
        _ => return Ok(index),
    };
    items.swap(index, target);
    Ok(target)
}

// ============================================================================
// Image collections
// ============================================================================

/// Append an empty image slot. Returns its index.
pub fn add_image_slot(doc: &mut Value, images: &FieldPath) -> Result<usize, EditError> {
    let items = list_or_create(doc, images)?;
    items.push(Value::String(String::new()));
    Ok(items.len() - 1)
}

pub fn remove_image_slot(doc: &mut Value, images: &FieldPath, index: usize) -> Result<Value, EditError> {
    check_index(list_mut(doc, images)?, index, images)?;
    images.index(index).remove(doc)
}

// ============================================================================
// Record lists
// ============================================================================

/// Append a record seeded from the list's first `columns` keys, all empty.
/// An empty list gets a minimal `{id, title}` record. Returns its index.
pub fn add_record(doc: &mut Value, records: &FieldPath, columns: usize) -> Result<usize, EditError> {
    let items = list_or_create(doc, records)?;
    let keys = record_columns(items, columns);
    let record = if keys.is_empty() {
        json!({ "id": format!("item-{}", timestamp_millis()), "title": "New Item" })
    } else {
        Value::Object(
            keys.into_iter()
                .map(|k| (k, Value::String(String::new())))
                .collect::<Map<String, Value>>(),
        )
    };
    items.push(record);
    Ok(items.len() - 1)
}

fn timestamp_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

/// Remove a record. Needs `confirmed`; returns the removed record.
pub fn remove_record(
    doc: &mut Value,
    records: &FieldPath,
    index: usize,
    confirmed: bool,
) -> Result<Value, EditError> {
    let items = list_mut(doc, records)?;
    check_index(items, index, records)?;
    if !confirmed {
        return Err(EditError::ConfirmationRequired(format!(
            "delete item {} of {}",
            index + 1,
            records.dotted()
        )));
    }
    records.index(index).remove(doc)
}

// ============================================================================
// Primitive lists
// ============================================================================

/// Replace a list with one string per line of `text`.
pub fn set_lines(doc: &mut Value, path: &FieldPath, text: &str) -> Result<(), EditError> {
    if let Some(existing) = path.get(doc)
        && !existing.is_array()
    {
        return Err(EditError::NotAList {
            path: path.to_string(),
        });
    }
    let lines = text
        .split('\n')
        .map(|line| Value::String(line.strip_suffix('\r').unwrap_or(line).to_string()))
        .collect();
    path.set(doc, Value::Array(lines))
}
