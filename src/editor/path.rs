//! JSON-pointer addressed field paths.
//!
//! A [`FieldPath`] names one slot in a document using RFC 6901 syntax:
//! `/blocks/0/title`. The empty path is the document root. Tokens are kept as
//! strings; whether `0` is an array index or an object key is decided by the
//! container it is applied to.

use super::EditError;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath {
    tokens: Vec<String>,
}

impl FieldPath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a JSON pointer. `""` is the root; anything else must start
    /// with `/`.
    pub fn parse(pointer: &str) -> Result<Self, EditError> {
        if pointer.is_empty() {
            return Ok(Self::root());
        }
        let Some(rest) = pointer.strip_prefix('/') else {
            return Err(EditError::InvalidPath(pointer.to_string()));
        };
        let tokens = rest
            .split('/')
            .map(|t| t.replace("~1", "/").replace("~0", "~"))
            .collect();
        Ok(Self { tokens })
    }

    pub fn key(&self, key: &str) -> Self {
        let mut tokens = self.tokens.clone();
        tokens.push(key.to_string());
        Self { tokens }
    }

    pub fn index(&self, index: usize) -> Self {
        self.key(&index.to_string())
    }

    pub fn is_root(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// The final token, if any.
    pub fn last(&self) -> Option<&str> {
        self.tokens.last().map(String::as_str)
    }

    /// The enclosing path and the final token.
    pub fn split_last(&self) -> Option<(FieldPath, &str)> {
        let (last, parent) = self.tokens.split_last()?;
        Some((
            FieldPath {
                tokens: parent.to_vec(),
            },
            last.as_str(),
        ))
    }

    pub fn get<'a>(&self, doc: &'a Value) -> Option<&'a Value> {
        doc.pointer(&self.to_string())
    }

    pub fn get_mut<'a>(&self, doc: &'a mut Value) -> Option<&'a mut Value> {
        doc.pointer_mut(&self.to_string())
    }

    /// Store `value` at this path.
    ///
    /// Object parents gain the key if it is missing. Array parents accept an
    /// existing index, or the length to append.
    pub fn set(&self, doc: &mut Value, value: Value) -> Result<(), EditError> {
        let Some((parent_path, last)) = self.split_last() else {
            *doc = value;
            return Ok(());
        };
        let parent = parent_path
            .get_mut(doc)
            .ok_or_else(|| EditError::PathNotFound(parent_path.to_string()))?;
        match parent {
            Value::Object(map) => {
                map.insert(last.to_string(), value);
                Ok(())
            }
            Value::Array(items) => {
                let index = parse_index(last, self)?;
                if index < items.len() {
                    items[index] = value;
                    Ok(())
                } else if index == items.len() {
                    items.push(value);
                    Ok(())
                } else {
                    Err(EditError::IndexOutOfRange {
                        path: parent_path.to_string(),
                        index,
                    })
                }
            }
            _ => Err(EditError::PathNotFound(self.to_string())),
        }
    }

    /// Remove and return the value at this path. Object key order and the
    /// order of remaining array elements are preserved.
    pub fn remove(&self, doc: &mut Value) -> Result<Value, EditError> {
        let Some((parent_path, last)) = self.split_last() else {
            return Err(EditError::InvalidPath("cannot remove the document root".into()));
        };
        let not_found = || EditError::PathNotFound(self.to_string());
        match parent_path.get_mut(doc).ok_or_else(not_found)? {
            Value::Object(map) => map.shift_remove(last).ok_or_else(not_found),
            Value::Array(items) => {
                let index = parse_index(last, self)?;
                if index < items.len() {
                    Ok(items.remove(index))
                } else {
                    Err(not_found())
                }
            }
            _ => Err(not_found()),
        }
    }

    /// Dotted display form for humans: `blocks[0].title`.
    pub fn dotted(&self) -> String {
        let mut out = String::new();
        for token in &self.tokens {
            if token.parse::<usize>().is_ok() {
                out.push_str(&format!("[{token}]"));
            } else {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(token);
            }
        }
        if out.is_empty() {
            out.push_str("(root)");
        }
        out
    }
}

fn parse_index(token: &str, path: &FieldPath) -> Result<usize, EditError> {
    token
        .parse::<usize>()
        .map_err(|_| EditError::InvalidPath(path.to_string()))
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            write!(f, "/{}", token.replace('~', "~0").replace('/', "~1"))?;
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(s: &str) -> FieldPath {
        FieldPath::parse(s).unwrap()
    }

    #[test]
    fn parse_and_display() {
        assert!(path("").is_root());
        assert_eq!(path("/blocks/0/title").tokens(), &["blocks", "0", "title"]);
        assert_eq!(path("/blocks/0/title").to_string(), "/blocks/0/title");
        assert!(FieldPath::parse("blocks/0").is_err());
    }

    #[test]
    fn escaping_round_trips() {
        let p = FieldPath::root().key("a/b").key("c~d");
        assert_eq!(p.to_string(), "/a~1b/c~0d");
        assert_eq!(path("/a~1b/c~0d"), p);
    }

    #[test]
    fn builders() {
        let p = FieldPath::root().key("items").index(2).key("title");
        assert_eq!(p.to_string(), "/items/2/title");
        assert_eq!(p.last(), Some("title"));
        let (parent, last) = p.split_last().unwrap();
        assert_eq!(parent.to_string(), "/items/2");
        assert_eq!(last, "title");
        assert!(FieldPath::root().split_last().is_none());
    }

    #[test]
    fn get_values() {
        let doc = json!({"items": [{"title": "A"}], "0": "key zero"});
        assert_eq!(path("/items/0/title").get(&doc), Some(&json!("A")));
        assert_eq!(path("/0").get(&doc), Some(&json!("key zero")));
        assert_eq!(path("").get(&doc), Some(&doc));
        assert_eq!(path("/items/5").get(&doc), None);
    }

    #[test]
    fn set_values() {
        let mut doc = json!({"items": ["a"], "title": "Old"});
        path("/title").set(&mut doc, json!("New")).unwrap();
        path("/subtitle").set(&mut doc, json!("Added")).unwrap();
        path("/items/0").set(&mut doc, json!("b")).unwrap();
        path("/items/1").set(&mut doc, json!("c")).unwrap();
        assert_eq!(
            doc,
            json!({"items": ["b", "c"], "title": "New", "subtitle": "Added"})
        );

        assert!(matches!(
            path("/items/5").set(&mut doc, json!("x")),
            Err(EditError::IndexOutOfRange { index: 5, .. })
        ));
        assert!(matches!(
            path("/missing/x").set(&mut doc, json!(1)),
            Err(EditError::PathNotFound(_))
        ));
        assert!(matches!(
            path("/title/x").set(&mut doc, json!(1)),
            Err(EditError::PathNotFound(_))
        ));
    }

    #[test]
    fn set_root_replaces_document() {
        let mut doc = json!({"a": 1});
        FieldPath::root().set(&mut doc, json!([1, 2])).unwrap();
        assert_eq!(doc, json!([1, 2]));
    }

    #[test]
    fn remove_preserves_order() {
        let mut doc = json!({"a": 1, "b": 2, "c": 3, "list": [1, 2, 3]});
        assert_eq!(path("/a").remove(&mut doc).unwrap(), json!(1));
        assert_eq!(path("/list/0").remove(&mut doc).unwrap(), json!(1));
        let keys: Vec<&String> = doc.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["b", "c", "list"]);
        assert_eq!(doc["list"], json!([2, 3]));
        assert!(path("/nope").remove(&mut doc).is_err());
        assert!(FieldPath::root().remove(&mut doc).is_err());
    }

    #[test]
    fn dotted_display() {
        assert_eq!(path("/blocks/0/title").dotted(), "blocks[0].title");
        assert_eq!(path("/title").dotted(), "title");
        assert_eq!(FieldPath::root().dotted(), "(root)");
    }
}
