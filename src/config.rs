//! Loading of the emoji and keyword documents.
//!
//! The picker core only understands [`RawNode`], a nested, order-preserving
//! mapping of category names to either further mappings or emoji strings.
//! This module turns JSON documents into that shape. Two spellings of a
//! category are accepted and produce identical trees:
//!
//! ```json
//! { "Faces": { "Happy": "🙂😀", "Sad": "🙁" } }
//! { "Faces": [ { "Happy": "🙂😀" }, { "Sad": "🙁" } ] }
//! ```
//!
//! Keys starting with `_` are treated as comments and skipped.

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;

use crate::error::ConfigError;

/// Built-in emoji document used when no file is supplied.
pub const DEFAULT_EMOJIS: &str = include_str!("../assets/emojis.json");

/// Built-in keyword document used when no file is supplied.
pub const DEFAULT_KEYWORDS: &str = include_str!("../assets/keywords.json");

/// Glyph → human-readable name.
pub type Keywords = HashMap<String, String>;

/// Unvalidated category data, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawNode {
    /// A mapping of names to child nodes.
    Branch(Vec<(String, RawNode)>),
    /// A string of emoji without guaranteed separators.
    Leaf(String),
}

impl RawNode {
    /// Convenience constructor for a branch.
    pub fn branch<S: Into<String>>(entries: impl IntoIterator<Item = (S, RawNode)>) -> Self {
        RawNode::Branch(
            entries
                .into_iter()
                .map(|(name, node)| (name.into(), node))
                .collect(),
        )
    }

    /// Convenience constructor for a leaf.
    pub fn leaf(glyphs: impl Into<String>) -> Self {
        RawNode::Leaf(glyphs.into())
    }
}

/// Parse an emoji document.
pub fn parse_emojis(json: &str) -> Result<RawNode, ConfigError> {
    let value: Value = serde_json::from_str(json)?;
    emojis_from_value(&value)
}

/// Convert an already-parsed JSON value into a [`RawNode`] tree.
pub fn emojis_from_value(value: &Value) -> Result<RawNode, ConfigError> {
    match value {
        Value::Object(_) | Value::Array(_) => convert(value, &[]),
        other => Err(ConfigError::InvalidLeaf {
            path: "(root)".to_string(),
            found: kind(other),
        }),
    }
}

fn convert(value: &Value, path: &[&str]) -> Result<RawNode, ConfigError> {
    match value {
        Value::String(s) => Ok(RawNode::Leaf(s.clone())),
        Value::Object(map) => {
            let mut entries = Vec::with_capacity(map.len());
            for (key, child) in map {
                push_entry(&mut entries, key, child, path)?;
            }
            Ok(RawNode::Branch(entries))
        }
        // List form: every element is a single-entry (or multi-entry) object.
        Value::Array(list) => {
            let mut entries = Vec::with_capacity(list.len());
            for element in list {
                let Value::Object(map) = element else {
                    return Err(ConfigError::InvalidLeaf {
                        path: path.join("/"),
                        found: kind(element),
                    });
                };
                for (key, child) in map {
                    push_entry(&mut entries, key, child, path)?;
                }
            }
            Ok(RawNode::Branch(entries))
        }
        other => Err(ConfigError::InvalidLeaf {
            path: path.join("/"),
            found: kind(other),
        }),
    }
}

fn push_entry(
    entries: &mut Vec<(String, RawNode)>,
    key: &str,
    child: &Value,
    path: &[&str],
) -> Result<(), ConfigError> {
    if key.starts_with('_') {
        return Ok(());
    }
    let mut child_path = path.to_vec();
    child_path.push(key);
    entries.push((key.to_string(), convert(child, &child_path)?));
    Ok(())
}

/// Parse a keyword document: either `{"🙂": "slight smile"}` or
/// `[{"🙂": "slight smile"}, ...]`. Entries whose value is not a string are
/// skipped.
pub fn parse_keywords(json: &str) -> Result<Keywords, ConfigError> {
    let value: Value = serde_json::from_str(json)?;
    let mut keywords = Keywords::new();
    match value {
        Value::Object(map) => collect_keywords(&mut keywords, &map),
        Value::Array(list) => {
            for element in &list {
                match element {
                    Value::Object(map) => collect_keywords(&mut keywords, map),
                    other => {
                        return Err(ConfigError::InvalidKeywords(format!(
                            "expected an object entry, found {}",
                            kind(other)
                        )))
                    }
                }
            }
        }
        other => {
            return Err(ConfigError::InvalidKeywords(format!(
                "expected an object or array, found {}",
                kind(&other)
            )))
        }
    }
    Ok(keywords)
}

fn collect_keywords(keywords: &mut Keywords, map: &serde_json::Map<String, Value>) {
    for (glyph, name) in map {
        match name {
            Value::String(name) => {
                keywords.insert(glyph.clone(), name.clone());
            }
            other => tracing::debug!(glyph = %glyph, found = kind(other), "skipping non-string keyword"),
        }
    }
}

/// Read a file into a string, attaching the path to any IO error.
pub fn read_document(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the emoji tree and keywords, falling back to the built-in documents.
pub fn load(
    emojis: Option<&Path>,
    keywords: Option<&Path>,
) -> Result<(RawNode, Keywords), ConfigError> {
    let raw = match emojis {
        Some(path) => parse_emojis(&read_document(path)?)?,
        None => parse_emojis(DEFAULT_EMOJIS)?,
    };
    let keywords = match keywords {
        Some(path) => parse_keywords(&read_document(path)?)?,
        None => parse_keywords(DEFAULT_KEYWORDS)?,
    };
    tracing::debug!(keywords = keywords.len(), "loaded picker configuration");
    Ok((raw, keywords))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
