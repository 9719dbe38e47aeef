//! Error types for glyphpick.

use std::path::PathBuf;

use thiserror::Error;

/// Configuration errors. Fatal to picker initialization; no partial tree is
/// ever exposed when one of these is returned.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A category mixes nested categories and leaf strings.
    #[error("category '{path}' mixes subcategories and emoji strings")]
    MixedChildren { path: String },

    /// A value has a type that cannot appear at its position.
    #[error("invalid value at '{path}': found {found}")]
    InvalidLeaf { path: String, found: &'static str },

    /// The keyword document has an unexpected shape.
    #[error("invalid keyword document: {0}")]
    InvalidKeywords(String),

    /// Malformed JSON.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration file could not be read.
    #[error("failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
