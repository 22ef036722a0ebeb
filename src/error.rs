use std::path::PathBuf;
use thiserror::Error;

use crate::paths::SourceKind;

#[derive(Error, Debug)]
pub enum VarexError {
    // Config
    #[error("unrecognized source kind `{0}`")]
    UnknownSource(String),

    #[error("unrecognized search category `{0}`")]
    UnknownCategory(String),

    #[error("bucket source requires a bucket name: {0}")]
    MissingBucket(String),

    #[error("path has no search categories: {0}")]
    EmptyCategories(String),

    #[error("invalid pattern")]
    InvalidPattern(String),

    #[error("invalid configuration")]
    Config(#[source] serde_json::Error),

    // Traversal
    #[error("path not found: {0}")]
    NotFound(String),

    #[error("roll table not found: {0}")]
    TableNotFound(String),

    #[error("invalid feed payload: {0}")]
    InvalidFeed(String),

    #[error("no backend registered for {0:?}")]
    NoBackend(SourceKind),

    #[error("HTTP request failed: {url}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("IO error")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Third-party extensibility
    #[error("backend error: {0}")]
    Backend(String),
}

impl VarexError {
    /// The location (path, URL, table name) this error occurred at, if applicable.
    /// Callers use this to present "Skipped: <location>" without pattern matching on variants.
    pub fn location(&self) -> Option<String> {
        match self {
            Self::NotFound(loc) | Self::TableNotFound(loc) | Self::InvalidFeed(loc) => {
                Some(loc.clone())
            }
            Self::Http { url, .. } => Some(url.clone()),
            Self::Io { path, .. } => Some(path.display().to_string()),
            _ => None,
        }
    }

    /// Whether a search can continue after this error.
    ///
    /// Backend failures degrade one path's contribution to empty; the rest
    /// of the walk keeps going.
    ///
    /// Configuration errors never self-resolve and should halt immediately.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Self::UnknownSource(_)
                | Self::UnknownCategory(_)
                | Self::MissingBucket(_)
                | Self::EmptyCategories(_)
                | Self::Config(_)
        )
    }
}
