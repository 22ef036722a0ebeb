use serde::{Deserialize, Serialize};

use crate::media;

/// A single image produced by a [`SourceWalker`](crate::walker::SourceWalker).
///
/// Two records describe the same image iff their `path`s are equal. One path
/// may carry several display names (aliases); each alias is its own record
/// and is never merged with the others.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageRecord {
    /// URI of the image. May be percent-encoded.
    pub path: String,

    /// Display name. Defaults to the file stem of `path`.
    pub name: String,

    /// Free-form tags, searched alongside the name in fuzzy mode.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl ImageRecord {
    /// A record named after its own file stem.
    pub fn from_path(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = media::file_stem(&path);
        Self { path, name, tags: Vec::new() }
    }

    pub fn named(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            tags: Vec::new(),
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Whether `name` is just the derived file stem rather than a chosen title.
    pub fn has_default_name(&self) -> bool {
        self.name == media::file_stem(&self.path)
    }
}

/// Inclusive character range `[start, end]` of a fuzzy match, for highlighting.
pub type MatchRange = (usize, usize);

/// One ranked hit from the match engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub record: ImageRecord,

    /// Fuzzy dissimilarity in `[0, 1]`, lower is better. `None` in exact mode.
    pub score: Option<f64>,

    /// Matched character ranges of the best-scoring field. Empty in exact mode.
    pub indices: Vec<MatchRange>,
}

impl MatchResult {
    pub fn exact(record: ImageRecord) -> Self {
        Self { record, score: None, indices: Vec::new() }
    }
}
