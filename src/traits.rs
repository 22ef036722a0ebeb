use async_trait::async_trait;
use serde::Deserialize;

use crate::error::VarexError;
use crate::paths::SourceKind;
use crate::record::{ImageRecord, MatchResult};

/// One level of a directory-style listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Listing {
    /// The directory the backend actually listed. `"."` means the backend
    /// treats the requested path as a root unto itself; the walker stops there.
    #[serde(default)]
    pub target: String,

    /// File paths, as the backend spells them.
    #[serde(default)]
    pub files: Vec<String>,

    /// Sub-directory paths, as the backend spells them.
    #[serde(default)]
    pub dirs: Vec<String>,
}

/// Extra parameters for [`Storage::browse`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowseOptions {
    pub bucket:    Option<String>,
    /// Ask the backend to flatten the whole subtree into `files`.
    pub recursive: bool,
}

/// A directory-listing backend for local data, object buckets or cloud libraries.
///
/// # Thread Safety
///
/// `Send + Sync` are required: one storage is shared by every walk an
/// engine performs.
///
/// # Error Handling
///
/// Return `Err` for anything that prevents listing `dir`. The walker turns
/// it into a warning and keeps whatever it already collected.
#[async_trait]
pub trait Storage: Send + Sync {
    /// List one directory of `source`.
    async fn browse(
        &self,
        source: &SourceKind,
        dir: &str,
        options: &BrowseOptions,
    ) -> Result<Listing, VarexError>;
}

/// Recursive browse of another user's cloud asset library.
#[async_trait]
pub trait AssetBrowser: Send + Sync {
    /// Every file URL under `dir`, using `api_key` to authenticate.
    async fn browse_recursive(&self, dir: &str, api_key: &str) -> Result<Vec<String>, VarexError>;
}

/// One row of a roll table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub img:  String,
    pub text: Option<String>,
}

/// Looks up roll tables loaded in the host.
#[async_trait]
pub trait TableProvider: Send + Sync {
    /// Rows of the table named exactly `name`, or `None` if there is none.
    async fn table(&self, name: &str) -> Option<Vec<TableRow>>;
}

/// Fetches JSON documents for feed and gallery sources.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch_json(
        &self,
        url: &str,
        headers: &[(&str, String)],
    ) -> Result<serde_json::Value, VarexError>;
}

/// Out-of-band, user-facing notifications.
pub trait Notifier: Send + Sync {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
}

/// Ranks candidate records against a query.
///
/// Candidates arrive already filtered and de-duplicated; implementations
/// only decide membership and order.
///
/// # Example
///
/// ```rust
/// use varex::{ImageRecord, Matcher, MatchResult};
///
/// struct PrefixMatcher;
///
/// impl Matcher for PrefixMatcher {
///     fn find(&self, query: &str, candidates: &[ImageRecord]) -> Vec<MatchResult> {
///         candidates
///             .iter()
///             .filter(|r| r.name.starts_with(query))
///             .cloned()
///             .map(MatchResult::exact)
///             .collect()
///     }
/// }
/// ```
pub trait Matcher: Send + Sync {
    fn find(&self, query: &str, candidates: &[ImageRecord]) -> Vec<MatchResult>;
}
