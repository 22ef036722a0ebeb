//! # varex
//!
//! Variant art search engine. Finds alternate artwork for tokens, portraits
//! and tiles by name across heterogeneous storage.
//!
//! varex owns the search core: walking configured search paths across
//! backends ([`Storage`], [`AssetBrowser`], [`TableProvider`],
//! [`FeedFetcher`]), the cache snapshot, filters, exact and fuzzy matching,
//! and keyword decomposition of queries. It does **not** own rendering or
//! persistence: the host supplies listings and consumes ranked results.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use varex::{PathDescriptor, SearchCategory, SearchOverrides, SourceKind};
//!
//! # async fn run() -> Result<(), varex::VarexError> {
//! let engine = varex::engine()
//!     .local_root("/srv/host/Data")
//!     .path(PathDescriptor::new("tokens", SourceKind::Local, [SearchCategory::Token])?)
//!     .build()?;
//!
//! // Capture cache-eligible paths once, then search as often as needed.
//! engine.begin_cache().await;
//!
//! let results = engine
//!     .search("Ancient Red Dragon", SearchCategory::Token, &SearchOverrides::default())
//!     .await;
//! for (sub_query, hits) in results.iter() {
//!     println!("{sub_query}: {} hits", hits.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Custom Backends
//!
//! Implement [`Storage`] to list anything directory-shaped:
//!
//! ```rust
//! use async_trait::async_trait;
//! use varex::{BrowseOptions, Listing, SourceKind, Storage, VarexError};
//!
//! struct Fixed(Vec<String>);
//!
//! #[async_trait]
//! impl Storage for Fixed {
//!     async fn browse(
//!         &self,
//!         _source: &SourceKind,
//!         dir: &str,
//!         _options: &BrowseOptions,
//!     ) -> Result<Listing, VarexError> {
//!         Ok(Listing {
//!             target: dir.to_string(),
//!             files:  self.0.clone(),
//!             dirs:   Vec::new(),
//!         })
//!     }
//! }
//! ```

#![forbid(unsafe_code)]

pub mod filter;
pub mod fuzzy;
pub mod media;
pub mod walker;

mod builder;
mod cache;
mod config;
mod engine;
mod error;
mod http;
mod local;
mod matcher;
mod notify;
mod paths;
mod query;
mod record;
mod results;
mod traits;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use builder::SearchEngineBuilder;
pub use cache::CacheSnapshot;
pub use config::{
    AlgorithmSettings, FilterSettings, RandomizerOverrides, RandomizerSettings, SearchOverrides,
    SearchSettings,
};
pub use engine::{pick_random, RandomRequest, SearchEngine, SharedVariant, SYNC_THRESHOLD};
pub use error::VarexError;
pub use http::{HttpAssetBrowser, HttpFetcher};
pub use local::LocalStorage;
pub use matcher::{normalize, ExactMatcher, FuzzyMatcher};
pub use notify::LogNotifier;
pub use paths::{
    category_key, CloudIdentity, PathCatalog, PathDescriptor, RawPath, SearchCategory, SourceKind,
    WalkTarget,
};
pub use query::{parse_excluded, sub_queries};
pub use record::{ImageRecord, MatchRange, MatchResult};
pub use results::{CacheStats, SearchResults};
pub use traits::{
    AssetBrowser, BrowseOptions, FeedFetcher, Listing, Matcher, Notifier, Storage, TableProvider,
    TableRow,
};

// ── Entry point ───────────────────────────────────────────────────────────────

/// Create a new [`SearchEngineBuilder`] to configure a [`SearchEngine`].
pub fn engine() -> SearchEngineBuilder {
    SearchEngineBuilder::default()
}
