use std::path::PathBuf;
use std::sync::Arc;

use crate::cache::Cache;
use crate::config::SearchSettings;
use crate::engine::SearchEngine;
use crate::error::VarexError;
use crate::http::{HttpAssetBrowser, HttpFetcher};
use crate::local::LocalStorage;
use crate::notify::LogNotifier;
use crate::paths::{CloudIdentity, PathCatalog, PathDescriptor};
use crate::traits::{AssetBrowser, FeedFetcher, Notifier, Storage, TableProvider};
use crate::walker::{SourceWalker, DEFAULT_GALLERY_URL};

// ---------------------------------------------------------------------------
// SearchEngineBuilder
// ---------------------------------------------------------------------------

/// Entry point for configuring a [`SearchEngine`].
///
/// Created via [`varex::engine()`](crate::engine) or [`SearchEngine::builder`].
/// Configure with chained builder methods, then call
/// [`build()`](SearchEngineBuilder::build).
///
/// # Example
///
/// ```rust,ignore
/// let engine = varex::engine()
///     .local_root("/srv/host/Data")
///     .catalog(PathCatalog::from_json(&paths_json)?)
///     .settings(SearchSettings::from_json(&settings_json)?)
///     .tables(my_tables)
///     .notifier(my_notifier)
///     .build()?;
/// ```
#[derive(Default)]
pub struct SearchEngineBuilder {
    catalog:      Option<PathCatalog>,
    paths:        Vec<PathDescriptor>,
    identities:   Vec<CloudIdentity>,
    settings:     Option<SearchSettings>,
    storage:      Option<Arc<dyn Storage>>,
    assets:       Option<Arc<dyn AssetBrowser>>,
    tables:       Option<Arc<dyn TableProvider>>,
    feeds:        Option<Arc<dyn FeedFetcher>>,
    notifier:     Option<Arc<dyn Notifier>>,
    gallery_url:  Option<String>,
    gallery_id:   Option<String>,
    current_user: Option<String>,
}

impl SearchEngineBuilder {
    // ── Paths ─────────────────────────────────────────────────────────────

    /// Use a prepared catalog. Paths added with [`path`](Self::path) and
    /// [`identity`](Self::identity) are appended to it.
    pub fn catalog(mut self, catalog: PathCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn path(mut self, descriptor: PathDescriptor) -> Self {
        self.paths.push(descriptor);
        self
    }

    pub fn identity(mut self, identity: CloudIdentity) -> Self {
        self.identities.push(identity);
        self
    }

    /// The user whose cloud paths are browsed without an API key.
    pub fn current_user(mut self, user_id: impl Into<String>) -> Self {
        self.current_user = Some(user_id.into());
        self
    }

    // ── Settings ──────────────────────────────────────────────────────────

    /// Global defaults that per-call overrides fall back to.
    pub fn settings(mut self, settings: SearchSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    // ── Collaborators ─────────────────────────────────────────────────────

    /// Serve [`SourceKind::Local`](crate::SourceKind::Local) paths from a directory on disk.
    pub fn local_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.storage = Some(Arc::new(LocalStorage::new(root)));
        self
    }

    /// Directory-listing backend for local, bucket and cloud listings.
    pub fn storage(mut self, s: impl Storage + 'static) -> Self {
        self.storage = Some(Arc::new(s));
        self
    }

    pub fn assets(mut self, a: impl AssetBrowser + 'static) -> Self {
        self.assets = Some(Arc::new(a));
        self
    }

    pub fn tables(mut self, t: impl TableProvider + 'static) -> Self {
        self.tables = Some(Arc::new(t));
        self
    }

    pub fn feeds(mut self, f: impl FeedFetcher + 'static) -> Self {
        self.feeds = Some(Arc::new(f));
        self
    }

    pub fn notifier(mut self, n: impl Notifier + 'static) -> Self {
        self.notifier = Some(Arc::new(n));
        self
    }

    /// Album endpoint and client id for gallery sources.
    pub fn gallery(mut self, url: impl Into<String>, client_id: Option<String>) -> Self {
        self.gallery_url = Some(url.into());
        self.gallery_id = client_id;
        self
    }

    // ── Build ─────────────────────────────────────────────────────────────

    /// Validate the configuration and create the engine.
    ///
    /// # Errors
    ///
    /// Returns `Err` for configuration bugs: a path without categories, a
    /// bucket path without a bucket, or an HTTP client that can't be built.
    pub fn build(self) -> Result<SearchEngine, VarexError> {
        let mut paths = self
            .catalog
            .as_ref()
            .map(|c| c.paths().to_vec())
            .unwrap_or_default();
        paths.extend(self.paths);

        let mut catalog = PathCatalog::new(paths)?;
        let identities = self
            .catalog
            .iter()
            .flat_map(|c| c.identities().iter().cloned())
            .chain(self.identities);
        for identity in identities {
            catalog = catalog.with_identity(identity)?;
        }

        let feeds: Arc<dyn FeedFetcher> = match self.feeds {
            Some(f) => f,
            None    => Arc::new(HttpFetcher::new()?),
        };
        let assets: Arc<dyn AssetBrowser> = match self.assets {
            Some(a) => a,
            None    => Arc::new(HttpAssetBrowser::new()?),
        };
        let notifier: Arc<dyn Notifier> = match self.notifier {
            Some(n) => n,
            None    => Arc::new(LogNotifier),
        };

        let walker = SourceWalker {
            storage:     self.storage,
            assets,
            tables:      self.tables,
            feeds,
            notifier,
            gallery_url: self.gallery_url.unwrap_or_else(|| DEFAULT_GALLERY_URL.to_string()),
            gallery_id:  self.gallery_id,
        };

        Ok(SearchEngine {
            catalog,
            settings: self.settings.unwrap_or_default(),
            walker,
            cache: Cache::default(),
            current_user: self.current_user,
        })
    }
}
