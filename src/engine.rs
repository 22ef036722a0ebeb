use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::builder::SearchEngineBuilder;
use crate::cache::{Cache, CacheSnapshot};
use crate::config::{RandomizerOverrides, SearchOverrides, SearchSettings};
use crate::filter::Filter;
use crate::fuzzy::{FuzzyIndex, Key};
use crate::matcher::{self, dedupe};
use crate::paths::{PathCatalog, SearchCategory, WalkTarget};
use crate::query::{parse_excluded, sub_queries};
use crate::record::{ImageRecord, MatchResult};
use crate::results::{CacheStats, SearchResults};
use crate::walker::SourceWalker;

/// Similarity cut-off for [`SearchEngine::sync_search`].
pub const SYNC_THRESHOLD: f64 = 0.4;

/// Group key for shared variants merged into random-search pools.
pub const SHARED_GROUP: &str = "shared-variants";

/// Group key for wildcard images merged into random-search pools.
pub const WILDCARD_GROUP: &str = "wildcard-images";

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// An image explicitly attached to an entity, under one or more names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedVariant {
    pub path:  String,
    pub names: Vec<String>,
}

/// Parameters for [`SearchEngine::random_search`].
#[derive(Debug, Clone)]
pub struct RandomRequest {
    pub category:        SearchCategory,
    pub overrides:       SearchOverrides,
    pub randomizer:      RandomizerOverrides,
    pub shared_variants: Vec<SharedVariant>,
    /// Wildcard image paths of the entity.
    pub wildcard:        Vec<String>,
}

impl RandomRequest {
    pub fn new(category: SearchCategory) -> Self {
        Self {
            category,
            overrides:       SearchOverrides::default(),
            randomizer:      RandomizerOverrides::default(),
            shared_variants: Vec::new(),
            wildcard:        Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// SearchEngine
// ---------------------------------------------------------------------------

/// Owns the cache snapshot and answers art searches against it plus live walks.
///
/// Build one per process with [`SearchEngine::builder`] and share it by
/// reference. Every query entry point returns an empty result while
/// [`begin_cache`](SearchEngine::begin_cache) is running.
pub struct SearchEngine {
    pub(crate) catalog:      PathCatalog,
    pub(crate) settings:     SearchSettings,
    pub(crate) walker:       SourceWalker,
    pub(crate) cache:        Cache,
    pub(crate) current_user: Option<String>,
}

impl SearchEngine {
    pub fn builder() -> SearchEngineBuilder {
        SearchEngineBuilder::default()
    }

    pub fn catalog(&self) -> &PathCatalog {
        &self.catalog
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    pub fn walker(&self) -> &SourceWalker {
        &self.walker
    }

    /// Whether a cache rebuild is in flight.
    pub fn is_caching(&self) -> bool {
        self.cache.is_rebuilding()
    }

    /// The current snapshot. Stays valid even if a rebuild swaps it out.
    pub fn snapshot(&self) -> Arc<CacheSnapshot> {
        self.cache.load()
    }

    pub fn last_cache_stats(&self) -> Option<CacheStats> {
        self.cache.last_stats()
    }

    /// Drop the snapshot, e.g. after the path configuration changed.
    pub fn invalidate_cache(&self) {
        self.cache.invalidate();
    }

    // ── Cache ─────────────────────────────────────────────────────────────

    /// Rebuild the snapshot from every cache-eligible path.
    ///
    /// Returns `None` without doing anything if a rebuild is already running.
    /// Individual path failures only shrink the snapshot; the rebuild itself
    /// always completes.
    pub async fn begin_cache(&self) -> Option<CacheStats> {
        let Some(guard) = self.cache.try_begin() else {
            tracing::debug!("cache rebuild already in progress");
            return None;
        };

        self.walker.notifier.info("Caching started");
        let start = Instant::now();

        let plan = self.catalog.walk_plan(None, true, self.current_user.as_deref());
        let snapshot = self.walk(&plan).await;
        let stats = CacheStats::compute(snapshot.len(), plan.len(), start.elapsed());

        guard.publish(snapshot, stats);
        self.walker
            .notifier
            .info(&format!("Caching finished: {} images", stats.images));
        Some(stats)
    }

    async fn walk(&self, plan: &[WalkTarget<'_>]) -> CacheSnapshot {
        let mut found = CacheSnapshot::default();
        for target in plan {
            let records = self.walker.walk(target.descriptor, target.api_key).await;
            found.extend(target.descriptor.category_key(), records);
        }
        found
    }

    // ── Search ────────────────────────────────────────────────────────────

    /// Run `text` as a full query plus its keyword sub-queries.
    ///
    /// A path found by an earlier sub-query is not repeated by a later one.
    pub async fn search(
        &self,
        text: &str,
        category: SearchCategory,
        overrides: &SearchOverrides,
    ) -> SearchResults {
        if self.is_caching() {
            return SearchResults::default();
        }

        let settings = overrides.resolve(&self.settings);
        let text = text.trim();
        tracing::debug!(query = text, %category, ?settings, "starting art search");

        let excluded = parse_excluded(&settings.excluded_keywords);
        let passes = sub_queries(text, settings.keyword_search, &excluded);
        let candidates = self.candidates(category, &settings).await;
        let matcher = matcher::for_settings(&settings);

        let mut results = SearchResults::default();
        let mut used: HashSet<String> = HashSet::new();
        for pass in passes {
            if results.contains_sub_query(&pass) {
                continue;
            }
            let hits: Vec<MatchResult> = matcher
                .find(&pass, &candidates)
                .into_iter()
                .filter(|hit| !used.contains(&hit.record.path))
                .collect();
            used.extend(hits.iter().map(|hit| hit.record.path.clone()));
            results.insert(pass, hits);
        }

        tracing::debug!(query = text, hits = results.total(), "finished art search");
        results
    }

    /// [`search`](SearchEngine::search) flattened to distinct paths.
    pub async fn search_paths(
        &self,
        text: &str,
        category: SearchCategory,
        overrides: &SearchOverrides,
    ) -> Vec<String> {
        self.search(text, category, overrides).await.paths()
    }

    /// Cached records for `category` followed by a live walk of the
    /// non-cached paths, filtered and with repeated `(path, name)` pairs removed.
    async fn candidates(&self, category: SearchCategory, settings: &SearchSettings) -> Vec<ImageRecord> {
        let cached = self.cache.load();
        let plan = self
            .catalog
            .walk_plan(Some(category), false, self.current_user.as_deref());
        let live = self.walk(&plan).await;

        let filter = Filter::compose(category, &settings.filters);
        dedupe(
            cached
                .records_for(category)
                .chain(live.records_for(category))
                .filter(|r| filter.passes(r, settings.run_search_on_path))
                .cloned(),
        )
    }

    // ── Automation ────────────────────────────────────────────────────────

    /// One uniformly random record from the pool the randomizer settings select.
    pub async fn random_search(&self, text: &str, request: &RandomRequest) -> Option<ImageRecord> {
        if self.is_caching() {
            return None;
        }
        let pool = self.random_pool(text, request).await?.flatten();
        pick_random(&pool, &mut rand::thread_rng()).cloned()
    }

    async fn random_pool(&self, text: &str, request: &RandomRequest) -> Option<SearchResults> {
        let randomizer = request.randomizer.resolve(&self.settings.randomizer);
        if randomizer.is_disabled() {
            return None;
        }

        let mut results = SearchResults::default();
        if randomizer.name_search || randomizer.keywords {
            let mut overrides = request.overrides.clone();
            overrides.keyword_search.get_or_insert(randomizer.keywords);
            results = self.search(text, request.category, &overrides).await;
        }

        if randomizer.shared && !request.shared_variants.is_empty() {
            let shared = request
                .shared_variants
                .iter()
                .flat_map(|v| v.names.iter().map(|n| ImageRecord::named(v.path.clone(), n.clone())))
                .collect();
            results.push_group(SHARED_GROUP, shared);
        }

        if randomizer.wildcard && !request.wildcard.is_empty() {
            let wildcard = request.wildcard.iter().map(ImageRecord::from_path).collect();
            results.push_group(WILDCARD_GROUP, wildcard);
        }

        Some(results)
    }

    /// The search hit whose name is closest to `target_name`, if any is
    /// within [`SYNC_THRESHOLD`].
    pub async fn sync_search(
        &self,
        text: &str,
        target_name: &str,
        category: SearchCategory,
        overrides: &SearchOverrides,
    ) -> Option<ImageRecord> {
        if self.is_caching() || target_name.trim().is_empty() {
            return None;
        }

        let results = self.search(text, category, overrides).await;
        let mut index = FuzzyIndex::new(&[Key::Name], SYNC_THRESHOLD);
        for record in results.flatten() {
            index.add(record);
        }
        index
            .search(target_name, 1)
            .into_iter()
            .next()
            .map(|hit| hit.record)
    }
}

/// Uniform pick from `records`.
pub fn pick_random<'a, R: Rng + ?Sized>(records: &'a [ImageRecord], rng: &mut R) -> Option<&'a ImageRecord> {
    records.choose(rng)
}
