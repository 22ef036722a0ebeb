use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arc_swap::{ArcSwap, ArcSwapOption};
use indexmap::IndexMap;

use crate::paths::{categories_from_key, SearchCategory};
use crate::record::ImageRecord;
use crate::results::CacheStats;

// ---------------------------------------------------------------------------
// CacheSnapshot
// ---------------------------------------------------------------------------

/// Walk results grouped by the category key of the path that produced them.
///
/// Used both for the long-lived cache and for the transient results of a
/// live walk.
#[derive(Debug, Clone, Default)]
pub struct CacheSnapshot {
    groups: IndexMap<String, Vec<ImageRecord>>,
}

impl CacheSnapshot {
    pub fn extend(&mut self, key: String, records: Vec<ImageRecord>) {
        if records.is_empty() {
            return;
        }
        self.groups.entry(key).or_default().extend(records);
    }

    /// Records from every group whose categories serve `category`, group
    /// order then first-seen order.
    pub fn records_for(&self, category: SearchCategory) -> impl Iterator<Item = &ImageRecord> {
        self.groups
            .iter()
            .filter(move |(key, _)| categories_from_key(key).iter().any(|c| c.serves(category)))
            .flat_map(|(_, records)| records.iter())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

/// The engine's snapshot plus the rebuild gate that protects it.
///
/// Readers load the current `Arc` and keep it for the length of a query;
/// a rebuild stores a complete new snapshot in one swap.
#[derive(Default)]
pub(crate) struct Cache {
    snapshot:   ArcSwap<CacheSnapshot>,
    rebuilding: AtomicBool,
    last_stats: ArcSwapOption<CacheStats>,
}

impl Cache {
    pub fn load(&self) -> Arc<CacheSnapshot> {
        self.snapshot.load_full()
    }

    pub fn is_rebuilding(&self) -> bool {
        self.rebuilding.load(Ordering::Acquire)
    }

    /// Claim the rebuild gate. `None` while another rebuild holds it.
    pub fn try_begin(&self) -> Option<RebuildGuard<'_>> {
        self.rebuilding
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RebuildGuard { cache: self })
    }

    pub fn invalidate(&self) {
        self.snapshot.store(Arc::new(CacheSnapshot::default()));
    }

    pub fn last_stats(&self) -> Option<CacheStats> {
        self.last_stats.load().as_deref().copied()
    }
}

/// Held for the duration of a rebuild; releases the gate on drop, including
/// when the rebuilding future is dropped mid-walk.
pub(crate) struct RebuildGuard<'a> {
    cache: &'a Cache,
}

impl RebuildGuard<'_> {
    pub fn publish(self, snapshot: CacheSnapshot, stats: CacheStats) {
        self.cache.snapshot.store(Arc::new(snapshot));
        self.cache.last_stats.store(Some(Arc::new(stats)));
    }
}

impl Drop for RebuildGuard<'_> {
    fn drop(&mut self) {
        self.cache.rebuilding.store(false, Ordering::Release);
    }
}
