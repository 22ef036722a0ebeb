use std::collections::HashSet;
use std::time::Duration;

use indexmap::IndexMap;

use crate::record::{ImageRecord, MatchResult};

/// The output of an art search, grouped by the sub-query that found each hit.
///
/// Groups are in the order the sub-queries ran. A path appears in at most
/// one group; inside a group one path may appear once per alias name.
#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    groups: IndexMap<String, Vec<MatchResult>>,
}

impl SearchResults {
    pub(crate) fn insert(&mut self, sub_query: String, hits: Vec<MatchResult>) {
        self.groups.insert(sub_query, hits);
    }

    pub(crate) fn push_group(&mut self, key: impl Into<String>, records: Vec<ImageRecord>) {
        self.groups
            .insert(key.into(), records.into_iter().map(MatchResult::exact).collect());
    }

    pub fn contains_sub_query(&self, sub_query: &str) -> bool {
        self.groups.contains_key(sub_query)
    }

    pub fn get(&self, sub_query: &str) -> Option<&[MatchResult]> {
        self.groups.get(sub_query).map(Vec::as_slice)
    }

    /// Sub-queries with their hits, in run order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[MatchResult])> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn sub_queries(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Total hits across all groups.
    pub fn total(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Every hit's record, group by group.
    pub fn flatten(&self) -> Vec<ImageRecord> {
        self.groups
            .values()
            .flatten()
            .map(|hit| hit.record.clone())
            .collect()
    }

    /// Distinct paths in first-seen order.
    pub fn paths(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.groups
            .values()
            .flatten()
            .filter(|hit| seen.insert(hit.record.path.as_str()))
            .map(|hit| hit.record.path.clone())
            .collect()
    }
}

/// Summary of a completed cache rebuild.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheStats {
    /// Records captured in the new snapshot.
    pub images: usize,

    /// Search paths walked.
    pub paths: usize,

    /// Wall-clock time of the rebuild.
    pub duration: Duration,

    /// Records captured per second. Clamped to 0 on zero-duration rebuilds.
    pub images_per_sec: usize,
}

impl CacheStats {
    pub(crate) fn compute(images: usize, paths: usize, duration: Duration) -> Self {
        let ips = if duration.as_secs_f64() > 0.0 {
            (images as f64 / duration.as_secs_f64()) as usize
        } else {
            0
        };
        Self {
            images,
            paths,
            duration,
            images_per_sec: ips,
        }
    }
}
