use std::collections::HashSet;

use crate::config::SearchSettings;
use crate::filter::comparison_text;
use crate::fuzzy::{FuzzyIndex, Key};
use crate::record::{ImageRecord, MatchResult};
use crate::traits::Matcher;

/// Lower-case and drop everything but ASCII letters, digits and slashes.
///
/// Spaces go too, so `"red dragon"` and `"reddragon"` normalize alike.
pub fn normalize(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '/' || *c == '\\')
        .collect()
}

/// Drop repeated `(path, name)` pairs, keeping first-seen order. Aliases
/// (same path, different name) all survive.
pub fn dedupe(records: impl IntoIterator<Item = ImageRecord>) -> Vec<ImageRecord> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    records
        .into_iter()
        .filter(|r| seen.insert((r.path.clone(), r.name.clone())))
        .collect()
}

/// The matcher `settings` ask for.
pub fn for_settings(settings: &SearchSettings) -> Box<dyn Matcher> {
    if settings.algorithm.exact {
        Box::new(ExactMatcher {
            run_search_on_path: settings.run_search_on_path,
        })
    } else {
        Box::new(FuzzyMatcher {
            run_search_on_path: settings.run_search_on_path,
            threshold:          settings.algorithm.fuzzy_threshold,
            limit:              settings.algorithm.fuzzy_limit,
        })
    }
}

// ---------------------------------------------------------------------------
// ExactMatcher
// ---------------------------------------------------------------------------

/// Normalized substring membership. Unscored; keeps candidate order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatcher {
    pub run_search_on_path: bool,
}

impl Matcher for ExactMatcher {
    fn find(&self, query: &str, candidates: &[ImageRecord]) -> Vec<MatchResult> {
        let needle = normalize(query);
        candidates
            .iter()
            .filter(|r| normalize(&comparison_text(r, self.run_search_on_path)).contains(&needle))
            .cloned()
            .map(MatchResult::exact)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// FuzzyMatcher
// ---------------------------------------------------------------------------

/// Scored approximate matching over name (or path) and tags.
///
/// An empty query browses: the first `limit` candidates, in order.
#[derive(Debug, Clone, Copy)]
pub struct FuzzyMatcher {
    pub run_search_on_path: bool,
    pub threshold:          f64,
    pub limit:              usize,
}

impl Matcher for FuzzyMatcher {
    fn find(&self, query: &str, candidates: &[ImageRecord]) -> Vec<MatchResult> {
        let primary = if self.run_search_on_path { Key::Path } else { Key::Name };
        let mut index = FuzzyIndex::new(&[primary, Key::Tags], self.threshold);
        for record in candidates {
            index.add(record.clone());
        }

        if query.is_empty() {
            index.browse(self.limit)
        } else {
            index.search(query, self.limit)
        }
    }
}
