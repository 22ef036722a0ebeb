use std::collections::HashMap;

use serde::Deserialize;

use crate::error::VarexError;
use crate::paths::SearchCategory;

pub const DEFAULT_EXCLUDED_KEYWORDS: &str = "and,for";
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.4;
pub const DEFAULT_FUZZY_LIMIT: usize = 100;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Raw include/exclude/regex strings for one category, as configured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    pub include: String,
    pub exclude: String,
    pub regex:   String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AlgorithmSettings {
    /// Substring matching instead of fuzzy scoring.
    pub exact:           bool,
    /// Maximum accepted dissimilarity, `0.0` exact only … `1.0` anything.
    pub fuzzy_threshold: f64,
    /// Maximum number of fuzzy results per sub-query.
    pub fuzzy_limit:     usize,
}

impl Default for AlgorithmSettings {
    fn default() -> Self {
        Self {
            exact:           false,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            fuzzy_limit:     DEFAULT_FUZZY_LIMIT,
        }
    }
}

/// Which result sources feed random picks. All off disables random search.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RandomizerSettings {
    /// Search on the entity name.
    pub name_search: bool,
    /// Include keyword sub-queries in that search.
    pub keywords:    bool,
    /// Add the entity's shared variants.
    pub shared:      bool,
    /// Add the entity's wildcard images.
    pub wildcard:    bool,
}

impl Default for RandomizerSettings {
    fn default() -> Self {
        Self {
            name_search: true,
            keywords:    false,
            shared:      false,
            wildcard:    false,
        }
    }
}

impl RandomizerSettings {
    pub fn is_disabled(&self) -> bool {
        !(self.name_search || self.keywords || self.shared || self.wildcard)
    }
}

/// Global search settings with defaults for every field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchSettings {
    pub keyword_search:     bool,
    /// Comma/space separated words never used as keyword sub-queries.
    pub excluded_keywords:  String,
    pub run_search_on_path: bool,
    pub algorithm:          AlgorithmSettings,
    pub filters:            HashMap<SearchCategory, FilterSettings>,
    pub randomizer:         RandomizerSettings,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            keyword_search:     true,
            excluded_keywords:  DEFAULT_EXCLUDED_KEYWORDS.to_string(),
            run_search_on_path: false,
            algorithm:          AlgorithmSettings::default(),
            filters:            HashMap::new(),
            randomizer:         RandomizerSettings::default(),
        }
    }
}

impl SearchSettings {
    pub fn from_json(json: &str) -> Result<Self, VarexError> {
        serde_json::from_str(json).map_err(VarexError::Config)
    }
}

// ---------------------------------------------------------------------------
// Overrides
// ---------------------------------------------------------------------------

/// Per-call settings. `None` fields fall back to the engine's [`SearchSettings`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchOverrides {
    pub keyword_search:     Option<bool>,
    pub excluded_keywords:  Option<String>,
    pub run_search_on_path: Option<bool>,
    pub exact:              Option<bool>,
    pub fuzzy_threshold:    Option<f64>,
    pub fuzzy_limit:        Option<usize>,
    pub filters:            Option<HashMap<SearchCategory, FilterSettings>>,
}

impl SearchOverrides {
    /// Fill every unset field from `defaults`. Values set here always win.
    pub fn resolve(&self, defaults: &SearchSettings) -> SearchSettings {
        SearchSettings {
            keyword_search: self.keyword_search.unwrap_or(defaults.keyword_search),
            excluded_keywords: self
                .excluded_keywords
                .clone()
                .unwrap_or_else(|| defaults.excluded_keywords.clone()),
            run_search_on_path: self.run_search_on_path.unwrap_or(defaults.run_search_on_path),
            algorithm: AlgorithmSettings {
                exact:           self.exact.unwrap_or(defaults.algorithm.exact),
                fuzzy_threshold: self
                    .fuzzy_threshold
                    .unwrap_or(defaults.algorithm.fuzzy_threshold)
                    .clamp(0.0, 1.0),
                fuzzy_limit:     self.fuzzy_limit.unwrap_or(defaults.algorithm.fuzzy_limit),
            },
            filters: self.filters.clone().unwrap_or_else(|| defaults.filters.clone()),
            randomizer: defaults.randomizer.clone(),
        }
    }

    pub fn keyword_search(mut self, yes: bool) -> Self {
        self.keyword_search = Some(yes);
        self
    }

    pub fn exact(mut self, yes: bool) -> Self {
        self.exact = Some(yes);
        self
    }

    pub fn fuzzy_threshold(mut self, t: f64) -> Self {
        self.fuzzy_threshold = Some(t);
        self
    }

    pub fn fuzzy_limit(mut self, n: usize) -> Self {
        self.fuzzy_limit = Some(n);
        self
    }

    pub fn run_search_on_path(mut self, yes: bool) -> Self {
        self.run_search_on_path = Some(yes);
        self
    }

    pub fn filter(mut self, category: SearchCategory, filter: FilterSettings) -> Self {
        self.filters.get_or_insert_with(HashMap::new).insert(category, filter);
        self
    }
}

/// Per-call randomizer switches. `None` fields fall back to the engine's settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RandomizerOverrides {
    pub name_search: Option<bool>,
    pub keywords:    Option<bool>,
    pub shared:      Option<bool>,
    pub wildcard:    Option<bool>,
}

impl RandomizerOverrides {
    pub fn resolve(&self, defaults: &RandomizerSettings) -> RandomizerSettings {
        RandomizerSettings {
            name_search: self.name_search.unwrap_or(defaults.name_search),
            keywords:    self.keywords.unwrap_or(defaults.keywords),
            shared:      self.shared.unwrap_or(defaults.shared),
            wildcard:    self.wildcard.unwrap_or(defaults.wildcard),
        }
    }
}
