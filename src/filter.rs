use std::collections::HashMap;

use regex::Regex;

use crate::config::FilterSettings;
use crate::error::VarexError;
use crate::media;
use crate::paths::SearchCategory;
use crate::record::ImageRecord;

/// A compiled include/exclude/regex filter for one search category.
///
/// A regex, when present, decides alone: include and exclude are ignored.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub include: String,
    pub exclude: String,
    pub regex:   Option<Regex>,
}

impl Filter {
    /// Compile `settings`, rejecting a malformed pattern.
    pub fn try_from_settings(settings: &FilterSettings) -> Result<Self, VarexError> {
        let regex = match settings.regex.trim() {
            "" => None,
            pattern => Some(
                Regex::new(pattern).map_err(|e| VarexError::InvalidPattern(e.to_string()))?,
            ),
        };
        Ok(Self {
            include: settings.include.clone(),
            exclude: settings.exclude.clone(),
            regex,
        })
    }

    /// Filter for `category`, or the all-pass filter when it has none.
    ///
    /// An unparseable pattern is logged and dropped; include/exclude still apply.
    pub fn compose(category: SearchCategory, filters: &HashMap<SearchCategory, FilterSettings>) -> Self {
        let Some(settings) = filters.get(&category) else {
            return Self::default();
        };
        match Self::try_from_settings(settings) {
            Ok(filter) => filter,
            Err(e) => {
                tracing::warn!(%category, pattern = %settings.regex, "ignoring filter regex: {e}");
                Self {
                    include: settings.include.clone(),
                    exclude: settings.exclude.clone(),
                    regex:   None,
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty() && self.regex.is_none()
    }

    pub fn passes(&self, record: &ImageRecord, run_search_on_path: bool) -> bool {
        let text = comparison_text(record, run_search_on_path);

        if let Some(regex) = &self.regex {
            return regex.is_match(&text);
        }
        if !self.include.is_empty() && !text.contains(&self.include) {
            return false;
        }
        if !self.exclude.is_empty() && text.contains(&self.exclude) {
            return false;
        }
        true
    }
}

/// The text a record is filtered and exactly matched on.
///
/// The decoded path when searching on paths; otherwise the file name with
/// extension for records that kept their default name, else the name itself.
pub fn comparison_text(record: &ImageRecord, run_search_on_path: bool) -> String {
    if run_search_on_path {
        media::decode(&record.path).into_owned()
    } else if record.has_default_name() {
        media::file_name_with_ext(&record.path)
    } else {
        record.name.clone()
    }
}
