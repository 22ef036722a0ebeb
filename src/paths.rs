use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::VarexError;

// ---------------------------------------------------------------------------
// SearchCategory
// ---------------------------------------------------------------------------

/// Which kind of entity a query is looking for art for.
///
/// Paths and filters are scoped by category: a path tagged `Tile` never
/// contributes to a `Token` search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum SearchCategory {
    Portrait,
    Token,
    /// Portrait and token art in one pass.
    Both,
    Tile,
    Item,
    JournalEntry,
}

impl SearchCategory {
    pub const ALL: [SearchCategory; 6] = [
        Self::Portrait,
        Self::Token,
        Self::Both,
        Self::Tile,
        Self::Item,
        Self::JournalEntry,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Portrait     => "Portrait",
            Self::Token        => "Token",
            Self::Both         => "PortraitAndToken",
            Self::Tile         => "Tile",
            Self::Item         => "Item",
            Self::JournalEntry => "JournalEntry",
        }
    }

    /// Whether a path tagged with `self` may serve a query for `query`.
    ///
    /// `Both` bridges portrait and token art in either direction.
    pub fn serves(&self, query: SearchCategory) -> bool {
        if *self == query {
            return true;
        }
        matches!(
            (self, query),
            (Self::Both, Self::Portrait | Self::Token) | (Self::Portrait | Self::Token, Self::Both)
        )
    }
}

impl fmt::Display for SearchCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchCategory {
    type Err = VarexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "portrait"                            => Ok(Self::Portrait),
            "token"                               => Ok(Self::Token),
            "portraitandtoken" | "both"           => Ok(Self::Both),
            "tile"                                => Ok(Self::Tile),
            "item"                                => Ok(Self::Item),
            "journalentry" | "journal"            => Ok(Self::JournalEntry),
            _ => Err(VarexError::UnknownCategory(s.to_string())),
        }
    }
}

impl TryFrom<String> for SearchCategory {
    type Error = VarexError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Composite cache key for a category set: sorted, comma-joined names.
pub fn category_key(categories: &BTreeSet<SearchCategory>) -> String {
    let mut names: Vec<&str> = categories.iter().map(|c| c.as_str()).collect();
    names.sort_unstable();
    names.join(",")
}

/// Inverse of [`category_key`]. Unknown names are skipped.
pub fn categories_from_key(key: &str) -> BTreeSet<SearchCategory> {
    key.split(',').filter_map(|name| name.parse().ok()).collect()
}

// ---------------------------------------------------------------------------
// SourceKind
// ---------------------------------------------------------------------------

/// The storage backend a path lives on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Host data directory.
    Local,
    /// Object storage bucket; `text` is a key prefix.
    Bucket { bucket: String },
    /// Cloud asset library; `text` is a folder in the owner's library.
    CloudAsset,
    /// Hosted album; `text` is the album id.
    CloudGallery,
    /// Roll table loaded in the host; `text` is the table name.
    RollTable,
    /// JSON document of `{path, name?, tags?}` objects; `text` is the URL.
    JsonFeed,
    /// Manifest-style shared asset gallery; `text` is a folder.
    ImageGallery,
}

impl SourceKind {
    /// Parse a host source tag such as `"data"`, `"s3:my-bucket"` or `"rolltable"`.
    ///
    /// Unknown tags are a configuration bug and are rejected.
    pub fn parse(tag: &str) -> Result<Self, VarexError> {
        let tag = tag.trim();
        if let Some(bucket) = tag.strip_prefix("s3:") {
            if bucket.is_empty() {
                return Err(VarexError::MissingBucket(tag.to_string()));
            }
            return Ok(Self::Bucket { bucket: bucket.to_string() });
        }
        match tag {
            "" | "data" | "local" | "public" => Ok(Self::Local),
            "s3"                            => Err(VarexError::MissingBucket(tag.to_string())),
            "forgevtt"                      => Ok(Self::CloudAsset),
            "imgur"                         => Ok(Self::CloudGallery),
            "rolltable"                     => Ok(Self::RollTable),
            "json"                          => Ok(Self::JsonFeed),
            "forge-bazaar"                  => Ok(Self::ImageGallery),
            other => Err(VarexError::UnknownSource(other.to_string())),
        }
    }

    /// The host tag this kind round-trips to.
    pub fn tag(&self) -> String {
        match self {
            Self::Local            => "data".to_string(),
            Self::Bucket { bucket } => format!("s3:{bucket}"),
            Self::CloudAsset       => "forgevtt".to_string(),
            Self::CloudGallery     => "imgur".to_string(),
            Self::RollTable        => "rolltable".to_string(),
            Self::JsonFeed         => "json".to_string(),
            Self::ImageGallery     => "forge-bazaar".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// PathDescriptor
// ---------------------------------------------------------------------------

/// One configured search location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathDescriptor {
    pub text:       String,
    pub source:     SourceKind,
    pub categories: BTreeSet<SearchCategory>,
    /// Captured into the cache snapshot instead of walked on every query.
    pub cache:      bool,
    /// Descend into sub-directories on listing backends.
    pub recursive:  bool,
    /// Shared with other users through a [`CloudIdentity`] API key.
    pub share:      bool,
}

impl PathDescriptor {
    pub fn new(
        text: impl Into<String>,
        source: SourceKind,
        categories: impl IntoIterator<Item = SearchCategory>,
    ) -> Result<Self, VarexError> {
        let descriptor = Self {
            text:       text.into(),
            source,
            categories: categories.into_iter().collect(),
            cache:      true,
            recursive:  true,
            share:      false,
        };
        descriptor.validate()?;
        Ok(descriptor)
    }

    pub fn cached(mut self, yes: bool) -> Self {
        self.cache = yes;
        self
    }

    pub fn recursive(mut self, yes: bool) -> Self {
        self.recursive = yes;
        self
    }

    pub fn shared(mut self, yes: bool) -> Self {
        self.share = yes;
        self
    }

    /// Cache key for this path's category set.
    pub fn category_key(&self) -> String {
        category_key(&self.categories)
    }

    /// Whether this path contributes to a query for `query`.
    pub fn serves(&self, query: SearchCategory) -> bool {
        self.categories.iter().any(|c| c.serves(query))
    }

    fn validate(&self) -> Result<(), VarexError> {
        if self.categories.is_empty() {
            return Err(VarexError::EmptyCategories(self.text.clone()));
        }
        if let SourceKind::Bucket { bucket } = &self.source {
            if bucket.trim().is_empty() {
                return Err(VarexError::MissingBucket(self.text.clone()));
            }
        }
        Ok(())
    }
}

/// Path settings as the host stores them.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPath {
    pub text: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default = "default_true")]
    pub cache: bool,
    #[serde(default = "default_true")]
    pub recursive: bool,
    #[serde(default)]
    pub share: bool,
}

fn default_true() -> bool {
    true
}

impl TryFrom<RawPath> for PathDescriptor {
    type Error = VarexError;

    fn try_from(raw: RawPath) -> Result<Self, Self::Error> {
        let categories = raw
            .types
            .iter()
            .map(|t| t.parse())
            .collect::<Result<BTreeSet<SearchCategory>, _>>()?;
        let descriptor = Self {
            text: raw.text,
            source: SourceKind::parse(&raw.source)?,
            categories,
            cache: raw.cache,
            recursive: raw.recursive,
            share: raw.share,
        };
        descriptor.validate()?;
        Ok(descriptor)
    }
}

// ---------------------------------------------------------------------------
// CloudIdentity
// ---------------------------------------------------------------------------

/// Cloud asset paths owned by one user.
///
/// The owner browses them directly; everyone else needs the owner's API key
/// and only sees paths flagged [`share`](PathDescriptor::share).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudIdentity {
    pub user_id: String,
    pub api_key: Option<String>,
    pub paths:   Vec<PathDescriptor>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawIdentity {
    #[serde(default)]
    api_key: String,
    #[serde(default)]
    paths: Vec<RawPath>,
}

// ---------------------------------------------------------------------------
// PathCatalog
// ---------------------------------------------------------------------------

/// One path to walk, with the API key to walk it with.
#[derive(Debug, Clone)]
pub struct WalkTarget<'a> {
    pub descriptor: &'a PathDescriptor,
    pub api_key:    Option<&'a str>,
}

/// The validated list of configured search locations.
#[derive(Debug, Clone, Default)]
pub struct PathCatalog {
    paths:      Vec<PathDescriptor>,
    identities: Vec<CloudIdentity>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCatalog {
    #[serde(default)]
    search_paths: Vec<RawPath>,
    #[serde(default)]
    forge_search_paths: std::collections::BTreeMap<String, RawIdentity>,
}

impl PathCatalog {
    pub fn new(paths: Vec<PathDescriptor>) -> Result<Self, VarexError> {
        for p in &paths {
            p.validate()?;
        }
        Ok(Self { paths, identities: Vec::new() })
    }

    pub fn with_identity(mut self, identity: CloudIdentity) -> Result<Self, VarexError> {
        for p in &identity.paths {
            p.validate()?;
        }
        self.identities.push(identity);
        Ok(self)
    }

    /// Load `{ "searchPaths": [...], "forgeSearchPaths": { uid: { apiKey, paths } } }`.
    pub fn from_json(json: &str) -> Result<Self, VarexError> {
        let raw: RawCatalog = serde_json::from_str(json).map_err(VarexError::Config)?;
        let paths = raw
            .search_paths
            .into_iter()
            .map(PathDescriptor::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let mut catalog = Self::new(paths)?;
        for (user_id, identity) in raw.forge_search_paths {
            let paths = identity
                .paths
                .into_iter()
                .map(PathDescriptor::try_from)
                .collect::<Result<Vec<_>, _>>()?;
            let api_key = Some(identity.api_key).filter(|k| !k.trim().is_empty());
            catalog = catalog.with_identity(CloudIdentity { user_id, api_key, paths })?;
        }
        Ok(catalog)
    }

    pub fn paths(&self) -> &[PathDescriptor] {
        &self.paths
    }

    pub fn identities(&self) -> &[CloudIdentity] {
        &self.identities
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty() && self.identities.iter().all(|i| i.paths.is_empty())
    }

    /// Paths to walk for one pass.
    ///
    /// `category = None` selects every category (a full cache rebuild).
    /// When `caching` is set only cache-eligible paths are returned, otherwise
    /// only live ones. Cloud identities other than `current_user` contribute
    /// their shared paths, and only when they carry an API key.
    pub fn walk_plan(
        &self,
        category: Option<SearchCategory>,
        caching: bool,
        current_user: Option<&str>,
    ) -> Vec<WalkTarget<'_>> {
        let wanted = |p: &PathDescriptor| {
            p.cache == caching && category.map_or(true, |c| p.serves(c))
        };

        let mut plan: Vec<WalkTarget<'_>> = self
            .paths
            .iter()
            .filter(|p| wanted(p))
            .map(|descriptor| WalkTarget { descriptor, api_key: None })
            .collect();

        for identity in &self.identities {
            if current_user == Some(identity.user_id.as_str()) {
                plan.extend(
                    identity
                        .paths
                        .iter()
                        .filter(|p| wanted(p))
                        .map(|descriptor| WalkTarget { descriptor, api_key: None }),
                );
            } else if let Some(key) = identity.api_key.as_deref() {
                plan.extend(
                    identity
                        .paths
                        .iter()
                        .filter(|p| p.share && wanted(p))
                        .map(|descriptor| WalkTarget { descriptor, api_key: Some(key) }),
                );
            }
        }
        plan
    }
}
