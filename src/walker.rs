use std::collections::HashSet;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::VarexError;
use crate::media;
use crate::paths::{PathDescriptor, SourceKind};
use crate::record::ImageRecord;
use crate::traits::{AssetBrowser, BrowseOptions, FeedFetcher, Notifier, Storage, TableProvider};

pub const DEFAULT_GALLERY_URL: &str = "https://api.imgur.com/3/album";

/// Top-level gallery folders that can be listed recursively. One level above
/// them the gallery's recursive listing is unreliable.
const GALLERY_ROOTS: &[&str] = &["modules", "systems", "worlds", "assets"];

// ---------------------------------------------------------------------------
// SourceWalker
// ---------------------------------------------------------------------------

/// Turns one [`PathDescriptor`] into the media records reachable from it.
///
/// Each [`SourceKind`] has its own handler. Backend failures are reported
/// through the [`Notifier`] and never escape [`walk`](SourceWalker::walk).
pub struct SourceWalker {
    pub(crate) storage:     Option<Arc<dyn Storage>>,
    pub(crate) assets:      Arc<dyn AssetBrowser>,
    pub(crate) tables:      Option<Arc<dyn TableProvider>>,
    pub(crate) feeds:       Arc<dyn FeedFetcher>,
    pub(crate) notifier:    Arc<dyn Notifier>,
    pub(crate) gallery_url: String,
    pub(crate) gallery_id:  Option<String>,
}

impl SourceWalker {
    /// Walk `descriptor`, authenticating cloud asset browses with `api_key`.
    ///
    /// Returns everything collected before the first failure; a failure is
    /// reported as a warning, never returned.
    pub async fn walk(&self, descriptor: &PathDescriptor, api_key: Option<&str>) -> Vec<ImageRecord> {
        tracing::debug!(
            source = %descriptor.source.tag(),
            path = %descriptor.text,
            "walking search path"
        );

        let mut found = Vec::new();
        let res = match &descriptor.source {
            SourceKind::Local | SourceKind::Bucket { .. } | SourceKind::ImageGallery => {
                self.walk_listing(descriptor, &mut found).await;
                Ok(())
            }
            SourceKind::CloudAsset => match api_key {
                Some(key) => self.walk_assets(descriptor, key, &mut found).await,
                None => {
                    self.walk_listing(descriptor, &mut found).await;
                    Ok(())
                }
            },
            SourceKind::CloudGallery => self.walk_gallery(descriptor, &mut found).await,
            SourceKind::RollTable    => self.walk_table(descriptor, &mut found).await,
            SourceKind::JsonFeed     => self.walk_feed(descriptor, &mut found).await,
        };

        if let Err(e) = res {
            self.report(descriptor, &e);
        }
        found
    }

    fn report(&self, descriptor: &PathDescriptor, err: &VarexError) {
        let message = match err {
            VarexError::TableNotFound(name) => format!("Invalid roll table name: {name}"),
            VarexError::InvalidFeed(url)    => format!("Invalid or empty JSON feed: {url}"),
            other => format!(
                "Path not found {}:{} ({other})",
                descriptor.source.tag(),
                descriptor.text
            ),
        };
        self.notifier.warn(&message);
    }

    // ── Listing backends ──────────────────────────────────────────────────

    /// Depth-first listing walk. A failing directory is reported and skipped;
    /// its siblings are still visited.
    async fn walk_listing(&self, descriptor: &PathDescriptor, found: &mut Vec<ImageRecord>) {
        let Some(storage) = self.storage.as_ref() else {
            self.report(descriptor, &VarexError::NoBackend(descriptor.source.clone()));
            return;
        };

        let source = &descriptor.source;
        let options = BrowseOptions {
            bucket: match source {
                SourceKind::Bucket { bucket } => Some(bucket.clone()),
                _ => None,
            },
            // Cloud and gallery listings flatten server-side
            recursive: matches!(source, SourceKind::CloudAsset | SourceKind::ImageGallery),
        };

        let mut visited: HashSet<String> = HashSet::new();
        let mut stack = vec![descriptor.text.clone()];

        while let Some(dir) = stack.pop() {
            if !visited.insert(dir.clone()) {
                continue;
            }

            let listing = match storage.browse(source, &dir, &options).await {
                Ok(listing) => listing,
                Err(e) => {
                    let at = PathDescriptor { text: dir.clone(), ..descriptor.clone() };
                    self.report(&at, &e);
                    continue;
                }
            };

            // Root unto itself
            if listing.target == "." {
                continue;
            }

            add_files(listing.files.iter().map(String::as_str), found);

            if !descends(descriptor, &dir) {
                continue;
            }
            for sub in listing.dirs.iter().rev() {
                if *sub != dir && !visited.contains(sub) {
                    stack.push(sub.clone());
                }
            }
        }
    }

    /// Single recursive browse of another user's cloud library.
    async fn walk_assets(
        &self,
        descriptor: &PathDescriptor,
        api_key: &str,
        found: &mut Vec<ImageRecord>,
    ) -> Result<(), VarexError> {
        let files = self.assets.browse_recursive(&descriptor.text, api_key).await?;
        add_files(files.iter().map(String::as_str), found);
        Ok(())
    }

    // ── Document backends ─────────────────────────────────────────────────

    async fn walk_gallery(
        &self,
        descriptor: &PathDescriptor,
        found: &mut Vec<ImageRecord>,
    ) -> Result<(), VarexError> {
        let url = format!("{}/{}", self.gallery_url.trim_end_matches('/'), descriptor.text);
        let headers: Vec<(&str, String)> = self
            .gallery_id
            .iter()
            .map(|id| ("Authorization", format!("Client-ID {id}")))
            .collect();

        let value = self.feeds.fetch_json(&url, &headers).await?;
        let album: GalleryAlbum =
            serde_json::from_value(value).map_err(|_| VarexError::InvalidFeed(url.clone()))?;
        if !album.success {
            return Err(VarexError::InvalidFeed(url));
        }

        for image in album.data.images {
            if !media::is_media(&image.link) {
                continue;
            }
            let name = image
                .title
                .or(image.description)
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| media::file_stem(&image.link));
            found.push(ImageRecord::named(image.link, name));
        }
        Ok(())
    }

    async fn walk_table(
        &self,
        descriptor: &PathDescriptor,
        found: &mut Vec<ImageRecord>,
    ) -> Result<(), VarexError> {
        let not_found = || VarexError::TableNotFound(descriptor.text.clone());

        let tables = self.tables.as_ref().ok_or_else(not_found)?;
        let rows = tables.table(&descriptor.text).await.ok_or_else(not_found)?;

        for row in rows {
            if !media::is_media(&row.img) {
                continue;
            }
            let name = row
                .text
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| media::file_stem(&row.img));
            found.push(ImageRecord::named(row.img, name));
        }
        Ok(())
    }

    async fn walk_feed(
        &self,
        descriptor: &PathDescriptor,
        found: &mut Vec<ImageRecord>,
    ) -> Result<(), VarexError> {
        let invalid = || VarexError::InvalidFeed(descriptor.text.clone());

        let value = self.feeds.fetch_json(&descriptor.text, &[]).await?;
        let items: Vec<FeedItem> = serde_json::from_value(value).map_err(|_| invalid())?;
        if items.is_empty() {
            return Err(invalid());
        }

        for item in items {
            if !media::is_media(&item.path) {
                continue;
            }
            let name = item.name.unwrap_or_else(|| media::file_stem(&item.path));
            found.push(ImageRecord::named(item.path, name).with_tags(item.tags));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn add_files<'a>(files: impl Iterator<Item = &'a str>, found: &mut Vec<ImageRecord>) {
    found.extend(files.filter(|f| media::is_media(f)).map(ImageRecord::from_path));
}

/// Whether the walker lists the sub-directories of `dir`.
fn descends(descriptor: &PathDescriptor, dir: &str) -> bool {
    match descriptor.source {
        SourceKind::CloudAsset => false,
        SourceKind::ImageGallery => {
            let bare: String = dir.chars().filter(|c| *c != '/' && *c != '\\').collect();
            GALLERY_ROOTS.contains(&bare.as_str())
        }
        _ => descriptor.recursive,
    }
}

#[derive(Deserialize)]
struct GalleryAlbum {
    #[serde(default)]
    success: bool,
    data: GalleryData,
}

#[derive(Deserialize)]
struct GalleryData {
    #[serde(default)]
    images: Vec<GalleryImage>,
}

#[derive(Deserialize)]
struct GalleryImage {
    link:        String,
    title:       Option<String>,
    description: Option<String>,
}

#[derive(Deserialize)]
struct FeedItem {
    path: String,
    name: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}
