use std::path::{Path, PathBuf};

use async_trait::async_trait;
use ignore::{DirEntry, WalkBuilder};

use crate::error::VarexError;
use crate::paths::SourceKind;
use crate::traits::{BrowseOptions, Listing, Storage};

// ---------------------------------------------------------------------------
// LocalStorage
// ---------------------------------------------------------------------------

/// [`Storage`] over a directory on disk, serving [`SourceKind::Local`].
///
/// Paths in and out are relative to `root` and use `/` separators, the way
/// the host spells data paths. Hidden files and ignore files are not
/// special: every entry is listed.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn browse(
        &self,
        source: &SourceKind,
        dir: &str,
        options: &BrowseOptions,
    ) -> Result<Listing, VarexError> {
        if *source != SourceKind::Local {
            return Err(VarexError::NoBackend(source.clone()));
        }

        let root = self.root.clone();
        let dir = normalize(dir);
        let recursive = options.recursive;

        tokio::task::spawn_blocking(move || list(&root, &dir, recursive))
            .await
            .map_err(|e| VarexError::Backend(format!("listing task failed: {e}")))?
    }
}

// ---------------------------------------------------------------------------
// list()
// ---------------------------------------------------------------------------

/// Blocking listing of `root/dir`. One level deep unless `recursive`, in
/// which case every file in the subtree lands in `files` and `dirs` is empty.
/// Entries that can't be read are logged and skipped.
fn list(root: &Path, dir: &str, recursive: bool) -> Result<Listing, VarexError> {
    let base = if dir.is_empty() { root.to_path_buf() } else { root.join(dir) };
    if !base.is_dir() {
        return Err(VarexError::NotFound(dir.to_string()));
    }

    let mut builder = WalkBuilder::new(&base);
    builder
        .standard_filters(false)
        .ignore(false)
        .parents(false)
        .hidden(false)
        .follow_links(false)
        .same_file_system(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .max_depth(if recursive { None } else { Some(1) });

    let mut listing = Listing {
        target: dir.to_string(),
        ..Listing::default()
    };

    for res in builder.build() {
        let entry = match res {
            Ok(entry) => entry,
            Err(e) => {
                let err = map_ignore_error(e);
                tracing::warn!(location = ?err.location(), "skipping unreadable entry: {err}");
                continue;
            }
        };

        // Skip the root itself
        if entry.depth() == 0 {
            continue;
        }

        let Some(ft) = entry.file_type() else {
            continue;
        };
        let Some(rel) = relative(root, &entry) else {
            continue;
        };

        if ft.is_dir() {
            if !recursive {
                listing.dirs.push(rel);
            }
        } else if ft.is_file() {
            listing.files.push(rel);
        }
    }

    Ok(listing)
}

fn relative(root: &Path, entry: &DirEntry) -> Option<String> {
    let rel = entry.path().strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

fn normalize(dir: &str) -> String {
    let dir = dir.replace('\\', "/");
    let dir = dir.trim_start_matches("./").trim_matches('/');
    if dir == "." {
        String::new()
    } else {
        dir.to_string()
    }
}

// ---------------------------------------------------------------------------
// Map ignore::Error to VarexError
// ---------------------------------------------------------------------------

fn map_ignore_error(e: ignore::Error) -> VarexError {
    match e {
        ignore::Error::WithPath { path, err } => match *err {
            ignore::Error::Io(io_err) => {
                if io_err.kind() == std::io::ErrorKind::NotFound {
                    VarexError::NotFound(path.display().to_string())
                } else {
                    VarexError::Io { path, source: io_err }
                }
            }
            other => VarexError::Backend(other.to_string()),
        },
        ignore::Error::WithDepth { err, .. } => map_ignore_error(*err),
        ignore::Error::Io(io_err) => VarexError::Io {
            path: PathBuf::new(),
            source: io_err,
        },
        other => VarexError::Backend(other.to_string()),
    }
}
