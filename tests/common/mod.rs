//! In-memory backends shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;
use varex::{
    AssetBrowser, BrowseOptions, FeedFetcher, Listing, Notifier, SourceKind, Storage,
    TableProvider, TableRow, VarexError,
};

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Directory tree keyed by directory path. Unknown directories fail.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    tree:    HashMap<String, Listing>,
    calls:   Arc<AtomicUsize>,
    browsed: Arc<Mutex<Vec<(String, BrowseOptions)>>>,
    gate:    Option<Arc<Notify>>,
}

impl MemoryStorage {
    pub fn dir(mut self, dir: &str, files: &[&str], dirs: &[&str]) -> Self {
        self.tree.insert(
            dir.to_string(),
            Listing {
                target: dir.to_string(),
                files:  files.iter().map(|f| f.to_string()).collect(),
                dirs:   dirs.iter().map(|d| d.to_string()).collect(),
            },
        );
        self
    }

    /// A directory the backend lists as the root unto itself.
    pub fn root_dir(mut self, dir: &str, files: &[&str]) -> Self {
        self.tree.insert(
            dir.to_string(),
            Listing {
                target: ".".to_string(),
                files:  files.iter().map(|f| f.to_string()).collect(),
                dirs:   Vec::new(),
            },
        );
        self
    }

    /// Park every browse until `gate` is notified.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Shared browse counter; clone it before handing the storage over.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }

    /// Every `(dir, options)` pair browsed so far.
    pub fn browsed(&self) -> Arc<Mutex<Vec<(String, BrowseOptions)>>> {
        self.browsed.clone()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn browse(
        &self,
        _source: &SourceKind,
        dir: &str,
        options: &BrowseOptions,
    ) -> Result<Listing, VarexError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.browsed.lock().unwrap().push((dir.to_string(), options.clone()));
        match &self.gate {
            Some(gate) => gate.notified().await,
            None => tokio::task::yield_now().await,
        }
        self.tree
            .get(dir)
            .cloned()
            .ok_or_else(|| VarexError::NotFound(dir.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct MemoryTables(pub HashMap<String, Vec<TableRow>>);

impl MemoryTables {
    pub fn table(mut self, name: &str, rows: &[(&str, Option<&str>)]) -> Self {
        let rows = rows
            .iter()
            .map(|(img, text)| TableRow {
                img:  img.to_string(),
                text: text.map(str::to_string),
            })
            .collect();
        self.0.insert(name.to_string(), rows);
        self
    }
}

#[async_trait]
impl TableProvider for MemoryTables {
    async fn table(&self, name: &str) -> Option<Vec<TableRow>> {
        self.0.get(name).cloned()
    }
}

/// JSON documents by URL, recording the headers of every request.
#[derive(Clone, Default)]
pub struct MemoryFeeds {
    docs:     HashMap<String, serde_json::Value>,
    requests: Arc<Mutex<Vec<(String, Vec<(String, String)>)>>>,
}

impl MemoryFeeds {
    pub fn doc(mut self, url: &str, value: serde_json::Value) -> Self {
        self.docs.insert(url.to_string(), value);
        self
    }

    pub fn requests(&self) -> Arc<Mutex<Vec<(String, Vec<(String, String)>)>>> {
        self.requests.clone()
    }
}

#[async_trait]
impl FeedFetcher for MemoryFeeds {
    async fn fetch_json(
        &self,
        url: &str,
        headers: &[(&str, String)],
    ) -> Result<serde_json::Value, VarexError> {
        self.requests.lock().unwrap().push((
            url.to_string(),
            headers.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
        ));
        self.docs
            .get(url)
            .cloned()
            .ok_or_else(|| VarexError::NotFound(url.to_string()))
    }
}

/// Cloud library contents per `(dir, api_key)`.
#[derive(Clone, Default)]
pub struct MemoryAssets(pub HashMap<(String, String), Vec<String>>);

impl MemoryAssets {
    pub fn library(mut self, dir: &str, key: &str, files: &[&str]) -> Self {
        self.0.insert(
            (dir.to_string(), key.to_string()),
            files.iter().map(|f| f.to_string()).collect(),
        );
        self
    }
}

#[async_trait]
impl AssetBrowser for MemoryAssets {
    async fn browse_recursive(&self, dir: &str, api_key: &str) -> Result<Vec<String>, VarexError> {
        self.0
            .get(&(dir.to_string(), api_key.to_string()))
            .cloned()
            .ok_or_else(|| VarexError::Backend(format!("access denied: {dir}")))
    }
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub infos: Arc<Mutex<Vec<String>>>,
    pub warns: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn warnings(&self) -> Vec<String> {
        self.warns.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.infos.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn info(&self, message: &str) {
        self.infos.lock().unwrap().push(message.to_string());
    }

    fn warn(&self, message: &str) {
        self.warns.lock().unwrap().push(message.to_string());
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// An engine builder with every network collaborator replaced by an empty mock.
pub fn offline() -> varex::SearchEngineBuilder {
    varex::engine()
        .feeds(MemoryFeeds::default())
        .assets(MemoryAssets::default())
}

pub fn names(records: &[varex::ImageRecord]) -> Vec<String> {
    records.iter().map(|r| r.name.clone()).collect()
}
