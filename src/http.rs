use async_trait::async_trait;
use serde::Deserialize;

use crate::error::VarexError;
use crate::traits::{AssetBrowser, FeedFetcher};

pub const DEFAULT_ASSET_BROWSE_URL: &str = "https://forge-vtt.com/api/assets/browse";

/// Build a `reqwest` client that honours the system proxy.
///
/// `HTTP_PROXY`/`HTTPS_PROXY` (either case) are applied when set; an invalid
/// proxy URL is logged and the client connects directly.
pub fn create_client() -> Result<reqwest::Client, VarexError> {
    let mut builder = reqwest::Client::builder();

    if let Ok(proxy_url) = std::env::var("HTTP_PROXY")
        .or_else(|_| std::env::var("http_proxy"))
        .or_else(|_| std::env::var("HTTPS_PROXY"))
        .or_else(|_| std::env::var("https_proxy"))
    {
        if !proxy_url.trim().is_empty() {
            match reqwest::Proxy::all(&proxy_url) {
                Ok(proxy) => {
                    builder = builder.proxy(proxy);
                    tracing::debug!("using proxy {proxy_url}");
                }
                Err(e) => {
                    tracing::warn!("invalid proxy {proxy_url}, connecting directly: {e}");
                }
            }
        }
    }

    builder.build().map_err(|source| VarexError::Http {
        url: String::new(),
        source,
    })
}

// ---------------------------------------------------------------------------
// HttpFetcher
// ---------------------------------------------------------------------------

/// [`FeedFetcher`] over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, VarexError> {
        Ok(Self { client: create_client()? })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FeedFetcher for HttpFetcher {
    async fn fetch_json(
        &self,
        url: &str,
        headers: &[(&str, String)],
    ) -> Result<serde_json::Value, VarexError> {
        let http_err = |source| VarexError::Http { url: url.to_string(), source };

        let mut request = self.client.get(url).header("Accept", "application/json");
        for (name, value) in headers {
            request = request.header(*name, value);
        }

        request
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(http_err)?
            .json::<serde_json::Value>()
            .await
            .map_err(http_err)
    }
}

// ---------------------------------------------------------------------------
// HttpAssetBrowser
// ---------------------------------------------------------------------------

/// [`AssetBrowser`] for the cloud asset API.
#[derive(Debug, Clone)]
pub struct HttpAssetBrowser {
    client:   reqwest::Client,
    endpoint: String,
}

#[derive(Deserialize)]
struct BrowseResponse {
    #[serde(default)]
    files: Vec<BrowseFile>,
}

#[derive(Deserialize)]
struct BrowseFile {
    url: String,
}

impl HttpAssetBrowser {
    pub fn new() -> Result<Self, VarexError> {
        Ok(Self {
            client:   create_client()?,
            endpoint: DEFAULT_ASSET_BROWSE_URL.to_string(),
        })
    }

    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = url.into();
        self
    }
}

#[async_trait]
impl AssetBrowser for HttpAssetBrowser {
    async fn browse_recursive(&self, dir: &str, api_key: &str) -> Result<Vec<String>, VarexError> {
        let http_err = |source| VarexError::Http { url: self.endpoint.clone(), source };

        let body = serde_json::json!({
            "path": dir,
            "options": { "recursive": true },
        });

        let response: BrowseResponse = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(http_err)?
            .json()
            .await
            .map_err(http_err)?;

        Ok(response.files.into_iter().map(|f| f.url).collect())
    }
}
