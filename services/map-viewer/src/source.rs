//! Layer sources: where the manifest and layer files are fetched from.

use async_trait::async_trait;
use bytes::Bytes;
use map_common::{MapError, MapResult};
use reqwest::Client;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Something that can fetch a named JSON resource.
///
/// Every call goes to the underlying store; nothing is cached.
#[async_trait]
pub trait LayerSource: Send + Sync {
    /// Fetch the raw bytes of `file`.
    async fn fetch(&self, file: &str) -> MapResult<Bytes>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}

/// Fetch `file` and decode it as JSON.
pub async fn fetch_json(source: &dyn LayerSource, file: &str) -> MapResult<Value> {
    let body = source.fetch(file).await?;
    Ok(serde_json::from_slice(&body)?)
}

/// Pick a source for a data path: `http(s)://` URLs are fetched over HTTP,
/// anything else is a local directory.
pub fn source_for(data_path: &str, timeout: Duration) -> MapResult<Arc<dyn LayerSource>> {
    if data_path.starts_with("http://") || data_path.starts_with("https://") {
        Ok(Arc::new(HttpSource::new(data_path, timeout)?))
    } else {
        Ok(Arc::new(DirSource::new(data_path)))
    }
}

// ============================================================================
// Local directory
// ============================================================================

/// Reads files from a local directory.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl LayerSource for DirSource {
    #[instrument(skip(self), fields(root = ?self.root))]
    async fn fetch(&self, file: &str) -> MapResult<Bytes> {
        let path = self.root.join(file);
        debug!(path = ?path, "Reading layer file");
        let body = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => MapError::HttpStatus {
                status: 404,
                reason: "Not Found".to_string(),
            },
            _ => MapError::Transport(format!("Failed to read {}: {}", path.display(), e)),
        })?;
        Ok(Bytes::from(body))
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

// ============================================================================
// HTTP
// ============================================================================

/// Fetches files relative to a base URL.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: &str, timeout: Duration) -> MapResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MapError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };

        Ok(Self { client, base_url })
    }

    fn url_for(&self, file: &str) -> String {
        format!("{}{}", self.base_url, file.trim_start_matches('/'))
    }
}

#[async_trait]
impl LayerSource for HttpSource {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn fetch(&self, file: &str) -> MapResult<Bytes> {
        let url = self.url_for(file);
        debug!(url = %url, "Fetching layer file");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::CACHE_CONTROL, "no-store")
            .send()
            .await
            .map_err(|e| MapError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MapError::HttpStatus {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        response
            .bytes()
            .await
            .map_err(|e| MapError::Transport(e.to_string()))
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}
