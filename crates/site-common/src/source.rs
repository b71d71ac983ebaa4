/// Content sources: where markdown and JSON documents are fetched from.
///
/// The content core only ever asks for a relative path (`content/pages/trang-chu.md`,
/// `data/products.json`) and receives UTF-8 text. Whether that text comes from the
/// live website, a checked-out content directory or memory is decided here.
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::error::CommonError;

#[async_trait::async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch the document at `path` as text.
    async fn fetch_text(&self, path: &str) -> Result<String, CommonError>;
}

#[derive(Clone, Debug)]
pub struct HttpSourceConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl HttpSourceConfig {
    /// Optional:
    /// - `HTTP_SOURCE_TIMEOUT_SECS` (default: 10)
    /// - `HTTP_SOURCE_MAX_RETRIES` (default: 2)
    /// - `HTTP_SOURCE_RETRY_INITIAL_MS` (default: 200)
    /// - `HTTP_SOURCE_RETRY_MAX_MS` (default: 2000)
    pub fn from_env(base_url: &str) -> Self {
        let timeout = std::env::var("HTTP_SOURCE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(10));

        let max_retries = std::env::var("HTTP_SOURCE_MAX_RETRIES")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(2);

        let initial_backoff = std::env::var("HTTP_SOURCE_RETRY_INITIAL_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or_else(|| Duration::from_millis(200));

        let max_backoff = std::env::var("HTTP_SOURCE_RETRY_MAX_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or_else(|| Duration::from_millis(2_000));

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            max_retries,
            initial_backoff,
            max_backoff,
        }
    }
}

/// Fetches documents from the public website over HTTP.
#[derive(Clone)]
pub struct HttpSource {
    config: HttpSourceConfig,
    http: reqwest::Client,
}

impl HttpSource {
    pub fn new(config: HttpSourceConfig) -> Result<Self, CommonError> {
        let http = reqwest::Client::builder()
            .user_agent("coir-site/content")
            .build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &HttpSourceConfig {
        &self.config
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path.trim_start_matches('/'))
    }

    async fn fetch_once(&self, url: &str, path: &str) -> Result<String, CommonError> {
        let resp = self
            .http
            .get(url)
            .timeout(self.config.timeout)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CommonError::Status {
                status,
                path: path.to_string(),
            });
        }
        Ok(resp.text().await?)
    }
}

#[async_trait::async_trait]
impl ContentSource for HttpSource {
    async fn fetch_text(&self, path: &str) -> Result<String, CommonError> {
        let url = self.url_for(path);
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.fetch_once(&url, path).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    if attempt > self.config.max_retries || !should_retry(&e) {
                        return Err(e);
                    }
                    let delay = backoff_delay(
                        self.config.initial_backoff,
                        self.config.max_backoff,
                        attempt - 1,
                    );
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis(),
                        error = %e,
                        url,
                        "content fetch failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

fn should_retry(err: &CommonError) -> bool {
    match err {
        CommonError::Request(e) => e.is_timeout() || e.is_connect() || e.is_body(),
        CommonError::Status { status, .. } => {
            *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
        }
        _ => false,
    }
}

fn backoff_delay(initial: Duration, max: Duration, exponent: u32) -> Duration {
    let mult = 1u128.checked_shl(exponent).unwrap_or(u128::MAX);
    let base_ms = initial.as_millis().saturating_mul(mult);
    let capped_ms = std::cmp::min(base_ms, max.as_millis()) as u64;
    let jitter_cap = std::cmp::max(1, capped_ms / 4);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0))
        .subsec_nanos() as u64;
    Duration::from_millis(capped_ms.saturating_add(nanos % (jitter_cap + 1)))
}

/// Reads documents from a local checkout of the website's public directory.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `path` under the root. Parent-directory components are rejected.
    fn resolve(&self, path: &str) -> Result<PathBuf, CommonError> {
        let rel = Path::new(path.trim_start_matches('/'));
        if rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(CommonError::NotFound(path.to_string()));
        }
        Ok(self.root.join(rel))
    }
}

#[async_trait::async_trait]
impl ContentSource for DirSource {
    async fn fetch_text(&self, path: &str) -> Result<String, CommonError> {
        let full = self.resolve(path)?;
        debug!(path = %full.display(), "reading content file");
        tokio::fs::read_to_string(&full)
            .await
            .map_err(|source| match source.kind() {
                std::io::ErrorKind::NotFound => CommonError::NotFound(path.to_string()),
                _ => CommonError::Io {
                    path: full.display().to_string(),
                    source,
                },
            })
    }
}

/// In-memory documents keyed by path. Counts every fetch, hit or miss.
#[derive(Debug, Default)]
pub struct MemorySource {
    docs: Mutex<HashMap<String, String>>,
    fetches: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, path: &str, text: &str) -> Self {
        self.insert(path, text);
        self
    }

    pub fn insert(&self, path: &str, text: &str) {
        self.docs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path.trim_start_matches('/').to_string(), text.to_string());
    }

    pub fn remove(&self, path: &str) {
        self.docs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(path.trim_start_matches('/'));
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ContentSource for MemorySource {
    async fn fetch_text(&self, path: &str) -> Result<String, CommonError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.docs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(path.trim_start_matches('/'))
            .cloned()
            .ok_or_else(|| CommonError::NotFound(path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dir_source_reads_relative_paths() {
        let dir = tempfile::tempdir().expect("tempdir");
        let pages = dir.path().join("content").join("pages");
        std::fs::create_dir_all(&pages).expect("create dirs");
        std::fs::write(pages.join("trang-chu.md"), "# Trang chủ\n").expect("write");

        let source = DirSource::new(dir.path());
        let text = source
            .fetch_text("/content/pages/trang-chu.md")
            .await
            .expect("file should be readable");
        assert_eq!(text, "# Trang chủ\n");
    }

    #[tokio::test]
    async fn dir_source_missing_file_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = DirSource::new(dir.path());
        let err = source.fetch_text("data/products.json").await.unwrap_err();
        assert!(matches!(err, CommonError::NotFound(_)));
    }

    #[tokio::test]
    async fn dir_source_rejects_parent_components() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = DirSource::new(dir.path());
        let err = source.fetch_text("../etc/passwd").await.unwrap_err();
        assert!(matches!(err, CommonError::NotFound(_)));
    }

    #[tokio::test]
    async fn memory_source_counts_fetches() {
        let source = MemorySource::new().with("data/banners.json", "{}");
        assert!(source.fetch_text("data/banners.json").await.is_ok());
        assert!(source.fetch_text("data/missing.json").await.is_err());
        assert_eq!(source.fetch_count(), 2);
    }

    #[test]
    fn backoff_is_capped() {
        let delay = backoff_delay(Duration::from_millis(200), Duration::from_millis(1_000), 10);
        assert!(delay <= Duration::from_millis(1_250));
        assert!(delay >= Duration::from_millis(1_000));
    }

    #[test]
    fn http_url_joins_without_double_slash() {
        let source = HttpSource::new(HttpSourceConfig::from_env("https://example.com/"))
            .expect("client builds");
        assert_eq!(
            source.url_for("/content/pages/trang-chu.md"),
            "https://example.com/content/pages/trang-chu.md"
        );
    }
}
