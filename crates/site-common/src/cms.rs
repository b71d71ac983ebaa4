/// Client for the CMS public API.
///
/// Every response is kept in a small in-memory cache. Fresh entries (younger than the
/// TTL) are served without a request; when a request fails and an older entry exists,
/// the stale entry is served instead. Only a miss with no entry at all surfaces the error.
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::error::CommonError;

const HEALTH_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Clone, Debug)]
pub struct CmsClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub cache_ttl: Duration,
}

impl CmsClientConfig {
    /// Returns `None` when `CMS_API_URL` is unset.
    ///
    /// Optional:
    /// - `CMS_TIMEOUT_MS` (default: 5000)
    /// - `CMS_CACHE_TTL_SECS` (default: 60)
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var("CMS_API_URL").ok()?;

        let timeout = std::env::var("CMS_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or_else(|| Duration::from_millis(5_000));

        let cache_ttl = std::env::var("CMS_CACHE_TTL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(60));

        Some(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            cache_ttl,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheStats {
    pub size: usize,
    pub keys: Vec<String>,
    pub ttl_secs: u64,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    #[serde(default)]
    status: Option<String>,
}

struct CacheEntry {
    data: Value,
    fetched_at: Instant,
}

#[derive(Clone)]
pub struct CmsClient {
    config: CmsClientConfig,
    http: reqwest::Client,
    cache: Arc<Mutex<HashMap<String, CacheEntry>>>,
}

impl CmsClient {
    pub fn new(config: CmsClientConfig) -> Result<Self, CommonError> {
        let http = reqwest::Client::builder()
            .user_agent("Website/1.0")
            .build()?;
        Ok(Self {
            config,
            http,
            cache: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    pub fn config(&self) -> &CmsClientConfig {
        &self.config
    }

    /// Homepage data. Rejects envelopes that do not report `success: true`.
    pub async fn home(&self) -> Result<Value, CommonError> {
        self.fetch_with_cache("home", || async move {
            let envelope = self.get_envelope("/public/home", &[]).await?;
            if envelope.success != Some(true) {
                return Err(CommonError::InvalidResponse(
                    "Invalid API response".to_string(),
                ));
            }
            Ok(envelope.data)
        })
        .await
    }

    pub async fn about(&self) -> Result<Value, CommonError> {
        self.fetch_with_cache("about", || async move {
            Ok(self.get_envelope("/public/about", &[]).await?.data)
        })
        .await
    }

    pub async fn products(&self) -> Result<Value, CommonError> {
        self.fetch_with_cache("products", || async move {
            Ok(self.get_envelope("/public/products", &[]).await?.data)
        })
        .await
    }

    pub async fn news(&self, page: u32, limit: u32) -> Result<Value, CommonError> {
        let key = format!("news_{page}_{limit}");
        self.fetch_with_cache(&key, || async move {
            let params = [("page", page.to_string()), ("limit", limit.to_string())];
            Ok(self.get_envelope("/public/news", &params).await?.data)
        })
        .await
    }

    pub async fn site_config(&self) -> Result<Value, CommonError> {
        self.fetch_with_cache("config", || async move {
            Ok(self.get_envelope("/public/config", &[]).await?.data)
        })
        .await
    }

    /// `true` when `/health` answers `{"status": "ok"}` within two seconds.
    pub async fn health_check(&self) -> bool {
        let url = format!("{}/health", self.config.base_url);
        let result = async {
            let resp = self.http.get(&url).timeout(HEALTH_TIMEOUT).send().await?;
            let body: HealthResponse = resp.json().await?;
            Ok::<_, CommonError>(body.status.as_deref() == Some("ok"))
        }
        .await;
        match result {
            Ok(ok) => ok,
            Err(e) => {
                error!(error = %e, "CMS health check failed");
                false
            }
        }
    }

    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear();
        info!("CMS client cache cleared");
    }

    pub async fn cache_stats(&self) -> CacheStats {
        let cache = self.cache.lock().await;
        let mut keys: Vec<String> = cache.keys().cloned().collect();
        keys.sort();
        CacheStats {
            size: cache.len(),
            keys,
            ttl_secs: self.config.cache_ttl.as_secs(),
        }
    }

    /// Serve `key` from cache when fresh, otherwise run `fetch`. A failed fetch falls
    /// back to the stale entry if there is one.
    pub async fn fetch_with_cache<F, Fut>(&self, key: &str, fetch: F) -> Result<Value, CommonError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, CommonError>>,
    {
        let now = Instant::now();
        let stale = {
            let cache = self.cache.lock().await;
            match cache.get(key) {
                Some(entry) if now.duration_since(entry.fetched_at) < self.config.cache_ttl => {
                    info!(key, "CMS cache hit");
                    return Ok(entry.data.clone());
                }
                Some(entry) => Some(entry.data.clone()),
                None => None,
            }
        };

        info!(key, "CMS cache miss, fetching");
        match fetch().await {
            Ok(data) => {
                self.cache.lock().await.insert(
                    key.to_string(),
                    CacheEntry {
                        data: data.clone(),
                        fetched_at: now,
                    },
                );
                Ok(data)
            }
            Err(e) => {
                error!(key, error = %e, "CMS fetch failed");
                match stale {
                    Some(data) => {
                        warn!(key, "serving stale CMS cache entry");
                        Ok(data)
                    }
                    None => Err(e),
                }
            }
        }
    }

    async fn get_envelope(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Envelope, CommonError> {
        let url = format!("{}{}", self.config.base_url, path);
        let resp = self
            .http
            .get(&url)
            .query(params)
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
        Ok(resp.json::<Envelope>().await?)
    }
}
