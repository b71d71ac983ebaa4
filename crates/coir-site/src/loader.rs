/// Page-level markdown loader and footer refresher.
///
/// Pages are fetched from `{content_base}pages/{page}.md`, scanned into
/// `PageContent` and memoised by page name. The homepage (`trang-chu`) carries the
/// contact block written into `[data-contact]` footer nodes, optionally on a timer.
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use sha2::{Digest, Sha256};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::{debug, error, info, warn};

use site_common::error::CommonError;
use site_common::source::ContentSource;

use crate::cache::ContentCache;
use crate::dom::{Document, SharedDocument};
use crate::model::Contact;
use crate::page::{parse_page_markdown, PageContent};

pub const HOME_PAGE: &str = "trang-chu";

pub struct MarkdownContentLoader {
    source: Arc<dyn ContentSource>,
    content_base: String,
    cache: ContentCache<Arc<PageContent>>,
    refresh_interval: Duration,
    auto_refresh: Mutex<Option<JoinHandle<()>>>,
}

impl MarkdownContentLoader {
    pub fn new(
        source: Arc<dyn ContentSource>,
        content_base: &str,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            source,
            content_base: content_base.to_string(),
            cache: ContentCache::new(),
            refresh_interval,
            auto_refresh: Mutex::new(None),
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    fn page_path(&self, page: &str) -> String {
        format!("{}pages/{page}.md", self.content_base)
    }

    /// Memoised page content. Fetch failures are logged and yield `None`.
    pub async fn load_page_content(&self, page: &str) -> Option<Arc<PageContent>> {
        self.try_load_page_content(page)
            .await
            .inspect_err(|e| error!(page, error = %e, "failed to load page markdown"))
            .ok()
    }

    pub async fn try_load_page_content(&self, page: &str) -> Result<Arc<PageContent>, CommonError> {
        if let Some(cached) = self.cache.get(page).await {
            return Ok(cached);
        }
        let (content, _) = self.fetch_page(page).await?;
        Ok(content)
    }

    /// Fetches and parses `page` regardless of the memo, then stores the result.
    /// Returns the content together with the SHA-256 of the raw markdown.
    async fn fetch_page(&self, page: &str) -> Result<(Arc<PageContent>, String), CommonError> {
        let markdown = self.source.fetch_text(&self.page_path(page)).await?;
        let digest = format!("{:x}", Sha256::digest(markdown.as_bytes()));
        let content = Arc::new(parse_page_markdown(&markdown));
        self.cache.set(page, Arc::clone(&content)).await;
        Ok((content, digest))
    }

    pub async fn cached_content(&self, page: &str) -> Option<Arc<PageContent>> {
        self.cache.get(page).await
    }

    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    /// Writes the homepage contact block into the footer. `false` when the homepage
    /// could not be loaded.
    pub async fn update_footer_from_markdown(&self, dom: &SharedDocument) -> bool {
        let Some(content) = self.load_page_content(HOME_PAGE).await else {
            return false;
        };
        apply_contact(&mut *dom.lock().await, &content.contact);
        info!(contact = ?content.contact, "footer updated from markdown");
        true
    }

    pub async fn refresh(&self, dom: &SharedDocument) -> bool {
        self.cache.clear().await;
        let updated = self.update_footer_from_markdown(dom).await;
        info!(updated, "manual refresh completed");
        updated
    }

    /// Starts the recurring footer refresh. The first tick fires one interval after
    /// the call. Starting again replaces the running timer.
    pub fn start_auto_refresh(self: &Arc<Self>, dom: SharedDocument) {
        let mut slot = self
            .auto_refresh
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(previous) = slot.take() {
            previous.abort();
        }

        let period = self.refresh_interval;
        let loader: Weak<Self> = Arc::downgrade(self);
        *slot = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            let mut last_digest: Option<String> = None;
            loop {
                ticker.tick().await;
                let Some(loader) = loader.upgrade() else {
                    break;
                };
                match loader.fetch_page(HOME_PAGE).await {
                    Ok((content, digest)) => {
                        let changed = last_digest.as_ref().is_some_and(|d| *d != digest);
                        if changed {
                            info!(page = HOME_PAGE, "homepage markdown changed");
                        } else {
                            debug!(page = HOME_PAGE, "homepage markdown unchanged");
                        }
                        last_digest = Some(digest);
                        apply_contact(&mut *dom.lock().await, &content.contact);
                    }
                    Err(e) => warn!(page = HOME_PAGE, error = %e, "auto-refresh fetch failed"),
                }
            }
        }));
        info!(interval_ms = period.as_millis() as u64, "auto-refresh started");
    }

    pub fn stop_auto_refresh(&self) {
        let mut slot = self
            .auto_refresh
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(handle) = slot.take() {
            handle.abort();
            info!("auto-refresh stopped");
        }
    }

    pub fn is_auto_refreshing(&self) -> bool {
        self.auto_refresh
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }
}

impl Drop for MarkdownContentLoader {
    fn drop(&mut self) {
        self.stop_auto_refresh();
    }
}

/// Writes each present, non-empty contact field into `[data-contact=<field>]`
/// nodes. Phone links drop dots and whitespace from the number.
fn apply_contact(doc: &mut Document, contact: &Contact) {
    if let Some(phone) = contact.phone.as_deref().filter(|p| !p.is_empty()) {
        let dial: String = phone
            .chars()
            .filter(|c| *c != '.' && !c.is_whitespace())
            .collect();
        for el in doc.select_data_mut("contact", Some("phone")) {
            el.set_text(phone);
            if el.is_anchor() {
                el.href = Some(format!("tel:{dial}"));
            }
        }
    }
    if let Some(email) = contact.email.as_deref().filter(|e| !e.is_empty()) {
        for el in doc.select_data_mut("contact", Some("email")) {
            el.set_text(email);
            if el.is_anchor() {
                el.href = Some(format!("mailto:{email}"));
            }
        }
    }
    if let Some(address) = contact.address.as_deref().filter(|a| !a.is_empty()) {
        for el in doc.select_data_mut("contact", Some("address")) {
            el.set_text(address);
        }
    }
}
