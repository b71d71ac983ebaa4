/// Tiered content resolution: markdown, then JSON, then built-in defaults.
///
/// The first tier that yields valid content wins. Tier errors are logged and
/// treated like missing content, so a caller always gets something to render.
/// The outcome is reported three ways: the returned `Resolved.status`, the
/// synchronous `status()` snapshot, and `ContentUpdate` events on `subscribe()`.
use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::warn;

use crate::dom::{escape_html, SharedDocument};
use crate::error::AppError;
use crate::model::{Contact, Product, Testimonial, DEFAULT_PRODUCT_CATEGORY, DEFAULT_PRODUCT_PRICE};
use crate::status::{ContentUpdate, StatusReport, StatusTracker, UpdateStatus};

const FALLBACK_PHONE: &str = "0984.288.512";
const FALLBACK_EMAIL: &str = "munduahoanghieu.vn@gmail.com";
const FALLBACK_ADDRESS: &str = "Ấp Hội An, Xã Đa Phước Hội, Huyện Mỏ Cày Nam, Tỉnh Bến Tre";
const FALLBACK_TITLE: &str = "MỤN DỪA HOÀNG HIẾU";
const FALLBACK_SUBTITLE: &str = "GIẢI PHÁP NÔNG NGHIỆP XANH";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ContentKind {
    Contact,
    Products {
        #[serde(default)]
        category: Option<String>,
    },
    Testimonials {
        #[serde(default)]
        limit: Option<usize>,
    },
    Page {
        name: String,
    },
}

impl ContentKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Contact => "contact",
            Self::Products { .. } => "products",
            Self::Testimonials { .. } => "testimonials",
            Self::Page { .. } => "page",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(tag = "kind", content = "data", rename_all = "kebab-case")]
pub enum Content {
    Contact(Contact),
    Products(Vec<Product>),
    Testimonials(Vec<Testimonial>),
    Page(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct Resolved {
    pub content: Content,
    pub status: UpdateStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct RefreshOutcome {
    pub footer: bool,
    pub products: UpdateStatus,
    pub testimonials: UpdateStatus,
    pub successful: usize,
}

/// The two fetchable tiers. `Ok(None)` means the tier has nothing for `kind`;
/// `Err` means the tier could not be read at all.
#[async_trait::async_trait]
pub trait ContentTiers: Send + Sync {
    async fn markdown_tier(&self, kind: &ContentKind) -> Result<Option<Content>, AppError>;

    async fn json_tier(&self, kind: &ContentKind) -> Result<Option<Content>, AppError>;

    /// Drops every memoised document so the next resolution refetches.
    async fn clear_caches(&self);
}

pub fn is_valid_content(content: &Content) -> bool {
    match content {
        Content::Contact(contact) => [&contact.phone, &contact.email, &contact.address]
            .into_iter()
            .any(|field| field.as_deref().is_some_and(|v| !v.is_empty())),
        Content::Products(products) => !products.is_empty(),
        Content::Testimonials(testimonials) => !testimonials.is_empty(),
        Content::Page(value) => !value.is_null(),
    }
}

pub fn hardcoded_fallback(kind: &ContentKind) -> Content {
    match kind {
        ContentKind::Contact => Content::Contact(Contact {
            phone: Some(FALLBACK_PHONE.to_string()),
            email: Some(FALLBACK_EMAIL.to_string()),
            address: Some(FALLBACK_ADDRESS.to_string()),
            title: Some(FALLBACK_TITLE.to_string()),
            subtitle: Some(FALLBACK_SUBTITLE.to_string()),
            slogan: None,
        }),
        ContentKind::Products { .. } => Content::Products(vec![
            fallback_product(
                "mun-dua-xu-ly",
                "Mụn dừa đã xử lý",
                "Tỷ lệ xơ-mụn đáp ứng theo yêu cầu của bạn",
            ),
            fallback_product(
                "xo-dua-tu-nhien",
                "Xơ dừa tự nhiên",
                "Xơ dừa nguyên chất, không pha trộn",
            ),
        ]),
        ContentKind::Testimonials { .. } => Content::Testimonials(vec![Testimonial {
            id: "khach-hang-1".to_string(),
            name: "Chị Mai Lan".to_string(),
            location: "TP.HCM".to_string(),
            content: "Mụn dừa của bác Hiếu rất sạch và chất lượng. Cây lan của tôi phát triển rất tốt sau khi dùng.".to_string(),
            product: "Xơ dừa tự nhiên".to_string(),
            ..Testimonial::default()
        }]),
        ContentKind::Page { .. } => Content::Page(Value::Object(Default::default())),
    }
}

fn fallback_product(id: &str, name: &str, description: &str) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        price: DEFAULT_PRODUCT_PRICE.to_string(),
        category: DEFAULT_PRODUCT_CATEGORY.to_string(),
        ..Product::default()
    }
}

pub struct SafeContentManager<T> {
    tiers: Arc<T>,
    status: StatusTracker,
}

impl<T: ContentTiers> SafeContentManager<T> {
    pub fn new(tiers: Arc<T>) -> Self {
        Self {
            tiers,
            status: StatusTracker::new(),
        }
    }

    pub fn tiers(&self) -> &Arc<T> {
        &self.tiers
    }

    pub async fn safe_load_content(&self, kind: &ContentKind) -> Resolved {
        let label = kind.label();
        self.status.set(UpdateStatus::Loading);
        self.status.publish(format!("Loading {label}"));

        let markdown_failed = match self.tiers.markdown_tier(kind).await {
            Ok(Some(content)) if is_valid_content(&content) => {
                self.status.mark_updated();
                return self.settle(
                    content,
                    UpdateStatus::Success,
                    format!("Loaded {label} from markdown successfully"),
                );
            }
            Ok(_) => false,
            Err(e) => {
                warn!(kind = label, error = %e, "markdown tier failed");
                true
            }
        };
        self.status.publish(format!("Markdown failed, trying JSON for {label}"));

        let json_failed = match self.tiers.json_tier(kind).await {
            Ok(Some(content)) if is_valid_content(&content) => {
                return self.settle(
                    content,
                    UpdateStatus::JsonFallback,
                    format!("Loaded {label} from JSON fallback"),
                );
            }
            Ok(_) => false,
            Err(e) => {
                warn!(kind = label, error = %e, "JSON tier failed");
                true
            }
        };

        let content = hardcoded_fallback(kind);
        if markdown_failed && json_failed {
            self.settle(
                content,
                UpdateStatus::Error,
                format!("Error loading {label}, using hardcoded fallback"),
            )
        } else {
            self.settle(
                content,
                UpdateStatus::HardcodedFallback,
                format!("JSON failed, using hardcoded fallback for {label}"),
            )
        }
    }

    fn settle(&self, content: Content, status: UpdateStatus, message: String) -> Resolved {
        self.status.set(status);
        self.status.publish(message);
        Resolved { content, status }
    }

    /// Resolves the contact block and writes it into `[data-contact]` nodes. The
    /// address is written as markup with a line break after each comma.
    pub async fn update_footer_safely(&self, dom: &SharedDocument) -> bool {
        let resolved = self.safe_load_content(&ContentKind::Contact).await;
        let Content::Contact(contact) = resolved.content else {
            self.status.publish("No valid contact data found");
            return false;
        };

        {
            let mut doc = dom.lock().await;
            if let Some(phone) = contact.phone.as_deref().filter(|p| !p.is_empty()) {
                let dial: String = phone
                    .chars()
                    .filter(|c| !matches!(c, '.' | '-') && !c.is_whitespace())
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
                let html = escape_html(address).replace(',', ",<br>");
                for el in doc.select_data_mut("contact", Some("address")) {
                    el.set_inner_html(html.clone());
                }
            }
        }

        self.status.publish(format!(
            "Footer updated successfully ({})",
            resolved.status.message()
        ));
        true
    }

    pub fn status(&self) -> StatusReport {
        self.status.report()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ContentUpdate> {
        self.status.subscribe()
    }

    /// Clears every cache, then re-resolves the footer, products and testimonials
    /// concurrently.
    pub async fn force_refresh(&self, dom: &SharedDocument) -> RefreshOutcome {
        self.tiers.clear_caches().await;

        let products_kind = ContentKind::Products { category: None };
        let testimonials_kind = ContentKind::Testimonials { limit: None };
        let (footer, products, testimonials) = futures::join!(
            self.update_footer_safely(dom),
            self.safe_load_content(&products_kind),
            self.safe_load_content(&testimonials_kind),
        );

        let successful = usize::from(footer)
            + usize::from(is_valid_content(&products.content))
            + usize::from(is_valid_content(&testimonials.content));
        self.status
            .publish(format!("Force refresh completed - {successful}/3 successful"));

        RefreshOutcome {
            footer,
            products: products.status,
            testimonials: testimonials.status,
            successful,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use site_common::source::MemorySource;

    use super::*;
    use crate::config::Config;
    use crate::content::ContentManager;
    use crate::dom::{Document, Element};

    #[derive(Clone)]
    enum Tier {
        Has(Content),
        Missing,
        Fails,
    }

    impl Tier {
        /// Content is only served for the kind it belongs to.
        fn answer(&self, name: &str, kind: &ContentKind) -> Result<Option<Content>, AppError> {
            match self {
                Tier::Has(content) if kind_of(content) == kind.label() => Ok(Some(content.clone())),
                Tier::Has(_) | Tier::Missing => Ok(None),
                Tier::Fails => Err(AppError::Unavailable(name.to_string())),
            }
        }
    }

    fn kind_of(content: &Content) -> &'static str {
        match content {
            Content::Contact(_) => "contact",
            Content::Products(_) => "products",
            Content::Testimonials(_) => "testimonials",
            Content::Page(_) => "page",
        }
    }

    struct FakeTiers {
        markdown: Tier,
        json: Tier,
        cleared: AtomicUsize,
    }

    impl FakeTiers {
        fn new(markdown: Tier, json: Tier) -> Arc<Self> {
            Arc::new(Self {
                markdown,
                json,
                cleared: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait::async_trait]
    impl ContentTiers for FakeTiers {
        async fn markdown_tier(&self, kind: &ContentKind) -> Result<Option<Content>, AppError> {
            self.markdown.answer("markdown", kind)
        }

        async fn json_tier(&self, kind: &ContentKind) -> Result<Option<Content>, AppError> {
            self.json.answer("json", kind)
        }

        async fn clear_caches(&self) {
            self.cleared.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn products(names: &[&str]) -> Content {
        Content::Products(
            names
                .iter()
                .map(|n| Product::named(n.to_string(), n))
                .collect(),
        )
    }

    const ALL: ContentKind = ContentKind::Products { category: None };

    #[tokio::test]
    async fn markdown_tier_wins_when_valid() {
        let safe = SafeContentManager::new(FakeTiers::new(
            Tier::Has(products(&["md"])),
            Tier::Has(products(&["json"])),
        ));
        let resolved = safe.safe_load_content(&ALL).await;
        assert_eq!(resolved.status, UpdateStatus::Success);
        assert_eq!(resolved.content, products(&["md"]));
        assert!(safe.status().last_update.is_some());
    }

    #[tokio::test]
    async fn empty_markdown_falls_through_to_json() {
        let safe = SafeContentManager::new(FakeTiers::new(
            Tier::Has(products(&[])),
            Tier::Has(products(&["json"])),
        ));
        let resolved = safe.safe_load_content(&ALL).await;
        assert_eq!(resolved.status, UpdateStatus::JsonFallback);
        assert_eq!(resolved.content, products(&["json"]));
        assert_eq!(safe.status().status, UpdateStatus::JsonFallback);
        assert!(safe.status().last_update.is_none());
    }

    #[tokio::test]
    async fn nothing_valid_ends_in_hardcoded_defaults() {
        let safe = SafeContentManager::new(FakeTiers::new(Tier::Fails, Tier::Missing));
        let resolved = safe.safe_load_content(&ALL).await;
        assert_eq!(resolved.status, UpdateStatus::HardcodedFallback);
        assert_eq!(resolved.content, hardcoded_fallback(&ALL));
        assert_eq!(
            safe.status().message,
            "Using hardcoded fallback (all sources failed)"
        );
    }

    #[tokio::test]
    async fn empty_json_list_after_markdown_error_is_hardcoded() {
        let safe = SafeContentManager::new(FakeTiers::new(
            Tier::Fails,
            Tier::Has(products(&[])),
        ));
        let resolved = safe.safe_load_content(&ALL).await;
        assert_eq!(resolved.status, UpdateStatus::HardcodedFallback);
        assert_eq!(resolved.content, hardcoded_fallback(&ALL));
    }

    #[tokio::test]
    async fn both_tiers_failing_reports_error() {
        let safe = SafeContentManager::new(FakeTiers::new(Tier::Fails, Tier::Fails));
        let kind = ContentKind::Testimonials { limit: Some(3) };
        let resolved = safe.safe_load_content(&kind).await;
        assert_eq!(resolved.status, UpdateStatus::Error);
        match resolved.content {
            Content::Testimonials(list) => assert_eq!(list[0].name, "Chị Mai Lan"),
            other => panic!("unexpected content: {other:?}"),
        }
    }

    #[tokio::test]
    async fn each_step_is_published() {
        let safe = SafeContentManager::new(FakeTiers::new(
            Tier::Missing,
            Tier::Has(products(&["json"])),
        ));
        let mut rx = safe.subscribe();
        safe.safe_load_content(&ALL).await;

        let mut statuses = Vec::new();
        while let Ok(update) = rx.try_recv() {
            statuses.push(update.status);
        }
        assert_eq!(
            statuses,
            vec![
                UpdateStatus::Loading,
                UpdateStatus::Loading,
                UpdateStatus::JsonFallback,
            ]
        );
    }

    #[test]
    fn content_validity() {
        assert!(!is_valid_content(&Content::Contact(Contact::default())));
        assert!(!is_valid_content(&Content::Contact(Contact {
            phone: Some(String::new()),
            title: Some("MỤN DỪA".to_string()),
            ..Contact::default()
        })));
        assert!(is_valid_content(&Content::Contact(Contact {
            address: Some("Bến Tre".to_string()),
            ..Contact::default()
        })));
        assert!(!is_valid_content(&products(&[])));
        assert!(is_valid_content(&products(&["x"])));
        assert!(!is_valid_content(&Content::Testimonials(Vec::new())));
        assert!(!is_valid_content(&Content::Page(Value::Null)));
        assert!(is_valid_content(&Content::Page(serde_json::json!({}))));
        assert!(is_valid_content(&hardcoded_fallback(&ContentKind::Contact)));
    }

    fn footer() -> SharedDocument {
        Document::new()
            .with(Element::new("a").with_data("contact", "phone"))
            .with(Element::new("a").with_data("contact", "email"))
            .with(Element::new("p").with_data("contact", "address"))
            .shared()
    }

    #[tokio::test]
    async fn footer_falls_back_to_hardcoded_contact() {
        let source = Arc::new(MemorySource::new());
        let cm = Arc::new(ContentManager::new(source, &Config::default()));
        let safe = SafeContentManager::new(cm);
        let dom = footer();

        assert!(safe.update_footer_safely(&dom).await);
        assert_eq!(safe.status().status, UpdateStatus::Error);

        let doc = dom.lock().await;
        let els = doc.elements();
        assert_eq!(els[0].text, "0984.288.512");
        assert_eq!(els[0].href.as_deref(), Some("tel:0984288512"));
        assert_eq!(els[1].href.as_deref(), Some("mailto:munduahoanghieu.vn@gmail.com"));
        assert_eq!(
            els[2].inner_html,
            "Ấp Hội An,<br> Xã Đa Phước Hội,<br> Huyện Mỏ Cày Nam,<br> Tỉnh Bến Tre"
        );
    }

    #[tokio::test]
    async fn homepage_markdown_contact_is_the_first_tier() {
        let source = Arc::new(MemorySource::new().with(
            "content/pages/trang-chu.md",
            "## Liên hệ\n**Hotline**: 0909-123 456\n",
        ));
        let cm = Arc::new(ContentManager::new(source, &Config::default()));
        let safe = SafeContentManager::new(cm);
        let dom = footer();

        assert!(safe.update_footer_safely(&dom).await);
        assert_eq!(safe.status().status, UpdateStatus::Success);
        let doc = dom.lock().await;
        assert_eq!(doc.elements()[0].href.as_deref(), Some("tel:0909123456"));
        // Email absent from markdown: node untouched.
        assert!(doc.elements()[1].href.is_none());
    }

    #[tokio::test]
    async fn contact_json_tier_reads_company_document() {
        let source = Arc::new(MemorySource::new().with(
            "data/company.json",
            r#"{"company": {"contact": {"email": "info@coir.vn"}}}"#,
        ));
        let cm = Arc::new(ContentManager::new(source, &Config::default()));
        let safe = SafeContentManager::new(cm);

        let resolved = safe.safe_load_content(&ContentKind::Contact).await;
        assert_eq!(resolved.status, UpdateStatus::JsonFallback);
        match resolved.content {
            Content::Contact(c) => assert_eq!(c.email.as_deref(), Some("info@coir.vn")),
            other => panic!("unexpected content: {other:?}"),
        }
    }

    #[tokio::test]
    async fn force_refresh_clears_caches_and_resolves_all_three() {
        let tiers = FakeTiers::new(Tier::Missing, Tier::Has(products(&["json"])));
        let safe = SafeContentManager::new(Arc::clone(&tiers));
        let dom = footer();

        let outcome = safe.force_refresh(&dom).await;
        assert_eq!(tiers.cleared.load(Ordering::SeqCst), 1);
        assert!(outcome.footer);
        assert_eq!(outcome.products, UpdateStatus::JsonFallback);
        assert_eq!(outcome.successful, 3);
    }
}
