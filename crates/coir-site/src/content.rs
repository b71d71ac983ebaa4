/// JSON- and markdown-backed content access for the site pages.
///
/// JSON documents live at `{data_base}{file}.json`, markdown data documents at
/// `{content_base}data/{file}.md`. Both are memoised for the life of the manager:
/// - `{file}`: parsed JSON document
/// - `md_{file}_{kind}`: markdown document converted to `kind`
///
/// Every public accessor fails soft: transport and decode errors are logged and
/// read as "no content". The fallible `ContentTiers` implementation at the bottom
/// is what the safe resolution policy builds on.
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use site_common::error::CommonError;
use site_common::source::ContentSource;

use crate::cache::{markdown_key, ContentCache};
use crate::config::Config;
use crate::dom::{escape_html, SharedDocument};
use crate::error::AppError;
use crate::loader::{MarkdownContentLoader, HOME_PAGE};
use crate::markdown::{convert_to_products, convert_to_testimonials, MarkdownParser, ParsedDocument};
use crate::model::{
    Banner, BannersDoc, CompanyDoc, CompanyInfo, Product, ProductsDoc, Testimonial,
    TestimonialsDoc,
};
use crate::safe::{Content, ContentKind, ContentTiers};

pub const PRODUCTS_MARKDOWN: &str = "san-pham";
pub const TESTIMONIALS_MARKDOWN: &str = "chung-thuc-khach-hang";
pub const DEFAULT_TESTIMONIAL_LIMIT: usize = 4;

const DEFAULT_COMPANY_NAME: &str = "MỤN DỪA HOÀNG HIẾU";
const DEFAULT_COMPANY_TAGLINE: &str = "Giá thể sạch - Năng suất vượt trội";
const DEFAULT_COMPANY_PHONE: &str = "0984288512";
const DEFAULT_COMPANY_EMAIL: &str = "munduahoanghieu.vn@gmail.com";
const SOCIAL_NETWORKS: [&str; 4] = ["facebook", "zalo", "whatsapp", "youtube"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkdownKind {
    Raw,
    Products,
    Testimonials,
}

impl MarkdownKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Products => "products",
            Self::Testimonials => "testimonials",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MarkdownContent {
    Raw(Arc<ParsedDocument>),
    Products(Vec<Product>),
    Testimonials(Vec<Testimonial>),
}

pub struct ContentManager {
    source: Arc<dyn ContentSource>,
    data_base: String,
    content_base: String,
    json_cache: ContentCache<Arc<Value>>,
    markdown_cache: ContentCache<MarkdownContent>,
    parser: MarkdownParser,
    pages: Arc<MarkdownContentLoader>,
}

impl ContentManager {
    pub fn new(source: Arc<dyn ContentSource>, config: &Config) -> Self {
        Self {
            parser: MarkdownParser::new(Arc::clone(&source)),
            pages: Arc::new(MarkdownContentLoader::new(
                Arc::clone(&source),
                &config.content_base,
                config.refresh_interval,
            )),
            source,
            data_base: config.data_base.clone(),
            content_base: config.content_base.clone(),
            json_cache: ContentCache::new(),
            markdown_cache: ContentCache::new(),
        }
    }

    /// The page loader sharing this manager's source.
    pub fn pages(&self) -> &Arc<MarkdownContentLoader> {
        &self.pages
    }

    // --- JSON documents ---

    pub async fn load_data(&self, file: &str) -> Option<Arc<Value>> {
        self.try_load_data(file)
            .await
            .inspect_err(|e| error!(file, error = %e, "error loading JSON document"))
            .ok()
    }

    pub async fn try_load_data(&self, file: &str) -> Result<Arc<Value>, CommonError> {
        if let Some(cached) = self.json_cache.get(file).await {
            return Ok(cached);
        }
        let path = format!("{}{file}.json", self.data_base);
        let text = self.source.fetch_text(&path).await?;
        let value = Arc::new(serde_json::from_str::<Value>(&text)?);
        self.json_cache.set(file, Arc::clone(&value)).await;
        debug!(file, "loaded JSON document");
        Ok(value)
    }

    async fn try_document<T: DeserializeOwned>(&self, file: &str) -> Result<T, CommonError> {
        let value = self.try_load_data(file).await?;
        Ok(T::deserialize(value.as_ref())?)
    }

    async fn document<T: DeserializeOwned + Default>(&self, file: &str) -> T {
        match self.try_document(file).await {
            Ok(doc) => doc,
            Err(e) => {
                warn!(file, error = %e, "JSON document unavailable, using empty default");
                T::default()
            }
        }
    }

    /// Active banners only.
    pub async fn banners(&self) -> Vec<Banner> {
        let doc: BannersDoc = self.document("banners").await;
        doc.banners.into_iter().filter(|b| b.active).collect()
    }

    pub async fn products(&self, category: Option<&str>) -> Vec<Product> {
        let doc: ProductsDoc = self.document("products").await;
        filter_category(doc.products, category)
    }

    pub async fn testimonials(&self, limit: Option<usize>) -> Vec<Testimonial> {
        let doc: TestimonialsDoc = self.document("testimonials").await;
        apply_limit(doc.testimonials, limit)
    }

    pub async fn company_info(&self) -> CompanyInfo {
        let doc: CompanyDoc = self.document("company").await;
        doc.company
    }

    /// Entry `page` of `pages.json`, or an empty object.
    pub async fn page_content(&self, page: &str) -> Value {
        self.load_data("pages")
            .await
            .and_then(|pages| pages.get(page).cloned())
            .unwrap_or_else(|| Value::Object(Default::default()))
    }

    // --- Markdown documents ---

    pub async fn load_markdown_content(
        &self,
        file: &str,
        kind: MarkdownKind,
    ) -> Option<MarkdownContent> {
        self.try_load_markdown_content(file, kind)
            .await
            .inspect_err(|e| {
                error!(file, kind = kind.as_str(), error = %e, "error loading markdown content")
            })
            .ok()
    }

    pub async fn try_load_markdown_content(
        &self,
        file: &str,
        kind: MarkdownKind,
    ) -> Result<MarkdownContent, CommonError> {
        let key = markdown_key(file, kind.as_str());
        if let Some(cached) = self.markdown_cache.get(&key).await {
            return Ok(cached);
        }

        let path = format!("{}data/{file}.md", self.content_base);
        let parsed = self.parser.try_load_markdown_file(&path).await?;
        let content = match kind {
            MarkdownKind::Raw => MarkdownContent::Raw(parsed),
            MarkdownKind::Products => MarkdownContent::Products(convert_to_products(&parsed)),
            MarkdownKind::Testimonials => {
                MarkdownContent::Testimonials(convert_to_testimonials(&parsed))
            }
        };
        self.markdown_cache.set(&key, content.clone()).await;
        Ok(content)
    }

    async fn try_markdown_products(&self) -> Result<Vec<Product>, CommonError> {
        match self
            .try_load_markdown_content(PRODUCTS_MARKDOWN, MarkdownKind::Products)
            .await?
        {
            MarkdownContent::Products(products) => Ok(products),
            _ => Ok(Vec::new()),
        }
    }

    async fn try_markdown_testimonials(&self) -> Result<Vec<Testimonial>, CommonError> {
        match self
            .try_load_markdown_content(TESTIMONIALS_MARKDOWN, MarkdownKind::Testimonials)
            .await?
        {
            MarkdownContent::Testimonials(testimonials) => Ok(testimonials),
            _ => Ok(Vec::new()),
        }
    }

    /// Markdown products when there are any, otherwise the JSON catalogue.
    pub async fn products_from_markdown(&self, category: Option<&str>) -> Vec<Product> {
        match self.try_markdown_products().await {
            Ok(products) if !products.is_empty() => filter_category(products, category),
            Ok(_) => self.products(category).await,
            Err(e) => {
                warn!(error = %e, "markdown products unavailable, using JSON");
                self.products(category).await
            }
        }
    }

    /// Markdown testimonials when there are any, otherwise the JSON list.
    pub async fn testimonials_from_markdown(&self, limit: Option<usize>) -> Vec<Testimonial> {
        match self.try_markdown_testimonials().await {
            Ok(testimonials) if !testimonials.is_empty() => apply_limit(testimonials, limit),
            Ok(_) => self.testimonials(limit).await,
            Err(e) => {
                warn!(error = %e, "markdown testimonials unavailable, using JSON");
                self.testimonials(limit).await
            }
        }
    }

    // --- Rendering ---

    pub async fn render_banners(&self, dom: &SharedDocument, container_id: &str) -> bool {
        let banners = self.banners().await;
        if banners.is_empty() {
            return false;
        }
        let mut doc = dom.lock().await;
        let Some(container) = doc.element_by_id_mut(container_id) else {
            return false;
        };
        container.set_inner_html(banners.iter().map(banner_html).collect());
        true
    }

    pub async fn render_products(
        &self,
        dom: &SharedDocument,
        container_id: &str,
        category: Option<&str>,
        limit: Option<usize>,
    ) -> bool {
        let products = apply_limit(self.products(category).await, limit);
        if products.is_empty() {
            return false;
        }
        let mut doc = dom.lock().await;
        let Some(container) = doc.element_by_id_mut(container_id) else {
            return false;
        };
        container.set_inner_html(products.iter().map(product_html).collect());
        true
    }

    pub async fn render_testimonials(
        &self,
        dom: &SharedDocument,
        container_id: &str,
        limit: usize,
    ) -> bool {
        let testimonials = self.testimonials(Some(limit)).await;
        if testimonials.is_empty() {
            return false;
        }
        let mut doc = dom.lock().await;
        let Some(container) = doc.element_by_id_mut(container_id) else {
            return false;
        };
        container.set_inner_html(testimonials.iter().map(testimonial_html).collect());
        true
    }

    /// Company name, tagline, hotline, email and social links from `company.json`,
    /// with built-in defaults for the text fields.
    pub async fn update_footer(&self, dom: &SharedDocument) {
        let company = self.company_info().await;
        let contact = company.contact.clone().unwrap_or_default();
        let name = company.name.as_deref().unwrap_or(DEFAULT_COMPANY_NAME);
        let tagline = company.tagline.as_deref().unwrap_or(DEFAULT_COMPANY_TAGLINE);
        let phone = contact.phone.as_deref().unwrap_or(DEFAULT_COMPANY_PHONE);
        let email = contact.email.as_deref().unwrap_or(DEFAULT_COMPANY_EMAIL);

        let mut doc = dom.lock().await;
        for el in doc.select_data_mut("company-name", None) {
            el.set_text(name);
        }
        for el in doc.select_data_mut("company-tagline", None) {
            el.set_text(tagline);
        }
        for el in doc.select_data_mut("company-phone", None) {
            el.set_text(&format!("Hotline: {phone}"));
            el.href = Some(format!("tel:{phone}"));
        }
        for el in doc.select_data_mut("company-email", None) {
            el.set_text(email);
        }
        for network in SOCIAL_NETWORKS {
            let Some(link) = company.social_media.get(network) else {
                continue;
            };
            if let Some(el) = doc.first_data_mut(&format!("social-{network}")) {
                el.href = Some(link.url.clone());
                el.title = Some(link.name.clone());
            }
        }
    }

    /// Empties the JSON cache, the converted markdown cache and the parser memo.
    pub async fn clear_cache(&self) {
        self.json_cache.clear().await;
        self.markdown_cache.clear().await;
        self.parser.clear_cache().await;
        info!("content caches cleared");
    }
}

#[async_trait::async_trait]
impl ContentTiers for ContentManager {
    async fn markdown_tier(&self, kind: &ContentKind) -> Result<Option<Content>, AppError> {
        let content = match kind {
            ContentKind::Contact => {
                let page = self.pages.try_load_page_content(HOME_PAGE).await?;
                Content::Contact(page.contact.clone())
            }
            ContentKind::Products { category } => Content::Products(filter_category(
                self.try_markdown_products().await?,
                category.as_deref(),
            )),
            ContentKind::Testimonials { limit } => Content::Testimonials(apply_limit(
                self.try_markdown_testimonials().await?,
                *limit,
            )),
            ContentKind::Page { name } => {
                let page = self.pages.try_load_page_content(name).await?;
                Content::Page(serde_json::to_value(page.as_ref()).map_err(CommonError::from)?)
            }
        };
        Ok(Some(content))
    }

    async fn json_tier(&self, kind: &ContentKind) -> Result<Option<Content>, AppError> {
        let content = match kind {
            ContentKind::Contact => {
                let doc: CompanyDoc = self.try_document("company").await?;
                doc.company.contact.map(Content::Contact)
            }
            ContentKind::Products { category } => {
                let doc: ProductsDoc = self.try_document("products").await?;
                Some(Content::Products(filter_category(doc.products, category.as_deref())))
            }
            ContentKind::Testimonials { limit } => {
                let doc: TestimonialsDoc = self.try_document("testimonials").await?;
                Some(Content::Testimonials(apply_limit(doc.testimonials, *limit)))
            }
            ContentKind::Page { name } => {
                let pages = self.try_load_data("pages").await?;
                pages.get(name.as_str()).cloned().map(Content::Page)
            }
        };
        Ok(content)
    }

    async fn clear_caches(&self) {
        self.clear_cache().await;
        self.pages.clear_cache().await;
    }
}

fn filter_category(products: Vec<Product>, category: Option<&str>) -> Vec<Product> {
    match category {
        Some(category) if !category.is_empty() => products
            .into_iter()
            .filter(|p| p.category == category)
            .collect(),
        _ => products,
    }
}

/// A limit of zero means no limit.
fn apply_limit<T>(mut items: Vec<T>, limit: Option<usize>) -> Vec<T> {
    if let Some(limit) = limit.filter(|&n| n > 0) {
        items.truncate(limit);
    }
    items
}

fn banner_html(banner: &Banner) -> String {
    format!(
        r#"<div class="slide" data-image="{image}"><h2 class="slide-title">{title}</h2><p class="slide-subtitle">{subtitle}</p></div>"#,
        image = escape_html(&banner.image),
        title = escape_html(&banner.title),
        subtitle = escape_html(&banner.subtitle),
    )
}

fn product_html(product: &Product) -> String {
    let features: String = product
        .features
        .iter()
        .map(|f| {
            format!(
                r#"<li class="flex items-center text-gray-700"><span class="w-2 h-2 bg-green-500 rounded-full mr-3"></span>{}</li>"#,
                escape_html(f)
            )
        })
        .collect();
    format!(
        r#"<div class="bg-white p-6 rounded-lg shadow-md"><h3 class="text-xl font-bold text-green-700">{name}</h3><p class="text-gray-600 mb-4">{description}</p><ul class="space-y-2 mb-4">{features}</ul><div class="flex justify-between items-center"><span class="text-lg font-bold text-orange-600">{price}</span><button data-contact-product="{name}" class="bg-green-600 text-white px-4 py-2 rounded-lg">Liên hệ</button></div></div>"#,
        name = escape_html(&product.name),
        description = escape_html(&product.description),
        price = escape_html(&product.price),
    )
}

fn testimonial_html(testimonial: &Testimonial) -> String {
    format!(
        r#"<div class="bg-white p-8 rounded-xl shadow-md"><div class="flex items-center mb-6"><div class="{color} text-white w-16 h-16 rounded-full"></div><div><h4 class="text-xl font-bold text-gray-800 mb-1">{name} - {location}</h4><div class="text-yellow-500 text-lg">{stars}</div></div></div><p class="text-gray-700 text-lg italic">"{content}"</p><div class="mt-4 text-sm text-gray-500">Cây trồng: {crop} • Sử dụng: {usage}</div></div>"#,
        color = escape_html(&testimonial.avatar_color),
        name = escape_html(&testimonial.name),
        location = escape_html(&testimonial.location),
        stars = "⭐".repeat(usize::from(testimonial.rating)),
        content = escape_html(&testimonial.content),
        crop = escape_html(&testimonial.crop),
        usage = escape_html(&testimonial.usage_duration),
    )
}

#[cfg(test)]
mod tests {
    use site_common::source::MemorySource;

    use super::*;
    use crate::dom::{Document, Element};

    const PRODUCTS_JSON: &str = r#"{"products": [
        {"id": "mun-dua", "name": "Mụn dừa", "category": "main", "features": ["Sạch"], "price": "Liên hệ"},
        {"id": "chip", "name": "Vỏ dừa <chip>", "category": "chips"}
    ]}"#;

    const TESTIMONIALS_JSON: &str = r#"{"testimonials": [
        {"name": "Anh Tư", "location": "Cần Thơ", "content": "Tốt", "rating": 4},
        {"name": "Chị Lan", "location": "TP.HCM", "content": "Sạch"},
        {"name": "Cô Ba", "location": "Bến Tre", "content": "Rẻ"}
    ]}"#;

    const PRODUCTS_MD: &str = "# Sản phẩm\n\n## Mụn dừa đã xử lý\n**Mô tả**: Sạch\n- Tơi xốp\n";

    fn manager(source: &Arc<MemorySource>) -> ContentManager {
        ContentManager::new(source.clone(), &Config::default())
    }

    #[tokio::test]
    async fn json_documents_are_memoised() {
        let source = Arc::new(MemorySource::new().with("data/products.json", PRODUCTS_JSON));
        let cm = manager(&source);

        assert_eq!(cm.products(None).await.len(), 2);
        assert_eq!(cm.products(Some("chips")).await[0].id, "chip");
        assert_eq!(source.fetch_count(), 1);

        cm.clear_cache().await;
        cm.products(None).await;
        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test]
    async fn missing_or_malformed_documents_read_as_empty() {
        let source = Arc::new(MemorySource::new().with("data/banners.json", "{not json"));
        let cm = manager(&source);

        assert!(cm.banners().await.is_empty());
        assert!(cm.testimonials(None).await.is_empty());
        assert_eq!(cm.company_info().await, CompanyInfo::default());
        assert_eq!(cm.page_content("gioi-thieu").await, serde_json::json!({}));
        assert!(cm.load_data("banners").await.is_none());
    }

    #[tokio::test]
    async fn banners_keep_active_only_and_limits_apply() {
        let source = Arc::new(
            MemorySource::new()
                .with(
                    "data/banners.json",
                    r#"{"banners": [{"title": "A", "active": true}, {"title": "B"}]}"#,
                )
                .with("data/testimonials.json", TESTIMONIALS_JSON),
        );
        let cm = manager(&source);

        let banners = cm.banners().await;
        assert_eq!(banners.len(), 1);
        assert_eq!(banners[0].title, "A");
        assert_eq!(cm.testimonials(Some(2)).await.len(), 2);
        assert_eq!(cm.testimonials(Some(0)).await.len(), 3);
    }

    #[tokio::test]
    async fn markdown_products_win_over_json_without_mixing() {
        let source = Arc::new(
            MemorySource::new()
                .with("data/products.json", PRODUCTS_JSON)
                .with("content/data/san-pham.md", PRODUCTS_MD),
        );
        let cm = manager(&source);

        let products = cm.products_from_markdown(None).await;
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "Mụn dừa đã xử lý");

        // Category filter applies to the markdown result; no JSON fallback once
        // markdown produced products.
        assert!(cm.products_from_markdown(Some("chips")).await.is_empty());
    }

    #[tokio::test]
    async fn markdown_failure_falls_back_to_json() {
        let source = Arc::new(MemorySource::new().with("data/testimonials.json", TESTIMONIALS_JSON));
        let cm = manager(&source);

        let testimonials = cm.testimonials_from_markdown(Some(1)).await;
        assert_eq!(testimonials.len(), 1);
        assert_eq!(testimonials[0].name, "Anh Tư");
    }

    #[tokio::test]
    async fn converted_markdown_is_cached_by_kind() {
        let source = Arc::new(MemorySource::new().with("content/data/san-pham.md", PRODUCTS_MD));
        let cm = manager(&source);

        let raw = cm.load_markdown_content(PRODUCTS_MARKDOWN, MarkdownKind::Raw).await;
        assert!(matches!(raw, Some(MarkdownContent::Raw(_))));
        let products = cm
            .load_markdown_content(PRODUCTS_MARKDOWN, MarkdownKind::Products)
            .await;
        assert!(matches!(products, Some(MarkdownContent::Products(p)) if p.len() == 1));
        // The parser memo serves the second conversion.
        assert_eq!(source.fetch_count(), 1);
        assert!(cm.load_markdown_content("missing", MarkdownKind::Raw).await.is_none());
    }

    #[tokio::test]
    async fn renderers_escape_and_skip_missing_containers() {
        let source = Arc::new(
            MemorySource::new()
                .with("data/products.json", PRODUCTS_JSON)
                .with("data/testimonials.json", TESTIMONIALS_JSON),
        );
        let cm = manager(&source);
        let dom = Document::new()
            .with(Element::new("div").with_id("products-container"))
            .with(Element::new("div").with_id("testimonials-container"))
            .shared();

        assert!(cm.render_products(&dom, "products-container", None, None).await);
        assert!(cm.render_testimonials(&dom, "testimonials-container", DEFAULT_TESTIMONIAL_LIMIT).await);
        assert!(!cm.render_products(&dom, "nowhere", None, None).await);
        assert!(!cm.render_banners(&dom, "products-container").await);

        let doc = dom.lock().await;
        let products = &doc.element_by_id("products-container").unwrap().inner_html;
        assert!(products.contains("Vỏ dừa &lt;chip&gt;"));
        assert!(!products.contains("<chip>"));
        let testimonials = &doc.element_by_id("testimonials-container").unwrap().inner_html;
        assert!(testimonials.contains("Anh Tư - Cần Thơ"));
        assert!(testimonials.contains("⭐⭐⭐⭐<"));
    }

    #[tokio::test]
    async fn footer_uses_defaults_and_social_links() {
        let source = Arc::new(MemorySource::new().with(
            "data/company.json",
            r#"{"company": {"tagline": "Sạch", "social_media": {"zalo": {"url": "https://zalo.me/0984288512", "name": "Zalo"}}}}"#,
        ));
        let cm = manager(&source);
        let dom = Document::new()
            .with(Element::new("span").with_data("company-name", ""))
            .with(Element::new("span").with_data("company-tagline", ""))
            .with(Element::new("a").with_data("company-phone", ""))
            .with(Element::new("a").with_data("social-zalo", ""))
            .with(Element::new("a").with_data("social-facebook", ""))
            .shared();

        cm.update_footer(&dom).await;
        let doc = dom.lock().await;
        let els = doc.elements();
        assert_eq!(els[0].text, "MỤN DỪA HOÀNG HIẾU");
        assert_eq!(els[1].text, "Sạch");
        assert_eq!(els[2].text, "Hotline: 0984288512");
        assert_eq!(els[2].href.as_deref(), Some("tel:0984288512"));
        assert_eq!(els[3].href.as_deref(), Some("https://zalo.me/0984288512"));
        assert_eq!(els[3].title.as_deref(), Some("Zalo"));
        assert!(els[4].href.is_none());
    }

    #[tokio::test]
    async fn admin_numeric_ids_reach_the_json_tier() {
        let source = Arc::new(
            MemorySource::new()
                .with(
                    "data/products.json",
                    r#"{"products": [{"id": 1, "name": "Mụn dừa", "category": "main", "features": ["Sạch"]}]}"#,
                )
                .with(
                    "data/testimonials.json",
                    r#"{"testimonials": [{"id": 1, "name": "Anh Tư", "rating": 5, "content": "Tốt"}]}"#,
                ),
        );
        let cm = Arc::new(manager(&source));
        assert_eq!(cm.products(None).await.len(), 1);
        assert_eq!(cm.testimonials(None).await[0].id, "1");

        let safe = crate::safe::SafeContentManager::new(Arc::clone(&cm));
        let resolved = safe
            .safe_load_content(&ContentKind::Products { category: None })
            .await;
        assert_eq!(resolved.status, crate::status::UpdateStatus::JsonFallback);
        match resolved.content {
            Content::Products(products) => assert_eq!(products[0].id, "1"),
            other => panic!("unexpected content: {other:?}"),
        }
    }
}
