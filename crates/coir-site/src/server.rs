/// MCP server for the coconut-coir website content.
///
/// Exposes eight tools:
/// - `search_site`: Accent-insensitive search over products and pages
/// - `search_news`: Search over the news page's posts, tips, categories and sections
/// - `load_page`: Structured content of one markdown page
/// - `resolve_content`: Tiered markdown/JSON/default resolution of a content kind
/// - `content_status`: Outcome of the most recent resolution
/// - `force_refresh`: Drop caches and re-resolve footer, products and testimonials
/// - `cms_status`: Health and cache of the CMS API client
/// - `cms_fetch`: Cached read of one CMS public endpoint
use std::sync::Arc;

use rmcp::{
    Json, ServerHandler,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_handler, tool_router,
};
use tracing::info;

use crate::content::{ContentManager, DEFAULT_TESTIMONIAL_LIMIT};
use crate::corpus::SiteEntry;
use crate::dom::SharedDocument;
use crate::news_search::search_news;
use crate::page::PageContent;
use crate::safe::{ContentKind, RefreshOutcome, Resolved, SafeContentManager};
use crate::search::{highlight, search, HitKind};
use crate::status::StatusReport;
use site_common::cms::CmsClient;
use site_common::mcp_api::{
    CmsFetchParams, CmsFetchResponse, CmsStatusResponse, LoadPageParams, NewsCategory,
    NewsPostSummary, NewsSearchResponse, NewsSection, NewsTip, ResolveContentParams,
    SearchNewsParams, SearchSiteParams, SiteSearchHit, SiteSearchResponse,
};

const DEFAULT_NEWS_PAGE: u32 = 1;
const DEFAULT_NEWS_LIMIT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CmsEndpoint {
    Home,
    About,
    Products,
    News { page: u32, limit: u32 },
    Config,
}

impl CmsEndpoint {
    fn from_params(params: &CmsFetchParams) -> Result<Self, String> {
        match params.endpoint.trim().to_lowercase().as_str() {
            "home" => Ok(Self::Home),
            "about" => Ok(Self::About),
            "products" => Ok(Self::Products),
            "news" => Ok(Self::News {
                page: params.page.unwrap_or(DEFAULT_NEWS_PAGE).max(1),
                limit: params.limit.unwrap_or(DEFAULT_NEWS_LIMIT).max(1),
            }),
            "config" => Ok(Self::Config),
            other => Err(format!(
                "unknown CMS endpoint: '{other}'. Available endpoints: home, about, products, news, config"
            )),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::About => "about",
            Self::Products => "products",
            Self::News { .. } => "news",
            Self::Config => "config",
        }
    }
}

#[derive(Clone)]
pub struct CoirSiteServer {
    safe: Arc<SafeContentManager<ContentManager>>,
    footer: SharedDocument,
    cms: Option<CmsClient>,
    tool_router: ToolRouter<CoirSiteServer>,
}

impl CoirSiteServer {
    pub fn new(
        safe: Arc<SafeContentManager<ContentManager>>,
        footer: SharedDocument,
        cms: Option<CmsClient>,
    ) -> Self {
        Self {
            safe,
            footer,
            cms,
            tool_router: Self::tool_router(),
        }
    }

    fn content(&self) -> &Arc<ContentManager> {
        self.safe.tiers()
    }
}

#[tool_router]
impl CoirSiteServer {
    #[tool(description = "Search the website's products and pages. Matching ignores Vietnamese diacritics and case; a record matches when its title, description or a tag contains the whole query or every query word.")]
    async fn search_site(
        &self,
        Parameters(params): Parameters<SearchSiteParams>,
    ) -> Result<Json<SiteSearchResponse>, String> {
        let results = search(&params.query).map_err(|e| e.to_string())?;
        let hits = results
            .all()
            .into_iter()
            .map(|hit| to_api_hit(hit.kind, hit.entry, &params.query))
            .collect();

        info!(query = %params.query, total = results.total, "site search");
        Ok(Json(SiteSearchResponse {
            query: params.query,
            total: results.total,
            results: hits,
        }))
    }

    #[tool(description = "Search the news page: articles (title, excerpt, body), farming tips, article categories and sidebar sections. Same accent-insensitive matching as search_site.")]
    async fn search_news(
        &self,
        Parameters(params): Parameters<SearchNewsParams>,
    ) -> Result<Json<NewsSearchResponse>, String> {
        let results = search_news(&params.query).map_err(|e| e.to_string())?;
        let query = params.query.as_str();

        let response = NewsSearchResponse {
            query: params.query.clone(),
            total: results.total,
            posts: results
                .posts
                .iter()
                .map(|p| NewsPostSummary {
                    id: p.id,
                    title: p.title.to_string(),
                    highlighted_title: highlight(p.title, query),
                    category: p.category.to_string(),
                    date: p.date.to_string(),
                    excerpt: p.excerpt.to_string(),
                    highlighted_excerpt: highlight(p.excerpt, query),
                    read_time: p.read_time.to_string(),
                })
                .collect(),
            tips: results
                .tips
                .iter()
                .map(|t| NewsTip {
                    text: t.to_string(),
                    highlighted: highlight(t, query),
                })
                .collect(),
            categories: results
                .categories
                .iter()
                .map(|c| NewsCategory {
                    key: c.key.to_string(),
                    label: c.label.to_string(),
                })
                .collect(),
            sections: results
                .sections
                .iter()
                .map(|s| NewsSection {
                    title: s.title.to_string(),
                    highlighted_title: highlight(s.title, query),
                    icon: s.icon.to_string(),
                    description: s.description.to_string(),
                })
                .collect(),
        };
        Ok(Json(response))
    }

    #[tool(description = "Load one page's markdown (content/pages/<page>.md) as title, sections, contact details, product list and commitments.")]
    async fn load_page(
        &self,
        Parameters(params): Parameters<LoadPageParams>,
    ) -> Result<Json<PageContent>, String> {
        let page = params.page.trim();
        if page.is_empty() {
            return Err("page must not be empty".to_string());
        }

        let content = self
            .content()
            .pages()
            .try_load_page_content(page)
            .await
            .map_err(|e| format!("failed to load page '{page}': {e}"))?;
        Ok(Json(content.as_ref().clone()))
    }

    #[tool(description = "Resolve a content kind (contact, products, testimonials, page) from markdown, falling back to JSON and then to built-in defaults. Always returns content together with the tier it came from.")]
    async fn resolve_content(
        &self,
        Parameters(params): Parameters<ResolveContentParams>,
    ) -> Result<Json<Resolved>, String> {
        let kind = content_kind(params)?;
        Ok(Json(self.safe.safe_load_content(&kind).await))
    }

    #[tool(description = "Report the status and timestamp of the most recent content resolution.")]
    async fn content_status(&self) -> Result<Json<StatusReport>, String> {
        Ok(Json(self.safe.status()))
    }

    #[tool(description = "Clear every content cache (and the CMS response cache), then re-resolve the footer contact block, products and testimonials concurrently.")]
    async fn force_refresh(&self) -> Result<Json<RefreshOutcome>, String> {
        info!("force_refresh tool invoked");
        if let Some(cms) = &self.cms {
            cms.clear_cache().await;
        }
        Ok(Json(self.safe.force_refresh(&self.footer).await))
    }

    #[tool(description = "Check the CMS API health endpoint and report the client's response cache.")]
    async fn cms_status(&self) -> Result<Json<CmsStatusResponse>, String> {
        let Some(cms) = &self.cms else {
            return Ok(Json(CmsStatusResponse {
                configured: false,
                healthy: false,
                cache: None,
            }));
        };

        let healthy = cms.health_check().await;
        Ok(Json(CmsStatusResponse {
            configured: true,
            healthy,
            cache: Some(cms.cache_stats().await),
        }))
    }

    #[tool(description = "Read one CMS public endpoint (home, about, products, news, config). Responses are cached for the configured TTL; when the CMS is down a stale cached response is served.")]
    async fn cms_fetch(
        &self,
        Parameters(params): Parameters<CmsFetchParams>,
    ) -> Result<Json<CmsFetchResponse>, String> {
        let endpoint = CmsEndpoint::from_params(&params)?;
        let cms = self
            .cms
            .as_ref()
            .ok_or_else(|| "CMS is not configured (set CMS_API_URL)".to_string())?;

        let data = match endpoint {
            CmsEndpoint::Home => cms.home().await,
            CmsEndpoint::About => cms.about().await,
            CmsEndpoint::Products => cms.products().await,
            CmsEndpoint::News { page, limit } => cms.news(page, limit).await,
            CmsEndpoint::Config => cms.site_config().await,
        }
        .map_err(|e| format!("CMS {} request failed: {e}", endpoint.name()))?;

        Ok(Json(CmsFetchResponse {
            endpoint: endpoint.name().to_string(),
            data,
        }))
    }
}

fn content_kind(params: ResolveContentParams) -> Result<ContentKind, String> {
    match params.kind.trim().to_lowercase().as_str() {
        "contact" => Ok(ContentKind::Contact),
        "products" => Ok(ContentKind::Products {
            category: params.category,
        }),
        "testimonials" => Ok(ContentKind::Testimonials {
            limit: Some(params.limit.unwrap_or(DEFAULT_TESTIMONIAL_LIMIT)),
        }),
        "page" => match params.name {
            Some(name) if !name.trim().is_empty() => Ok(ContentKind::Page { name }),
            _ => Err("page content requires a name".to_string()),
        },
        other => Err(format!(
            "unknown content kind: '{other}'. Available kinds: contact, products, testimonials, page"
        )),
    }
}

fn to_api_hit(kind: HitKind, entry: &SiteEntry, query: &str) -> SiteSearchHit {
    SiteSearchHit {
        kind: match kind {
            HitKind::Product => "product",
            HitKind::Page => "page",
        }
        .to_string(),
        title: entry.title.to_string(),
        highlighted_title: highlight(entry.title, query),
        description: entry.description.to_string(),
        image: entry.image.to_string(),
        url: entry.url.to_string(),
        tags: entry.tags.iter().map(|t| t.to_string()).collect(),
    }
}

#[tool_handler]
impl ServerHandler for CoirSiteServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            server_info: Implementation {
                name: "coir-site".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Content server for the Mụn Dừa Hoàng Hiếu website. Use search_site and \
                 search_news for keyword lookup, load_page for a page's structured markdown, \
                 resolve_content for contact/products/testimonials with automatic fallback, \
                 content_status and force_refresh to inspect or reload content, and \
                 cms_status and cms_fetch for the CMS API."
                    .to_string(),
            ),
        }
    }
}
