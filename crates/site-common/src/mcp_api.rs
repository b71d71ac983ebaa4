use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::cms::CacheStats;

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchSiteParams {
    /// Free-text query. Accents are optional: "mun dua" finds "Mụn Dừa".
    pub query: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchNewsParams {
    /// Free-text query matched against news posts, tips, categories and sidebar sections.
    pub query: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct LoadPageParams {
    /// Page slug such as "trang-chu" or "lien-he" (loaded from `content/pages/<page>.md`).
    pub page: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ResolveContentParams {
    /// One of "contact", "products", "testimonials" or "page".
    pub kind: String,
    /// Product category filter (products only).
    pub category: Option<String>,
    /// Maximum number of testimonials (default: 4, 0 for all).
    pub limit: Option<usize>,
    /// Page slug (page only).
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CmsFetchParams {
    /// One of "home", "about", "products", "news" or "config".
    pub endpoint: String,
    /// News page number (news only, default: 1).
    pub page: Option<u32>,
    /// News page size (news only, default: 10).
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SiteSearchHit {
    /// "product" or "page".
    pub kind: String,
    pub title: String,
    /// Title with every query keyword wrapped in `<mark>`.
    pub highlighted_title: String,
    pub description: String,
    pub image: String,
    pub url: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SiteSearchResponse {
    pub query: String,
    pub total: usize,
    /// Products first, then pages.
    pub results: Vec<SiteSearchHit>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NewsPostSummary {
    pub id: u32,
    pub title: String,
    pub highlighted_title: String,
    pub category: String,
    pub date: String,
    pub excerpt: String,
    pub highlighted_excerpt: String,
    pub read_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NewsTip {
    pub text: String,
    pub highlighted: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NewsCategory {
    pub key: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NewsSection {
    pub title: String,
    pub highlighted_title: String,
    pub icon: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NewsSearchResponse {
    pub query: String,
    pub total: usize,
    pub posts: Vec<NewsPostSummary>,
    pub tips: Vec<NewsTip>,
    pub categories: Vec<NewsCategory>,
    pub sections: Vec<NewsSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CmsStatusResponse {
    /// False when `CMS_API_URL` is not set.
    pub configured: bool,
    pub healthy: bool,
    pub cache: Option<CacheStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CmsFetchResponse {
    pub endpoint: String,
    /// The `data` member of the CMS response envelope.
    pub data: serde_json::Value,
}
