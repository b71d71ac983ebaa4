/// Keyword search over the site's fixed product and page corpus.
///
/// Matching is diacritic-insensitive: both the query and every candidate field are
/// NFD-decomposed, stripped of combining marks, whitespace-collapsed and lowercased.
/// A field matches when it contains the whole normalised query as a phrase, or
/// every query keyword somewhere. A record matches when any of its fields does.
/// Results keep corpus order; there is no scoring.
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use unicode_normalization::UnicodeNormalization;

use crate::corpus::{SiteEntry, SITE_PAGES, SITE_PRODUCTS};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("Vui lòng nhập từ khóa tìm kiếm")]
    EmptyQuery,
}

/// NFD, drop U+0300..=U+036F, collapse whitespace, trim, lowercase.
pub fn normalize(s: &str) -> String {
    let stripped: String = s
        .nfd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .collect();
    stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[derive(Debug, Clone)]
pub struct QueryMatcher {
    phrase: String,
    keywords: Vec<String>,
}

impl QueryMatcher {
    pub fn new(query: &str) -> Result<Self, SearchError> {
        let phrase = normalize(query);
        if phrase.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        let keywords = phrase.split(' ').map(str::to_string).collect();
        Ok(Self { phrase, keywords })
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn matches(&self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        let text = normalize(text);
        text.contains(&self.phrase) || self.keywords.iter().all(|kw| text.contains(kw.as_str()))
    }

    pub fn matches_any<'a>(&self, texts: impl IntoIterator<Item = &'a str>) -> bool {
        texts.into_iter().any(|t| self.matches(t))
    }
}

/// Wraps each case-insensitive occurrence of every whitespace-separated query
/// keyword in `<mark>`. Keywords are applied one after another, so a later keyword
/// can match inside markup added by an earlier one.
pub fn highlight(text: &str, query: &str) -> String {
    let mut result = text.to_string();
    for keyword in query.split_whitespace() {
        let Ok(re) = RegexBuilder::new(&regex::escape(keyword))
            .case_insensitive(true)
            .build()
        else {
            continue;
        };
        result = replace_marked(&re, &result);
    }
    result
}

fn replace_marked(re: &Regex, text: &str) -> String {
    re.replace_all(text, "<mark>$0</mark>").into_owned()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HitKind {
    Product,
    Page,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SearchHit {
    pub kind: HitKind,
    pub entry: &'static SiteEntry,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SiteSearchResults {
    pub products: Vec<&'static SiteEntry>,
    pub pages: Vec<&'static SiteEntry>,
    pub total: usize,
}

impl SiteSearchResults {
    /// Products first, then pages, each tagged with its kind.
    pub fn all(&self) -> Vec<SearchHit> {
        let products = self.products.iter().map(|&entry| SearchHit {
            kind: HitKind::Product,
            entry,
        });
        let pages = self.pages.iter().map(|&entry| SearchHit {
            kind: HitKind::Page,
            entry,
        });
        products.chain(pages).collect()
    }
}

fn entry_matches(matcher: &QueryMatcher, entry: &SiteEntry) -> bool {
    matcher.matches(entry.title)
        || matcher.matches(entry.description)
        || matcher.matches_any(entry.tags.iter().copied())
}

pub fn search(query: &str) -> Result<SiteSearchResults, SearchError> {
    let matcher = QueryMatcher::new(query)?;
    let products: Vec<_> = SITE_PRODUCTS
        .iter()
        .filter(|e| entry_matches(&matcher, e))
        .collect();
    let pages: Vec<_> = SITE_PAGES
        .iter()
        .filter(|e| entry_matches(&matcher, e))
        .collect();
    let total = products.len() + pages.len();
    Ok(SiteSearchResults {
        products,
        pages,
        total,
    })
}
