/// Search box of the news page: posts, tips, categories and sidebar sections.
use serde::Serialize;

use crate::corpus::{
    Category, NewsPost, SectionAnchor, CATEGORIES, DAILY_TIPS, NEWS_POSTS, QUICK_TIPS,
    SECTION_ANCHORS,
};
use crate::search::{QueryMatcher, SearchError};

#[derive(Debug, Clone, Default, Serialize)]
pub struct NewsSearchResults {
    pub posts: Vec<&'static NewsPost>,
    /// Quick tips first, then daily tips.
    pub tips: Vec<&'static str>,
    pub categories: Vec<&'static Category>,
    pub sections: Vec<&'static SectionAnchor>,
    pub total: usize,
}

pub fn search_news(query: &str) -> Result<NewsSearchResults, SearchError> {
    let matcher = QueryMatcher::new(query)?;

    let posts: Vec<_> = NEWS_POSTS
        .iter()
        .filter(|p| matcher.matches_any([p.title, p.excerpt, p.content]))
        .collect();

    let mut tips: Vec<&'static str> = QUICK_TIPS
        .iter()
        .filter(|t| matcher.matches_any([t.title, t.tip]))
        .map(|t| t.tip)
        .collect();
    tips.extend(DAILY_TIPS.iter().copied().filter(|t| matcher.matches(t)));

    let categories: Vec<_> = CATEGORIES
        .iter()
        .filter(|c| matcher.matches(c.label))
        .collect();

    let sections: Vec<_> = SECTION_ANCHORS
        .iter()
        .filter(|s| {
            matcher.matches_any([s.title, s.description])
                || matcher.matches_any(s.keywords.iter().copied())
        })
        .collect();

    let total = posts.len() + tips.len() + categories.len() + sections.len();
    Ok(NewsSearchResults {
        posts,
        tips,
        categories,
        sections,
        total,
    })
}
