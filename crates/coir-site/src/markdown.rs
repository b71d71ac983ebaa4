/// Parser for the site's editable markdown documents.
///
/// The format is a small subset of markdown:
/// - `# Title` opens a section
/// - `## Title` opens a subsection inside the open section
/// - `### Title` adds a titled entry to the open subsection (or section)
/// - `- text` / `* text` list items, `1. text` numbered items
/// - `**Label**: value` label lines, stored with the `**` removed
/// - `---` separators, anything else plain text
///
/// Parsing is a single line-by-line pass and never fails. Malformed input at worst
/// attributes content to the wrong container.
use std::sync::Arc;

use regex::Regex;
use schemars::JsonSchema;
use serde::Serialize;
use tracing::{debug, error};

use crate::cache::ContentCache;
use crate::model::{Product, Testimonial};
use site_common::error::CommonError;
use site_common::source::ContentSource;

const ID_MAX_LEN: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Item {
    ListItem {
        text: String,
    },
    NumberedItem {
        text: String,
    },
    Text {
        text: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        bold: Vec<String>,
    },
    Separator,
}

impl Item {
    pub fn text(&self) -> Option<&str> {
        match self {
            Item::ListItem { text } | Item::NumberedItem { text } | Item::Text { text, .. } => {
                Some(text)
            }
            Item::Separator => None,
        }
    }
}

/// A `###` entry.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct SubItem {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct Subsection {
    pub title: String,
    pub content: Vec<Item>,
    pub items: Vec<SubItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct Section {
    pub title: String,
    pub content: Vec<Item>,
    pub subsections: Vec<Subsection>,
    pub items: Vec<SubItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, JsonSchema)]
pub struct ParsedDocument {
    pub sections: Vec<Section>,
}

/// Open containers during a parse. Items go to the subsection if one is open,
/// otherwise to the section; with neither open they are dropped.
#[derive(Default)]
struct OpenContainers {
    section: Option<Section>,
    subsection: Option<Subsection>,
}

impl OpenContainers {
    fn push_item(&mut self, item: Item) {
        if let Some(sub) = self.subsection.as_mut() {
            sub.content.push(item);
        } else if let Some(section) = self.section.as_mut() {
            section.content.push(item);
        }
    }

    fn push_sub_item(&mut self, title: &str) {
        let entry = SubItem {
            title: title.to_string(),
        };
        if let Some(sub) = self.subsection.as_mut() {
            sub.items.push(entry);
        } else if let Some(section) = self.section.as_mut() {
            section.items.push(entry);
        }
    }

    fn close_subsection(&mut self) {
        if let (Some(section), Some(sub)) = (self.section.as_mut(), self.subsection.take()) {
            section.subsections.push(sub);
        }
    }

    fn close_section(&mut self, doc: &mut ParsedDocument) {
        self.close_subsection();
        if let Some(section) = self.section.take() {
            doc.sections.push(section);
        }
    }
}

pub fn parse_markdown(markdown: &str) -> ParsedDocument {
    let numbered_re = Regex::new(r"^\d+\.\s").expect("valid regex");

    let mut doc = ParsedDocument::default();
    let mut open = OpenContainers::default();

    for raw in markdown.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(title) = line.strip_prefix("# ") {
            open.close_section(&mut doc);
            open.section = Some(Section {
                title: title.trim().to_string(),
                content: Vec::new(),
                subsections: Vec::new(),
                items: Vec::new(),
            });
        } else if let Some(title) = line.strip_prefix("## ") {
            if open.section.is_some() {
                open.close_subsection();
                open.subsection = Some(Subsection {
                    title: title.trim().to_string(),
                    content: Vec::new(),
                    items: Vec::new(),
                });
            }
        } else if let Some(title) = line.strip_prefix("### ") {
            open.push_sub_item(title.trim());
        } else if let Some(text) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
            open.push_item(Item::ListItem {
                text: text.trim().to_string(),
            });
        } else if let Some(m) = numbered_re.find(line) {
            open.push_item(Item::NumberedItem {
                text: line[m.end()..].trim().to_string(),
            });
        } else if line.contains("**") {
            let (text, bold) = parse_bold_text(line);
            open.push_item(Item::Text { text, bold });
        } else if line.starts_with("---") {
            open.push_item(Item::Separator);
        } else {
            open.push_item(Item::Text {
                text: line.to_string(),
                bold: Vec::new(),
            });
        }
    }

    open.close_section(&mut doc);
    doc
}

/// Split on `**`. Odd segments are bold spans; the returned text is every segment
/// joined with the delimiters removed.
pub fn parse_bold_text(line: &str) -> (String, Vec<String>) {
    let mut text = String::with_capacity(line.len());
    let mut bold = Vec::new();
    for (i, part) in line.split("**").enumerate() {
        text.push_str(part);
        if i % 2 == 1 {
            bold.push(part.to_string());
        }
    }
    (text, bold)
}

/// Every subsection of a product section becomes a `Product`.
///
/// A section qualifies when its title mentions "Sản phẩm" or it has any subsection.
pub fn convert_to_products(doc: &ParsedDocument) -> Vec<Product> {
    let mut products = Vec::new();
    for section in qualifying_sections(doc, "Sản phẩm") {
        for sub in &section.subsections {
            let mut product = Product::named(generate_id(&sub.title), &sub.title);
            for item in &sub.content {
                match item {
                    Item::Text { text, .. } if text.contains("Mô tả") => {
                        product.description = label_value(text, "Mô tả");
                    }
                    Item::ListItem { text } => product.features.push(text.clone()),
                    _ => match item.text() {
                        Some(text) if text.contains("Giá") => {
                            product.price = label_value(text, "Giá");
                        }
                        Some(text) if text.contains("Ảnh") => {
                            product.image = label_value(text, "Ảnh");
                        }
                        _ => {}
                    },
                }
            }
            products.push(product);
        }
    }
    products
}

pub fn convert_to_testimonials(doc: &ParsedDocument) -> Vec<Testimonial> {
    let mut testimonials = Vec::new();
    for section in qualifying_sections(doc, "Chứng thực") {
        for sub in &section.subsections {
            let mut testimonial = Testimonial {
                id: generate_id(&sub.title),
                ..Testimonial::default()
            };
            for text in sub.content.iter().filter_map(Item::text) {
                if text.contains("Tên") {
                    testimonial.name = label_value(text, "Tên");
                } else if text.contains("Địa chỉ") {
                    testimonial.location = label_value(text, "Địa chỉ");
                } else if text.contains("Nội dung") {
                    testimonial.content = label_value(text, "Nội dung").replace('"', "");
                } else if text.contains("Sản phẩm sử dụng") {
                    testimonial.product = label_value(text, "Sản phẩm sử dụng");
                } else if text.contains("Thời gian") {
                    testimonial.date = label_value(text, "Thời gian");
                }
            }
            testimonials.push(testimonial);
        }
    }
    testimonials
}

fn qualifying_sections<'a>(
    doc: &'a ParsedDocument,
    label: &'a str,
) -> impl Iterator<Item = &'a Section> + 'a {
    doc.sections
        .iter()
        .filter(move |s| s.title.contains(label) || !s.subsections.is_empty())
}

/// The value after `Label:` in a label line. Lines without the colon are kept whole.
fn label_value(text: &str, label: &str) -> String {
    let Some(pos) = text.find(label) else {
        return text.trim().to_string();
    };
    match text[pos + label.len()..].trim_start().strip_prefix(':') {
        Some(value) => value.trim().to_string(),
        None => text.trim().to_string(),
    }
}

/// Slug from a title: lowercase, keep ASCII word characters, whitespace and `-`,
/// whitespace runs become `-`, cut at 20 characters. Not unique.
pub fn generate_id(title: &str) -> String {
    let lowered = title.to_lowercase();
    let kept = lowered
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace());

    let mut id = String::with_capacity(title.len());
    let mut in_space = false;
    for c in kept {
        if c.is_whitespace() {
            if !in_space {
                id.push('-');
            }
            in_space = true;
        } else {
            id.push(c);
            in_space = false;
        }
    }
    id.chars().take(ID_MAX_LEN).collect()
}

/// Fetches and parses markdown documents, memoised by path.
pub struct MarkdownParser {
    source: Arc<dyn ContentSource>,
    cache: ContentCache<Arc<ParsedDocument>>,
}

impl MarkdownParser {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self {
            source,
            cache: ContentCache::new(),
        }
    }

    /// `None` on any fetch failure; the error is logged.
    pub async fn load_markdown_file(&self, path: &str) -> Option<Arc<ParsedDocument>> {
        self.try_load_markdown_file(path)
            .await
            .inspect_err(|e| error!(path, error = %e, "error loading markdown file"))
            .ok()
    }

    pub async fn try_load_markdown_file(
        &self,
        path: &str,
    ) -> Result<Arc<ParsedDocument>, CommonError> {
        if let Some(cached) = self.cache.get(path).await {
            return Ok(cached);
        }

        let markdown = self.source.fetch_text(path).await?;
        let parsed = Arc::new(parse_markdown(&markdown));
        debug!(path, sections = parsed.sections.len(), "parsed markdown file");
        self.cache.set(path, Arc::clone(&parsed)).await;
        Ok(parsed)
    }

    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use site_common::source::MemorySource;

    const PRODUCTS_MD: &str = r#"# Sản phẩm Mụn Dừa

## Mụn dừa đã xử lý
**Mô tả**: Tỷ lệ xơ-mụn đáp ứng theo yêu cầu
- Sạch, tơi xốp
- Giữ ẩm tốt
**Giá**: 50.000đ/bao
**Ảnh**: /assets/image/products/mun-dua-xu-ly.jpg

## Xơ dừa tự nhiên
**Mô tả**: Xơ dừa nguyên chất
"#;

    #[test]
    fn parse_sections_and_subsections() {
        let doc = parse_markdown(PRODUCTS_MD);
        assert_eq!(doc.sections.len(), 1);

        let section = &doc.sections[0];
        assert_eq!(section.title, "Sản phẩm Mụn Dừa");
        assert!(section.content.is_empty());
        assert_eq!(section.subsections.len(), 2);
        assert_eq!(section.subsections[0].title, "Mụn dừa đã xử lý");
        assert_eq!(section.subsections[0].content.len(), 5);
        assert_eq!(
            section.subsections[0].content[0],
            Item::Text {
                text: "Mô tả: Tỷ lệ xơ-mụn đáp ứng theo yêu cầu".to_string(),
                bold: vec!["Mô tả".to_string()],
            }
        );
    }

    #[test]
    fn new_top_heading_commits_open_subsection() {
        let doc = parse_markdown("# A\n## A1\n- one\n# B\n- two\n");
        assert_eq!(doc.sections.len(), 2);
        assert_eq!(doc.sections[0].subsections.len(), 1);
        assert_eq!(doc.sections[0].subsections[0].content.len(), 1);
        assert_eq!(doc.sections[1].content[0].text(), Some("two"));
    }

    #[test]
    fn items_keep_their_order() {
        let md = "# Hướng dẫn\n1. Ngâm nước\nTrộn với đất\n- Tưới đều\n---\n**Lưu ý**: giữ ẩm\n";
        let doc = parse_markdown(md);
        let texts: Vec<&str> = doc.sections[0]
            .content
            .iter()
            .filter_map(Item::text)
            .collect();
        assert_eq!(
            texts,
            vec!["Ngâm nước", "Trộn với đất", "Tưới đều", "Lưu ý: giữ ẩm"]
        );
        assert_eq!(doc.sections[0].content[3], Item::Separator);
        assert!(matches!(doc.sections[0].content[0], Item::NumberedItem { .. }));
    }

    #[test]
    fn level_three_heading_attaches_to_nearest_container() {
        let doc = parse_markdown("# A\n### loose\n## A1\n### nested\n");
        assert_eq!(doc.sections[0].items[0].title, "loose");
        assert_eq!(doc.sections[0].subsections[0].items[0].title, "nested");
    }

    #[test]
    fn content_before_any_heading_is_dropped() {
        let doc = parse_markdown("orphan line\n## orphan sub\n# Real\ntext\n");
        assert_eq!(doc.sections.len(), 1);
        assert!(doc.sections[0].subsections.is_empty());
        assert_eq!(doc.sections[0].content.len(), 1);
    }

    #[test]
    fn bold_split_records_odd_segments() {
        let (text, bold) = parse_bold_text("**Hotline**: 0984.288.512 **24/7**");
        assert_eq!(text, "Hotline: 0984.288.512 24/7");
        assert_eq!(bold, vec!["Hotline".to_string(), "24/7".to_string()]);
    }

    #[test]
    fn products_from_subsections() {
        let products = convert_to_products(&parse_markdown(PRODUCTS_MD));
        assert_eq!(products.len(), 2);

        let first = &products[0];
        assert_eq!(first.name, "Mụn dừa đã xử lý");
        assert_eq!(first.id, "mn-da-x-l");
        assert_eq!(first.description, "Tỷ lệ xơ-mụn đáp ứng theo yêu cầu");
        assert_eq!(first.features, vec!["Sạch, tơi xốp", "Giữ ẩm tốt"]);
        assert_eq!(first.price, "50.000đ/bao");
        assert_eq!(first.image, "/assets/image/products/mun-dua-xu-ly.jpg");
        assert_eq!(first.category, "main");

        let second = &products[1];
        assert_eq!(second.price, "Liên hệ");
        assert_eq!(second.image, "/assets/image/products/default.jpg");
    }

    #[test]
    fn testimonials_from_subsections() {
        let md = r#"# Chứng thực khách hàng

## Khách hàng 1
**Tên**: Chị Mai Lan
**Địa chỉ**: TP.HCM
**Nội dung**: "Mụn dừa rất sạch"
**Sản phẩm sử dụng**: Xơ dừa tự nhiên
**Thời gian**: 6 tháng
"#;
        let testimonials = convert_to_testimonials(&parse_markdown(md));
        assert_eq!(testimonials.len(), 1);
        let t = &testimonials[0];
        assert_eq!(t.id, "khch-hng-1");
        assert_eq!(t.name, "Chị Mai Lan");
        assert_eq!(t.location, "TP.HCM");
        assert_eq!(t.content, "Mụn dừa rất sạch");
        assert_eq!(t.product, "Xơ dừa tự nhiên");
        assert_eq!(t.date, "6 tháng");
        assert_eq!(t.rating, 5);
    }

    #[test]
    fn sections_without_label_or_subsections_are_skipped() {
        let doc = parse_markdown("# Giới thiệu\nVăn bản\n");
        assert!(convert_to_products(&doc).is_empty());
        assert!(convert_to_testimonials(&doc).is_empty());
    }

    #[test]
    fn generate_id_is_bounded_and_deterministic() {
        let id = generate_id("Premium Coconut Coir Blocks for Greenhouses");
        assert_eq!(id, "premium-coconut-coir");
        assert!(id.len() <= 20);
        assert_eq!(id, generate_id("Premium Coconut Coir Blocks for Greenhouses"));
        assert_eq!(generate_id("Xơ   dừa (loại 1)"), "x-da-loi-1");
    }

    #[test]
    fn generate_id_collides_on_shared_prefix() {
        // Known limitation: titles that agree on the first 20 normalized characters
        // produce the same id.
        let a = generate_id("Premium coconut coir blocks, 5kg");
        let b = generate_id("Premium coconut coir blocks, 25kg");
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn load_markdown_file_memoises_by_path() {
        let source = Arc::new(MemorySource::new().with("content/data/san-pham.md", PRODUCTS_MD));
        let parser = MarkdownParser::new(source.clone());

        let first = parser.load_markdown_file("content/data/san-pham.md").await;
        let second = parser.load_markdown_file("content/data/san-pham.md").await;
        assert!(first.is_some());
        assert_eq!(first, second);
        assert_eq!(source.fetch_count(), 1);

        parser.clear_cache().await;
        parser.load_markdown_file("content/data/san-pham.md").await;
        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test]
    async fn load_markdown_file_failure_is_none() {
        let parser = MarkdownParser::new(Arc::new(MemorySource::new()));
        assert!(parser.load_markdown_file("content/data/missing.md").await.is_none());
    }
}
