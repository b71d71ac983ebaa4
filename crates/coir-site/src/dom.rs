/// Minimal document model that renderers and footer updates write into.
///
/// Elements are addressed by `id`, by tag, or by `data-*` attribute (stored without
/// the `data-` prefix). Only the properties the content core writes are modelled.
use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::Mutex;

pub type SharedDocument = Arc<Mutex<Document>>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub tag: String,
    pub id: Option<String>,
    pub data: BTreeMap<String, String>,
    pub text: String,
    pub inner_html: String,
    pub href: Option<String>,
    pub title: Option<String>,
    /// Layout box in CSS pixels, relative to the document top.
    pub top: f64,
    pub height: f64,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    /// `name` without the `data-` prefix. Valueless attributes use `""`.
    pub fn with_data(mut self, name: &str, value: &str) -> Self {
        self.data.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_box(mut self, top: f64, height: f64) -> Self {
        self.top = top;
        self.height = height;
        self
    }

    pub fn is_anchor(&self) -> bool {
        self.tag == "a"
    }

    /// Replaces the text content. Any previous markup is dropped.
    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.inner_html.clear();
    }

    pub fn set_inner_html(&mut self, html: String) {
        self.inner_html = html;
        self.text.clear();
    }
}

#[derive(Debug, Clone, Default)]
pub struct Document {
    elements: Vec<Element>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(self) -> SharedDocument {
        Arc::new(Mutex::new(self))
    }

    pub fn with(mut self, element: Element) -> Self {
        self.elements.push(element);
        self
    }

    pub fn push(&mut self, element: Element) {
        self.elements.push(element);
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn element_by_id(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.id.as_deref() == Some(id))
    }

    pub fn element_by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id.as_deref() == Some(id))
    }

    /// Every element carrying `data-<name>`, optionally with an exact value.
    pub fn select_data_mut<'a>(
        &'a mut self,
        name: &'a str,
        value: Option<&'a str>,
    ) -> impl Iterator<Item = &'a mut Element> + 'a {
        self.elements.iter_mut().filter(move |e| match (e.data.get(name), value) {
            (Some(_), None) => true,
            (Some(v), Some(want)) => v == want,
            (None, _) => false,
        })
    }

    pub fn first_data_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.data.contains_key(name))
    }

    /// The page header, used to offset scroll targets.
    pub fn header(&self) -> Option<&Element> {
        self.elements.iter().find(|e| e.tag == "header")
    }

    pub fn first_by_tag(&self, tag: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.tag == tag)
    }

    /// Resolves `#id`, `.class` (matched against `data-class`) or a bare tag name.
    pub fn query(&self, selector: &str) -> Option<&Element> {
        if let Some(id) = selector.strip_prefix('#') {
            self.element_by_id(id)
        } else if let Some(class) = selector.strip_prefix('.') {
            self.elements.iter().find(|e| {
                e.data
                    .get("class")
                    .is_some_and(|c| c.split_whitespace().any(|name| name == class))
            })
        } else {
            self.first_by_tag(selector)
        }
    }
}

/// Escapes text for interpolation into element markup.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn footer() -> Document {
        Document::new()
            .with(Element::new("header").with_box(0.0, 64.0))
            .with(Element::new("A").with_data("contact", "phone"))
            .with(Element::new("span").with_data("contact", "phone"))
            .with(Element::new("span").with_data("contact", "email"))
            .with(Element::new("div").with_id("products-container"))
    }

    #[test]
    fn selects_by_data_value() {
        let mut doc = footer();
        assert_eq!(doc.select_data_mut("contact", Some("phone")).count(), 2);
        assert_eq!(doc.select_data_mut("contact", None).count(), 3);
        assert!(doc.select_data_mut("company-name", None).next().is_none());
    }

    #[test]
    fn tags_are_lowercased() {
        let doc = footer();
        assert!(doc.elements()[1].is_anchor());
        assert_eq!(doc.header().map(|h| h.height), Some(64.0));
    }

    #[test]
    fn query_by_id_and_class() {
        let doc = footer().with(
            Element::new("h3")
                .with_data("class", "tip-card highlight")
                .with_box(900.0, 40.0),
        );
        assert!(doc.query("#products-container").is_some());
        assert_eq!(doc.query(".tip-card").map(|e| e.top), Some(900.0));
        assert!(doc.query(".tip").is_none());
    }

    #[test]
    fn text_and_markup_replace_each_other() {
        let mut el = Element::new("p");
        el.set_inner_html("<b>x</b>".to_string());
        el.set_text("plain");
        assert_eq!(el.text, "plain");
        assert!(el.inner_html.is_empty());
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }
}
