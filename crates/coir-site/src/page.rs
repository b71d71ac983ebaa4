/// Flat page content scraped from a page's markdown.
///
/// Unlike `markdown::parse_markdown`, this scan does not build a tree. It classifies
/// each line by Vietnamese label keywords into contact fields, section text, and the
/// product and commitment lists shown on the homepage.
use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::Serialize;

use crate::model::Contact;

const CONTACT_EMOJI: [char; 3] = ['📞', '📧', '📍'];

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PageItem {
    Pair { key: String, value: String },
    List { text: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, JsonSchema)]
pub struct PageSection {
    pub title: String,
    /// Plain text lines joined by a single space.
    pub content: String,
    pub items: Vec<PageItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, JsonSchema)]
pub struct PageContent {
    pub title: String,
    pub sections: BTreeMap<String, PageSection>,
    pub contact: Contact,
    pub products: Vec<String>,
    pub features: Vec<String>,
}

#[derive(Clone, Copy)]
enum ContactField {
    Phone,
    Email,
    Address,
    Title,
    Subtitle,
    Slogan,
}

impl ContactField {
    /// `key` is expected lowercased.
    fn classify(key: &str) -> Option<Self> {
        if key.contains("hotline") || key.contains("điện thoại") {
            Some(Self::Phone)
        } else if key.contains("email") {
            Some(Self::Email)
        } else if key.contains("địa chỉ") {
            Some(Self::Address)
        } else if key.contains("tiêu đề") {
            Some(Self::Title)
        } else if key.contains("phụ đề") {
            Some(Self::Subtitle)
        } else if key.contains("slogan") {
            Some(Self::Slogan)
        } else {
            None
        }
    }

    fn assign(self, contact: &mut Contact, value: &str) {
        let slot = match self {
            Self::Phone => &mut contact.phone,
            Self::Email => &mut contact.email,
            Self::Address => &mut contact.address,
            Self::Title => &mut contact.title,
            Self::Subtitle => &mut contact.subtitle,
            Self::Slogan => &mut contact.slogan,
        };
        *slot = Some(value.to_string());
    }
}

pub fn parse_page_markdown(markdown: &str) -> PageContent {
    let mut content = PageContent::default();
    let mut current: Option<String> = None;

    for raw in markdown.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(title) = line.strip_prefix("# ") {
            content.title = title.trim().to_string();
        } else if let Some(title) = line.strip_prefix("## ") {
            let title = title.trim().to_string();
            content.sections.insert(
                title.clone(),
                PageSection {
                    title: title.clone(),
                    ..PageSection::default()
                },
            );
            current = Some(title);
        } else if line.contains("**") && line.contains(':') {
            // Only the first two colon-separated segments are used.
            let mut parts = line.split(':');
            let key = parts.next().unwrap_or_default().trim().replace('*', "").to_lowercase();
            let value = parts.next().unwrap_or_default().trim().replace('*', "");

            if let Some(field) = ContactField::classify(&key) {
                field.assign(&mut content.contact, &value);
            }
            if let Some(section) = current.as_ref().and_then(|t| content.sections.get_mut(t)) {
                section.items.push(PageItem::Pair { key, value });
            }
        } else if line.starts_with("- ") || line.starts_with("✅ ") {
            let item = line
                .trim_start_matches(['-', '✅'])
                .trim()
                .to_string();
            if let Some(title) = current.as_ref() {
                if let Some(section) = content.sections.get_mut(title) {
                    section.items.push(PageItem::List { text: item.clone() });
                }
                let lowered = title.to_lowercase();
                if lowered.contains("sản phẩm") {
                    content.products.push(item);
                } else if lowered.contains("cam kết") {
                    content.features.push(item);
                }
            }
        } else if line.starts_with(CONTACT_EMOJI) {
            if let Some((key, value)) = line.split_once(':') {
                let key = key
                    .replace(|c: char| CONTACT_EMOJI.contains(&c) || c == '*', "")
                    .trim()
                    .to_lowercase();
                let value = value.trim().replace('*', "");
                match ContactField::classify(&key) {
                    Some(field @ (ContactField::Phone | ContactField::Email | ContactField::Address)) => {
                        field.assign(&mut content.contact, &value);
                    }
                    _ => {}
                }
            }
        } else if let Some(section) = current.as_ref().and_then(|t| content.sections.get_mut(t)) {
            if section.content.is_empty() {
                section.content = line.to_string();
            } else {
                section.content.push(' ');
                section.content.push_str(line);
            }
        }
    }

    content
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hotline_under_contact_heading() {
        let content = parse_page_markdown("## Liên hệ\n**Hotline**: 0984.288.512\n");
        assert_eq!(content.contact.phone.as_deref(), Some("0984.288.512"));
        let section = &content.sections["Liên hệ"];
        assert_eq!(
            section.items,
            vec![PageItem::Pair {
                key: "hotline".to_string(),
                value: "0984.288.512".to_string(),
            }]
        );
    }

    #[test]
    fn full_homepage() {
        let md = r#"# Mụn Dừa Hoàng Hiếu

## Giới thiệu
**Tiêu đề**: MỤN DỪA HOÀNG HIẾU
**Phụ đề**: GIẢI PHÁP NÔNG NGHIỆP XANH
Từ quê hương xứ dừa Bến Tre,
chúng tôi chọn lọc nguyên liệu tự nhiên.

## Sản phẩm nổi bật
- Mụn dừa xử lý
- Vỏ dừa cắt chip

## Cam kết
✅ Giao hàng toàn quốc
- Tư vấn miễn phí

## Liên hệ
📧 Email: munduahoanghieu.vn@gmail.com
📍 Địa chỉ: Ấp Hội An, Bến Tre
📞 Hotline: 0984.288.512
"#;
        let content = parse_page_markdown(md);
        assert_eq!(content.title, "Mụn Dừa Hoàng Hiếu");
        assert_eq!(content.contact.title.as_deref(), Some("MỤN DỪA HOÀNG HIẾU"));
        assert_eq!(
            content.contact.subtitle.as_deref(),
            Some("GIẢI PHÁP NÔNG NGHIỆP XANH")
        );
        assert_eq!(
            content.contact.email.as_deref(),
            Some("munduahoanghieu.vn@gmail.com")
        );
        assert_eq!(content.contact.address.as_deref(), Some("Ấp Hội An, Bến Tre"));
        assert_eq!(content.contact.phone.as_deref(), Some("0984.288.512"));
        assert_eq!(
            content.sections["Giới thiệu"].content,
            "Từ quê hương xứ dừa Bến Tre, chúng tôi chọn lọc nguyên liệu tự nhiên."
        );
        assert_eq!(content.products, vec!["Mụn dừa xử lý", "Vỏ dừa cắt chip"]);
        assert_eq!(
            content.features,
            vec!["Giao hàng toàn quốc", "Tư vấn miễn phí"]
        );
        assert!(content.sections["Liên hệ"].items.is_empty());
    }

    #[test]
    fn label_value_uses_second_segment_only() {
        let content = parse_page_markdown("## Giờ\n**Giờ mở cửa**: 7:30 - 17:00\n");
        assert_eq!(
            content.sections["Giờ"].items[0],
            PageItem::Pair {
                key: "giờ mở cửa".to_string(),
                value: "7".to_string(),
            }
        );
    }

    #[test]
    fn lines_before_any_section_only_feed_contact() {
        let content = parse_page_markdown("**Email**: a@b.vn\nfree text\n- item\n");
        assert_eq!(content.contact.email.as_deref(), Some("a@b.vn"));
        assert!(content.sections.is_empty());
        assert!(content.products.is_empty());
    }
}
