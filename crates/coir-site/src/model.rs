use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

pub const DEFAULT_PRODUCT_CATEGORY: &str = "main";
pub const DEFAULT_PRODUCT_PRICE: &str = "Liên hệ";
pub const DEFAULT_PRODUCT_IMAGE: &str = "/assets/image/products/default.jpg";
pub const DEFAULT_RATING: u8 = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Banner {
    pub image: String,
    pub title: String,
    pub subtitle: String,
    pub active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Product {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    pub category: String,
    pub description: String,
    pub features: Vec<String>,
    pub price: String,
    pub image: String,
}

impl Product {
    /// A product named `name` with the catalogue defaults filled in.
    pub fn named(id: String, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            category: DEFAULT_PRODUCT_CATEGORY.to_string(),
            description: String::new(),
            features: Vec::new(),
            price: DEFAULT_PRODUCT_PRICE.to_string(),
            image: DEFAULT_PRODUCT_IMAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Testimonial {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    pub location: String,
    pub content: String,
    pub rating: u8,
    pub product: String,
    pub date: String,
    pub avatar_color: String,
    pub crop: String,
    pub usage_duration: String,
}

impl Default for Testimonial {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            location: String::new(),
            content: String::new(),
            rating: DEFAULT_RATING,
            product: String::new(),
            date: String::new(),
            avatar_color: String::new(),
            crop: String::new(),
            usage_duration: String::new(),
        }
    }
}

/// Contact fields recognised on the homepage and in `company.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slogan: Option<String>,
}

impl Contact {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SocialLink {
    pub url: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CompanyInfo {
    pub name: Option<String>,
    pub tagline: Option<String>,
    pub contact: Option<Contact>,
    pub social_media: BTreeMap<String, SocialLink>,
}

/// Ids written by the admin backend are integers; markdown-derived ids are slugs.
fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Option::<Id>::deserialize(deserializer)? {
        Some(Id::Text(text)) => text,
        Some(Id::Number(number)) => number.to_string(),
        None => String::new(),
    })
}

/// Keeps every record that decodes and logs the rest.
fn valid_records<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let records = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(records
        .into_iter()
        .filter_map(|record| {
            serde_json::from_value(record)
                .inspect_err(|e| warn!(error = %e, "skipping invalid record"))
                .ok()
        })
        .collect())
}

// JSON documents as stored under `data/`. Each wraps its payload in a named key;
// a missing key reads as empty.

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BannersDoc {
    #[serde(deserialize_with = "valid_records")]
    pub banners: Vec<Banner>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProductsDoc {
    #[serde(deserialize_with = "valid_records")]
    pub products: Vec<Product>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TestimonialsDoc {
    #[serde(deserialize_with = "valid_records")]
    pub testimonials: Vec<Testimonial>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CompanyDoc {
    pub company: CompanyInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_wrapper_key_reads_as_empty() {
        let doc: ProductsDoc = serde_json::from_str("{}").unwrap();
        assert!(doc.products.is_empty());
        let doc: CompanyDoc = serde_json::from_str(r#"{"other": 1}"#).unwrap();
        assert!(doc.company.contact.is_none());
    }

    #[test]
    fn testimonial_rating_defaults_to_five() {
        let doc: TestimonialsDoc =
            serde_json::from_str(r#"{"testimonials": [{"name": "Chị Lan"}]}"#).unwrap();
        assert_eq!(doc.testimonials[0].rating, 5);
        assert_eq!(doc.testimonials[0].name, "Chị Lan");
    }

    #[test]
    fn admin_written_documents_decode() {
        let doc: ProductsDoc = serde_json::from_str(
            r#"{"products": [
                {"id": 1, "name": "Mụn dừa", "description": "Sạch", "features": ["Tơi xốp"],
                 "price": "Liên hệ", "category": "main", "image": "/assets/image/products/default.jpg"},
                {"id": "xo-dua", "name": "Xơ dừa"}
            ]}"#,
        )
        .unwrap();
        let ids: Vec<_> = doc.products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "xo-dua"]);

        let doc: TestimonialsDoc = serde_json::from_str(
            r#"{"testimonials": [
                {"id": 2, "name": "Anh Tùng", "location": "Đà Lạt", "rating": 5,
                 "content": "Rất tốt", "crop": "Dâu tây", "usage_duration": "6 tháng",
                 "avatar_color": "bg-green-600"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(doc.testimonials[0].id, "2");
        assert_eq!(doc.testimonials[0].crop, "Dâu tây");
    }

    #[test]
    fn one_bad_record_does_not_drop_the_document() {
        let doc: ProductsDoc = serde_json::from_str(
            r#"{"products": [{"id": 1, "name": "Mụn dừa"}, {"id": 2, "name": 42}]}"#,
        )
        .unwrap();
        assert_eq!(doc.products.len(), 1);
        assert_eq!(doc.products[0].name, "Mụn dừa");
    }
}
