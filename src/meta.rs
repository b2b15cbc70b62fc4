use serde::Serialize;

use crate::config::Settings;
use crate::content::Page;

/// A `<meta>` tag in the page head. Open Graph tags use `property`, Twitter
/// and plain description tags use `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetaTag {
    pub attr: &'static str,
    pub key: String,
    pub content: String,
}

impl MetaTag {
    fn property(key: &str, content: impl Into<String>) -> Self {
        Self {
            attr: "property",
            key: key.to_string(),
            content: content.into(),
        }
    }

    fn name(key: &str, content: impl Into<String>) -> Self {
        Self {
            attr: "name",
            key: key.to_string(),
            content: content.into(),
        }
    }
}

pub fn open_graph(page: &Page, settings: &Settings) -> Vec<MetaTag> {
    let mut tags = Vec::with_capacity(10);

    if let Some(desc) = &page.description {
        tags.push(MetaTag::name("description", desc.clone()));
    }
    tags.push(MetaTag::property("og:type", "article"));
    tags.push(MetaTag::property("og:title", page.title.clone()));
    if let Some(desc) = &page.description {
        tags.push(MetaTag::property("og:description", desc.clone()));
    }
    tags.push(MetaTag::property("og:url", settings.page_url(&page.id)));
    tags.push(MetaTag::property("og:site_name", settings.site_name.clone()));
    tags.push(MetaTag::property(
        "article:published_time",
        page.published.to_string(),
    ));
    tags.push(MetaTag::property(
        "article:modified_time",
        page.modified().to_string(),
    ));
    tags.push(MetaTag::name("twitter:card", "summary_large_image"));
    tags.push(MetaTag::name("twitter:title", page.title.clone()));

    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{parse_page, RawPage};

    #[test]
    fn tags_follow_page_fields() {
        let raw: RawPage = serde_json::from_value(serde_json::json!({
            "id": "/tools/ahrefs-vs-semrush",
            "title": "Ahrefs vs Semrush",
            "published": "2024-02-02",
        }))
        .unwrap();
        let page = parse_page(&raw).unwrap();
        let tags = open_graph(&page, &Settings::default());

        let get = |k: &str| tags.iter().find(|t| t.key == k).map(|t| t.content.as_str());
        assert_eq!(get("og:title"), Some("Ahrefs vs Semrush"));
        assert_eq!(get("og:url"), Some("https://example.com/tools/ahrefs-vs-semrush"));
        assert_eq!(get("article:modified_time"), Some("2024-02-02"));
        assert_eq!(get("og:description"), None);
        assert_eq!(get("description"), None);
    }
}
