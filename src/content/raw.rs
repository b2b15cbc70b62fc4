use serde::{Deserialize, Serialize};

/// One authored page record, as read from disk. Nothing here is validated yet;
/// `content::parse_page` turns it into a `Page`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawPage {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub published: String,
    #[serde(default)]
    pub updated: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review: Option<RawReview>,
    #[serde(default)]
    pub toc: Vec<RawTocEntry>,
    #[serde(default)]
    pub sections: Vec<RawSection>,
    #[serde(default)]
    pub links: Vec<RawLink>,
    #[serde(default)]
    pub related: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawReview {
    pub item_name: String,
    #[serde(default)]
    pub item_type: Option<String>,
    pub author: String,
    #[serde(default)]
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawTocEntry {
    pub label: String,
    pub target: String,
}

/// `content` stays untyped until the section kind is known.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawSection {
    pub id: String,
    #[serde(default)]
    pub heading: Option<String>,
    pub kind: String,
    #[serde(default)]
    pub nav: Option<bool>,
    #[serde(default)]
    pub content: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawLink {
    pub target: String,
    pub label: String,
}
