use maud::{html, Markup, PreEscaped};
use serde::Serialize;

use crate::content::links::INLINE_LINKS_RE;
use crate::content::{FaqItem, Stat, TocEntry};
use crate::error::AssemblyError;
use crate::meta::MetaTag;
use crate::table::RenderedTable;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderedBody {
    Prose { paragraphs: Vec<String> },
    ComparisonTable { table: RenderedTable },
    Checklist { items: Vec<String> },
    FaqList { items: Vec<FaqItem> },
    StatBlock { stats: Vec<Stat> },
    Cta { text: String, label: String, href: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedSection {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    pub body: RenderedBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedLink {
    pub id: String,
    pub title: String,
}

/// Validated page content handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedPage {
    pub id: String,
    pub url: String,
    pub title: String,
    pub head: Vec<MetaTag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating_label: Option<String>,
    pub toc: Vec<TocEntry>,
    pub sections: Vec<RenderedSection>,
    pub related: Vec<RelatedLink>,
    pub json_ld: Vec<String>,
    #[serde(skip)]
    pub warnings: Vec<AssemblyError>,
}

enum Inline<'a> {
    Text(&'a str),
    Link { label: &'a str, href: &'a str },
}

fn inline_parts(text: &str) -> Vec<Inline<'_>> {
    let mut parts = Vec::new();
    let mut last = 0;
    for caps in INLINE_LINKS_RE.captures_iter(text) {
        let (Some(m), Some(label), Some(href)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        parts.push(Inline::Text(&text[last..m.start()]));
        parts.push(Inline::Link {
            label: label.as_str(),
            href: href.as_str(),
        });
        last = m.end();
    }
    parts.push(Inline::Text(&text[last..]));
    parts
}

/// Escaped text with `[label](href)` turned into anchors.
pub fn inline_markup(text: &str) -> Markup {
    html! {
        @for part in inline_parts(text) {
            @match part {
                Inline::Text(t) => { (t) },
                Inline::Link { label, href } => { a href=(href) { (label) } },
            }
        }
    }
}

/// Text with link markup reduced to the link labels.
pub fn plain_text(text: &str) -> String {
    INLINE_LINKS_RE.replace_all(text, "$1").trim().to_string()
}

impl RenderedPage {
    /// Head tags plus the article body. Navigation chrome and styling are left
    /// to whoever embeds this fragment.
    pub fn markup(&self) -> Markup {
        html! {
            title { (self.title) }
            link rel="canonical" href=(self.url);
            @for tag in &self.head {
                @if tag.attr == "property" {
                    meta property=(tag.key) content=(tag.content);
                } @else {
                    meta name=(tag.key) content=(tag.content);
                }
            }
            @for block in &self.json_ld {
                // keep "</script>" inside a string from closing the tag
                script type="application/ld+json" { (PreEscaped(block.replace("</", "<\\/"))) }
            }
            article {
                h1 { (self.title) }
                @if let Some(label) = &self.rating_label {
                    p.rating { "Rating: " (label) }
                }
                @if !self.toc.is_empty() {
                    nav.toc {
                        ol {
                            @for entry in &self.toc {
                                li { a href=(format!("#{}", entry.target)) { (entry.label) } }
                            }
                        }
                    }
                }
                @for section in &self.sections {
                    (section.markup())
                }
                @if !self.related.is_empty() {
                    aside.related {
                        h2 { "Related" }
                        ul {
                            @for r in &self.related {
                                li { a href=(r.id) { (r.title) } }
                            }
                        }
                    }
                }
            }
        }
    }

    pub fn to_html(&self) -> String {
        self.markup().into_string()
    }
}

impl RenderedSection {
    fn markup(&self) -> Markup {
        let class = match &self.body {
            RenderedBody::Prose { .. } => "prose",
            RenderedBody::ComparisonTable { .. } => "comparison-table",
            RenderedBody::Checklist { .. } => "checklist",
            RenderedBody::FaqList { .. } => "faq",
            RenderedBody::StatBlock { .. } => "stats",
            RenderedBody::Cta { .. } => "cta",
        };
        html! {
            section id=(self.id) class=(class) {
                @if let Some(heading) = &self.heading {
                    h2 { (heading) }
                }
                @match &self.body {
                    RenderedBody::Prose { paragraphs } => {
                        @for para in paragraphs {
                            p { (inline_markup(para)) }
                        }
                    },
                    RenderedBody::ComparisonTable { table } => { (table.markup()) },
                    RenderedBody::Checklist { items } => {
                        ul {
                            @for item in items {
                                li { (inline_markup(item)) }
                            }
                        }
                    },
                    RenderedBody::FaqList { items } => {
                        @for item in items {
                            details {
                                summary { (item.question) }
                                p { (inline_markup(&item.answer)) }
                            }
                        }
                    },
                    RenderedBody::StatBlock { stats } => {
                        dl {
                            @for stat in stats {
                                dt { (stat.value) }
                                dd { (stat.label) }
                            }
                        }
                    },
                    RenderedBody::Cta { text, label, href } => {
                        p { (inline_markup(text)) }
                        a.button href=(href) { (label) }
                    },
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_links_become_anchors() {
        assert_eq!(
            inline_markup("Read the [full comparison →](/compare/a-vs-b) & more").into_string(),
            "Read the <a href=\"/compare/a-vs-b\">full comparison →</a> &amp; more"
        );
        assert_eq!(inline_markup("no links").into_string(), "no links");
        assert_eq!(
            inline_markup("[<b>x</b>](/a?b=\"c\")").into_string(),
            "<a href=\"/a?b=&quot;c&quot;\">&lt;b&gt;x&lt;/b&gt;</a>"
        );
    }

    #[test]
    fn plain_text_drops_link_markup() {
        assert_eq!(plain_text("See [pricing](/pricing) now."), "See pricing now.");
    }

    #[test]
    fn page_fragment_has_sections_and_scripts() {
        let page = RenderedPage {
            id: "/a".into(),
            url: "https://example.com/a".into(),
            title: "A & B".into(),
            head: vec![],
            rating_label: Some("4.5/5".into()),
            toc: vec![TocEntry {
                label: "Overview".into(),
                target: "overview".into(),
            }],
            sections: vec![RenderedSection {
                id: "overview".into(),
                heading: Some("Overview".into()),
                body: RenderedBody::Prose {
                    paragraphs: vec!["Hello".into()],
                },
            }],
            related: vec![],
            json_ld: vec!["{\"headline\":\"</script>\"}".into()],
            warnings: vec![],
        };
        let html = page.to_html();
        assert!(html.contains("<title>A &amp; B</title>"));
        assert!(html.contains("<a href=\"#overview\">Overview</a>"));
        assert!(html.contains("<section id=\"overview\" class=\"prose\">"));
        assert!(html.contains("<\\/script>"));
        assert!(html.contains("Rating: 4.5/5"));
    }
}
