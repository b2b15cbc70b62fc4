use std::sync::LazyLock;

use regex::Regex;

use super::model::{InternalLink, LinkOrigin, Section, SectionBody};

pub(crate) static INLINE_LINKS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\(([^)\s]+)\)").unwrap());

/// Strip a trailing slash so `/reviews/` and `/reviews` name the same page.
pub fn normalize_id(id: &str) -> String {
    let trimmed = id.trim();
    if trimmed.len() > 1 {
        trimmed.trim_end_matches('/').to_string()
    } else {
        trimmed.to_string()
    }
}

/// Split an href into (page id, fragment). External hrefs yield `None`;
/// a bare `#frag` points at `current`.
pub fn split_href(href: &str, current: &str) -> Option<(String, Option<String>)> {
    let href = href.trim();
    if href.starts_with("//") {
        return None;
    }
    if let Some(frag) = href.strip_prefix('#') {
        return Some((current.to_string(), non_empty(frag)));
    }
    if !href.starts_with('/') {
        return None;
    }
    // query strings don't change which page is targeted
    let (path, fragment) = match href.split_once('#') {
        Some((p, f)) => (p, non_empty(f)),
        None => (href, None),
    };
    let path = path.split('?').next().unwrap_or(path);
    Some((normalize_id(path), fragment))
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Markdown-style `[label](href)` links inside a piece of text.
pub fn inline_links(text: &str) -> Vec<(String, String)> {
    INLINE_LINKS_RE
        .captures_iter(text)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .collect()
}

/// Every internal link carried by the page body: inline `[label](href)` links
/// and cta targets, in document order.
pub fn extract(source: &str, sections: &[Section]) -> Vec<InternalLink> {
    let mut links = Vec::new();

    for section in sections {
        match &section.body {
            SectionBody::Prose(paragraphs) => {
                for p in paragraphs {
                    push_inline(source, p, &mut links);
                }
            }
            SectionBody::Checklist(items) => {
                for item in items {
                    push_inline(source, item, &mut links);
                }
            }
            SectionBody::FaqList(items) => {
                for item in items {
                    push_inline(source, &item.answer, &mut links);
                }
            }
            SectionBody::Cta(cta) => {
                if let Some((target, fragment)) = split_href(&cta.href, source) {
                    links.push(InternalLink {
                        source: source.to_string(),
                        target,
                        fragment,
                        label: cta.label.clone(),
                        origin: LinkOrigin::Cta,
                    });
                }
            }
            SectionBody::ComparisonTable(table) => {
                for row in &table.rows {
                    for cell in row {
                        push_inline(source, cell, &mut links);
                    }
                }
            }
            SectionBody::StatBlock(_) => {}
        }
    }

    links
}

fn push_inline(source: &str, text: &str, links: &mut Vec<InternalLink>) {
    for (label, href) in inline_links(text) {
        if let Some((target, fragment)) = split_href(&href, source) {
            links.push(InternalLink {
                source: source.to_string(),
                target,
                fragment,
                label,
                origin: LinkOrigin::Inline,
            });
        }
    }
}
