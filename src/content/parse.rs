use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::links::{self, normalize_id, split_href};
use super::model::*;
use super::raw::{RawPage, RawSection};
use crate::error::ValidationError;

static ANCHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap());
static PAGE_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^/[^\s#?]*$").unwrap());

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ProsePayload {
    paragraphs: Vec<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TablePayload {
    columns: Vec<RawColumn>,
    rows: Vec<Vec<String>>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawColumn {
    label: String,
    #[serde(default)]
    format: Option<RawFormat>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFormat {
    Named(String),
    Pattern { pattern: String },
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ChecklistPayload {
    items: Vec<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct FaqPayload {
    items: Vec<FaqItem>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct StatPayload {
    stats: Vec<Stat>,
}

pub fn is_valid_anchor(id: &str) -> bool {
    ANCHOR_RE.is_match(id)
}

/// An id is also an output path, so `.`/`..` and empty segments are refused.
pub fn is_valid_page_id(id: &str) -> bool {
    PAGE_ID_RE.is_match(id)
        && (id == "/"
            || id[1..]
                .split('/')
                .all(|seg| !seg.is_empty() && seg != "." && seg != ".."))
}

/// Turn one authored record into a typed `Page`, reporting every structural
/// problem found rather than stopping at the first.
pub fn parse_page(raw: &RawPage) -> Result<Page, Vec<ValidationError>> {
    let mut errors = Vec::new();

    let id = normalize_id(&raw.id);
    if !is_valid_page_id(&id) {
        errors.push(ValidationError::InvalidPageId { id: raw.id.clone() });
    }
    if raw.title.trim().is_empty() {
        errors.push(ValidationError::EmptyTitle);
    }

    let published = parse_date("published", &raw.published, &mut errors);
    let updated = raw
        .updated
        .as_deref()
        .and_then(|u| parse_date("updated", u, &mut errors));
    if let (Some(p), Some(u)) = (published, updated) {
        if u < p {
            errors.push(ValidationError::UpdatedBeforePublished {
                published: p.to_string(),
                updated: u.to_string(),
            });
        }
    }

    let (rating, review) = parse_rating(raw, &mut errors);

    let mut seen = HashSet::new();
    let mut sections = Vec::with_capacity(raw.sections.len());
    for rs in &raw.sections {
        if !is_valid_anchor(&rs.id) {
            errors.push(ValidationError::InvalidAnchorId {
                section: rs.id.clone(),
            });
        }
        if !seen.insert(rs.id.as_str()) {
            errors.push(ValidationError::DuplicateSection {
                section: rs.id.clone(),
            });
        }
        match parse_section(rs) {
            Ok(section) => sections.push(section),
            Err(mut errs) => errors.append(&mut errs),
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    // errors is empty, so the published date parsed
    let Some(published) = published else {
        return Err(vec![ValidationError::InvalidDate {
            field: "published",
            value: raw.published.clone(),
        }]);
    };

    let toc = raw
        .toc
        .iter()
        .map(|t| TocEntry {
            label: t.label.clone(),
            target: t.target.trim_start_matches('#').to_string(),
        })
        .collect();

    let mut page_links = Vec::new();
    for l in &raw.links {
        // absolute URLs leave the site and are not checked
        let Some((target, fragment)) = split_href(&l.target, &id) else {
            continue;
        };
        page_links.push(InternalLink {
            source: id.clone(),
            target,
            fragment,
            label: l.label.clone(),
            origin: LinkOrigin::Explicit,
        });
    }
    let related: Vec<String> = raw.related.iter().map(|r| normalize_id(r)).collect();
    for r in &related {
        page_links.push(InternalLink {
            source: id.clone(),
            target: r.clone(),
            fragment: None,
            label: String::new(),
            origin: LinkOrigin::Related,
        });
    }
    page_links.extend(links::extract(&id, &sections));

    Ok(Page {
        id,
        title: raw.title.trim().to_string(),
        description: raw.description.clone().filter(|d| !d.trim().is_empty()),
        published,
        updated,
        rating,
        review,
        sections,
        toc,
        links: page_links,
        related,
    })
}

fn parse_date(
    field: &'static str,
    value: &str,
    errors: &mut Vec<ValidationError>,
) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") {
        Ok(d) => Some(d),
        Err(_) => {
            errors.push(ValidationError::InvalidDate {
                field,
                value: value.to_string(),
            });
            None
        }
    }
}

/// The page-level rating is canonical; a review may repeat it but never
/// disagree with it.
fn parse_rating(
    raw: &RawPage,
    errors: &mut Vec<ValidationError>,
) -> (Option<Rating>, Option<Review>) {
    let review_rating = raw.review.as_ref().and_then(|r| r.rating);
    let value = match (raw.rating, review_rating) {
        (Some(visible), Some(review)) if visible != review => {
            errors.push(ValidationError::RatingMismatch { visible, review });
            Some(visible)
        }
        (Some(v), _) | (None, Some(v)) => Some(v),
        (None, None) => None,
    };

    if let Some(v) = value {
        if v.is_finite() && ((v * 10.0).round() - v * 10.0).abs() > 1e-9 {
            errors.push(ValidationError::RatingPrecision { value: v });
        }
    }

    let review = raw.review.as_ref().map(|r| Review {
        item_name: r.item_name.trim().to_string(),
        item_type: r
            .item_type
            .clone()
            .unwrap_or_else(|| "Organization".to_string()),
        author: r.author.trim().to_string(),
    });
    if review.is_some() && value.is_none() {
        errors.push(ValidationError::ReviewWithoutRating);
    }

    (value.map(|value| Rating { value }), review)
}

fn payload<T: DeserializeOwned>(rs: &RawSection) -> Result<T, Vec<ValidationError>> {
    serde_json::from_value(rs.content.clone()).map_err(|e| {
        vec![ValidationError::MalformedSection {
            section: rs.id.clone(),
            kind: rs.kind.clone(),
            reason: e.to_string(),
        }]
    })
}

fn malformed(rs: &RawSection, reason: impl Into<String>) -> ValidationError {
    ValidationError::MalformedSection {
        section: rs.id.clone(),
        kind: rs.kind.clone(),
        reason: reason.into(),
    }
}

fn parse_section(rs: &RawSection) -> Result<Section, Vec<ValidationError>> {
    let Some(kind) = SectionKind::parse(&rs.kind) else {
        return Err(vec![malformed(rs, "unknown section kind")]);
    };

    let empty = || {
        vec![ValidationError::EmptyPayload {
            section: rs.id.clone(),
        }]
    };

    let body = match kind {
        SectionKind::Prose => {
            let p: ProsePayload = payload(rs)?;
            if p.paragraphs.iter().all(|s| s.trim().is_empty()) {
                return Err(empty());
            }
            SectionBody::Prose(p.paragraphs)
        }
        SectionKind::Checklist => {
            let p: ChecklistPayload = payload(rs)?;
            if p.items.is_empty() {
                return Err(empty());
            }
            SectionBody::Checklist(p.items)
        }
        SectionKind::FaqList => {
            let p: FaqPayload = payload(rs)?;
            if p.items.is_empty() {
                return Err(empty());
            }
            let mut errs = Vec::new();
            for (index, item) in p.items.iter().enumerate() {
                if item.question.trim().is_empty() {
                    errs.push(ValidationError::EmptyFaqField {
                        section: rs.id.clone(),
                        index,
                        field: "question",
                    });
                }
                if item.answer.trim().is_empty() {
                    errs.push(ValidationError::EmptyFaqField {
                        section: rs.id.clone(),
                        index,
                        field: "answer",
                    });
                }
            }
            if !errs.is_empty() {
                return Err(errs);
            }
            SectionBody::FaqList(p.items)
        }
        SectionKind::StatBlock => {
            let p: StatPayload = payload(rs)?;
            if p.stats.is_empty() {
                return Err(empty());
            }
            SectionBody::StatBlock(p.stats)
        }
        SectionKind::Cta => SectionBody::Cta(payload::<Cta>(rs)?),
        SectionKind::ComparisonTable => SectionBody::ComparisonTable(parse_table(rs)?),
    };

    Ok(Section {
        id: rs.id.clone(),
        heading: rs.heading.clone().filter(|h| !h.trim().is_empty()),
        nav: rs.nav.unwrap_or_else(|| kind.nav_default()),
        body,
    })
}

fn parse_table(rs: &RawSection) -> Result<ComparisonTable, Vec<ValidationError>> {
    let p: TablePayload = payload(rs)?;
    let mut errs = Vec::new();

    if p.columns.len() < 2 {
        errs.push(malformed(
            rs,
            format!("a comparison table needs at least 2 columns, got {}", p.columns.len()),
        ));
    }
    if p.rows.is_empty() {
        errs.push(ValidationError::EmptyPayload {
            section: rs.id.clone(),
        });
    }

    let mut columns = Vec::with_capacity(p.columns.len());
    for col in p.columns {
        let format = match col.format {
            None => None,
            Some(RawFormat::Named(name)) => match name.as_str() {
                "currency" => Some(CellFormat::Currency),
                "percentage" => Some(CellFormat::Percentage),
                "day_range" => Some(CellFormat::DayRange),
                "number" => Some(CellFormat::Number),
                other => {
                    errs.push(malformed(
                        rs,
                        format!("column {:?} has unknown format {:?}", col.label, other),
                    ));
                    None
                }
            },
            // anchored so a pattern has to describe the whole cell
            Some(RawFormat::Pattern { pattern }) => match Regex::new(&format!("^(?:{})$", pattern)) {
                Ok(re) => Some(CellFormat::Pattern(re)),
                Err(e) => {
                    errs.push(malformed(
                        rs,
                        format!("column {:?} has an invalid pattern: {}", col.label, e),
                    ));
                    None
                }
            },
        };
        columns.push(Column {
            label: col.label,
            format,
        });
    }

    if !errs.is_empty() {
        return Err(errs);
    }
    Ok(ComparisonTable {
        columns,
        rows: p.rows,
    })
}
