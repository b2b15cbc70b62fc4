use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub published: NaiveDate,
    pub updated: Option<NaiveDate>,
    pub rating: Option<Rating>,
    pub review: Option<Review>,
    pub sections: Vec<Section>,
    pub toc: Vec<TocEntry>,
    pub links: Vec<InternalLink>,
    pub related: Vec<String>,
}

impl Page {
    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn has_section(&self, id: &str) -> bool {
        self.section(id).is_some()
    }

    /// Latest of published/updated.
    pub fn modified(&self) -> NaiveDate {
        self.updated.unwrap_or(self.published)
    }

    /// FAQ items of every `FaqList` section, in document order.
    pub fn faq_items(&self) -> impl Iterator<Item = &FaqItem> {
        self.sections.iter().flat_map(|s| match &s.body {
            SectionBody::FaqList(items) => items.as_slice(),
            _ => &[][..],
        })
    }

    pub fn has_faq(&self) -> bool {
        self.sections
            .iter()
            .any(|s| matches!(s.body, SectionBody::FaqList(_)))
    }
}

/// A rating on a 0..=best scale, stored once and derived into both the visible
/// label and the JSON-LD `reviewRating`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rating {
    pub value: f64,
}

impl Rating {
    pub fn label(&self, best: f64) -> String {
        format!("{:.1}/{}", self.value, best)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub item_name: String,
    pub item_type: String,
    pub author: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub id: String,
    pub heading: Option<String>,
    pub nav: bool,
    pub body: SectionBody,
}

impl Section {
    pub fn kind(&self) -> SectionKind {
        self.body.kind()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Prose,
    ComparisonTable,
    Checklist,
    FaqList,
    StatBlock,
    Cta,
}

impl SectionKind {
    pub const ALL: [SectionKind; 6] = [
        SectionKind::Prose,
        SectionKind::ComparisonTable,
        SectionKind::Checklist,
        SectionKind::FaqList,
        SectionKind::StatBlock,
        SectionKind::Cta,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "prose" => Some(SectionKind::Prose),
            "comparison_table" => Some(SectionKind::ComparisonTable),
            "checklist" => Some(SectionKind::Checklist),
            "faq_list" => Some(SectionKind::FaqList),
            "stat_block" => Some(SectionKind::StatBlock),
            "cta" => Some(SectionKind::Cta),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Prose => "prose",
            SectionKind::ComparisonTable => "comparison_table",
            SectionKind::Checklist => "checklist",
            SectionKind::FaqList => "faq_list",
            SectionKind::StatBlock => "stat_block",
            SectionKind::Cta => "cta",
        }
    }

    /// Cta and stat blocks are decorative and stay out of the TOC unless a
    /// section opts in.
    pub fn nav_default(&self) -> bool {
        !matches!(self, SectionKind::Cta | SectionKind::StatBlock)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SectionBody {
    Prose(Vec<String>),
    ComparisonTable(ComparisonTable),
    Checklist(Vec<String>),
    FaqList(Vec<FaqItem>),
    StatBlock(Vec<Stat>),
    Cta(Cta),
}

impl SectionBody {
    pub fn kind(&self) -> SectionKind {
        match self {
            SectionBody::Prose(_) => SectionKind::Prose,
            SectionBody::ComparisonTable(_) => SectionKind::ComparisonTable,
            SectionBody::Checklist(_) => SectionKind::Checklist,
            SectionBody::FaqList(_) => SectionKind::FaqList,
            SectionBody::StatBlock(_) => SectionKind::StatBlock,
            SectionBody::Cta(_) => SectionKind::Cta,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub label: String,
    pub target: String,
}

#[derive(Debug, Clone)]
pub struct ComparisonTable {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
}

impl PartialEq for ComparisonTable {
    fn eq(&self, other: &Self) -> bool {
        self.columns == other.columns && self.rows == other.rows
    }
}

#[derive(Debug, Clone)]
pub struct Column {
    pub label: String,
    pub format: Option<CellFormat>,
}

impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label
            && self.format.as_ref().map(CellFormat::name) == other.format.as_ref().map(CellFormat::name)
    }
}

/// Declared shape of the cells in one table column.
#[derive(Debug, Clone)]
pub enum CellFormat {
    Currency,
    Percentage,
    DayRange,
    Number,
    Pattern(Regex),
}

impl CellFormat {
    pub fn name(&self) -> String {
        match self {
            CellFormat::Currency => "currency".into(),
            CellFormat::Percentage => "percentage".into(),
            CellFormat::DayRange => "day_range".into(),
            CellFormat::Number => "number".into(),
            CellFormat::Pattern(re) => format!("pattern:{}", re.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FaqItem {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Stat {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Cta {
    pub text: String,
    pub label: String,
    pub href: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkOrigin {
    Explicit,
    Related,
    Cta,
    Inline,
}

/// A link from one page of the site to another (or to itself).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalLink {
    pub source: String,
    pub target: String,
    pub fragment: Option<String>,
    pub label: String,
    pub origin: LinkOrigin,
}
