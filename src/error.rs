use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// Structural problems found while turning a raw record into a `Page`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("invalid page id {id:?}: must be an absolute path without whitespace, '#' or '?'")]
    InvalidPageId { id: String },
    #[error("page title is empty")]
    EmptyTitle,
    #[error("section {section:?} ({kind}) is malformed: {reason}")]
    MalformedSection {
        section: String,
        kind: String,
        reason: String,
    },
    #[error("section id {section:?} is not a valid anchor (lowercase, hyphenated, no whitespace)")]
    InvalidAnchorId { section: String },
    #[error("section id {section:?} is used more than once")]
    DuplicateSection { section: String },
    #[error("section {section:?} has no content")]
    EmptyPayload { section: String },
    #[error("faq item {index} in section {section:?} has an empty {field}")]
    EmptyFaqField {
        section: String,
        index: usize,
        field: &'static str,
    },
    #[error("{field} date {value:?} is not YYYY-MM-DD")]
    InvalidDate { field: &'static str, value: String },
    #[error("updated date {updated} is earlier than published date {published}")]
    UpdatedBeforePublished { published: String, updated: String },
    #[error("page rating {visible} differs from review rating {review}")]
    RatingMismatch { visible: f64, review: f64 },
    #[error("review metadata present but no rating given")]
    ReviewWithoutRating,
    #[error("rating {value} has more than one decimal place")]
    RatingPrecision { value: f64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnchorIssue {
    #[error("toc entry {entry:?} points to a section that does not exist")]
    DanglingAnchor { entry: String },
    #[error("section {section:?} has no table of contents entry")]
    OrphanSection { section: String },
    #[error("section {target:?} is listed {count} times in the table of contents")]
    DuplicateTocEntry { target: String, count: usize },
    #[error("toc entry {entry:?} appears after {previous:?} but its section comes first in the body")]
    OutOfOrderAnchor { entry: String, previous: String },
}

impl AnchorIssue {
    pub fn severity(&self) -> Severity {
        match self {
            AnchorIssue::OutOfOrderAnchor { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum LinkError {
    #[error("{page} links to {target}, which is not a known page")]
    BrokenLink { page: String, target: String },
    #[error("{page} links to {target}#{fragment}, but {target} has no such section")]
    DanglingFragment {
        page: String,
        target: String,
        fragment: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("row {row_index} has {actual} cells, expected {expected}")]
    RaggedRow {
        row_index: usize,
        expected: usize,
        actual: usize,
    },
    #[error("row {row}, column {column:?}: {value:?} does not match the column format")]
    CellFormatMismatch {
        row: usize,
        column: String,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EmitError {
    #[error("rating {value} is outside [0, {best}]")]
    InvalidRating { value: f64, best: f64 },
    #[error("failed to serialize structured data: {0}")]
    Serialize(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("page id {id} is declared by more than one record")]
    DuplicatePage { id: String },
}

/// Every problem the assembler can report for a page.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssemblyError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Anchor(#[from] AnchorIssue),
    #[error(transparent)]
    Link(#[from] LinkError),
    #[error("table in section {section:?}: {error}")]
    Table { section: String, error: TableError },
    #[error(transparent)]
    Emit(#[from] EmitError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl AssemblyError {
    pub fn severity(&self) -> Severity {
        match self {
            AssemblyError::Anchor(issue) => issue.severity(),
            _ => Severity::Error,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Error
    }

    /// Stable short name used in reports.
    pub fn code(&self) -> &'static str {
        match self {
            AssemblyError::Validation(e) => match e {
                ValidationError::InvalidPageId { .. } => "InvalidPageId",
                ValidationError::EmptyTitle => "EmptyTitle",
                ValidationError::MalformedSection { .. } => "MalformedSection",
                ValidationError::InvalidAnchorId { .. } => "InvalidAnchorId",
                ValidationError::DuplicateSection { .. } => "DuplicateSection",
                ValidationError::EmptyPayload { .. } => "EmptyPayload",
                ValidationError::EmptyFaqField { .. } => "EmptyFaqField",
                ValidationError::InvalidDate { .. } => "InvalidDate",
                ValidationError::UpdatedBeforePublished { .. } => "UpdatedBeforePublished",
                ValidationError::RatingMismatch { .. } => "RatingMismatch",
                ValidationError::ReviewWithoutRating => "ReviewWithoutRating",
                ValidationError::RatingPrecision { .. } => "RatingPrecision",
            },
            AssemblyError::Anchor(e) => match e {
                AnchorIssue::DanglingAnchor { .. } => "DanglingAnchor",
                AnchorIssue::OrphanSection { .. } => "OrphanSection",
                AnchorIssue::DuplicateTocEntry { .. } => "DuplicateTocEntry",
                AnchorIssue::OutOfOrderAnchor { .. } => "OutOfOrderAnchor",
            },
            AssemblyError::Link(e) => match e {
                LinkError::BrokenLink { .. } => "BrokenLink",
                LinkError::DanglingFragment { .. } => "DanglingFragment",
            },
            AssemblyError::Table { error, .. } => match error {
                TableError::RaggedRow { .. } => "RaggedRow",
                TableError::CellFormatMismatch { .. } => "CellFormatMismatch",
            },
            AssemblyError::Emit(EmitError::InvalidRating { .. }) => "InvalidRating",
            AssemblyError::Emit(EmitError::Serialize(_)) => "StructuredData",
            AssemblyError::Registry(RegistryError::DuplicatePage { .. }) => "DuplicatePage",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_order_is_the_only_warning() {
        let warn = AssemblyError::from(AnchorIssue::OutOfOrderAnchor {
            entry: "b".into(),
            previous: "a".into(),
        });
        assert_eq!(warn.severity(), Severity::Warning);
        assert!(!warn.is_fatal());

        let dangling = AssemblyError::from(AnchorIssue::DanglingAnchor { entry: "x".into() });
        assert!(dangling.is_fatal());
        assert_eq!(dangling.code(), "DanglingAnchor");
    }

    #[test]
    fn table_error_message_names_section() {
        let e = AssemblyError::Table {
            section: "pricing".into(),
            error: TableError::RaggedRow {
                row_index: 0,
                expected: 3,
                actual: 2,
            },
        };
        assert_eq!(e.code(), "RaggedRow");
        assert!(e.to_string().contains("pricing"));
        assert!(e.to_string().contains("expected 3"));
    }
}
