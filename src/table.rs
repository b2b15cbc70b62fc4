use std::sync::LazyLock;

use maud::{html, Markup};
use regex::Regex;
use serde::Serialize;

use crate::content::{CellFormat, ComparisonTable};
use crate::error::TableError;
use crate::render::inline_markup;

static CURRENCY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\$(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d{2})?\+?(?:\s*[-–]\s*\$(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d{2})?\+?)?(?:\s*/\s*[a-z]+)?$",
    )
    .unwrap()
});
static PERCENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{1,3}(?:\.\d+)?%(?:\s*[-–]\s*\d{1,3}(?:\.\d+)?%)?$").unwrap()
});
static DAY_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+(?:\s*[-–]\s*\d+)?\+?\s+(?:business\s+)?days?$").unwrap()
});
static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?\+?$").unwrap());

/// Cells that mean "not applicable" and pass any column format.
const PLACEHOLDERS: &[&str] = &["—", "-", "N/A"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stripe {
    Odd,
    Even,
}

impl Stripe {
    pub fn class(&self) -> &'static str {
        match self {
            Stripe::Odd => "odd",
            Stripe::Even => "even",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedRow {
    pub cells: Vec<String>,
    pub stripe: Stripe,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedTable {
    pub headers: Vec<String>,
    pub rows: Vec<RenderedRow>,
}

impl RenderedTable {
    /// (columns, rows)
    pub fn shape(&self) -> (usize, usize) {
        (self.headers.len(), self.rows.len())
    }

    pub fn markup(&self) -> Markup {
        html! {
            table.comparison {
                thead {
                    tr {
                        @for h in &self.headers {
                            th { (h) }
                        }
                    }
                }
                tbody {
                    @for row in &self.rows {
                        tr class=(row.stripe.class()) {
                            @for cell in &row.cells {
                                td { (inline_markup(cell)) }
                            }
                        }
                    }
                }
            }
        }
    }
}

pub fn cell_matches(format: &CellFormat, value: &str) -> bool {
    let value = value.trim();
    if PLACEHOLDERS.contains(&value) {
        return true;
    }
    match format {
        CellFormat::Currency => CURRENCY_RE.is_match(value),
        CellFormat::Percentage => PERCENT_RE.is_match(value),
        CellFormat::DayRange => DAY_RANGE_RE.is_match(value),
        CellFormat::Number => NUMBER_RE.is_match(value),
        CellFormat::Pattern(re) => re.is_match(value),
    }
}

/// Validate row shape and cell formats, then map the table to rendered rows.
/// Nothing is rendered while any row is ragged or any cell is malformed.
pub fn render(table: &ComparisonTable) -> Result<RenderedTable, Vec<TableError>> {
    let expected = table.columns.len();
    let mut errors = Vec::new();

    for (row_index, row) in table.rows.iter().enumerate() {
        if row.len() != expected {
            errors.push(TableError::RaggedRow {
                row_index,
                expected,
                actual: row.len(),
            });
            continue;
        }
        for (column, cell) in table.columns.iter().zip(row) {
            if let Some(format) = &column.format {
                if !cell_matches(format, cell) {
                    errors.push(TableError::CellFormatMismatch {
                        row: row_index,
                        column: column.label.clone(),
                        value: cell.clone(),
                    });
                }
            }
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(RenderedTable {
        headers: table.columns.iter().map(|c| c.label.clone()).collect(),
        rows: table
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| RenderedRow {
                cells: row.iter().map(|c| c.trim().to_string()).collect(),
                stripe: if i % 2 == 0 { Stripe::Odd } else { Stripe::Even },
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Column;

    fn col(label: &str, format: Option<CellFormat>) -> Column {
        Column {
            label: label.into(),
            format,
        }
    }

    fn table(rows: &[&[&str]]) -> ComparisonTable {
        ComparisonTable {
            columns: vec![
                col("Feature", None),
                col("A", Some(CellFormat::Currency)),
                col("B", Some(CellFormat::Currency)),
            ],
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn ragged_row_reported() {
        let t = table(&[&["Price", "$10"]]);
        assert_eq!(
            render(&t),
            Err(vec![TableError::RaggedRow {
                row_index: 0,
                expected: 3,
                actual: 2
            }])
        );
    }

    #[test]
    fn cell_format_mismatch() {
        let t = table(&[&["Price", "$3,000/month", "three grand"]]);
        assert_eq!(
            render(&t),
            Err(vec![TableError::CellFormatMismatch {
                row: 0,
                column: "B".into(),
                value: "three grand".into()
            }])
        );
    }

    #[test]
    fn formats() {
        use CellFormat::*;
        for ok in ["$3,000/month", "$99", "$150-$500/link", "$5000+", "N/A", "—"] {
            assert!(cell_matches(&Currency, ok), "{ok}");
        }
        for bad in ["3,000", "$3,00", "free"] {
            assert!(!cell_matches(&Currency, bad), "{bad}");
        }
        assert!(cell_matches(&Percentage, "92%"));
        assert!(cell_matches(&Percentage, "10% - 15%"));
        assert!(!cell_matches(&Percentage, "92"));
        assert!(cell_matches(&DayRange, "7-14 days"));
        assert!(cell_matches(&DayRange, "1 day"));
        assert!(cell_matches(&DayRange, "30+ business days"));
        assert!(!cell_matches(&DayRange, "two weeks"));
        assert!(cell_matches(&Number, "70+"));
        assert!(cell_matches(&Number, "1,200"));
        let dr = Pattern(Regex::new(r"^(?:DR \d{1,2}\+?)$").unwrap());
        assert!(cell_matches(&dr, "DR 50+"));
        assert!(!cell_matches(&dr, "DR high"));
    }

    #[test]
    fn stripes_alternate() {
        let t = table(&[&["Price", "$10", "$20"], &["Setup", "$0", "$5"], &["Min", "$1", "$2"]]);
        let r = render(&t).unwrap();
        let stripes: Vec<_> = r.rows.iter().map(|r| r.stripe).collect();
        assert_eq!(stripes, vec![Stripe::Odd, Stripe::Even, Stripe::Odd]);
    }

    #[test]
    fn html_keeps_shape() {
        let t = table(&[&["Price", "$10", "$20"], &["<b>Setup</b>", "$0", "N/A"]]);
        let r = render(&t).unwrap();
        let html = r.markup().into_string();
        assert!(html.contains("&lt;b&gt;Setup&lt;/b&gt;"));

        let row_re = Regex::new(r"(?s)<tr[^>]*>(.*?)</tr>").unwrap();
        let shapes: Vec<usize> = row_re
            .captures_iter(&html)
            .map(|c| c[1].matches("<td>").count() + c[1].matches("<th>").count())
            .collect();
        assert_eq!(shapes, vec![3, 3, 3]);
        assert_eq!(r.shape(), (3, 2));
    }
}
