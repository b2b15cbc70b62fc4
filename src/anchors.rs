use std::collections::HashMap;

use crate::content::Page;
use crate::error::AnchorIssue;

/// Check that the table of contents and the section anchors agree.
///
/// Every TOC entry must hit a section, every navigable section must be listed
/// exactly once, and the TOC must follow body order. Out-of-order entries come
/// back as warnings alongside the errors.
pub fn resolve(page: &Page) -> Result<(), Vec<AnchorIssue>> {
    let mut issues = Vec::new();

    let position: HashMap<&str, usize> = page
        .sections
        .iter()
        .enumerate()
        .map(|(i, s)| (s.id.as_str(), i))
        .collect();

    let mut listed: HashMap<&str, usize> = HashMap::new();
    let mut last: Option<(usize, &str)> = None;

    for entry in &page.toc {
        let Some(&pos) = position.get(entry.target.as_str()) else {
            issues.push(AnchorIssue::DanglingAnchor {
                entry: entry.target.clone(),
            });
            continue;
        };

        *listed.entry(entry.target.as_str()).or_default() += 1;

        match last {
            Some((prev_pos, prev)) if pos < prev_pos => {
                issues.push(AnchorIssue::OutOfOrderAnchor {
                    entry: entry.target.clone(),
                    previous: prev.to_string(),
                });
            }
            _ => last = Some((pos, entry.target.as_str())),
        }
    }

    for section in &page.sections {
        match listed.get(section.id.as_str()) {
            None if section.nav => issues.push(AnchorIssue::OrphanSection {
                section: section.id.clone(),
            }),
            Some(&count) if count > 1 => issues.push(AnchorIssue::DuplicateTocEntry {
                target: section.id.clone(),
                count,
            }),
            _ => {}
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}
