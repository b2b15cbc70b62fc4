use std::collections::HashSet;

use crate::content::Page;
use crate::error::LinkError;
use crate::registry::PageRegistry;

/// Check the direct outgoing links of one page against the registry.
///
/// Only direct reachability matters, so this is a lookup per link. A fragment
/// must also name a section on the target page (including the page itself).
pub fn validate_page(page: &Page, registry: &PageRegistry) -> Result<(), Vec<LinkError>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for link in &page.links {
        let target = if link.target == page.id {
            Some(page)
        } else {
            registry.get(&link.target)
        };

        let error = match (target, &link.fragment) {
            (None, _) => Some(LinkError::BrokenLink {
                page: page.id.clone(),
                target: link.target.clone(),
            }),
            (Some(t), Some(fragment)) if !t.has_section(fragment) => {
                Some(LinkError::DanglingFragment {
                    page: page.id.clone(),
                    target: link.target.clone(),
                    fragment: fragment.clone(),
                })
            }
            _ => None,
        };

        if let Some(e) = error {
            // the same bad target is often linked from several places on a page
            if seen.insert(e.clone()) {
                errors.push(e);
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// One pass over every page in the registry; problems on one page never stop
/// the others from being checked.
pub fn validate(registry: &PageRegistry) -> Result<(), Vec<LinkError>> {
    let errors: Vec<LinkError> = registry
        .pages()
        .filter_map(|p| validate_page(p, registry).err())
        .flatten()
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
