use std::collections::{BTreeMap, HashSet};

use tracing::{debug, warn};

use crate::content::{links::normalize_id, parse_page, Page, RawPage};
pub use crate::error::RegistryError;

/// Split records into the ones that own their id (the first in input order)
/// and a `DuplicatePage` for every later record claiming the same id.
pub fn dedup(raws: &[RawPage]) -> (Vec<&RawPage>, Vec<RegistryError>) {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(raws.len());
    let mut duplicates = Vec::new();

    for raw in raws {
        let id = normalize_id(&raw.id);
        if seen.insert(id.clone()) {
            kept.push(raw);
        } else {
            duplicates.push(RegistryError::DuplicatePage { id });
        }
    }
    (kept, duplicates)
}

/// Every page of the site keyed by id. Built once before validation and only
/// read afterwards, so it can be shared freely across worker threads.
#[derive(Debug, Default)]
pub struct PageRegistry {
    pages: BTreeMap<String, Page>,
}

impl PageRegistry {
    /// Parse every record and keep the ones that parse cleanly. Records that
    /// fail parsing are left out here; the assembler reports their errors.
    pub fn build(raws: &[RawPage]) -> (Self, Vec<RegistryError>) {
        let (kept, duplicates) = dedup(raws);
        for RegistryError::DuplicatePage { id } in &duplicates {
            warn!(id = %id, "duplicate page id, keeping the first record");
        }

        let mut pages = BTreeMap::new();
        for raw in kept {
            match parse_page(raw) {
                Ok(page) => {
                    pages.insert(page.id.clone(), page);
                }
                Err(errs) => debug!(id = %raw.id, errors = errs.len(), "page left out of registry"),
            }
        }

        (Self { pages }, duplicates)
    }

    pub fn from_pages(pages: impl IntoIterator<Item = Page>) -> Self {
        Self {
            pages: pages.into_iter().map(|p| (p.id.clone(), p)).collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Page> {
        self.pages.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.pages.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Pages in id order.
    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        self.pages.values()
    }
}
