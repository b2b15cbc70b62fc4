use std::collections::BTreeMap;

use serde::Serialize;

use crate::content::{SectionBody, SectionKind};
use crate::registry::PageRegistry;

#[derive(Debug, Default, Serialize)]
pub struct SiteStats {
    pub pages: usize,
    pub reviews: usize,
    pub sections: BTreeMap<SectionKind, usize>,
    pub toc_entries: usize,
    pub internal_links: usize,
    pub faq_items: usize,
    pub table_rows: usize,
}

pub fn collect(registry: &PageRegistry) -> SiteStats {
    let mut s = SiteStats {
        sections: SectionKind::ALL.iter().map(|k| (*k, 0)).collect(),
        ..SiteStats::default()
    };

    for page in registry.pages() {
        s.pages += 1;
        if page.review.is_some() {
            s.reviews += 1;
        }
        s.toc_entries += page.toc.len();
        s.internal_links += page.links.len();
        for section in &page.sections {
            *s.sections.entry(section.kind()).or_default() += 1;
            match &section.body {
                SectionBody::FaqList(items) => s.faq_items += items.len(),
                SectionBody::ComparisonTable(t) => s.table_rows += t.rows.len(),
                _ => {}
            }
        }
    }
    s
}

impl SiteStats {
    pub fn print(&self) {
        println!("Pages:          {}", self.pages);
        println!("Reviews:        {}", self.reviews);
        println!("TOC entries:    {}", self.toc_entries);
        println!("Internal links: {}", self.internal_links);
        println!("FAQ items:      {}", self.faq_items);
        println!("Table rows:     {}", self.table_rows);
        println!("Sections:");
        for (kind, n) in &self.sections {
            println!("  {:<17} {}", kind.as_str(), n);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_dir;
    use std::path::Path;

    #[test]
    fn fixture_site_counts() {
        let (raws, _) = load_dir(Path::new("tests/fixtures/site")).unwrap();
        let (reg, _) = PageRegistry::build(&raws);
        let s = collect(&reg);
        assert_eq!(s.pages, reg.len());
        assert!(s.reviews >= 1);
        assert!(s.faq_items >= 2);
        assert_eq!(s.sections.len(), SectionKind::ALL.len());
    }
}
