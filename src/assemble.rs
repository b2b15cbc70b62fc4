use std::collections::HashMap;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::anchors;
use crate::config::Settings;
use crate::content::links::normalize_id;
use crate::content::{parse_page, Page, RawPage, SectionBody};
use crate::error::AssemblyError;
use crate::jsonld;
use crate::linkgraph;
use crate::meta;
use crate::registry::{self, PageRegistry, RegistryError};
use crate::render::{RelatedLink, RenderedBody, RenderedPage, RenderedSection};
use crate::table::{self, RenderedTable};

/// Where a page is in the pipeline. `Rendered` and `Failed` are terminal;
/// a page never reaches `Rendered` with a fatal problem outstanding.
#[derive(Debug)]
pub enum PageState {
    Parsed(Page),
    Validated {
        page: Page,
        tables: HashMap<String, RenderedTable>,
        json_ld: Vec<String>,
        warnings: Vec<AssemblyError>,
    },
    Rendered(RenderedPage),
    Failed(Vec<AssemblyError>),
}

impl PageState {
    pub fn name(&self) -> &'static str {
        match self {
            PageState::Parsed(_) => "parsed",
            PageState::Validated { .. } => "validated",
            PageState::Rendered(_) => "rendered",
            PageState::Failed(_) => "failed",
        }
    }
}

pub struct Assembler<'a> {
    registry: &'a PageRegistry,
    settings: &'a Settings,
}

impl<'a> Assembler<'a> {
    pub fn new(registry: &'a PageRegistry, settings: &'a Settings) -> Self {
        Self { registry, settings }
    }

    pub fn assemble(&self, raw: &RawPage) -> Result<RenderedPage, Vec<AssemblyError>> {
        let mut state = self.parse(raw);
        loop {
            debug!(page = %raw.id, state = state.name());
            state = match state {
                PageState::Parsed(page) => self.validate(page),
                PageState::Validated {
                    page,
                    tables,
                    json_ld,
                    warnings,
                } => self.render(page, tables, json_ld, warnings),
                PageState::Rendered(page) => return Ok(page),
                PageState::Failed(errors) => return Err(errors),
            };
        }
    }

    fn parse(&self, raw: &RawPage) -> PageState {
        match parse_page(raw) {
            Ok(page) => PageState::Parsed(page),
            Err(errors) => PageState::Failed(errors.into_iter().map(AssemblyError::from).collect()),
        }
    }

    /// Run every validator and keep all of their findings.
    fn validate(&self, page: Page) -> PageState {
        let mut problems: Vec<AssemblyError> = Vec::new();

        if let Err(issues) = anchors::resolve(&page) {
            problems.extend(issues.into_iter().map(AssemblyError::from));
        }
        if let Err(errors) = linkgraph::validate_page(&page, self.registry) {
            problems.extend(errors.into_iter().map(AssemblyError::from));
        }

        let mut tables = HashMap::new();
        for section in &page.sections {
            if let SectionBody::ComparisonTable(t) = &section.body {
                match table::render(t) {
                    Ok(rendered) => {
                        tables.insert(section.id.clone(), rendered);
                    }
                    Err(errors) => {
                        problems.extend(errors.into_iter().map(|error| AssemblyError::Table {
                            section: section.id.clone(),
                            error,
                        }))
                    }
                }
            }
        }

        let json_ld = match jsonld::emit_all(&page, self.settings) {
            Ok(blocks) => blocks,
            Err(e) => {
                problems.push(e.into());
                Vec::new()
            }
        };

        if problems.iter().any(AssemblyError::is_fatal) {
            return PageState::Failed(problems);
        }
        PageState::Validated {
            page,
            tables,
            json_ld,
            warnings: problems,
        }
    }

    fn render(
        &self,
        page: Page,
        mut tables: HashMap<String, RenderedTable>,
        json_ld: Vec<String>,
        warnings: Vec<AssemblyError>,
    ) -> PageState {
        let mut sections = Vec::with_capacity(page.sections.len());
        for s in &page.sections {
            let body = match &s.body {
                SectionBody::Prose(paragraphs) => RenderedBody::Prose {
                    paragraphs: paragraphs.clone(),
                },
                SectionBody::ComparisonTable(_) => {
                    // every table section was rendered during validation
                    let Some(table) = tables.remove(&s.id) else {
                        continue;
                    };
                    RenderedBody::ComparisonTable { table }
                }
                SectionBody::Checklist(items) => RenderedBody::Checklist {
                    items: items.clone(),
                },
                SectionBody::FaqList(items) => RenderedBody::FaqList {
                    items: items.clone(),
                },
                SectionBody::StatBlock(stats) => RenderedBody::StatBlock {
                    stats: stats.clone(),
                },
                SectionBody::Cta(cta) => RenderedBody::Cta {
                    text: cta.text.clone(),
                    label: cta.label.clone(),
                    href: cta.href.clone(),
                },
            };
            sections.push(RenderedSection {
                id: s.id.clone(),
                heading: s.heading.clone(),
                body,
            });
        }

        let related = page
            .related
            .iter()
            .filter_map(|id| {
                let title = if *id == page.id {
                    page.title.clone()
                } else {
                    self.registry.get(id)?.title.clone()
                };
                Some(RelatedLink {
                    id: id.clone(),
                    title,
                })
            })
            .collect();

        PageState::Rendered(RenderedPage {
            url: self.settings.page_url(&page.id),
            head: meta::open_graph(&page, self.settings),
            rating_label: page
                .rating
                .map(|r| r.label(self.settings.best_rating)),
            toc: page.toc.clone(),
            title: page.title.clone(),
            id: page.id,
            sections,
            related,
            json_ld,
            warnings,
        })
    }
}

/// Parse, validate and render one page against an already-built registry.
pub fn assemble(
    raw: &RawPage,
    registry: &PageRegistry,
    settings: &Settings,
) -> Result<RenderedPage, Vec<AssemblyError>> {
    Assembler::new(registry, settings).assemble(raw)
}

#[derive(Debug)]
pub struct PageOutcome {
    pub id: String,
    pub result: Result<RenderedPage, Vec<AssemblyError>>,
}

impl PageOutcome {
    pub fn problems(&self) -> &[AssemblyError] {
        match &self.result {
            Ok(page) => &page.warnings,
            Err(errors) => errors,
        }
    }
}

/// Assemble every record in parallel. Pages share nothing but the read-only
/// registry; outcomes come back sorted by page id. A record whose id was
/// already claimed by an earlier one fails with `DuplicatePage` and is never
/// assembled.
pub fn assemble_all(
    raws: &[RawPage],
    registry: &PageRegistry,
    settings: &Settings,
) -> Vec<PageOutcome> {
    let assembler = Assembler::new(registry, settings);
    let (kept, duplicates) = registry::dedup(raws);

    let mut outcomes: Vec<PageOutcome> = kept
        .par_iter()
        .map(|raw| PageOutcome {
            id: normalize_id(&raw.id),
            result: assembler.assemble(raw),
        })
        .collect();
    outcomes.extend(duplicates.into_iter().map(|dup| {
        let RegistryError::DuplicatePage { id } = &dup;
        PageOutcome {
            id: id.clone(),
            result: Err(vec![AssemblyError::from(dup)]),
        }
    }));
    // stable, so the record that owns an id stays ahead of its duplicates
    outcomes.sort_by(|a, b| a.id.cmp(&b.id));

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    info!(
        pages = outcomes.len(),
        rendered = outcomes.len() - failed,
        failed,
        "assembly finished"
    );
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AnchorIssue, EmitError, LinkError, Severity, TableError};
    use serde_json::{json, Value};

    fn raw(value: Value) -> RawPage {
        serde_json::from_value(value).unwrap()
    }

    fn review_page() -> Value {
        json!({
            "id": "/reviews/acme",
            "title": "Acme Links Review",
            "description": "Is Acme worth $3,000/month?",
            "published": "2024-03-01",
            "rating": 4.5,
            "review": { "item_name": "Acme Links", "author": "Dana Reyes" },
            "toc": [
                { "label": "Overview", "target": "overview" },
                { "label": "Pricing", "target": "pricing" },
                { "label": "FAQ", "target": "faq" }
            ],
            "sections": [
                { "id": "overview", "heading": "Overview", "kind": "prose",
                  "content": { "paragraphs": ["Compare with [Beta](/reviews/beta)."] } },
                { "id": "pricing", "heading": "Pricing", "kind": "comparison_table",
                  "content": {
                    "columns": [{ "label": "Plan" }, { "label": "Price", "format": "currency" }],
                    "rows": [["Starter", "$3,000/month"], ["Growth", "$6,500/month"]]
                  } },
                { "id": "faq", "heading": "FAQ", "kind": "faq_list",
                  "content": { "items": [{ "question": "Is Acme safe?", "answer": "Mostly." }] } },
                { "id": "book", "kind": "cta",
                  "content": { "text": "Want links?", "label": "Book a call", "href": "/contact" } }
            ],
            "related": ["/reviews/beta"]
        })
    }

    fn minimal(id: &str, title: &str) -> RawPage {
        raw(json!({ "id": id, "title": title, "published": "2024-01-01" }))
    }

    fn registry(with: &[RawPage]) -> PageRegistry {
        PageRegistry::build(with).0
    }

    fn site() -> Vec<RawPage> {
        vec![
            raw(review_page()),
            minimal("/reviews/beta", "Beta Review"),
            minimal("/contact", "Contact"),
        ]
    }

    #[test]
    fn renders_a_clean_page() {
        let raws = site();
        let reg = registry(&raws);
        let page = assemble(&raws[0], &reg, &Settings::default()).unwrap();

        assert_eq!(page.rating_label.as_deref(), Some("4.5/5"));
        assert_eq!(page.sections.len(), 4);
        assert_eq!(page.json_ld.len(), 3);
        assert!(page.json_ld[1].contains("\"ratingValue\": 4.5"));
        assert_eq!(page.related[0].title, "Beta Review");
        assert!(page.warnings.is_empty());
        let RenderedBody::ComparisonTable { table } = &page.sections[1].body else {
            panic!("expected a table");
        };
        assert_eq!(table.shape(), (2, 2));
    }

    #[test]
    fn dangling_pricing_anchor_fails_the_page() {
        let raws = vec![raw(json!({
            "id": "/guides/outreach",
            "title": "Outreach",
            "published": "2024-01-01",
            "toc": [
                { "label": "Overview", "target": "overview" },
                { "label": "Pricing", "target": "pricing" }
            ],
            "sections": [
                { "id": "overview", "kind": "prose", "content": { "paragraphs": ["x"] } }
            ]
        }))];
        let reg = registry(&raws);
        let errs = assemble(&raws[0], &reg, &Settings::default()).unwrap_err();
        assert_eq!(
            errs,
            vec![AssemblyError::Anchor(AnchorIssue::DanglingAnchor {
                entry: "pricing".into()
            })]
        );
    }

    #[test]
    fn ragged_table_fails_the_page() {
        let mut value = review_page();
        value["sections"][1]["content"] = json!({
            "columns": [{ "label": "Feature" }, { "label": "A" }, { "label": "B" }],
            "rows": [["Price", "$10"]]
        });
        let mut raws = site();
        raws[0] = raw(value);
        let reg = registry(&raws);
        let errs = assemble(&raws[0], &reg, &Settings::default()).unwrap_err();
        assert_eq!(
            errs,
            vec![AssemblyError::Table {
                section: "pricing".into(),
                error: TableError::RaggedRow {
                    row_index: 0,
                    expected: 3,
                    actual: 2
                }
            }]
        );
    }

    #[test]
    fn invalid_rating_fails_the_page() {
        let mut value = review_page();
        value["rating"] = json!(6);
        let mut raws = site();
        raws[0] = raw(value);
        let reg = registry(&raws);
        let errs = assemble(&raws[0], &reg, &Settings::default()).unwrap_err();
        assert_eq!(
            errs,
            vec![AssemblyError::Emit(EmitError::InvalidRating {
                value: 6.0,
                best: 5.0
            })]
        );
    }

    #[test]
    fn broken_link_when_target_missing() {
        let raws = site();
        let reg = registry(&raws[..1]);
        let errs = assemble(&raws[0], &reg, &Settings::default()).unwrap_err();
        assert!(errs.contains(&AssemblyError::Link(LinkError::BrokenLink {
            page: "/reviews/acme".into(),
            target: "/reviews/beta".into()
        })));
        assert!(errs.contains(&AssemblyError::Link(LinkError::BrokenLink {
            page: "/reviews/acme".into(),
            target: "/contact".into()
        })));
    }

    #[test]
    fn out_of_order_toc_still_renders_with_warning() {
        let mut value = review_page();
        value["toc"] = json!([
            { "label": "Pricing", "target": "pricing" },
            { "label": "Overview", "target": "overview" },
            { "label": "FAQ", "target": "faq" }
        ]);
        let mut raws = site();
        raws[0] = raw(value);
        let reg = registry(&raws);
        let page = assemble(&raws[0], &reg, &Settings::default()).unwrap();
        assert_eq!(page.warnings.len(), 1);
        assert_eq!(page.warnings[0].severity(), Severity::Warning);
    }

    #[test]
    fn parse_errors_short_circuit() {
        let mut value = review_page();
        value["sections"][0]["kind"] = json!("comparison_table");
        let raws = vec![raw(value)];
        let reg = registry(&raws);
        let errs = assemble(&raws[0], &reg, &Settings::default()).unwrap_err();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].code(), "MalformedSection");
    }

    #[test]
    fn assembling_twice_is_identical() {
        let raws = site();
        let reg = registry(&raws);
        let settings = Settings::default();
        let first = assemble(&raws[0], &reg, &settings);
        let second = assemble(&raws[0], &reg, &settings);
        assert_eq!(first, second);

        let broken = vec![raw(json!({
            "id": "/x", "title": "X", "published": "2024-01-01",
            "toc": [{ "label": "Gone", "target": "gone" }],
            "links": [{ "target": "/nowhere", "label": "?" }]
        }))];
        let reg = registry(&broken);
        assert_eq!(
            assemble(&broken[0], &reg, &settings),
            assemble(&broken[0], &reg, &settings)
        );
    }

    #[test]
    fn batch_is_sorted_and_complete() {
        let mut raws = site();
        raws.push(minimal("/about", ""));
        let reg = registry(&raws);
        let outcomes = assemble_all(&raws, &reg, &Settings::default());
        let ids: Vec<_> = outcomes.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["/about", "/contact", "/reviews/acme", "/reviews/beta"]);
        assert!(outcomes[0].result.is_err());
        assert!(outcomes[1..].iter().all(|o| o.result.is_ok()));
    }

    #[test]
    fn duplicate_records_fail_and_the_first_one_renders() {
        let raws = vec![minimal("/a", "First"), minimal("/a/", "Second")];
        let reg = registry(&raws);
        let outcomes = assemble_all(&raws, &reg, &Settings::default());

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.id == "/a"));
        assert_eq!(outcomes[0].result.as_ref().unwrap().title, "First");
        assert_eq!(
            outcomes[1].result.as_ref().unwrap_err(),
            &vec![AssemblyError::Registry(RegistryError::DuplicatePage {
                id: "/a".into()
            })]
        );
        assert_eq!(outcomes[1].problems()[0].code(), "DuplicatePage");
    }

    #[test]
    fn outcome_ids_are_normalized() {
        let raws = vec![minimal("/reviews/acme/", "Acme")];
        let reg = registry(&raws);
        let outcomes = assemble_all(&raws, &reg, &Settings::default());
        assert_eq!(outcomes[0].id, "/reviews/acme");
        assert_eq!(outcomes[0].result.as_ref().unwrap().id, "/reviews/acme");
    }
}
