//! Consistency checks and assembly for structured content pages: table of
//! contents vs. section anchors, internal links vs. the page registry,
//! comparison table shape, and JSON-LD derived from the visible fields.

pub mod anchors;
pub mod assemble;
pub mod config;
pub mod content;
pub mod error;
pub mod jsonld;
pub mod linkgraph;
pub mod loader;
pub mod meta;
pub mod registry;
pub mod render;
pub mod report;
pub mod sitemap;
pub mod stats;
pub mod table;

pub use assemble::{assemble, assemble_all, PageOutcome};
pub use config::Settings;
pub use content::{parse_page, Page, RawPage};
pub use error::{AssemblyError, Severity};
pub use registry::PageRegistry;
pub use render::RenderedPage;
pub use report::BuildReport;
