pub mod links;
pub mod model;
pub mod parse;
pub mod raw;

pub use model::*;
pub use parse::parse_page;
pub use raw::RawPage;
