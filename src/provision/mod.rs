mod builder;
mod cursor;
mod driver;
mod edges;
mod ids;
mod labels;
mod markers;
#[cfg(test)]
mod tests;
mod types;

pub use driver::{ParseRules, ParsedDocument, parse_pages};
pub use ids::{DEFAULT_SEARCH_ID_MAX_LEN, MIN_SEARCH_ID_LEN};
pub use labels::{SUB_ITEM_FALLBACK_CODE, display_paragraph};
pub use types::{DocumentJob, JobContext, ProvisionNode};
