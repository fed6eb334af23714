//! Streamcheck core: playlist data model and pure algorithms.
//!
//! Everything in this crate is synchronous and side-effect free: parsing
//! M3U text into channels, aggregating probe results by category,
//! serializing channels back to M3U, and slugging category names for
//! filesystem use. I/O lives in `streamcheck_engine`.
mod aggregate;
mod model;
mod parse;
mod serialize;
mod slug;

pub use aggregate::{aggregate, category_label, UNCATEGORIZED};
pub use model::{CategorySummary, Channel, ProbeResult, RunStats};
pub use parse::parse;
pub use serialize::serialize_playlist;
pub use slug::category_slug;
