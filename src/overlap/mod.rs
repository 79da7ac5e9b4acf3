mod groups;
mod pool;
mod resolve;

pub use groups::{OverlapGroups, find_overlap_groups};
pub use pool::{OverlapLookup, OverlapSource, build_overlap_lookup, collect_overlap_pool};
pub use resolve::{ResolveSummary, UNKNOWN_STATE, resolve_coverage};
