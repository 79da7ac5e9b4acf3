mod filter;
mod merge;
mod quadrant;

pub use filter::{BoundaryIndex, filter_collection};
pub use merge::{MergeReport, merge_collections};
pub use quadrant::{corner_ring, subdivide, subdivide_collection};
