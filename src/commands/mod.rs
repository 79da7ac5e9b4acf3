pub mod annotate;
pub mod build_sheetmap;
pub mod derive_quadrants;
pub mod extract_overlaps;
pub mod filter_index;
pub mod merge_index;
pub mod merge_sheetmaps;
pub mod neighbors;
pub mod resolve_coverage;
