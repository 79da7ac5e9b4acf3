use std::collections::BTreeSet;

use ahash::AHashSet;

use crate::geojson::FeatureCollection;

/// Result of merging raw sheet indices. The duplicate report is advisory:
/// nothing is deduplicated or dropped, the caller decides whether repeats are
/// acceptable.
#[derive(Debug)]
pub struct MergeReport {
    pub merged: FeatureCollection,
    /// Ids seen more than once, each reported once. The first occurrence of
    /// an id is never flagged, only its repeats.
    pub duplicate_ids: BTreeSet<String>,
    /// Features carried through without any id property (logged upstream).
    pub missing_id: usize,
}

/// Concatenate source collections in input order and flag repeated sheet ids
/// in a single walk over the combined list.
pub fn merge_collections(collections: Vec<FeatureCollection>, verbose: u8) -> MergeReport {
    let mut features = Vec::with_capacity(collections.iter().map(|c| c.len()).sum());
    let mut name = None;
    let mut crs = None;
    for fc in collections {
        name = name.or(fc.name);
        crs = crs.or(fc.crs);
        features.extend(fc.features);
    }

    let mut seen: AHashSet<&str> = AHashSet::with_capacity(features.len());
    let mut duplicate_ids = BTreeSet::new();
    let mut missing_id = 0usize;
    for feature in &features {
        match feature.id() {
            Some(id) => {
                if !seen.insert(id) {
                    duplicate_ids.insert(id.to_string());
                }
            }
            None => {
                missing_id += 1;
                if verbose > 0 {
                    eprintln!("[merge] feature without an id property kept as-is");
                }
            }
        }
    }

    let mut merged = FeatureCollection::new(features);
    merged.name = name;
    merged.crs = crs;
    MergeReport { merged, duplicate_ids, missing_id }
}
