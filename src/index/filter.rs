use anyhow::Result;
use geo::{BoundingRect, Intersects, MultiPolygon};
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{AABB, RTree};

use crate::geojson::{Feature, FeatureCollection, parse_multipolygon};

/// National boundary as a queryable set of per-state polygons: an R-tree of
/// bboxes narrows the candidates, an exact intersection test decides.
pub struct BoundaryIndex {
    polys: Vec<MultiPolygon<f64>>,
    rtree: RTree<GeomWithData<Rectangle<[f64; 2]>, usize>>,
}

impl BoundaryIndex {
    /// Build from boundary features (one polygon/multipolygon per state).
    /// Unparseable geometries are logged and skipped; an entirely empty
    /// boundary is an error.
    pub fn from_features(features: &[Feature], verbose: u8) -> Result<BoundaryIndex> {
        let mut polys = Vec::with_capacity(features.len());
        let mut entries = Vec::with_capacity(features.len());
        for (idx, feature) in features.iter().enumerate() {
            let mp = match parse_multipolygon(&feature.geometry) {
                Ok(mp) => mp,
                Err(err) => {
                    eprintln!("[filter] skipping boundary feature {idx}: {err}");
                    continue;
                }
            };
            let Some(rect) = mp.bounding_rect() else {
                eprintln!("[filter] skipping boundary feature {idx}: empty geometry");
                continue;
            };
            entries.push(GeomWithData::new(
                Rectangle::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
                polys.len(),
            ));
            polys.push(mp);
        }
        if polys.is_empty() {
            anyhow::bail!("no usable boundary geometries");
        }
        if verbose > 0 {
            eprintln!("[filter] boundary index holds {} geometries", polys.len());
        }
        Ok(BoundaryIndex { polys, rtree: RTree::bulk_load(entries) })
    }

    /// True iff the geometry intersects any boundary polygon.
    pub fn intersects(&self, geom: &MultiPolygon<f64>) -> bool {
        let Some(rect) = geom.bounding_rect() else { return false };
        let search = AABB::from_corners(
            [rect.min().x, rect.min().y],
            [rect.max().x, rect.max().y],
        );
        self.rtree
            .locate_in_envelope_intersecting(&search)
            .any(|cand| geom.intersects(&self.polys[cand.data]))
    }
}

/// Keep only the index features that intersect the boundary. Features whose
/// geometry cannot be parsed are dropped with a warning, not fatal.
pub fn filter_collection(
    fc: &FeatureCollection,
    boundary: &BoundaryIndex,
    verbose: u8,
) -> FeatureCollection {
    let mut kept = Vec::new();
    for feature in &fc.features {
        match parse_multipolygon(&feature.geometry) {
            Ok(mp) => {
                if boundary.intersects(&mp) {
                    kept.push(feature.clone());
                }
            }
            Err(err) => {
                if verbose > 0 {
                    eprintln!(
                        "[filter] skipping {}: {err}",
                        feature.id().unwrap_or("<no id>")
                    );
                }
            }
        }
    }

    let mut out = FeatureCollection::new(kept);
    out.name = Some("index_25k_filtered".into());
    out.crs = fc.crs.clone();
    out
}
