use geo::{BooleanOps, MultiPolygon};

/// Union a set of geometries into one polygon/multipolygon.
///
/// A single geometry passes through unchanged; two or more are folded with a
/// planar boolean union, so overlapping or edge-adjacent polygons merge and
/// disjoint ones stay separate members of the MultiPolygon. Returns None for
/// an empty input.
pub fn union_all(geoms: Vec<MultiPolygon<f64>>) -> Option<MultiPolygon<f64>> {
    let mut iter = geoms.into_iter();
    let first = iter.next()?;
    Some(iter.fold(first, |acc, next| acc.union(&next)))
}
