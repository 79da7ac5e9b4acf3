use serde_json::{Map, json};

use crate::geojson::{Feature, FeatureCollection, polygon_first_ring, ring_value};
use crate::sheet_id::{Quadrant, quadrant_id};

/// The closed 5-point ring of a bbox, anticlockwise from the top-left corner.
/// Index files store their rectangles in exactly this order, and the neighbor
/// finder synthesizes lookup keys from it.
pub fn corner_ring(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> [[f64; 2]; 5] {
    [
        [min_lon, max_lat],
        [min_lon, min_lat],
        [max_lon, min_lat],
        [max_lon, max_lat],
        [min_lon, max_lat],
    ]
}

/// Split one 50K sheet into its four 25K quadrants.
///
/// The split is a bbox halving at the arithmetic midpoint of each axis, not
/// an area-weighted one; the slight lon/lat area asymmetry is how the survey
/// grid itself is defined. Returns None (skip, not error) when the feature is
/// not a non-empty Polygon or carries no id.
pub fn subdivide(feature: &Feature) -> Option<[Feature; 4]> {
    let parent_id = feature.id()?;
    let ring = polygon_first_ring(&feature.geometry)?;

    let mut min_lon = f64::INFINITY;
    let mut max_lon = f64::NEG_INFINITY;
    let mut min_lat = f64::INFINITY;
    let mut max_lat = f64::NEG_INFINITY;
    for [lon, lat] in &ring {
        min_lon = min_lon.min(*lon);
        max_lon = max_lon.max(*lon);
        min_lat = min_lat.min(*lat);
        max_lat = max_lat.max(*lat);
    }

    let mid_lon = (min_lon + max_lon) / 2.0;
    let mid_lat = (min_lat + max_lat) / 2.0;

    let quadrants = Quadrant::ALL.map(|quadrant| {
        let ring = match quadrant {
            Quadrant::NW => corner_ring(min_lon, mid_lat, mid_lon, max_lat),
            Quadrant::NE => corner_ring(mid_lon, mid_lat, max_lon, max_lat),
            Quadrant::SW => corner_ring(min_lon, min_lat, mid_lon, mid_lat),
            Quadrant::SE => corner_ring(mid_lon, min_lat, max_lon, mid_lat),
        };
        let mut props = Map::new();
        props.insert("id".into(), json!(quadrant_id(parent_id, quadrant)));
        Feature::new(props, ring_value(&ring))
    });
    Some(quadrants)
}

/// Derive the 25K quadrant index from a 50K index, carrying the source
/// document's crs through. Skipped parents are counted, not fatal.
pub fn subdivide_collection(fc: &FeatureCollection, verbose: u8) -> FeatureCollection {
    let mut features = Vec::with_capacity(fc.len() * 4);
    let mut skipped = 0usize;
    for feature in &fc.features {
        match subdivide(feature) {
            Some(quadrants) => features.extend(quadrants),
            None => {
                skipped += 1;
                if verbose > 0 {
                    eprintln!(
                        "[quadrants] skipping {} (not a non-empty Polygon with an id)",
                        feature.id().unwrap_or("<no id>")
                    );
                }
            }
        }
    }

    let mut out = FeatureCollection::new(features);
    out.name = Some("index_25k_full".into());
    out.crs = Some(fc.crs.clone().unwrap_or_else(|| {
        json!({ "type": "name", "properties": { "name": "urn:ogc:def:crs:OGC:1.3:CRS84" } })
    }));
    if skipped > 0 && verbose > 0 {
        eprintln!("[quadrants] skipped {skipped} source features");
    }
    out
}
