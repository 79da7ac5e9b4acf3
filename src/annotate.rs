use std::path::Path;

use ahash::{AHashMap, AHashSet};
use anyhow::{Context, Result};
use serde_json::json;
use walkdir::WalkDir;

use crate::geojson::{FeatureCollection, polygon_first_ring};
use crate::geom::{FixedBox, FixedDeg, RingKey, ring_key};

pub const STATUS_AVAILABLE: &str = "available";
pub const STATUS_UNAVAILABLE: &str = "unavailable";
pub const STATUS_UNPROBED: &str = "unprobed";

/// Sheet ids with a known acquisition outcome, derived from the artifact
/// directory the (external) scraper writes into.
#[derive(Debug, Default)]
pub struct StatusSets {
    pub available: AHashSet<String>,
    pub unavailable: AHashSet<String>,
}

/// Scan a raw artifact directory: a downloaded `.pdf` marks its sheet
/// available; a `.unavailable` marker or a saved error `.html` page marks it
/// unavailable.
pub fn scan_artifacts(dir: &Path) -> Result<StatusSets> {
    let mut sets = StatusSets::default();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.with_context(|| format!("Failed to scan {}", dir.display()))?;
        let path = entry.path();
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else { continue };
        match path.extension().and_then(|e| e.to_str()) {
            Some("pdf") => {
                sets.available.insert(stem.to_string());
            }
            Some("unavailable") => {
                // Markers are named `<sheet>.pdf.unavailable`.
                let stem = stem.strip_suffix(".pdf").unwrap_or(stem);
                sets.unavailable.insert(stem.to_string());
            }
            Some("html") => {
                sets.unavailable.insert(stem.to_string());
            }
            _ => {}
        }
    }
    Ok(sets)
}

/// Concatenate the input collections and stamp every feature with exactly one
/// `status`: available wins over unavailable, anything else is unprobed.
pub fn annotate(collections: Vec<FeatureCollection>, sets: &StatusSets) -> FeatureCollection {
    let mut features = Vec::with_capacity(collections.iter().map(|c| c.len()).sum());
    for fc in collections {
        features.extend(fc.features);
    }
    for feature in &mut features {
        let status = match feature.id() {
            Some(id) if sets.available.contains(id) => STATUS_AVAILABLE,
            Some(id) if sets.unavailable.contains(id) => STATUS_UNAVAILABLE,
            _ => STATUS_UNPROBED,
        };
        feature.set_property("status", json!(status));
    }
    FeatureCollection::new(features)
}

/// Sheet dimensions used to synthesize neighbor rectangles, on the exact
/// fixed-point grid.
#[derive(Debug, Clone, Copy)]
pub struct SheetSize {
    pub width: FixedDeg,
    pub height: FixedDeg,
}

impl SheetSize {
    pub fn from_degrees(width: f64, height: f64) -> SheetSize {
        SheetSize { width: FixedDeg::from_deg(width), height: FixedDeg::from_deg(height) }
    }
}

impl Default for SheetSize {
    // The 25K series is a 0.125 x 0.125 degree grid.
    fn default() -> Self {
        SheetSize::from_degrees(0.125, 0.125)
    }
}

/// Find `unprobed` sheets adjacent to an `available` one: for each available
/// sheet, shift its bbox to the 8 compass neighbors and look the shifted
/// rectangle up by exact ring-key equality. Adjacency to a confirmed sheet is
/// the heuristic for which never-tried ids are worth requesting next.
/// Returns a sorted, deduplicated id list.
pub fn find_unprobed_neighbors(annotated: &FeatureCollection, size: SheetSize) -> Vec<String> {
    let mut ring_to_id: AHashMap<RingKey, &str> = AHashMap::with_capacity(annotated.len());
    let mut bbox_by_id: AHashMap<&str, FixedBox> = AHashMap::with_capacity(annotated.len());
    let mut status_by_id: AHashMap<&str, &str> = AHashMap::with_capacity(annotated.len());

    for feature in &annotated.features {
        let Some(id) = feature.id() else { continue };
        let Some(ring) = polygon_first_ring(&feature.geometry) else { continue };
        let Some(bbox) = FixedBox::from_ring(&ring) else { continue };
        ring_to_id.insert(ring_key(&ring), id);
        bbox_by_id.insert(id, bbox);
        if let Some(status) = feature.properties.get("status").and_then(|v| v.as_str()) {
            status_by_id.insert(id, status);
        }
    }

    let mut neighbors: Vec<&str> = Vec::new();
    for (&id, &bbox) in &bbox_by_id {
        if status_by_id.get(id) != Some(&STATUS_AVAILABLE) {
            continue;
        }
        for dx in [-1i64, 0, 1] {
            for dy in [-1i64, 0, 1] {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let shifted = bbox.shifted(size.width.scaled(dx), size.height.scaled(dy));
                let Some(&neighbor_id) = ring_to_id.get(&shifted.corner_ring()) else {
                    continue;
                };
                if status_by_id.get(neighbor_id) == Some(&STATUS_UNPROBED) {
                    neighbors.push(neighbor_id);
                }
            }
        }
    }

    neighbors.sort_unstable();
    neighbors.dedup();
    neighbors.into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geojson::{Feature, ring_value};
    use crate::index::corner_ring;
    use serde_json::{Map, Value};
    use std::fs;

    fn sheet(id: &str, min_lon: f64, min_lat: f64) -> Feature {
        let mut props = Map::new();
        props.insert("id".into(), json!(id));
        Feature::new(
            props,
            ring_value(&corner_ring(min_lon, min_lat, min_lon + 0.125, min_lat + 0.125)),
        )
    }

    fn sets(available: &[&str], unavailable: &[&str]) -> StatusSets {
        StatusSets {
            available: available.iter().map(|s| s.to_string()).collect(),
            unavailable: unavailable.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn every_feature_gets_exactly_one_status() {
        let fc = FeatureCollection::new(vec![
            sheet("A", 44.0, 39.875),
            sheet("B", 44.125, 39.875),
            sheet("C", 44.25, 39.875),
            Feature::new(Map::new(), Value::Null),
        ]);
        let annotated = annotate(vec![fc], &sets(&["A"], &["B"]));
        let statuses: Vec<&str> = annotated
            .features
            .iter()
            .map(|f| f.properties["status"].as_str().unwrap())
            .collect();
        assert_eq!(statuses, vec!["available", "unavailable", "unprobed", "unprobed"]);
    }

    #[test]
    fn available_wins_over_unavailable() {
        let fc = FeatureCollection::new(vec![sheet("A", 44.0, 39.875)]);
        let annotated = annotate(vec![fc], &sets(&["A"], &["A"]));
        assert_eq!(annotated.features[0].properties["status"], "available");
    }

    #[test]
    fn annotate_concatenates_all_inputs() {
        let a = FeatureCollection::new(vec![sheet("A", 44.0, 39.875)]);
        let b = FeatureCollection::new(vec![sheet("B", 44.125, 39.875)]);
        let annotated = annotate(vec![a, b], &StatusSets::default());
        assert_eq!(annotated.len(), 2);
    }

    #[test]
    fn scan_classifies_artifacts_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("48E_10_NE.pdf"), b"%PDF").unwrap();
        fs::write(dir.path().join("48E_11_SW.pdf.unavailable"), b"").unwrap();
        fs::write(dir.path().join("48E_12_NW.html"), b"<html>").unwrap();
        fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let sets = scan_artifacts(dir.path()).unwrap();
        assert!(sets.available.contains("48E_10_NE"));
        assert!(sets.unavailable.contains("48E_11_SW"));
        assert!(sets.unavailable.contains("48E_12_NW"));
        assert_eq!(sets.available.len(), 1);
        assert_eq!(sets.unavailable.len(), 2);
    }

    #[test]
    fn east_neighbor_is_reported_when_unprobed() {
        let fc = FeatureCollection::new(vec![
            sheet("center", 44.0, 39.875),
            sheet("east", 44.125, 39.875),
        ]);
        let annotated = annotate(vec![fc], &sets(&["center"], &[]));
        let out = find_unprobed_neighbors(&annotated, SheetSize::default());
        assert_eq!(out, vec!["east".to_string()]);
    }

    #[test]
    fn available_neighbors_are_not_reported() {
        let fc = FeatureCollection::new(vec![
            sheet("center", 44.0, 39.875),
            sheet("east", 44.125, 39.875),
        ]);
        let annotated = annotate(vec![fc], &sets(&["center", "east"], &[]));
        assert!(find_unprobed_neighbors(&annotated, SheetSize::default()).is_empty());
    }

    #[test]
    fn all_eight_compass_neighbors_are_probed() {
        let mut features = vec![sheet("center", 44.0, 39.875)];
        let mut expected = Vec::new();
        for (dx, dy) in
            [(-1, -1), (-1, 0), (-1, 1), (0, -1), (0, 1), (1, -1), (1, 0), (1, 1)]
        {
            let id = format!("n{dx}{dy}");
            features.push(sheet(
                &id,
                44.0 + dx as f64 * 0.125,
                39.875 + dy as f64 * 0.125,
            ));
            expected.push(id);
        }
        let annotated =
            annotate(vec![FeatureCollection::new(features)], &sets(&["center"], &[]));
        let mut out = find_unprobed_neighbors(&annotated, SheetSize::default());
        expected.sort();
        out.sort();
        assert_eq!(out, expected);
    }

    #[test]
    fn output_is_sorted_and_deduplicated() {
        // Two available sheets flank one unprobed sheet; it must appear once.
        let fc = FeatureCollection::new(vec![
            sheet("west", 44.0, 39.875),
            sheet("mid", 44.125, 39.875),
            sheet("east", 44.25, 39.875),
            sheet("far", 44.375, 39.875),
        ]);
        let annotated = annotate(vec![fc], &sets(&["west", "east"], &[]));
        let out = find_unprobed_neighbors(&annotated, SheetSize::default());
        assert_eq!(out, vec!["far".to_string(), "mid".to_string()]);
    }

    #[test]
    fn non_grid_aligned_sheets_have_no_false_neighbors() {
        // A sheet half a module away must not match any shifted rectangle.
        let fc = FeatureCollection::new(vec![
            sheet("center", 44.0, 39.875),
            sheet("offset", 44.0625, 39.875),
        ]);
        let annotated = annotate(vec![fc], &sets(&["center"], &[]));
        assert!(find_unprobed_neighbors(&annotated, SheetSize::default()).is_empty());
    }
}
