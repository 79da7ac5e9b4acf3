use std::fs;
use std::path::Path;

use ahash::AHashMap;
use anyhow::{Context, Result};
use serde_json::json;

use super::groups::OverlapGroups;
use crate::geojson::{FeatureCollection, OSM_25K_KEYS, read_collection};
use crate::sheet_id::normalize_osm;
use crate::sheetmap::SheetMap;
use crate::states::{StateCode, grid_file_states};

/// Provenance of one overlapping sheet-map entry, attached to every grid
/// feature that matches it.
#[derive(Debug, Clone)]
pub struct OverlapSource {
    pub soi_sheet_id: String,
    pub artifact_key: String,
    pub state_name: String,
    pub local_path: String,
}

/// Lookup from (normalized OSM 25K id, state code) to the overlapping
/// sheet-map entries it belongs to. Restricted to sheet ids that appear in
/// some overlap group.
pub struct OverlapLookup {
    map: AHashMap<(String, StateCode), Vec<OverlapSource>>,
}

impl OverlapLookup {
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn get(&self, osm_normalized: &str, state: StateCode) -> Option<&[OverlapSource]> {
        self.map.get(&(osm_normalized.to_string(), state)).map(Vec::as_slice)
    }
}

pub fn build_overlap_lookup(
    map: &SheetMap,
    overlaps: &OverlapGroups,
    verbose: u8,
) -> OverlapLookup {
    let mut lookup: AHashMap<(String, StateCode), Vec<OverlapSource>> = AHashMap::new();
    for (soi, artifact_keys) in &overlaps.groups {
        for artifact_key in artifact_keys {
            let Some(entry) = map.get(artifact_key) else { continue };
            let (Some(state_name), osm) = (entry.state_name.as_deref(), &entry.osm_sheet_id)
            else {
                eprintln!("[overlaps] {artifact_key}: missing state name, skipped");
                continue;
            };
            if osm.trim().is_empty() {
                eprintln!("[overlaps] {artifact_key}: missing OSM sheet id, skipped");
                continue;
            }
            let Some(code) = StateCode::from_name(state_name) else {
                eprintln!("[overlaps] {artifact_key}: unknown state name {state_name:?}, skipped");
                continue;
            };
            lookup
                .entry((normalize_osm(osm), code))
                .or_default()
                .push(OverlapSource {
                    soi_sheet_id: soi.clone(),
                    artifact_key: artifact_key.clone(),
                    state_name: state_name.to_string(),
                    local_path: entry.local_path.clone(),
                });
        }
    }
    if verbose > 0 {
        eprintln!("[overlaps] lookup holds {} (osm id, state) combinations", lookup.len());
    }
    OverlapLookup { map: lookup }
}

/// Scan every known taluk/mandal grid file under `grid_dir` and collect a
/// tagged copy of each sub-unit feature that belongs to an overlap group:
/// the raw overlap pool. A grid file that fails to read is logged and the
/// scan continues with its siblings.
pub fn collect_overlap_pool(
    lookup: &OverlapLookup,
    grid_dir: &Path,
    verbose: u8,
) -> Result<FeatureCollection> {
    let mut paths: Vec<_> = fs::read_dir(grid_dir)
        .with_context(|| format!("Failed to read {}", grid_dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    paths.sort();

    let mut pool = Vec::new();
    for path in paths {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else { continue };
        let Some(states) = grid_file_states(file_name) else { continue };
        if verbose > 0 {
            eprintln!("[overlaps] scanning {file_name}");
        }
        let grid = match read_collection(&path) {
            Ok(grid) => grid,
            Err(err) => {
                eprintln!("[overlaps] {file_name}: {err:#}");
                continue;
            }
        };

        for feature in &grid.features {
            let Some(osm_id) = feature.text_property(OSM_25K_KEYS) else { continue };
            let normalized = normalize_osm(osm_id);
            for &state in &states {
                let Some(sources) = lookup.get(&normalized, state) else { continue };
                for source in sources {
                    let mut tagged = feature.clone();
                    tagged.set_property("state_code", json!(state.as_str()));
                    tagged.set_property("soi_sheet_id", json!(source.soi_sheet_id));
                    tagged.set_property(
                        "_overlap_info",
                        json!({
                            "soi_sheet_id": source.soi_sheet_id,
                            "artifact_key": source.artifact_key,
                            "state_name": source.state_name,
                            "local_path": source.local_path,
                            "source_grid_file": file_name,
                        }),
                    );
                    pool.push(tagged);
                }
            }
        }
    }
    Ok(FeatureCollection::new(pool))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geojson::{Feature, ring_value, write_collection};
    use crate::index::corner_ring;
    use crate::overlap::find_overlap_groups;
    use crate::sheetmap::SheetMapEntry;
    use serde_json::{Map, Value};

    fn entry(osm: &str, soi: &str, state_name: &str) -> SheetMapEntry {
        SheetMapEntry {
            osm_sheet_id: osm.into(),
            soi_sheet_id: soi.into(),
            state_series_no: "1".into(),
            source_url: "http://x/1.pdf".into(),
            local_path: format!("data/{state_name}/1.pdf"),
            map_type: None,
            plan_year: None,
            state_name: Some(state_name.into()),
        }
    }

    fn grid_feature(osm_25k: &str, taluk: Option<&str>) -> Feature {
        let mut props = Map::new();
        props.insert("OSM_25K_IN".into(), Value::String(osm_25k.into()));
        if let Some(taluk) = taluk {
            props.insert("TALUK_NAME".into(), Value::String(taluk.into()));
        }
        Feature::new(props, ring_value(&corner_ring(80.0, 15.0, 80.125, 15.125)))
    }

    #[test]
    fn lookup_is_restricted_to_overlap_groups() {
        let mut map = SheetMap::new();
        map.insert("AP-48E_10_NE.pdf".into(), entry("F 42 W 1/NE", "48E_10_NE", "Andhra Pradesh"));
        map.insert("TN-48E_10_NE.pdf".into(), entry("F 42 W 1 / NE", "48E_10_NE", "Tamil Nadu"));
        map.insert("GJ-41K_3_SW.pdf".into(), entry("F 40 A 2/SW", "41K_3_SW", "Gujarat"));

        let overlaps = find_overlap_groups(&map, 0);
        let lookup = build_overlap_lookup(&map, &overlaps, 0);

        assert!(lookup.get("F 42 W 1/NE", StateCode::AP).is_some());
        assert!(lookup.get("F 42 W 1/NE", StateCode::TN).is_some());
        assert!(lookup.get("F 40 A 2/SW", StateCode::GJ).is_none());
    }

    #[test]
    fn pool_tags_matching_grid_features() {
        let mut map = SheetMap::new();
        map.insert("AP-48E_10_NE.pdf".into(), entry("F 42 W 1/NE", "48E_10_NE", "Andhra Pradesh"));
        map.insert("TN-48E_10_NE.pdf".into(), entry("F 42 W 1/NE", "48E_10_NE", "Tamil Nadu"));
        let overlaps = find_overlap_groups(&map, 0);
        let lookup = build_overlap_lookup(&map, &overlaps, 0);

        let dir = tempfile::tempdir().unwrap();
        let grid = FeatureCollection::new(vec![
            grid_feature("F 42 W 1 / NE", Some("Nellore")),
            grid_feature("F 99 X 9/SW", None),
        ]);
        write_collection(&dir.path().join("AP_OSM_25K_Grid_Taluk.geojson"), &grid, false).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let pool = collect_overlap_pool(&lookup, dir.path(), 0).unwrap();
        assert_eq!(pool.len(), 1);
        let tagged = &pool.features[0];
        assert_eq!(tagged.properties["state_code"], "AP");
        assert_eq!(tagged.properties["soi_sheet_id"], "48E_10_NE");
        let info = &tagged.properties["_overlap_info"];
        assert_eq!(info["artifact_key"], "AP-48E_10_NE.pdf");
        assert_eq!(info["source_grid_file"], "AP_OSM_25K_Grid_Taluk.geojson");
    }

    #[test]
    fn unreadable_grid_files_do_not_abort_the_scan() {
        let mut map = SheetMap::new();
        map.insert("AP-48E_10_NE.pdf".into(), entry("F 42 W 1/NE", "48E_10_NE", "Andhra Pradesh"));
        map.insert("TN-48E_10_NE.pdf".into(), entry("F 42 W 1/NE", "48E_10_NE", "Tamil Nadu"));
        let overlaps = find_overlap_groups(&map, 0);
        let lookup = build_overlap_lookup(&map, &overlaps, 0);

        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("AP_OSM_25K_Grid_Taluk.geojson"), "not json").unwrap();
        let grid = FeatureCollection::new(vec![grid_feature("F 42 W 1/NE", None)]);
        write_collection(&dir.path().join("TN_OSM_25K_Grid_Taluk.geojson"), &grid, false).unwrap();

        let pool = collect_overlap_pool(&lookup, dir.path(), 0).unwrap();
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.features[0].properties["state_code"], "TN");
    }
}
