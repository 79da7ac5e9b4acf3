use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use ahash::AHashMap;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::common::{finalize_write, open_for_write};
use crate::geojson::{FeatureCollection, OSM_25K_KEYS, OSM_50K_KEYS, SERIES_NO_KEYS};
use crate::sheet_id::{normalize, split_quadrant};
use crate::states::StateCode;

/// Placeholder SOI id for grid cells whose 50K parent is absent from the
/// index. Kept literal so downstream reports surface the gap instead of
/// hiding it.
pub const UNKNOWN_SHEET: &str = "UNKNOWN";

/// One state's sheet-to-artifact mapping, keyed by artifact filename
/// (`<CODE>-<soi_sheet_id>.pdf`). BTreeMap keeps the serialized files
/// sorted and regeneration byte-stable.
pub type SheetMap = BTreeMap<String, SheetMapEntry>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapType {
    Approved,
    Draft,
}

/// One row of a state's sheet map. Created once per (state, sheet) when the
/// raw grid is translated into canonical ids; the optional fields are filled
/// by the enrichment pass and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetMapEntry {
    pub osm_sheet_id: String,
    pub soi_sheet_id: String,
    pub state_series_no: String,
    pub source_url: String,
    pub local_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_type: Option<MapType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_year: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_name: Option<String>,
}

/// Lookup from a normalized OSM 50K sheet id to its (raw OSM id, SOI id)
/// pair, built once from the 50K index and passed explicitly to every
/// builder that needs it.
pub struct OsmSoiLookup {
    map: AHashMap<String, (String, String)>,
}

impl OsmSoiLookup {
    pub fn from_index(fc: &FeatureCollection, verbose: u8) -> OsmSoiLookup {
        let mut map = AHashMap::with_capacity(fc.len());
        for feature in &fc.features {
            let (Some(osm), Some(soi)) = (feature.text_property(OSM_50K_KEYS), feature.id())
            else {
                if verbose > 0 {
                    eprintln!("[sheetmap] index feature without OSM/SOI ids skipped");
                }
                continue;
            };
            map.insert(normalize(osm), (osm.to_string(), soi.to_string()));
        }
        OsmSoiLookup { map }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// SOI id of a 50K sheet, looked up by whitespace/case-insensitive match.
    pub fn soi_for(&self, osm_50k: &str) -> Option<&str> {
        self.map.get(&normalize(osm_50k)).map(|(_, soi)| soi.as_str())
    }

    /// Compose the 25K SOI id for a composite OSM id: `<soi_50k>_<quadrant>`
    /// (or the bare 50K id when no quadrant suffix is present), falling back
    /// to the `UNKNOWN` placeholder when the 50K parent is not indexed.
    pub fn compose_25k(&self, osm_25k: &str) -> String {
        let (base, quadrant) = split_quadrant(osm_25k);
        match self.soi_for(base) {
            Some(soi_50k) => match quadrant {
                Some(q) if !q.is_empty() => format!("{soi_50k}_{q}"),
                _ => soi_50k.to_string(),
            },
            None => UNKNOWN_SHEET.to_string(),
        }
    }
}

/// Translate one state's 25K grid file(s) into sheet-map entries.
///
/// Only cells whose downloaded artifact actually exists under `artifact_dir`
/// make it into the map; JPG scans are preferred over PDFs when both exist.
pub fn build_state_sheetmap(
    state: StateCode,
    lookup: &OsmSoiLookup,
    grids: &[FeatureCollection],
    artifact_dir: &Path,
    base_url: &str,
    verbose: u8,
) -> SheetMap {
    let mut map = SheetMap::new();
    for grid in grids {
        for feature in &grid.features {
            let Some(osm_25k) = feature.text_property(OSM_25K_KEYS) else {
                if verbose > 0 {
                    eprintln!("[sheetmap] {state}: grid cell without an OSM 25K id skipped");
                }
                continue;
            };
            let Some(series_no) = feature.string_property(SERIES_NO_KEYS) else {
                if verbose > 0 {
                    eprintln!("[sheetmap] {state}: grid cell {osm_25k} has no series number");
                }
                continue;
            };

            let soi_sheet = lookup.compose_25k(osm_25k);
            let Some((file_name, ext)) = find_artifact(state, &series_no, artifact_dir) else {
                if verbose > 1 {
                    eprintln!("[sheetmap] {state}: no artifact for series {series_no}");
                }
                continue;
            };

            let key = format!("{state}-{soi_sheet}.{ext}");
            map.insert(
                key,
                SheetMapEntry {
                    osm_sheet_id: osm_25k.to_string(),
                    soi_sheet_id: soi_sheet,
                    state_series_no: series_no,
                    source_url: format!("{base_url}/{file_name}"),
                    local_path: artifact_dir.join(&file_name).display().to_string(),
                    map_type: None,
                    plan_year: None,
                    state_name: None,
                },
            );
        }
    }
    map
}

/// Locate the downloaded artifact for one grid cell. Agencies name files
/// either `<CODE>_<series>.<ext>` or `<series>.<ext>` (with any
/// `"<CODE> "` prefix already part of the series number stripped), and some
/// deliver JPG instead of PDF.
fn find_artifact(state: StateCode, series_no: &str, dir: &Path) -> Option<(String, &'static str)> {
    let stripped = series_no
        .strip_prefix(state.as_str())
        .map(|rest| rest.trim_start())
        .unwrap_or(series_no);
    for ext in ["jpg", "pdf"] {
        for name in [format!("{state}_{stripped}.{ext}"), format!("{stripped}.{ext}")] {
            if dir.join(&name).exists() {
                return Some((name, ext));
            }
        }
    }
    None
}

pub fn read_sheetmap(path: &Path) -> Result<SheetMap> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn write_sheetmap(path: &Path, map: &SheetMap, force: bool) -> Result<()> {
    let mut pending = open_for_write(path, force)?;
    serde_json::to_writer_pretty(&mut pending, map).context("Failed to serialize sheet map")?;
    pending.write_all(b"\n")?;
    finalize_write(pending)
}

/// Map type stamped during the merge: West Bengal only ever published draft
/// CZMP sheets, every other source is approved.
pub fn map_type_for(state: StateCode) -> MapType {
    if state == StateCode::WB { MapType::Draft } else { MapType::Approved }
}

/// CZMP plan year per state; the 2011-cycle states keep their original year,
/// everything else is the 2019 cycle.
pub fn plan_year_for(state: StateCode) -> u16 {
    match state {
        StateCode::AP | StateCode::GA | StateCode::GJ | StateCode::TN | StateCode::WB => 2011,
        _ => 2019,
    }
}

/// Merge every per-state sheet map under `dir` into one map, enriching each
/// entry with map type, plan year, and the full state name. Files whose stem
/// is not a known state code are logged and skipped.
pub fn merge_sheetmaps(dir: &Path, verbose: u8) -> Result<(SheetMap, usize)> {
    let mut paths: Vec<_> = fs::read_dir(dir)
        .with_context(|| format!("Failed to read {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json"))
        .collect();
    paths.sort();

    let mut merged = SheetMap::new();
    let mut files = 0usize;
    for path in paths {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else { continue };
        let Some(state) = StateCode::from_code(stem) else {
            eprintln!("[sheetmap] {}: not a state code, skipped", path.display());
            continue;
        };
        let map = read_sheetmap(&path)?;
        if verbose > 0 {
            eprintln!("[sheetmap] {}: {} entries", path.display(), map.len());
        }
        for (key, mut entry) in map {
            entry.map_type = Some(map_type_for(state));
            entry.plan_year = Some(plan_year_for(state));
            entry.state_name = Some(state.name().to_string());
            merged.insert(key, entry);
        }
        files += 1;
    }
    Ok((merged, files))
}
