use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, bail};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::common::{finalize_write, open_for_write};

/// Administrative sub-unit name, checked in priority order. A populated name
/// signals true ownership of an overlap sub-unit by the file's state.
pub const SUBUNIT_NAME_KEYS: &[&str] = &["TALUK_NAME", "Mandal"];

/// OSM-style 50K sheet id carried by the raw 50K index.
pub const OSM_50K_KEYS: &[&str] = &["OSM_SHEET_"];

/// OSM-style composite 25K sheet id carried by per-state grid files.
pub const OSM_25K_KEYS: &[&str] = &["OSM_25K_IN"];

/// Per-state series number of a grid cell, one spelling per agency.
pub const SERIES_NO_KEYS: &[&str] = &["INDEX_NO", "Map_No", "Map_No_1"];

/// One GeoJSON feature: an open property bag plus the geometry kept as raw
/// JSON until a component actually needs to interpret it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default)]
    pub geometry: Value,
}

impl Feature {
    pub fn new(properties: Map<String, Value>, geometry: Value) -> Self {
        Self { kind: "Feature".into(), properties, geometry }
    }

    /// Canonical sheet id, when present.
    pub fn id(&self) -> Option<&str> {
        self.properties.get("id").and_then(Value::as_str)
    }

    /// First non-blank string value among `keys`, trimmed. This is the one
    /// sanctioned way to read inconsistently-named properties; ad-hoc probing
    /// at call sites is not.
    pub fn text_property(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|k| self.properties.get(*k))
            .filter_map(Value::as_str)
            .map(str::trim)
            .find(|s| !s.is_empty())
    }

    /// Like `text_property`, but also accepts numeric values (series numbers
    /// are plain integers in some grid files).
    pub fn string_property(&self, keys: &[&str]) -> Option<String> {
        for key in keys {
            match self.properties.get(*key) {
                Some(Value::String(s)) if !s.trim().is_empty() => return Some(s.trim().to_string()),
                Some(Value::Number(n)) => return Some(n.to_string()),
                _ => {}
            }
        }
        None
    }

    pub fn set_property(&mut self, key: &str, value: Value) {
        self.properties.insert(key.to_string(), value);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crs: Option<Value>,
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { kind: "FeatureCollection".into(), name: None, crs: None, features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Parse a FeatureCollection document, rejecting any other top-level schema.
pub fn parse_collection(text: &str) -> Result<FeatureCollection> {
    let fc: FeatureCollection =
        serde_json::from_str(text).context("Failed to parse GeoJSON document")?;
    if fc.kind != "FeatureCollection" {
        bail!("Expected a FeatureCollection, got {:?}", fc.kind);
    }
    Ok(fc)
}

pub fn read_collection(path: &Path) -> Result<FeatureCollection> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_collection(&text).with_context(|| format!("in {}", path.display()))
}

// One known corruption in a source index: a stray `]` closing the features
// array between two hand-concatenated chunks. Only this exact token sequence
// is ever repaired; everything else stays a fatal parse error.
const REPAIR_FROM: &str = "  }\n  ],\n  {";
const REPAIR_TO: &str = "  },\n  {";

/// Read a collection, repairing the single known corruption pattern if (and
/// only if) a strict parse fails and the pattern is present.
pub fn read_collection_repairing(path: &Path, verbose: u8) -> Result<FeatureCollection> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    match parse_collection(&text) {
        Ok(fc) => Ok(fc),
        Err(err) => {
            if !text.contains(REPAIR_FROM) {
                return Err(err).with_context(|| format!("in {}", path.display()));
            }
            if verbose > 0 {
                eprintln!("[repair] rewriting stray array delimiter in {}", path.display());
            }
            let repaired = text.replace(REPAIR_FROM, REPAIR_TO);
            parse_collection(&repaired)
                .with_context(|| format!("in {} (after repair)", path.display()))
        }
    }
}

/// Read line-delimited GeoJSON (one feature per line), skipping blank lines.
pub fn read_feature_lines(path: &Path) -> Result<Vec<Feature>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let mut features = Vec::new();
    for (no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let feature: Feature = serde_json::from_str(line)
            .with_context(|| format!("{}:{}: invalid feature line", path.display(), no + 1))?;
        features.push(feature);
    }
    Ok(features)
}

/// Write a collection as pretty-printed GeoJSON, atomically.
pub fn write_collection(path: &Path, fc: &FeatureCollection, force: bool) -> Result<()> {
    let mut pending = open_for_write(path, force)?;
    serde_json::to_writer_pretty(&mut pending, fc).context("Failed to serialize GeoJSON")?;
    pending.write_all(b"\n")?;
    finalize_write(pending)
}

/// Write a collection with one compact feature per line inside a readable
/// header/footer, so regenerated outputs diff line-by-line.
pub fn write_collection_lines(path: &Path, fc: &FeatureCollection, force: bool) -> Result<()> {
    let mut pending = open_for_write(path, force)?;
    writeln!(pending, "{{")?;
    writeln!(pending, "  \"type\": \"FeatureCollection\",")?;
    if let Some(name) = &fc.name {
        writeln!(pending, "  \"name\": {},", serde_json::to_string(name)?)?;
    }
    if let Some(crs) = &fc.crs {
        writeln!(pending, "  \"crs\": {},", serde_json::to_string(crs)?)?;
    }
    writeln!(pending, "  \"features\": [")?;
    let last = fc.features.len().saturating_sub(1);
    for (idx, feature) in fc.features.iter().enumerate() {
        let line = serde_json::to_string(feature)?;
        if idx < last {
            writeln!(pending, "    {line},")?;
        } else {
            writeln!(pending, "    {line}")?;
        }
    }
    writeln!(pending, "  ]")?;
    writeln!(pending, "}}")?;
    finalize_write(pending)
}

/// Parse a GeoJSON Polygon or MultiPolygon geometry into a `geo`
/// MultiPolygon. Anything else (points, lines, missing coordinates,
/// degenerate rings) is an error the caller decides to skip or abort on.
pub fn parse_multipolygon(value: &Value) -> Result<MultiPolygon<f64>> {
    let Some(kind) = value.get("type").and_then(Value::as_str) else {
        bail!("geometry has no type");
    };
    let Some(coords) = value.get("coordinates").and_then(Value::as_array) else {
        bail!("geometry has no coordinates");
    };
    match kind {
        "Polygon" => Ok(MultiPolygon(vec![parse_polygon_coords(coords)?])),
        "MultiPolygon" => {
            let mut polygons = Vec::with_capacity(coords.len());
            for polygon_coords in coords {
                let rings = polygon_coords
                    .as_array()
                    .ok_or_else(|| anyhow::anyhow!("MultiPolygon member is not an array"))?;
                polygons.push(parse_polygon_coords(rings)?);
            }
            Ok(MultiPolygon(polygons))
        }
        other => bail!("unsupported geometry type {other:?}"),
    }
}

fn parse_polygon_coords(rings: &[Value]) -> Result<Polygon<f64>> {
    let exterior = rings
        .first()
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow::anyhow!("polygon has no exterior ring"))?;
    let exterior = parse_ring_coords(exterior)?;

    let mut interiors = Vec::new();
    for ring in &rings[1..] {
        let ring = ring
            .as_array()
            .ok_or_else(|| anyhow::anyhow!("interior ring is not an array"))?;
        interiors.push(parse_ring_coords(ring)?);
    }
    Ok(Polygon::new(exterior, interiors))
}

fn parse_ring_coords(coords: &[Value]) -> Result<LineString<f64>> {
    let mut points = Vec::with_capacity(coords.len());
    for pair in coords {
        let Some(pair) = pair.as_array() else {
            bail!("ring coordinate is not an array");
        };
        if pair.len() < 2 {
            bail!("ring coordinate has fewer than 2 components");
        }
        let x = pair[0].as_f64().ok_or_else(|| anyhow::anyhow!("lon is not a number"))?;
        let y = pair[1].as_f64().ok_or_else(|| anyhow::anyhow!("lat is not a number"))?;
        if !x.is_finite() || !y.is_finite() {
            bail!("ring coordinate is not finite");
        }
        points.push(Coord { x, y });
    }

    // Close the ring if the source left it open.
    if !points.is_empty() && points[0] != points[points.len() - 1] {
        points.push(points[0]);
    }
    if points.len() < 4 {
        bail!("ring has fewer than 4 points");
    }
    Ok(LineString(points))
}

/// First exterior ring of a Polygon geometry, with Z values dropped.
/// Returns None for any other geometry type or an empty coordinate list;
/// callers treat that as "skip this feature", not an error.
pub fn polygon_first_ring(value: &Value) -> Option<Vec<[f64; 2]>> {
    if value.get("type").and_then(Value::as_str) != Some("Polygon") {
        return None;
    }
    let ring = value.get("coordinates")?.as_array()?.first()?.as_array()?;
    let mut points = Vec::with_capacity(ring.len());
    for pair in ring {
        let pair = pair.as_array()?;
        if pair.len() < 2 {
            return None;
        }
        points.push([pair[0].as_f64()?, pair[1].as_f64()?]);
    }
    if points.is_empty() { None } else { Some(points) }
}

/// Serialize a MultiPolygon back to a GeoJSON geometry value. A union that
/// collapsed to one polygon is written as a Polygon, mirroring how the
/// upstream datasets represent simply-connected coverage.
pub fn multipolygon_value(mp: &MultiPolygon<f64>) -> Value {
    let polygons: Vec<Value> = mp.0.iter().map(polygon_coords_value).collect();
    if polygons.len() == 1 {
        json!({ "type": "Polygon", "coordinates": polygons.into_iter().next().unwrap() })
    } else {
        json!({ "type": "MultiPolygon", "coordinates": polygons })
    }
}

fn polygon_coords_value(polygon: &Polygon<f64>) -> Value {
    let mut rings = Vec::with_capacity(1 + polygon.interiors().len());
    rings.push(ring_coords_value(polygon.exterior()));
    for interior in polygon.interiors() {
        rings.push(ring_coords_value(interior));
    }
    Value::Array(rings)
}

fn ring_coords_value(ring: &LineString<f64>) -> Value {
    Value::Array(ring.coords().map(|c| json!([c.x, c.y])).collect())
}

/// Polygon geometry value from a bare exterior ring.
pub fn ring_value(ring: &[[f64; 2]]) -> Value {
    json!({ "type": "Polygon", "coordinates": [ring] })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature_json(id: &str) -> String {
        format!(
            r#"{{"type":"Feature","properties":{{"id":"{id}"}},"geometry":{{"type":"Polygon","coordinates":[[[0.0,0.0],[0.0,1.0],[1.0,1.0],[1.0,0.0],[0.0,0.0]]]}}}}"#
        )
    }

    #[test]
    fn parses_a_feature_collection() {
        let text = format!(
            r#"{{"type":"FeatureCollection","features":[{}]}}"#,
            feature_json("48E_10")
        );
        let fc = parse_collection(&text).unwrap();
        assert_eq!(fc.len(), 1);
        assert_eq!(fc.features[0].id(), Some("48E_10"));
    }

    #[test]
    fn rejects_non_collection_documents() {
        let err = parse_collection(&feature_json("48E_10")).unwrap_err();
        assert!(err.to_string().contains("FeatureCollection"));
    }

    #[test]
    fn text_property_prefers_first_populated_alias() {
        let text = r#"{"type":"Feature","properties":{"TALUK_NAME":"  ","Mandal":"Nellore"},"geometry":null}"#;
        let feature: Feature = serde_json::from_str(text).unwrap();
        assert_eq!(feature.text_property(SUBUNIT_NAME_KEYS), Some("Nellore"));

        let text = r#"{"type":"Feature","properties":{"TALUK_NAME":"Chirala","Mandal":"Nellore"},"geometry":null}"#;
        let feature: Feature = serde_json::from_str(text).unwrap();
        assert_eq!(feature.text_property(SUBUNIT_NAME_KEYS), Some("Chirala"));
    }

    #[test]
    fn string_property_accepts_numbers() {
        let text = r#"{"type":"Feature","properties":{"INDEX_NO":81},"geometry":null}"#;
        let feature: Feature = serde_json::from_str(text).unwrap();
        assert_eq!(feature.string_property(SERIES_NO_KEYS), Some("81".to_string()));
    }

    #[test]
    fn repair_fixes_only_the_known_pattern() {
        let corrupt = concat!(
            "{\n",
            "\"type\": \"FeatureCollection\",\n",
            "\"features\": [\n",
            "  {\n",
            "    \"type\": \"Feature\",\n",
            "    \"properties\": {\"id\": \"A\"},\n",
            "    \"geometry\": null\n",
            "  }\n",
            "  ],\n",
            "  {\n",
            "    \"type\": \"Feature\",\n",
            "    \"properties\": {\"id\": \"B\"},\n",
            "    \"geometry\": null\n",
            "  }\n",
            "]\n",
            "}\n",
        );
        assert!(corrupt.contains(REPAIR_FROM));
        assert!(parse_collection(corrupt).is_err());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index_50k_extra.geojson");
        fs::write(&path, corrupt).unwrap();
        let fc = read_collection_repairing(&path, 0).unwrap();
        assert_eq!(fc.len(), 2);
        assert_eq!(fc.features[0].id(), Some("A"));
    }

    #[test]
    fn other_corruption_stays_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.geojson");
        fs::write(&path, "{\"type\": \"FeatureCollection\", \"features\": [,]}").unwrap();
        assert!(read_collection_repairing(&path, 0).is_err());
    }

    #[test]
    fn parse_multipolygon_accepts_polygon_and_multipolygon() {
        let poly = json!({
            "type": "Polygon",
            "coordinates": [[[0.0,0.0],[2.0,0.0],[2.0,2.0],[0.0,2.0],[0.0,0.0]]]
        });
        let mp = parse_multipolygon(&poly).unwrap();
        assert_eq!(mp.0.len(), 1);

        let multi = json!({
            "type": "MultiPolygon",
            "coordinates": [
                [[[0.0,0.0],[1.0,0.0],[1.0,1.0],[0.0,1.0],[0.0,0.0]]],
                [[[5.0,5.0],[6.0,5.0],[6.0,6.0],[5.0,6.0],[5.0,5.0]]]
            ]
        });
        let mp = parse_multipolygon(&multi).unwrap();
        assert_eq!(mp.0.len(), 2);
    }

    #[test]
    fn parse_multipolygon_closes_open_rings() {
        let poly = json!({
            "type": "Polygon",
            "coordinates": [[[0.0,0.0],[2.0,0.0],[2.0,2.0],[0.0,2.0]]]
        });
        let mp = parse_multipolygon(&poly).unwrap();
        let exterior = mp.0[0].exterior();
        assert_eq!(exterior.0.first(), exterior.0.last());
        assert_eq!(exterior.0.len(), 5);
    }

    #[test]
    fn parse_multipolygon_rejects_degenerate_input() {
        assert!(parse_multipolygon(&json!({"type": "Point", "coordinates": [0.0, 0.0]})).is_err());
        assert!(parse_multipolygon(&json!({"type": "Polygon", "coordinates": []})).is_err());
        let sliver = json!({"type": "Polygon", "coordinates": [[[0.0,0.0],[1.0,1.0]]]});
        assert!(parse_multipolygon(&sliver).is_err());
    }

    #[test]
    fn polygon_first_ring_skips_other_types() {
        let multi = json!({
            "type": "MultiPolygon",
            "coordinates": [[[[0.0,0.0],[1.0,0.0],[1.0,1.0],[0.0,0.0]]]]
        });
        assert!(polygon_first_ring(&multi).is_none());
        assert!(polygon_first_ring(&Value::Null).is_none());
        let empty = json!({"type": "Polygon", "coordinates": []});
        assert!(polygon_first_ring(&empty).is_none());
    }

    #[test]
    fn polygon_first_ring_drops_z() {
        let poly = json!({
            "type": "Polygon",
            "coordinates": [[[70.0, 20.0, 1.5], [70.5, 20.0, 1.5], [70.5, 20.5, 1.5], [70.0, 20.0, 1.5]]]
        });
        let ring = polygon_first_ring(&poly).unwrap();
        assert_eq!(ring[0], [70.0, 20.0]);
        assert_eq!(ring.len(), 4);
    }

    #[test]
    fn single_polygon_union_serializes_as_polygon() {
        let poly = json!({
            "type": "Polygon",
            "coordinates": [[[0.0,0.0],[2.0,0.0],[2.0,2.0],[0.0,2.0],[0.0,0.0]]]
        });
        let mp = parse_multipolygon(&poly).unwrap();
        let out = multipolygon_value(&mp);
        assert_eq!(out["type"], "Polygon");
    }
}
