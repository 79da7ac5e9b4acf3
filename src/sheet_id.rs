use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Canonicalize a sheet identifier for use as a join key: every whitespace
/// character is removed and the result is upper-cased.
///
/// State survey agencies format the same sheet id inconsistently
/// (`"F 43 S 15"`, `"f43s15"`, `"F43 S15"`); this collapses all of them to
/// `"F43S15"`. Idempotent.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(|c| c.to_uppercase())
        .collect()
}

static SLASH_WS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*/\s*").unwrap());
static WS_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Case-preserving normalization for OSM-style composite ids that keep a
/// quadrant suffix, e.g. `"F 45 P 6 / SE"` -> `"F 45 P 6/SE"`.
///
/// Collapses whitespace around `/` and internal whitespace runs, but keeps the
/// human-readable form so the result still matches grid files that were never
/// fully normalized. Ids without a `/` pass through with only the whitespace
/// collapsing. Idempotent.
pub fn normalize_osm(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let collapsed = SLASH_WS.replace_all(trimmed, "/");
    WS_RUN.replace_all(&collapsed, " ").into_owned()
}

/// Split a composite OSM id into its 50K part and quadrant suffix on the
/// LAST `/`: `"F 42 W 1/NE"` -> (`"F 42 W 1"`, Some(`"NE"`)).
/// Ids without a separator come back whole with no suffix.
pub fn split_quadrant(osm_id: &str) -> (&str, Option<&str>) {
    match osm_id.rsplit_once('/') {
        Some((base, suffix)) => (base.trim_end(), Some(suffix.trim())),
        None => (osm_id, None),
    }
}

/// One of the four equal subdivisions of a coarser sheet, in the order the
/// derived index lists them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quadrant {
    NW,
    NE,
    SW,
    SE,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [Quadrant::NW, Quadrant::NE, Quadrant::SW, Quadrant::SE];

    pub fn suffix(self) -> &'static str {
        match self {
            Quadrant::NW => "NW",
            Quadrant::NE => "NE",
            Quadrant::SW => "SW",
            Quadrant::SE => "SE",
        }
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Derived id of one quadrant sheet: the parent id with `/` flattened to `_`
/// and the quadrant suffix appended, e.g. `"48E/10"` + NE -> `"48E_10_NE"`.
pub fn quadrant_id(parent_id: &str, quadrant: Quadrant) -> String {
    format!("{}_{}", parent_id.replace('/', "_"), quadrant.suffix())
}
