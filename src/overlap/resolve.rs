use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, json};

use crate::geojson::{
    Feature, FeatureCollection, SUBUNIT_NAME_KEYS, multipolygon_value, parse_multipolygon,
};
use crate::geom::union_all;
use crate::states::StateCode;

/// Placeholder claimant code when no second state can be inferred for a
/// group. Deliberately best-effort: the source data is messy and a visible
/// placeholder beats dropping coverage on the floor.
pub const UNKNOWN_STATE: &str = "UNKNOWN";

#[derive(Debug, Default)]
pub struct ResolveSummary {
    pub coverage_features: usize,
    pub groups_skipped: usize,
    pub invalid_geometries: usize,
}

/// Resolve the raw overlap pool into per-state coverage features.
///
/// Partition rule, preserved from the source datasets' convention: within one
/// sheet's pool, the first claimant state's sub-units that carry a
/// taluk/mandal name belong to that state; its name-less sub-units are the
/// neighbouring state's territory drawn into the wrong administrative layer,
/// and go to the second claimant. Claimant order is the ascending state-code
/// order of the states present in the pool, which makes the "first" claimant
/// deterministic. The rule misfires if a grid omits names for unrelated
/// reasons; that is a property of the upstream data, validated by domain
/// review, not something this resolver second-guesses.
pub fn resolve_coverage(
    pool: &FeatureCollection,
    expected_states: &BTreeMap<String, BTreeSet<StateCode>>,
    verbose: u8,
) -> (FeatureCollection, ResolveSummary) {
    // Ascending soi_sheet_id drives the output ordering.
    let mut by_sheet: BTreeMap<&str, Vec<&Feature>> = BTreeMap::new();
    for feature in &pool.features {
        let Some(soi) = feature.properties.get("soi_sheet_id").and_then(|v| v.as_str()) else {
            continue;
        };
        by_sheet.entry(soi).or_default().push(feature);
    }

    let mut out = Vec::new();
    let mut summary = ResolveSummary::default();

    for (soi, features) in by_sheet {
        let mut by_state: BTreeMap<StateCode, Vec<&Feature>> = BTreeMap::new();
        for feature in features {
            let Some(code) = feature
                .properties
                .get("state_code")
                .and_then(|v| v.as_str())
                .and_then(StateCode::from_code)
            else {
                eprintln!("[coverage] {soi}: feature without a resolvable state code, skipped");
                continue;
            };
            by_state.entry(code).or_default().push(feature);
        }

        if by_state.is_empty() {
            eprintln!("[coverage] {soi}: no claimant states, group skipped");
            summary.groups_skipped += 1;
            continue;
        }

        let mut states = by_state.keys().copied();
        let first = states.next().expect("non-empty by_state");
        let second = match states.next() {
            Some(code) => code.as_str().to_string(),
            None => infer_second_claimant(soi, first, expected_states, verbose),
        };

        let (named, unnamed): (Vec<&Feature>, Vec<&Feature>) = by_state[&first]
            .iter()
            .copied()
            .partition(|f| f.text_property(SUBUNIT_NAME_KEYS).is_some());
        if verbose > 0 {
            eprintln!(
                "[coverage] {soi}: {first} has {} named / {} unnamed sub-units",
                named.len(),
                unnamed.len()
            );
        }

        // Named sub-units stay with the first claimant; the feature order is
        // named-owner first, then the inferred/second claimant.
        for (subset, owner) in [(named, first.as_str().to_string()), (unnamed, second)] {
            if let Some(feature) = merge_subset(soi, &subset, &owner, &mut summary) {
                out.push(feature);
                summary.coverage_features += 1;
            }
        }
    }

    (FeatureCollection::new(out), summary)
}

fn infer_second_claimant(
    soi: &str,
    first: StateCode,
    expected_states: &BTreeMap<String, BTreeSet<StateCode>>,
    verbose: u8,
) -> String {
    let inferred = expected_states
        .get(soi)
        .and_then(|states| states.iter().copied().find(|&code| code != first));
    match inferred {
        Some(code) => {
            if verbose > 0 {
                eprintln!("[coverage] {soi}: second claimant {code} inferred from sheet map");
            }
            code.as_str().to_string()
        }
        None => {
            eprintln!("[coverage] {soi}: could not determine second claimant state");
            UNKNOWN_STATE.to_string()
        }
    }
}

/// Union one subset of sub-unit polygons into a single coverage feature.
/// Invalid geometries are excluded from the union with a warning; an empty
/// subset (or one with no usable geometry) yields no feature.
fn merge_subset(
    soi: &str,
    subset: &[&Feature],
    owner: &str,
    summary: &mut ResolveSummary,
) -> Option<Feature> {
    if subset.is_empty() {
        return None;
    }
    let mut geoms = Vec::with_capacity(subset.len());
    for feature in subset {
        match parse_multipolygon(&feature.geometry) {
            Ok(mp) => geoms.push(mp),
            Err(err) => {
                eprintln!("[coverage] {soi}: invalid geometry excluded from union: {err}");
                summary.invalid_geometries += 1;
            }
        }
    }
    let merged = union_all(geoms)?;

    let sheet_id = format!("{owner}-{soi}");
    let mut props = Map::new();
    props.insert("sheet_id".into(), json!(sheet_id));
    Some(Feature::new(props, multipolygon_value(&merged)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geojson::ring_value;
    use crate::index::corner_ring;
    use geo::Area;
    use serde_json::Value;

    fn pool_feature(
        soi: &str,
        state: &str,
        taluk: Option<&str>,
        min_lon: f64,
        min_lat: f64,
    ) -> Feature {
        let mut props = Map::new();
        props.insert("soi_sheet_id".into(), json!(soi));
        props.insert("state_code".into(), json!(state));
        if let Some(taluk) = taluk {
            props.insert("TALUK_NAME".into(), json!(taluk));
        }
        Feature::new(
            props,
            ring_value(&corner_ring(min_lon, min_lat, min_lon + 1.0, min_lat + 1.0)),
        )
    }

    fn expected(soi: &str, states: &[StateCode]) -> BTreeMap<String, BTreeSet<StateCode>> {
        let mut map = BTreeMap::new();
        map.insert(soi.to_string(), states.iter().copied().collect());
        map
    }

    #[test]
    fn named_units_go_first_state_unnamed_go_second() {
        // 5 named + 2 unnamed AP sub-units; TN contributes its own features.
        let mut features = Vec::new();
        for i in 0..5 {
            features.push(pool_feature("48E_10_NE", "AP", Some("Taluk"), i as f64, 0.0));
        }
        for i in 0..2 {
            features.push(pool_feature("48E_10_NE", "AP", None, i as f64, 5.0));
        }
        features.push(pool_feature("48E_10_NE", "TN", Some("Taluk"), 0.0, 10.0));
        let pool = FeatureCollection::new(features);

        let (out, summary) =
            resolve_coverage(&pool, &expected("48E_10_NE", &[StateCode::AP, StateCode::TN]), 0);

        assert_eq!(out.len(), 2);
        assert_eq!(summary.coverage_features, 2);
        assert_eq!(out.features[0].properties["sheet_id"], "AP-48E_10_NE");
        assert_eq!(out.features[1].properties["sheet_id"], "TN-48E_10_NE");

        // 5 adjacent unit squares merge to area 5, the 2 unnamed to area 2.
        let named = parse_multipolygon(&out.features[0].geometry).unwrap();
        assert!((named.unsigned_area() - 5.0).abs() < 1e-9);
        let unnamed = parse_multipolygon(&out.features[1].geometry).unwrap();
        assert!((unnamed.unsigned_area() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn missing_second_state_is_inferred_from_expectation_table() {
        let pool = FeatureCollection::new(vec![
            pool_feature("48E_10_NE", "AP", Some("Taluk"), 0.0, 0.0),
            pool_feature("48E_10_NE", "AP", None, 5.0, 0.0),
        ]);
        let (out, _) =
            resolve_coverage(&pool, &expected("48E_10_NE", &[StateCode::AP, StateCode::TN]), 0);
        let ids: Vec<&Value> =
            out.features.iter().map(|f| &f.properties["sheet_id"]).collect();
        assert_eq!(ids, vec!["AP-48E_10_NE", "TN-48E_10_NE"]);
    }

    #[test]
    fn unresolvable_second_state_uses_the_placeholder() {
        let pool = FeatureCollection::new(vec![
            pool_feature("48E_10_NE", "AP", Some("Taluk"), 0.0, 0.0),
            pool_feature("48E_10_NE", "AP", None, 5.0, 0.0),
        ]);
        let (out, _) = resolve_coverage(&pool, &expected("48E_10_NE", &[StateCode::AP]), 0);
        assert_eq!(out.features[1].properties["sheet_id"], "UNKNOWN-48E_10_NE");
    }

    #[test]
    fn groups_without_claimants_are_skipped_not_fatal() {
        let mut no_state = pool_feature("48E_10_NE", "AP", None, 0.0, 0.0);
        no_state.properties.remove("state_code");
        let pool = FeatureCollection::new(vec![
            no_state,
            pool_feature("55M_1_SW", "GA", Some("Taluk"), 0.0, 0.0),
        ]);
        let (out, summary) = resolve_coverage(&pool, &BTreeMap::new(), 0);
        assert_eq!(summary.groups_skipped, 1);
        assert_eq!(out.features[0].properties["sheet_id"], "GA-55M_1_SW");
    }

    #[test]
    fn invalid_geometries_are_excluded_from_the_union() {
        let mut broken = pool_feature("48E_10_NE", "AP", Some("Taluk"), 0.0, 0.0);
        broken.geometry = json!({ "type": "Polygon", "coordinates": [] });
        let pool = FeatureCollection::new(vec![
            broken,
            pool_feature("48E_10_NE", "AP", Some("Taluk"), 1.0, 0.0),
            pool_feature("48E_10_NE", "TN", None, 9.0, 0.0),
        ]);
        let (out, summary) =
            resolve_coverage(&pool, &expected("48E_10_NE", &[StateCode::AP, StateCode::TN]), 0);
        assert_eq!(summary.invalid_geometries, 1);
        assert_eq!(out.features[0].properties["sheet_id"], "AP-48E_10_NE");
        let merged = parse_multipolygon(&out.features[0].geometry).unwrap();
        assert!((merged.unsigned_area() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn output_is_sorted_by_sheet_id() {
        let pool = FeatureCollection::new(vec![
            pool_feature("66B_2_SE", "KA", Some("Taluk"), 0.0, 0.0),
            pool_feature("48E_10_NE", "AP", Some("Taluk"), 2.0, 0.0),
        ]);
        let (out, _) = resolve_coverage(&pool, &BTreeMap::new(), 0);
        let ids: Vec<&Value> =
            out.features.iter().map(|f| &f.properties["sheet_id"]).collect();
        assert_eq!(ids, vec!["AP-48E_10_NE", "KA-66B_2_SE"]);
    }
}
