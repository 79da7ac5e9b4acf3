use std::collections::{BTreeMap, BTreeSet};

use crate::sheetmap::{SheetMap, UNKNOWN_SHEET};
use crate::states::StateCode;

/// Sheet-map entries grouped by SOI sheet id, restricted to ids claimed by
/// more than one artifact, plus the expectation table used to infer a second
/// claimant when only one state's grid data survives.
#[derive(Debug)]
pub struct OverlapGroups {
    /// soi_sheet_id -> artifact keys, only groups of >= 2 members. Groups of
    /// one are already fully resolved and out of scope for merging.
    pub groups: BTreeMap<String, Vec<String>>,
    /// Every state that ever claimed a given soi_sheet_id, across the whole
    /// sheet map (not just overlap groups).
    pub expected_states: BTreeMap<String, BTreeSet<StateCode>>,
}

/// Scan a merged sheet map for overlap groups. Entries with an unresolvable
/// state name are logged and contribute nothing to the expectation table;
/// `UNKNOWN` placeholder sheet ids never form a group.
pub fn find_overlap_groups(map: &SheetMap, verbose: u8) -> OverlapGroups {
    let mut by_sheet: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut expected_states: BTreeMap<String, BTreeSet<StateCode>> = BTreeMap::new();

    for (artifact_key, entry) in map {
        let soi = entry.soi_sheet_id.trim();
        if soi.is_empty() || soi == UNKNOWN_SHEET {
            continue;
        }
        by_sheet.entry(soi.to_string()).or_default().push(artifact_key.clone());

        match entry.state_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => match StateCode::from_name(name) {
                Some(code) => {
                    expected_states.entry(soi.to_string()).or_default().insert(code);
                }
                None => {
                    eprintln!("[overlaps] unknown state name {name:?} for {artifact_key}, skipped");
                }
            },
            _ => {
                if verbose > 0 {
                    eprintln!("[overlaps] {artifact_key} has no state name");
                }
            }
        }
    }

    let groups: BTreeMap<String, Vec<String>> =
        by_sheet.into_iter().filter(|(_, keys)| keys.len() > 1).collect();
    if verbose > 0 {
        eprintln!("[overlaps] found {} overlapping sheet ids", groups.len());
    }
    OverlapGroups { groups, expected_states }
}
