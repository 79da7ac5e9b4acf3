use smallvec::{SmallVec, smallvec};

/// Two-letter codes of the coastal states and union territories whose CZMP
/// grids feed the sheet maps. Declaration order is alphabetical so the derived
/// `Ord` doubles as the deterministic claimant order in overlap resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StateCode {
    AP,
    DD,
    GA,
    GJ,
    KA,
    KL,
    MH,
    OD,
    PY,
    TN,
    WB,
}

impl StateCode {
    pub const ALL: [StateCode; 11] = [
        StateCode::AP,
        StateCode::DD,
        StateCode::GA,
        StateCode::GJ,
        StateCode::KA,
        StateCode::KL,
        StateCode::MH,
        StateCode::OD,
        StateCode::PY,
        StateCode::TN,
        StateCode::WB,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StateCode::AP => "AP",
            StateCode::DD => "DD",
            StateCode::GA => "GA",
            StateCode::GJ => "GJ",
            StateCode::KA => "KA",
            StateCode::KL => "KL",
            StateCode::MH => "MH",
            StateCode::OD => "OD",
            StateCode::PY => "PY",
            StateCode::TN => "TN",
            StateCode::WB => "WB",
        }
    }

    /// Full state name as it appears in sheet-map entries.
    pub fn name(self) -> &'static str {
        match self {
            StateCode::AP => "Andhra Pradesh",
            StateCode::DD => "Daman and Diu",
            StateCode::GA => "Goa",
            StateCode::GJ => "Gujarat",
            StateCode::KA => "Karnataka",
            StateCode::KL => "Kerala",
            StateCode::MH => "Maharashtra",
            StateCode::OD => "Odisha",
            StateCode::PY => "Puducherry",
            StateCode::TN => "Tamil Nadu",
            StateCode::WB => "West Bengal",
        }
    }

    /// Resolve a full state name. Unknown names are a reportable anomaly at
    /// the call site, never a panic.
    pub fn from_name(name: &str) -> Option<StateCode> {
        StateCode::ALL.iter().copied().find(|c| c.name() == name)
    }

    /// Resolve a two-letter code string (case-sensitive, as written in file
    /// names and sheet-map keys).
    pub fn from_code(code: &str) -> Option<StateCode> {
        StateCode::ALL.iter().copied().find(|c| c.as_str() == code)
    }
}

impl std::fmt::Display for StateCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State code(s) a taluk/mandal grid file contributes features for.
///
/// Most files map to one state; Daman and Diu's two islands ship as separate
/// files that both resolve to DD, and the buffer leaves room for genuinely
/// shared files without heap allocation.
pub fn grid_file_states(file_name: &str) -> Option<SmallVec<[StateCode; 2]>> {
    let codes: SmallVec<[StateCode; 2]> = match file_name {
        "AP_OSM_25K_Grid_Taluk.geojson" => smallvec![StateCode::AP],
        "DAMAN_OSM_25K_Grid_Taluk.geojson" => smallvec![StateCode::DD],
        "Diu_OSM_25K_Grid_Taluk.geojson" => smallvec![StateCode::DD],
        "GA_OSM_25K_Grid_Taluk.geojson" => smallvec![StateCode::GA],
        "GJ_OSM_25K_Grid_Taluk.geojson" => smallvec![StateCode::GJ],
        "KA_OSM_25K_Grid_Taluk.geojson" => smallvec![StateCode::KA],
        "KL_OSM_25K_Grid_Taluk.geojson" => smallvec![StateCode::KL],
        "MH_OSM_25K_Grid_Taluk.geojson" => smallvec![StateCode::MH],
        "OD_OSM_25K_Grid_Taluk.geojson" => smallvec![StateCode::OD],
        "PY_OSM_25K_Grid_Taluk.geojson" => smallvec![StateCode::PY],
        "TN_OSM_25K_Grid_Taluk.geojson" => smallvec![StateCode::TN],
        "WB_OSM_25K_Grid_Taluk.geojson" => smallvec![StateCode::WB],
        _ => return None,
    };
    Some(codes)
}
