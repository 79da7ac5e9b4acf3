use clap::{Args, Parser, Subcommand, ValueHint};
use std::path::PathBuf;

/// Sheet-index CLI (argument schema only)
#[derive(Parser, Debug)]
#[command(name = "toposheet", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Merge raw 50K sheet indices into one full index, flagging repeated ids
    MergeIndex(MergeIndexArgs),

    /// Derive the 25K quadrant index from a 50K index
    DeriveQuadrants(DeriveQuadrantsArgs),

    /// Keep only index sheets intersecting the national boundary
    FilterIndex(FilterIndexArgs),

    /// Build one state's sheet-to-artifact map from its 25K grid
    BuildSheetmap(BuildSheetmapArgs),

    /// Merge per-state sheet maps into an enriched sheetmap.json
    MergeSheetmaps(MergeSheetmapsArgs),

    /// Collect the tagged overlap pool from state taluk/mandal grids
    ExtractOverlaps(ExtractOverlapsArgs),

    /// Resolve overlap groups into per-state coverage polygons
    ResolveCoverage(ResolveCoverageArgs),

    /// Stamp every index sheet with its availability status
    Annotate(AnnotateArgs),

    /// List unprobed sheets adjacent to available ones (stdout)
    Neighbors(NeighborsArgs),
}

#[derive(Args, Debug)]
pub struct MergeIndexArgs {
    /// Input index files, merged in the order given
    #[arg(required = true, value_hint = ValueHint::FilePath)]
    pub inputs: Vec<PathBuf>,

    /// Output merged index (must be a file path; "-" is rejected)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: PathBuf,

    /// Overwrite if the file exists
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct DeriveQuadrantsArgs {
    /// Input 50K index file
    #[arg(value_hint = ValueHint::FilePath)]
    pub index: PathBuf,

    /// Output 25K quadrant index
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: PathBuf,

    /// Overwrite if the file exists
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct FilterIndexArgs {
    /// Input index file
    #[arg(value_hint = ValueHint::FilePath)]
    pub index: PathBuf,

    /// National boundary, line-delimited GeoJSON (one state polygon per line)
    #[arg(value_hint = ValueHint::FilePath)]
    pub boundary: PathBuf,

    /// Output filtered index (one feature per line)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: PathBuf,

    /// Overwrite if the file exists
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct BuildSheetmapArgs {
    /// Two-letter state code, e.g. GJ, WB, DD
    pub state: String,

    /// 50K index file providing the OSM->SOI sheet lookup
    #[arg(value_hint = ValueHint::FilePath)]
    pub index: PathBuf,

    /// State 25K grid file(s)
    #[arg(required = true, value_hint = ValueHint::FilePath)]
    pub grids: Vec<PathBuf>,

    /// Directory of downloaded artifacts (PDF/JPG)
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub artifacts: PathBuf,

    /// Base URL the artifacts were fetched from
    #[arg(long)]
    pub base_url: String,

    /// Output per-state sheet map JSON
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: PathBuf,

    /// Overwrite if the file exists
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct MergeSheetmapsArgs {
    /// Directory of per-state sheet map JSON files
    #[arg(value_hint = ValueHint::DirPath)]
    pub sheetmaps: PathBuf,

    /// Output merged sheetmap.json
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: PathBuf,

    /// Overwrite if the file exists
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct ExtractOverlapsArgs {
    /// Merged sheetmap.json
    #[arg(value_hint = ValueHint::FilePath)]
    pub sheetmap: PathBuf,

    /// Directory of state taluk/mandal grid files
    #[arg(value_hint = ValueHint::DirPath)]
    pub grids: PathBuf,

    /// Output overlaps.geojson (raw tagged pool)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: PathBuf,

    /// Overwrite if the file exists
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct ResolveCoverageArgs {
    /// overlaps.geojson produced by extract-overlaps
    #[arg(value_hint = ValueHint::FilePath)]
    pub overlaps: PathBuf,

    /// Merged sheetmap.json (expected-states table)
    #[arg(value_hint = ValueHint::FilePath)]
    pub sheetmap: PathBuf,

    /// Output coverage.geojson
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: PathBuf,

    /// Overwrite if the file exists
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct AnnotateArgs {
    /// Input index files, annotated in the order given
    #[arg(required = true, value_hint = ValueHint::FilePath)]
    pub indices: Vec<PathBuf>,

    /// Directory of raw artifacts (PDFs, .unavailable markers, error pages)
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub raw: PathBuf,

    /// Output annotated index
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: PathBuf,

    /// Overwrite if the file exists
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct NeighborsArgs {
    /// Annotated index file
    #[arg(value_hint = ValueHint::FilePath)]
    pub index: PathBuf,

    /// Sheet width in degrees
    #[arg(long, default_value_t = 0.125)]
    pub sheet_width: f64,

    /// Sheet height in degrees
    #[arg(long, default_value_t = 0.125)]
    pub sheet_height: f64,
}
