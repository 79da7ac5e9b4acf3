use anyhow::{Result, bail};

use crate::cli::{BuildSheetmapArgs, Cli};
use crate::common::assert_not_stdout;
use crate::geojson::read_collection;
use crate::sheetmap::{OsmSoiLookup, build_state_sheetmap, write_sheetmap};
use crate::states::StateCode;

pub fn run(cli: &Cli, args: &BuildSheetmapArgs) -> Result<()> {
    assert_not_stdout(&args.output)?;

    let Some(state) = StateCode::from_code(&args.state) else {
        bail!("Unknown state code: {}", args.state);
    };

    let index = read_collection(&args.index)?;
    let lookup = OsmSoiLookup::from_index(&index, cli.verbose);
    if cli.verbose > 0 {
        eprintln!("[sheetmap] OSM->SOI lookup holds {} sheets", lookup.len());
    }

    let mut grids = Vec::with_capacity(args.grids.len());
    for path in &args.grids {
        grids.push(read_collection(path)?);
    }

    let map = build_state_sheetmap(
        state,
        &lookup,
        &grids,
        &args.artifacts,
        args.base_url.trim_end_matches('/'),
        cli.verbose,
    );
    write_sheetmap(&args.output, &map, args.force)?;

    println!(
        "Generated sheet map with {} entries for {state} -> {}",
        map.len(),
        args.output.display()
    );
    if cli.verbose > 0 {
        for key in map.keys().take(5) {
            eprintln!("[sheetmap]   {key}: {}", map[key].osm_sheet_id);
        }
    }
    Ok(())
}
