use anyhow::Result;

use crate::cli::{Cli, ExtractOverlapsArgs};
use crate::common::assert_not_stdout;
use crate::geojson::write_collection;
use crate::overlap::{build_overlap_lookup, collect_overlap_pool, find_overlap_groups};
use crate::sheetmap::read_sheetmap;

pub fn run(cli: &Cli, args: &ExtractOverlapsArgs) -> Result<()> {
    assert_not_stdout(&args.output)?;

    let map = read_sheetmap(&args.sheetmap)?;
    let overlaps = find_overlap_groups(&map, cli.verbose);

    if cli.verbose > 0 {
        for (soi, keys) in &overlaps.groups {
            eprintln!("[overlaps] {soi}:");
            for key in keys {
                let entry = &map[key];
                eprintln!(
                    "[overlaps]   - {key}: state={}, osm_sheet_id={}",
                    entry.state_name.as_deref().unwrap_or("UNKNOWN"),
                    entry.osm_sheet_id
                );
            }
        }
    }

    let lookup = build_overlap_lookup(&map, &overlaps, cli.verbose);
    let pool = collect_overlap_pool(&lookup, &args.grids, cli.verbose)?;
    write_collection(&args.output, &pool, args.force)?;

    println!(
        "Found {} overlapping sheet ids; collected {} tagged features -> {}",
        overlaps.groups.len(),
        pool.len(),
        args.output.display()
    );
    Ok(())
}
