use anyhow::Result;

use crate::cli::{Cli, ResolveCoverageArgs};
use crate::common::assert_not_stdout;
use crate::geojson::{read_collection, write_collection};
use crate::overlap::{find_overlap_groups, resolve_coverage};
use crate::sheetmap::read_sheetmap;

pub fn run(cli: &Cli, args: &ResolveCoverageArgs) -> Result<()> {
    assert_not_stdout(&args.output)?;

    let map = read_sheetmap(&args.sheetmap)?;
    let overlaps = find_overlap_groups(&map, cli.verbose);
    let pool = read_collection(&args.overlaps)?;
    if cli.verbose > 0 {
        eprintln!("[coverage] loaded {} pool features", pool.len());
    }

    let (coverage, summary) = resolve_coverage(&pool, &overlaps.expected_states, cli.verbose);
    write_collection(&args.output, &coverage, args.force)?;

    println!(
        "Resolved {} coverage features ({} groups skipped, {} invalid geometries) -> {}",
        summary.coverage_features,
        summary.groups_skipped,
        summary.invalid_geometries,
        args.output.display()
    );
    Ok(())
}
