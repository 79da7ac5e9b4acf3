use anyhow::Result;

use crate::cli::{Cli, DeriveQuadrantsArgs};
use crate::common::assert_not_stdout;
use crate::geojson::{read_collection, write_collection};
use crate::index::subdivide_collection;

pub fn run(cli: &Cli, args: &DeriveQuadrantsArgs) -> Result<()> {
    assert_not_stdout(&args.output)?;

    let index = read_collection(&args.index)?;
    let quadrants = subdivide_collection(&index, cli.verbose);
    write_collection(&args.output, &quadrants, args.force)?;

    println!(
        "Derived {} quadrant sheets from {} parents into {}",
        quadrants.len(),
        index.len(),
        args.output.display()
    );
    Ok(())
}
