use anyhow::Result;

use crate::cli::{Cli, FilterIndexArgs};
use crate::common::assert_not_stdout;
use crate::geojson::{read_collection, read_feature_lines, write_collection_lines};
use crate::index::{BoundaryIndex, filter_collection};

pub fn run(cli: &Cli, args: &FilterIndexArgs) -> Result<()> {
    assert_not_stdout(&args.output)?;

    let boundary_features = read_feature_lines(&args.boundary)?;
    let boundary = BoundaryIndex::from_features(&boundary_features, cli.verbose)?;

    let index = read_collection(&args.index)?;
    let filtered = filter_collection(&index, &boundary, cli.verbose);
    write_collection_lines(&args.output, &filtered, args.force)?;

    println!(
        "Kept {} of {} features intersecting the boundary -> {}",
        filtered.len(),
        index.len(),
        args.output.display()
    );
    Ok(())
}
