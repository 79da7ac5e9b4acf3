use anyhow::Result;

use crate::annotate::{SheetSize, find_unprobed_neighbors};
use crate::cli::{Cli, NeighborsArgs};
use crate::geojson::read_collection;

pub fn run(cli: &Cli, args: &NeighborsArgs) -> Result<()> {
    let annotated = read_collection(&args.index)?;
    let size = SheetSize::from_degrees(args.sheet_width, args.sheet_height);

    let neighbors = find_unprobed_neighbors(&annotated, size);
    if cli.verbose > 0 {
        eprintln!("[neighbors] {} unprobed neighbors of available sheets", neighbors.len());
    }
    for id in &neighbors {
        println!("{id}");
    }
    Ok(())
}
