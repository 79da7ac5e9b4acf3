use anyhow::Result;

use crate::annotate::{annotate, scan_artifacts};
use crate::cli::{AnnotateArgs, Cli};
use crate::common::assert_not_stdout;
use crate::geojson::{read_collection, write_collection};

pub fn run(cli: &Cli, args: &AnnotateArgs) -> Result<()> {
    assert_not_stdout(&args.output)?;

    let sets = scan_artifacts(&args.raw)?;
    if cli.verbose > 0 {
        eprintln!(
            "[annotate] {} available, {} unavailable artifacts",
            sets.available.len(),
            sets.unavailable.len()
        );
    }

    let mut collections = Vec::with_capacity(args.indices.len());
    for path in &args.indices {
        collections.push(read_collection(path)?);
    }

    let annotated = annotate(collections, &sets);
    write_collection(&args.output, &annotated, args.force)?;

    println!(
        "Annotated {} features -> {}",
        annotated.len(),
        args.output.display()
    );
    Ok(())
}
