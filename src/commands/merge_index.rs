use anyhow::Result;

use crate::cli::{Cli, MergeIndexArgs};
use crate::common::assert_not_stdout;
use crate::geojson::{read_collection_repairing, write_collection};
use crate::index::merge_collections;

pub fn run(cli: &Cli, args: &MergeIndexArgs) -> Result<()> {
    assert_not_stdout(&args.output)?;

    let mut collections = Vec::with_capacity(args.inputs.len());
    for path in &args.inputs {
        let fc = read_collection_repairing(path, cli.verbose)?;
        if cli.verbose > 0 {
            eprintln!("[merge] {}: {} features", path.display(), fc.len());
        }
        collections.push(fc);
    }

    let report = merge_collections(collections, cli.verbose);
    write_collection(&args.output, &report.merged, args.force)?;

    if report.duplicate_ids.is_empty() {
        println!("No duplicate sheet ids found");
    } else {
        println!("Found {} duplicate sheet ids:", report.duplicate_ids.len());
        for id in report.duplicate_ids.iter().take(10) {
            println!("  - {id}");
        }
        if report.duplicate_ids.len() > 10 {
            println!("  ... and {} more", report.duplicate_ids.len() - 10);
        }
    }
    if report.missing_id > 0 {
        println!("{} features had no id property", report.missing_id);
    }
    println!(
        "Merged {} features into {}",
        report.merged.len(),
        args.output.display()
    );
    Ok(())
}
