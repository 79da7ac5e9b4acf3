use anyhow::Result;

use crate::cli::{Cli, MergeSheetmapsArgs};
use crate::common::assert_not_stdout;
use crate::sheetmap::{merge_sheetmaps, write_sheetmap};

pub fn run(cli: &Cli, args: &MergeSheetmapsArgs) -> Result<()> {
    assert_not_stdout(&args.output)?;

    let (merged, files) = merge_sheetmaps(&args.sheetmaps, cli.verbose)?;
    write_sheetmap(&args.output, &merged, args.force)?;

    println!(
        "Merged {} entries from {files} files -> {}",
        merged.len(),
        args.output.display()
    );
    Ok(())
}
