use anyhow::Result;
use clap::Parser;

use toposheet::cli::{Cli, Commands};
use toposheet::commands::{
    annotate, build_sheetmap, derive_quadrants, extract_overlaps, filter_index, merge_index,
    merge_sheetmaps, neighbors, resolve_coverage,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    match &cli.command {
        Commands::MergeIndex(args) => merge_index::run(&cli, args),
        Commands::DeriveQuadrants(args) => derive_quadrants::run(&cli, args),
        Commands::FilterIndex(args) => filter_index::run(&cli, args),
        Commands::BuildSheetmap(args) => build_sheetmap::run(&cli, args),
        Commands::MergeSheetmaps(args) => merge_sheetmaps::run(&cli, args),
        Commands::ExtractOverlaps(args) => extract_overlaps::run(&cli, args),
        Commands::ResolveCoverage(args) => resolve_coverage::run(&cli, args),
        Commands::Annotate(args) => annotate::run(&cli, args),
        Commands::Neighbors(args) => neighbors::run(&cli, args),
    }
}
