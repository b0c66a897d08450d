//! CLI entry point for fetal head biometry measurement

use clap::Parser;
use fetal_biometry::io::cli::{Cli, FileProcessor};
use fetal_biometry::io::logging::init_logging;

fn main() -> fetal_biometry::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    let mut processor = FileProcessor::new(cli);
    processor.process().map(|_| ())
}
