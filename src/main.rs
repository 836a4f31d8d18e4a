//! robotcar-loader CLI entrypoint.
//!
//! Resolves a `DatasetConfig` from an optional JSON preset plus command line
//! overrides, builds the manifest under `<data_path>/robotcar/images`,
//! optionally dumps it as JSON (`--manifest-out`), then streams every record
//! through the pipeline, writing PNGs when `--output-dir` is set. A failing
//! image aborts the run unless `--keep-going` is given, in which case it is
//! logged and counted.

use clap::Parser;

mod cli;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = cli::CliArgs::parse();
    cli::run(args)
}
