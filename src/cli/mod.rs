//! Command Line Interface (CLI) layer.
//!
//! `args` defines argument parsing, `errors` the CLI-specific error type, and
//! `runner` the orchestration: resolve the config, build the manifest, stream
//! the pipeline and optionally write results to disk.
//!
//! To embed the loader in another application use `robotcar_loader::api`.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
