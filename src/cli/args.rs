use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "robotcar-loader", version, about = "RobotCar image manifest and pipeline CLI")]
pub struct CliArgs {
    /// Data root containing robotcar/images
    #[arg(long, env = "DATA_PATH")]
    pub data_path: PathBuf,

    /// JSON config preset; command line options override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Sequence directories to search for .jpg files (comma separated)
    #[arg(short, long, value_delimiter = ',')]
    pub sequences: Vec<String>,

    /// File listing relative image names, one per line (overrides --sequences)
    #[arg(long)]
    pub image_names: Option<PathBuf>,

    /// Target long side in pixels, or "original" (no resizing)
    #[arg(long)]
    pub resize_max: Option<String>,

    /// Shuffle the manifest with a fixed seed
    #[arg(long, default_value_t = false)]
    pub shuffle: bool,

    /// Keep RGB output instead of converting to grayscale
    #[arg(long, default_value_t = false)]
    pub color: bool,

    /// Maximum number of images decoded concurrently
    #[arg(long)]
    pub num_parallel_calls: Option<usize>,

    /// Only process the first N manifest entries
    #[arg(long)]
    pub limit: Option<usize>,

    /// Write processed images as PNG under this directory (<dir>/<name>.png)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Write the manifest as JSON to this path
    #[arg(long)]
    pub manifest_out: Option<PathBuf>,

    /// Log and count failing images instead of aborting on the first one
    #[arg(long, default_value_t = false)]
    pub keep_going: bool,

    /// Enable logging
    #[arg(long, default_value_t = false)]
    pub log: bool,
}
