use std::fs;
use std::path::{Path, PathBuf};

use image::{GrayImage, RgbImage};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use robotcar_loader::{DatasetConfig, Record, RobotcarDataset};

use super::args::CliArgs;
use super::errors::AppError;

/// Outcome of one pipeline traversal
#[derive(Debug, Clone, Copy, Default)]
pub struct RunReport {
    pub processed: usize,
    pub errors: usize,
}

fn parse_resize_max(size: &str) -> Result<Option<usize>, AppError> {
    if size.eq_ignore_ascii_case("original") {
        return Ok(None);
    }
    let parsed = size.parse::<usize>().map_err(|_| AppError::InvalidSize {
        size: size.to_string(),
    })?;
    Ok(Some(parsed).filter(|&s| s > 0))
}

fn read_image_names(path: &Path) -> Result<Vec<String>, AppError> {
    let contents = fs::read_to_string(path)?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Config file values first, then command line overrides
fn resolve_config(args: &CliArgs) -> Result<DatasetConfig, AppError> {
    let mut config = match &args.config {
        Some(path) => DatasetConfig::from_json_file(path)?,
        None => DatasetConfig::default(),
    };

    if !args.sequences.is_empty() {
        config.sequences = args.sequences.clone();
    }
    if let Some(path) = &args.image_names {
        config.image_names = Some(read_image_names(path)?);
    }
    if let Some(size) = &args.resize_max {
        config.resize_max = parse_resize_max(size)?;
    }
    if args.shuffle {
        config.shuffle = true;
    }
    if args.color {
        config.grayscale = false;
    }
    if let Some(n) = args.num_parallel_calls {
        config.num_parallel_calls = n;
    }

    config.validate()?;
    Ok(config)
}

/// `<output_dir>/<name>.png`; dots inside the name are kept
fn record_output_path(output_dir: &Path, name: &str) -> PathBuf {
    let parts: Vec<&str> = name
        .split('/')
        .filter(|p| !p.is_empty() && *p != "." && *p != "..")
        .collect();
    let mut path = output_dir.to_path_buf();
    if let Some((last, dirs)) = parts.split_last() {
        path.extend(dirs);
        path.push(format!("{last}.png"));
    }
    path
}

/// Write a record's image as PNG under `output_dir`, mirroring its name
pub fn save_record_png(record: &Record, output_dir: &Path) -> Result<PathBuf, AppError> {
    let path = record_output_path(output_dir, &record.name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let width = record.width() as u32;
    let height = record.height() as u32;
    let data: Vec<u8> = record.image.iter().copied().collect();
    let unsupported = || AppError::UnsupportedChannels {
        name: record.name.clone(),
        channels: record.channels(),
    };

    match record.channels() {
        1 => GrayImage::from_raw(width, height, data)
            .ok_or_else(unsupported)?
            .save(&path)?,
        3 => RgbImage::from_raw(width, height, data)
            .ok_or_else(unsupported)?
            .save(&path)?,
        _ => return Err(unsupported()),
    }
    Ok(path)
}

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.log {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .init();
    }

    let config = resolve_config(&args)?;
    let dataset = RobotcarDataset::open(&args.data_path, config)?;

    if let Some(manifest_out) = &args.manifest_out {
        if let Some(parent) = manifest_out.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(manifest_out, serde_json::to_vec_pretty(dataset.manifest())?)?;
        info!("Manifest written to {:?}", manifest_out);
    }

    let pipeline = match args.limit {
        Some(limit) => dataset.pipeline_with_limit(limit),
        None => dataset.pipeline(),
    };
    info!("Processing {} images", pipeline.len());

    let mut report = RunReport::default();
    for record in &pipeline {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                if !args.keep_going {
                    return Err(e.into());
                }
                warn!("Skipping image: {}", e);
                report.errors += 1;
                continue;
            }
        };

        if let Some(output_dir) = &args.output_dir {
            let path = save_record_png(&record, output_dir)?;
            debug!("Wrote {:?}", path);
        }
        report.processed += 1;
    }

    info!("Pipeline complete!");
    info!("Processed: {}", report.processed);
    info!("Errors: {}", report.errors);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_max_parsing() {
        assert_eq!(parse_resize_max("original").unwrap(), None);
        assert_eq!(parse_resize_max("0").unwrap(), None);
        assert_eq!(parse_resize_max("640").unwrap(), Some(640));
        assert!(matches!(
            parse_resize_max("big"),
            Err(AppError::InvalidSize { .. })
        ));
    }

    #[test]
    fn output_path_mirrors_name() {
        let path = record_output_path(Path::new("/out"), "night/rear/1418756721422");
        assert_eq!(path, PathBuf::from("/out/night/rear/1418756721422.png"));

        let path = record_output_path(Path::new("/out"), "../escape");
        assert_eq!(path, PathBuf::from("/out/escape.png"));
    }

    #[test]
    fn dotted_names_get_distinct_output_paths() {
        let a = record_output_path(Path::new("/out"), "seq/frame.001");
        let b = record_output_path(Path::new("/out"), "seq/frame.002");
        assert_eq!(a, PathBuf::from("/out/seq/frame.001.png"));
        assert_eq!(b, PathBuf::from("/out/seq/frame.002.png"));
        assert_ne!(a, b);
    }
}
