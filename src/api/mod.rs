//! High-level library API: open the RobotCar image dataset, inspect its
//! manifest, and stream processed records through an ordered parallel pipeline.
//! Prefer these entrypoints over the low-level `core` and `io` modules.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::core::parallel::{ParallelMap, parallel_map};
use crate::core::params::{DatasetConfig, PreprocessOptions};
use crate::core::processing::pipeline::process_entry;
use crate::error::Result;
use crate::io::manifest::{Manifest, ManifestEntry};
use crate::types::Record;

/// Per-record transform run by the pipeline workers
pub type Transform = Box<dyn Fn(ManifestEntry) -> Result<Record> + Send + Sync>;

/// Iterator over one traversal of a [`Pipeline`]
pub type Records = ParallelMap<std::vec::IntoIter<ManifestEntry>, Transform, Result<Record>>;

/// Lazy, restartable stream of processed records.
///
/// Every call to [`Pipeline::iter`] starts a fresh traversal of the manifest.
/// Records are decoded with up to `num_parallel_calls` in flight and are
/// yielded in manifest order. Failures on one record are yielded as `Err` and
/// do not end the traversal.
#[derive(Debug, Clone)]
pub struct Pipeline {
    entries: Arc<[ManifestEntry]>,
    options: PreprocessOptions,
    num_parallel_calls: usize,
}

impl Pipeline {
    pub fn new(manifest: Manifest, options: PreprocessOptions, num_parallel_calls: usize) -> Self {
        Self {
            entries: manifest.into_entries().into(),
            options,
            num_parallel_calls: num_parallel_calls.max(1),
        }
    }

    pub fn from_config(manifest: Manifest, config: &DatasetConfig) -> Self {
        Self::new(
            manifest,
            config.preprocess_options(),
            config.num_parallel_calls,
        )
    }

    pub fn iter(&self) -> Records {
        let options = self.options;
        let transform: Transform =
            Box::new(move |entry: ManifestEntry| process_entry(&entry, &options));
        parallel_map(self.entries.to_vec(), transform, self.num_parallel_calls)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn options(&self) -> &PreprocessOptions {
        &self.options
    }
}

impl<'a> IntoIterator for &'a Pipeline {
    type Item = Result<Record>;
    type IntoIter = Records;

    fn into_iter(self) -> Records {
        self.iter()
    }
}

/// The RobotCar image dataset rooted at `<data_path>/robotcar/images`
#[derive(Debug, Clone)]
pub struct RobotcarDataset {
    base_dir: PathBuf,
    config: DatasetConfig,
    manifest: Manifest,
}

impl RobotcarDataset {
    /// Location of the images relative to the data root
    pub const DATASET_FOLDER: &'static str = "robotcar/images";

    pub fn open(data_path: &Path, config: DatasetConfig) -> Result<Self> {
        Self::from_base_dir(&data_path.join(Self::DATASET_FOLDER), config)
    }

    /// Use `base_dir` directly as the directory holding sequences and images
    pub fn from_base_dir(base_dir: &Path, config: DatasetConfig) -> Result<Self> {
        config.validate()?;
        let manifest = Manifest::build(base_dir, &config)?;
        info!(
            "RobotCar dataset at {:?}: {} images, grayscale={} resize_max={:?} shuffle={}",
            base_dir,
            manifest.len(),
            config.grayscale,
            config.resize_max,
            config.shuffle
        );
        Ok(Self {
            base_dir: base_dir.to_path_buf(),
            config,
            manifest,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn len(&self) -> usize {
        self.manifest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.manifest.is_empty()
    }

    /// Build the record pipeline over the current manifest
    pub fn pipeline(&self) -> Pipeline {
        Pipeline::from_config(self.manifest.clone(), &self.config)
    }

    /// Same as [`RobotcarDataset::pipeline`] over the first `limit` entries
    pub fn pipeline_with_limit(&self, limit: usize) -> Pipeline {
        let mut manifest = self.manifest.clone();
        manifest.truncate(limit);
        Pipeline::from_config(manifest, &self.config)
    }
}
