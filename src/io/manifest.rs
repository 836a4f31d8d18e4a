//! Image manifest: the ordered list of `(image_path, name)` pairs selected
//! from the dataset's base directory before any pixel data is read.
use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use rand::SeedableRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::params::DatasetConfig;
use crate::error::{Error, Result};

/// Extension matched when searching sequence directories
pub const IMAGE_EXTENSION: &str = "jpg";

/// Seed used when `shuffle` is enabled, so evaluation splits are reproducible
pub const SHUFFLE_SEED: u64 = 0;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub image_path: PathBuf,
    /// Path relative to the base directory, extension stripped, `/`-separated
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// Select images under `base_dir` according to `config`.
    ///
    /// Explicit `image_names` win over `sequences`; with neither, this fails
    /// with [`Error::Configuration`].
    pub fn build(base_dir: &Path, config: &DatasetConfig) -> Result<Self> {
        let paths = if let Some(names) = config.explicit_image_names() {
            names.iter().map(|n| base_dir.join(n)).collect::<Vec<_>>()
        } else {
            if config.sequences.is_empty() {
                return Err(Error::Configuration(
                    "either image_names or a non-empty list of sequences is required".to_string(),
                ));
            }
            let mut paths = Vec::new();
            for sequence in &config.sequences {
                let found = find_images(&base_dir.join(sequence), IMAGE_EXTENSION)?;
                debug!("Sequence {}: {} images", sequence, found.len());
                paths.extend(found);
            }
            paths
        };

        let mut manifest = Self::from_paths(base_dir, paths);

        let duplicates = manifest.duplicate_names();
        if !duplicates.is_empty() {
            warn!(
                "{} image names occur more than once (first: {})",
                duplicates.len(),
                duplicates[0]
            );
        }

        if config.shuffle {
            manifest.shuffle(SHUFFLE_SEED);
        }

        info!(
            "Manifest built from {:?}: {} images",
            base_dir,
            manifest.len()
        );
        Ok(manifest)
    }

    /// Derive names for `paths` relative to `base_dir`, keeping their order
    pub fn from_paths(base_dir: &Path, paths: Vec<PathBuf>) -> Self {
        let entries = paths
            .into_iter()
            .map(|image_path| ManifestEntry {
                name: relative_name(base_dir, &image_path),
                image_path,
            })
            .collect();
        Self { entries }
    }

    /// Deterministic in-place permutation
    pub fn shuffle(&mut self, seed: u64) {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        self.entries.shuffle(&mut rng);
    }

    /// Keep only the first `len` entries
    pub fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ManifestEntry> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<ManifestEntry> {
        self.entries
    }

    pub fn image_paths(&self) -> Vec<&Path> {
        self.entries.iter().map(|e| e.image_path.as_path()).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Names shared by more than one entry, in order of first appearance
    pub fn duplicate_names(&self) -> Vec<&str> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut order = Vec::new();
        for entry in &self.entries {
            let count = counts.entry(entry.name.as_str()).or_insert(0);
            *count += 1;
            if *count == 2 {
                order.push(entry.name.as_str());
            }
        }
        order
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a ManifestEntry;
    type IntoIter = std::slice::Iter<'a, ManifestEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// `path` relative to `base_dir` with the extension dropped, joined with `/`
/// on every platform.
pub fn relative_name(base_dir: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(base_dir).unwrap_or(path);
    let stem = rel.file_stem().map(|s| s.to_string_lossy().into_owned());

    let mut parts: Vec<String> = rel
        .parent()
        .into_iter()
        .flat_map(|parent| parent.components())
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect();
    parts.extend(stem);
    parts.join("/")
}

/// Recursively collect files under `dir` whose extension equals `extension`.
/// Entries are sorted per directory; symlinked directories are not followed.
/// A missing `dir` yields no images.
pub fn find_images(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    if !dir.is_dir() {
        warn!("Sequence directory {:?} does not exist, skipping", dir);
        return Ok(found);
    }
    collect_images(dir, extension, &mut found)?;
    Ok(found)
}

fn collect_images(dir: &Path, extension: &str, found: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let file_type = entry.file_type().map_err(|e| Error::io(entry.path(), e))?;
        entries.push((entry.path(), file_type.is_dir()));
    }
    entries.sort();

    for (path, is_dir) in entries {
        if is_dir {
            collect_images(&path, extension, found)?;
        } else if path.extension().is_some_and(|ext| ext == extension) && path.is_file() {
            found.push(path);
        }
    }
    Ok(())
}
