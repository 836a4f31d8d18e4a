use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Dataset options. Suitable for config files: any field missing from a
/// JSON document falls back to its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Sequence subdirectories searched recursively for `.jpg` files
    pub sequences: Vec<String>,
    /// Explicit relative image names; takes precedence over `sequences` when non-empty
    pub image_names: Option<Vec<String>>,
    /// Target long side in pixels; None or 0 keeps the decoded size
    pub resize_max: Option<usize>,
    /// Shuffle the manifest with a fixed seed
    pub shuffle: bool,
    pub grayscale: bool,
    /// Maximum number of records decoded concurrently
    pub num_parallel_calls: usize,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            sequences: Vec::new(),
            image_names: None,
            resize_max: Some(640),
            shuffle: false,
            grayscale: true,
            num_parallel_calls: 10,
        }
    }
}

/// Per-record transform options derived from `DatasetConfig`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PreprocessOptions {
    pub grayscale: bool,
    pub resize_max: Option<usize>,
}

impl DatasetConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: DatasetConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_parallel_calls == 0 {
            return Err(Error::InvalidArgument {
                arg: "num_parallel_calls",
                value: self.num_parallel_calls.to_string(),
            });
        }
        Ok(())
    }

    /// Explicit names, if any were given. An empty list counts as absent.
    pub fn explicit_image_names(&self) -> Option<&[String]> {
        self.image_names
            .as_deref()
            .filter(|names| !names.is_empty())
    }

    pub fn preprocess_options(&self) -> PreprocessOptions {
        PreprocessOptions {
            grayscale: self.grayscale,
            resize_max: self.resize_max.filter(|&size| size > 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_is_merged_over_defaults() {
        let config = DatasetConfig::from_json_str(r#"{"sequences": ["2014-12-09"], "shuffle": true}"#)
            .unwrap();
        assert_eq!(config.sequences, vec!["2014-12-09".to_string()]);
        assert!(config.shuffle);
        assert_eq!(config.resize_max, Some(640));
        assert!(config.grayscale);
        assert_eq!(config.num_parallel_calls, 10);
        assert_eq!(config.image_names, None);
    }

    #[test]
    fn zero_parallelism_is_rejected() {
        let err = DatasetConfig::from_json_str(r#"{"num_parallel_calls": 0}"#).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidArgument {
                arg: "num_parallel_calls",
                ..
            }
        ));
    }

    #[test]
    fn zero_resize_max_disables_resizing() {
        let config = DatasetConfig {
            resize_max: Some(0),
            ..Default::default()
        };
        assert_eq!(config.preprocess_options().resize_max, None);

        let config = DatasetConfig {
            resize_max: None,
            grayscale: false,
            ..Default::default()
        };
        let opts = config.preprocess_options();
        assert_eq!(opts.resize_max, None);
        assert!(!opts.grayscale);
    }

    #[test]
    fn empty_name_list_counts_as_absent() {
        let config = DatasetConfig {
            image_names: Some(Vec::new()),
            ..Default::default()
        };
        assert!(config.explicit_image_names().is_none());
    }
}
