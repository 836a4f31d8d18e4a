#![doc = r##"
robotcar_loader — image manifest and streaming pipeline for the RobotCar dataset.

This crate enumerates images of the RobotCar localization dataset, either from
an explicit list of names or by searching named sequence directories for
`.jpg` files, and streams them through a short transform chain: read, decode,
optional grayscale, optional aspect-preserving resize. Records come out in
manifest order while decoding runs on a bounded number of rayon workers.

Layout on disk
--------------
```text
<data_path>/robotcar/images/
    overcast-reference/rear/1417176586977.jpg
    night/left/1418756721422.jpg
    ...
```
Each record's `name` is its path relative to `robotcar/images` with the
extension stripped and `/` as separator, e.g. `overcast-reference/rear/1417176586977`.

Quick start
-----------
```rust,no_run
use std::path::Path;
use robotcar_loader::{DatasetConfig, RobotcarDataset};

fn main() -> robotcar_loader::Result<()> {
    let config = DatasetConfig {
        sequences: vec!["overcast-reference".to_string()],
        resize_max: Some(640),
        grayscale: true,
        ..Default::default()
    };
    let dataset = RobotcarDataset::open(Path::new("/data"), config)?;

    for record in &dataset.pipeline() {
        let record = record?;
        println!(
            "{} {:?} original={}",
            record.name,
            record.image.dim(),
            record.original_size
        );
    }
    Ok(())
}
```

Config presets
--------------
`DatasetConfig` deserializes from JSON; missing fields keep their defaults
(`resize_max = 640`, `grayscale = true`, `num_parallel_calls = 10`).

```rust
use robotcar_loader::DatasetConfig;

let config = DatasetConfig::from_json_str(r#"{"sequences": ["night"], "shuffle": true}"#).unwrap();
assert!(config.shuffle);
assert_eq!(config.num_parallel_calls, 10);
```

Ordered parallel map
--------------------
The pipeline's parallel stage is a plain function usable on its own:

```rust
use robotcar_loader::parallel_map;

let squares: Vec<u64> = parallel_map(1..=5u64, |x| x * x, 3).collect();
assert_eq!(squares, vec![1, 4, 9, 16, 25]);
```

Error handling
--------------
Building a dataset fails with `Error::Configuration` when neither image names
nor sequences are given. While consuming a pipeline, unreadable or undecodable
files are yielded as `Err(Error::Io { .. })` / `Err(Error::Decode { .. })`; the
traversal continues and the caller decides whether to skip or stop.

Useful modules
--------------
- [`api`] — `RobotcarDataset` and `Pipeline`.
- [`io`] — manifest building and image decoding.
- [`core`] — parameters, grayscale/resize transforms, `parallel_map`.
- [`error`] — crate-level `Error` and `Result`.
"##]

pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod types;

pub use crate::core::parallel::{ParallelMap, parallel_map};
pub use crate::core::params::{DatasetConfig, PreprocessOptions};
pub use error::{Error, Result};
pub use types::{ImageSize, Record};

pub use io::manifest::{IMAGE_EXTENSION, Manifest, ManifestEntry, SHUFFLE_SEED};

pub use api::{Pipeline, Records, RobotcarDataset};
