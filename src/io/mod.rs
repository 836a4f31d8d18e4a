//! I/O layer: dataset enumeration (`manifest`) and image reading/decoding
//! (`reader`).
pub mod manifest;
pub use manifest::{Manifest, ManifestEntry};

pub mod reader;
pub use reader::{decode_rgb, read_image_bytes};
