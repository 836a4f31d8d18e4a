use ndarray::Array3;
use tracing::debug;

use crate::core::params::PreprocessOptions;
use crate::core::processing::grayscale::rgb_to_grayscale;
use crate::core::processing::resize::resize_to_long_side;
use crate::error::Result;
use crate::io::manifest::ManifestEntry;
use crate::io::reader::{decode_rgb, read_image_bytes};
use crate::types::{ImageSize, Record};

/// Grayscale then resize a decoded RGB tensor.
/// Returns the transformed image and the size it had on entry.
pub fn preprocess_image(
    image: Array3<u8>,
    options: &PreprocessOptions,
) -> Result<(Array3<u8>, ImageSize)> {
    let (rows, cols, _) = image.dim();
    let original_size = ImageSize::new(rows, cols);

    let mut image = image;
    if options.grayscale {
        image = rgb_to_grayscale(image);
    }
    if let Some(size) = options.resize_max {
        image = resize_to_long_side(image, size)?;
    }

    Ok((image, original_size))
}

/// Read, decode and preprocess one manifest entry
pub fn process_entry(entry: &ManifestEntry, options: &PreprocessOptions) -> Result<Record> {
    let bytes = read_image_bytes(&entry.image_path)?;
    let decoded = decode_rgb(&entry.image_path, &bytes)?;
    drop(bytes);

    let (image, original_size) = preprocess_image(decoded, options)?;
    debug!(
        "Loaded {} ({} -> {}x{}x{})",
        entry.name,
        original_size,
        image.dim().0,
        image.dim().1,
        image.dim().2
    );

    Ok(Record {
        image,
        name: entry.name.clone(),
        original_size,
    })
}
