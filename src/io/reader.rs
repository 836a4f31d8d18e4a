use std::path::Path;

use ndarray::Array3;

use crate::error::{Error, Result};

pub fn read_image_bytes(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| Error::io(path, e))
}

/// Decode an encoded image (JPEG, PNG, ...) into an `[H, W, 3]` RGB tensor.
/// `path` is only used for error reporting.
pub fn decode_rgb(path: &Path, bytes: &[u8]) -> Result<Array3<u8>> {
    let decoded = image::load_from_memory(bytes).map_err(|source| Error::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let rgb = decoded.to_rgb8();
    let (width, height) = rgb.dimensions();

    Ok(Array3::from_shape_vec(
        (height as usize, width as usize, 3),
        rgb.into_raw(),
    )?)
}
