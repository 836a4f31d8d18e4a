use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer, images::Image};
use ndarray::Array3;
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::ImageSize;

/// Scale `original` so its long side equals `target_long_side`, keeping the
/// aspect ratio. Each side is rounded to the nearest pixel and never drops below 1.
pub fn calculate_resize_dimensions(original: ImageSize, target_long_side: usize) -> ImageSize {
    let long_side = original.long_side();
    if long_side == 0 || long_side == target_long_side {
        return original;
    }

    let scale_factor = target_long_side as f64 / long_side as f64;
    let scale = |side: usize| ((side as f64 * scale_factor).round() as usize).max(1);

    ImageSize::new(scale(original.height), scale(original.width))
}

fn pixel_type_for(channels: usize) -> Result<PixelType> {
    match channels {
        1 => Ok(PixelType::U8),
        3 => Ok(PixelType::U8x3),
        other => Err(Error::Resize(format!(
            "unsupported channel count {other}, expected 1 or 3"
        ))),
    }
}

/// Bilinear resize of interleaved 8-bit pixels (1 or 3 channels)
pub fn resize_u8_image(
    data: Vec<u8>,
    original: ImageSize,
    target: ImageSize,
    channels: usize,
) -> Result<Vec<u8>> {
    let pixel_type = pixel_type_for(channels)?;
    let resize_options =
        ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear));
    let mut resizer = Resizer::new();

    let src_image = Image::from_vec_u8(
        original.width as u32,
        original.height as u32,
        data,
        pixel_type,
    )
    .map_err(Error::resize)?;
    let mut dst_image = Image::new(target.width as u32, target.height as u32, pixel_type);
    resizer
        .resize(&src_image, &mut dst_image, &resize_options)
        .map_err(Error::resize)?;

    Ok(dst_image.into_vec())
}

/// Resize an `[H, W, C]` tensor so its long side equals `target_long_side`.
/// Images already at that size are returned untouched.
pub fn resize_to_long_side(image: Array3<u8>, target_long_side: usize) -> Result<Array3<u8>> {
    let (rows, cols, channels) = image.dim();
    let original = ImageSize::new(rows, cols);
    let target = calculate_resize_dimensions(original, target_long_side);
    if target == original {
        return Ok(image);
    }

    debug!("Resizing {} -> {} (long side {})", original, target, target_long_side);

    let data = if image.is_standard_layout() {
        image.into_raw_vec()
    } else {
        image.iter().copied().collect()
    };
    let resized = resize_u8_image(data, original, target, channels)?;
    Ok(Array3::from_shape_vec(
        (target.height, target.width, channels),
        resized,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landscape_image_scales_to_long_side() {
        let size = calculate_resize_dimensions(ImageSize::new(100, 200), 100);
        assert_eq!(size, ImageSize::new(50, 100));
    }

    #[test]
    fn portrait_image_rounds_short_side() {
        // 960 * 640 / 1280 = 480; 333 * 640 / 1000 = 213.12
        assert_eq!(
            calculate_resize_dimensions(ImageSize::new(1280, 960), 640),
            ImageSize::new(640, 480)
        );
        assert_eq!(
            calculate_resize_dimensions(ImageSize::new(1000, 333), 640),
            ImageSize::new(640, 213)
        );
    }

    #[test]
    fn small_images_are_upscaled() {
        assert_eq!(
            calculate_resize_dimensions(ImageSize::new(10, 20), 40),
            ImageSize::new(20, 40)
        );
    }

    #[test]
    fn extreme_aspect_ratio_keeps_one_pixel() {
        assert_eq!(
            calculate_resize_dimensions(ImageSize::new(1, 1000), 10),
            ImageSize::new(1, 10)
        );
    }

    #[test]
    fn resize_preserves_channels_and_constant_color() {
        let image = Array3::from_elem((40, 80, 3), 120u8);
        let resized = resize_to_long_side(image, 20).unwrap();
        assert_eq!(resized.dim(), (10, 20, 3));
        assert!(resized.iter().all(|&v| v.abs_diff(120) <= 1));
    }

    #[test]
    fn single_channel_resize() {
        let image = Array3::from_elem((30, 10, 1), 7u8);
        let resized = resize_to_long_side(image, 60).unwrap();
        assert_eq!(resized.dim(), (60, 20, 1));
    }

    #[test]
    fn unsupported_channel_count_is_an_error() {
        let image = Array3::from_elem((4, 4, 2), 0u8);
        assert!(matches!(resize_to_long_side(image, 2), Err(Error::Resize(_))));
    }
}
