use ndarray::Array3;

const RGB_TO_GRAY: [f32; 3] = [0.2989, 0.5870, 0.1140];

/// Convert an `[H, W, 3]` RGB tensor to `[H, W, 1]` luminance.
/// Single-channel input is returned as is.
pub fn rgb_to_grayscale(image: Array3<u8>) -> Array3<u8> {
    let (rows, cols, channels) = image.dim();
    if channels == 1 {
        return image;
    }

    Array3::from_shape_fn((rows, cols, 1), |(r, c, _)| {
        let luma: f32 = RGB_TO_GRAY
            .iter()
            .enumerate()
            .map(|(ch, &w)| image[[r, c, ch]] as f32 * w)
            .sum();
        luma.round().clamp(0.0, 255.0) as u8
    })
}
