//! Shared types: `ImageSize` and the `Record` yielded by the pipeline.
use ndarray::Array3;
use serde::{Deserialize, Serialize};

/// Height and width of an image in pixels
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    pub height: usize,
    pub width: usize,
}

impl ImageSize {
    pub fn new(height: usize, width: usize) -> Self {
        Self { height, width }
    }

    pub fn long_side(&self) -> usize {
        self.height.max(self.width)
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.height, self.width)
    }
}

/// One processed sample.
///
/// `image` is laid out as `[height, width, channels]` with one channel for
/// grayscale output and three (RGB) otherwise. `original_size` is the size of
/// the decoded image before any resize.
#[derive(Debug, Clone)]
pub struct Record {
    pub image: Array3<u8>,
    pub name: String,
    pub original_size: ImageSize,
}

impl Record {
    pub fn height(&self) -> usize {
        self.image.dim().0
    }

    pub fn width(&self) -> usize {
        self.image.dim().1
    }

    pub fn channels(&self) -> usize {
        self.image.dim().2
    }

    pub fn size(&self) -> ImageSize {
        ImageSize::new(self.height(), self.width())
    }
}
