use thiserror::Error;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid resize parameter: {size}. Must be a non-negative integer or 'original'")]
    InvalidSize { size: String },

    #[error("Unsupported channel count {channels} for record {name}")]
    UnsupportedChannels { name: String, channels: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Loader(#[from] robotcar_loader::Error),
}
