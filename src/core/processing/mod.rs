pub mod grayscale;
pub mod pipeline;
pub mod resize;
