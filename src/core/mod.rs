//! Core building blocks: dataset parameters, the per-record transform chain
//! (grayscale, resize) and the ordered bounded `parallel_map`. These are
//! internal primitives consumed by the high-level `api` module.
pub mod parallel;
pub mod params;
pub mod processing;
