pub mod dense;

pub use dense::{GradientBuffers, Layer};
