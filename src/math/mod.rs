pub mod matrix;
pub mod ops;

pub use matrix::{Matrix, MatrixStats};
