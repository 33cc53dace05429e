pub mod error;
pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod loss;
pub mod optim;
pub mod train;

// Convenience re-exports
pub use error::{NnError, Result};
pub use math::matrix::{Matrix, MatrixStats};
pub use activation::activation::ActivationKind;
pub use layers::dense::{GradientBuffers, Layer};
pub use network::network::{Network, TrainingState};
pub use network::spec::NetworkSpec;
pub use loss::loss_type::LossKind;
pub use loss::softmax::softmax;
pub use optim::sgd::Sgd;
pub use train::trainer::train_network;
pub use train::{evaluate_loss, train_loop, EpochStats, TrainConfig};
