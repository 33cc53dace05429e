use crate::{
    error::Result,
    loss::loss_type::LossKind,
    math::matrix::Matrix,
    network::network::Network,
    train::{loop_fn::train_loop, train_config::TrainConfig},
};

/// Trains `network` on `inputs`/`targets` for `epochs` epochs with plain
/// per-sample gradient descent and returns the final epoch's mean loss.
///
/// Each input is a `(input_size, 1)` column and each target a
/// `(output_size, 1)` column. Weights are updated in place.
pub fn train_network(
    network: &mut Network,
    inputs: &[Matrix],
    targets: &[Matrix],
    epochs: usize,
    loss: LossKind,
) -> Result<f32> {
    train_loop(network, inputs, targets, &TrainConfig::new(epochs, loss))
}
