use std::time::Instant;

use tracing::info;

use crate::error::{NnError, Result};
use crate::loss::loss_type::LossKind;
use crate::math::matrix::Matrix;
use crate::network::network::Network;
use crate::train::epoch_stats::EpochStats;
use crate::train::train_config::TrainConfig;

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Trains `network` for `config.epochs` epochs and returns the mean training
/// loss of the **last epoch**.
///
/// Samples are visited strictly in order, one at a time, with a weight
/// update after every sample. The first call moves the network to
/// `TrainingReady`; later calls reuse the same gradient buffers.
///
/// # Errors
/// - `InvalidConfig` if the sample sets are empty or of different lengths,
///   `epochs == 0` or `log_every == 0`
/// - `ShapeMismatch` if any input or target does not fit the network
pub fn train_loop(
    network: &mut Network,
    inputs: &[Matrix],
    targets: &[Matrix],
    config: &TrainConfig,
) -> Result<f32> {
    if inputs.is_empty() {
        return Err(NnError::InvalidConfig("inputs must not be empty".into()));
    }
    if inputs.len() != targets.len() {
        return Err(NnError::InvalidConfig(format!(
            "got {} inputs but {} targets",
            inputs.len(),
            targets.len()
        )));
    }
    if config.epochs == 0 {
        return Err(NnError::InvalidConfig("epochs must be at least 1".into()));
    }
    if config.log_every == 0 {
        return Err(NnError::InvalidConfig("log_every must be at least 1".into()));
    }

    network.prepare_training()?;

    // Reused across every sample of every epoch.
    let mut prediction = Matrix::create(network.output_size(), 1)?;
    let mut loss_grad = Matrix::create(network.output_size(), 1)?;

    let mut last_train_loss = 0.0;

    for epoch in 0..config.epochs {
        let t_start = Instant::now();

        // ── One full pass over the training data ───────────────────────────
        let mut epoch_loss = 0.0;
        for (input, target) in inputs.iter().zip(targets) {
            epoch_loss += train_sample(
                network,
                input,
                target,
                config.loss,
                &mut prediction,
                &mut loss_grad,
            )?;
        }
        let train_loss = epoch_loss / inputs.len() as f32;
        last_train_loss = train_loss;

        // ── Emit progress ─────────────────────────────────────────────────
        if epoch % config.log_every == 0 || epoch + 1 == config.epochs {
            info!(
                epoch = epoch + 1,
                epochs = config.epochs,
                loss = train_loss,
                "training progress"
            );
        }

        if let Some(ref tx) = config.progress_tx {
            let stats = EpochStats {
                epoch: epoch + 1,
                total_epochs: config.epochs,
                train_loss,
                elapsed_ms: t_start.elapsed().as_millis() as u64,
            };
            // Nobody listening is not a training error.
            let _ = tx.send(stats);
        }
    }

    Ok(last_train_loss)
}

/// Runs one forward/backward/update step for a single sample and returns its
/// loss.
///
/// `prediction` and `loss_grad` are caller-owned `(output_size, 1)` buffers.
/// The network must already be `TrainingReady`.
pub fn train_sample(
    network: &mut Network,
    input: &Matrix,
    target: &Matrix,
    loss: LossKind,
    prediction: &mut Matrix,
    loss_grad: &mut Matrix,
) -> Result<f32> {
    // Forward pass, caching each layer's input for backward.
    network.layers[0].cache_input(input)?;
    network.forward(input, prediction)?;
    for i in 1..network.layers.len() {
        let (done, rest) = network.layers.split_at_mut(i);
        rest[0].cache_input(&done[i - 1].output)?;
    }

    let sample_loss = loss.loss(prediction, target)?;
    loss.derivative(prediction, target, loss_grad)?;

    // Backward pass: ∂L/∂input of layer i is ∂L/∂output of layer i - 1.
    let mut delta: Option<Matrix> = None;
    for i in (0..network.layers.len()).rev() {
        let mut input_grad = Matrix::create(network.layers[i].input_size(), 1)?;
        let output_grad = delta.as_ref().unwrap_or(&*loss_grad);
        network.layers[i].backward(output_grad, &mut input_grad, network.activations[i])?;
        delta = Some(input_grad);
    }

    network.update_weights()?;
    Ok(sample_loss)
}

/// Mean loss over a dataset without touching the weights (eval mode).
pub fn evaluate_loss(
    network: &mut Network,
    inputs: &[Matrix],
    targets: &[Matrix],
    loss: LossKind,
) -> Result<f32> {
    if inputs.is_empty() || inputs.len() != targets.len() {
        return Err(NnError::InvalidConfig(format!(
            "need equal, non-zero sample counts, got {} inputs and {} targets",
            inputs.len(),
            targets.len()
        )));
    }

    let mut output = Matrix::create(network.output_size(), 1)?;
    let mut total = 0.0;
    for (input, target) in inputs.iter().zip(targets) {
        network.forward(input, &mut output)?;
        total += loss.loss(&output, target)?;
    }
    Ok(total / inputs.len() as f32)
}
