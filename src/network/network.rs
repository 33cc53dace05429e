use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::activation::activation::ActivationKind;
use crate::error::{ensure_shape, NnError, Result};
use crate::layers::dense::Layer;
use crate::math::matrix::Matrix;
use crate::optim::sgd::Sgd;

/// Whether the per-layer gradient buffers exist yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingState {
    /// Inference only; no gradient buffers allocated.
    Uninitialized,
    /// Every layer owns its gradient buffers; they are reused across samples.
    TrainingReady,
}

/// A multilayer perceptron: an ordered chain of dense layers.
///
/// `layers[i]` maps `dims[i]` values to `dims[i + 1]` values and is followed
/// by `activations[i]`.
#[derive(Debug)]
pub struct Network {
    pub(crate) layers: Vec<Layer>,
    pub(crate) activations: Vec<ActivationKind>,
    learning_rate: f32,
    state: TrainingState,
}

impl Network {
    /// Builds a network from a shape list such as `[2, 4, 1]`.
    ///
    /// `activations` needs one entry per layer transition
    /// (`dims.len() - 1`). If any allocation fails, everything built so far
    /// is dropped before the error is returned.
    pub fn new<R: Rng>(
        dims: &[usize],
        activations: &[ActivationKind],
        learning_rate: f32,
        rng: &mut R,
    ) -> Result<Network> {
        if dims.len() < 2 {
            return Err(NnError::InvalidConfig(format!(
                "need at least two dimensions, got {}",
                dims.len()
            )));
        }
        let num_layers = dims.len() - 1;
        if activations.len() != num_layers {
            return Err(NnError::InvalidConfig(format!(
                "expected {num_layers} activations, got {}",
                activations.len()
            )));
        }
        if !(learning_rate.is_finite() && learning_rate > 0.0) {
            return Err(NnError::InvalidConfig(format!(
                "learning rate must be finite and positive, got {learning_rate}"
            )));
        }

        let mut layers = Vec::new();
        layers
            .try_reserve_exact(num_layers)
            .map_err(|_| NnError::AllocationFailed { elements: num_layers })?;
        for pair in dims.windows(2) {
            layers.push(Layer::new(pair[0], pair[1], rng)?);
        }

        let mut kinds = Vec::new();
        kinds
            .try_reserve_exact(num_layers)
            .map_err(|_| NnError::AllocationFailed { elements: num_layers })?;
        kinds.extend_from_slice(activations);

        debug!(?dims, ?activations, learning_rate, "network constructed");

        Ok(Network {
            layers,
            activations: kinds,
            learning_rate,
            state: TrainingState::Uninitialized,
        })
    }

    /// Same as [`Network::new`] with a `StdRng` seeded from `seed`, so the
    /// initial weights are reproducible.
    pub fn with_seed(
        dims: &[usize],
        activations: &[ActivationKind],
        learning_rate: f32,
        seed: u64,
    ) -> Result<Network> {
        let mut rng = StdRng::seed_from_u64(seed);
        Network::new(dims, activations, learning_rate, &mut rng)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn activations(&self) -> &[ActivationKind] {
        &self.activations
    }

    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    pub fn training_state(&self) -> TrainingState {
        self.state
    }

    /// Expected number of rows of an input column.
    pub fn input_size(&self) -> usize {
        self.layers[0].input_size()
    }

    /// Number of rows of the output column.
    pub fn output_size(&self) -> usize {
        self.layers[self.layers.len() - 1].output_size()
    }

    /// Runs `input` through every layer and copies the result into `output`.
    ///
    /// Both shapes are checked before any layer is touched, so a mismatch
    /// leaves every cached layer output as it was.
    pub fn forward(&mut self, input: &Matrix, output: &mut Matrix) -> Result<()> {
        ensure_shape("network_forward", (self.input_size(), 1), input.shape())?;
        ensure_shape("network_forward", (self.output_size(), 1), output.shape())?;

        self.propagate(input)?;
        output.copy_from(&self.layers[self.layers.len() - 1].output)
    }

    /// Forward pass into a freshly allocated `(output_size, 1)` matrix.
    pub fn predict(&mut self, input: &Matrix) -> Result<Matrix> {
        let mut output = Matrix::create(self.output_size(), 1)?;
        self.forward(input, &mut output)?;
        Ok(output)
    }

    /// Chains `Layer::forward`, feeding each layer's output to the next.
    fn propagate(&mut self, input: &Matrix) -> Result<()> {
        self.layers[0].forward(input, self.activations[0])?;
        for i in 1..self.layers.len() {
            let (done, rest) = self.layers.split_at_mut(i);
            rest[0].forward(&done[i - 1].output, self.activations[i])?;
        }
        Ok(())
    }

    /// Moves the network to `TrainingReady`, allocating every layer's
    /// gradient buffers. Returns `true` only on the call that performed the
    /// transition; later calls reuse the existing buffers.
    pub fn prepare_training(&mut self) -> Result<bool> {
        if self.state == TrainingState::TrainingReady {
            return Ok(false);
        }
        for layer in &mut self.layers {
            layer.prepare_gradients()?;
        }
        self.state = TrainingState::TrainingReady;
        debug!(layers = self.layers.len(), "gradient buffers allocated");
        Ok(true)
    }

    /// Applies `W -= lr·dW` and `b -= lr·db` to every layer.
    pub fn update_weights(&mut self) -> Result<()> {
        if self.state != TrainingState::TrainingReady {
            return Err(NnError::TrainingStateMissing);
        }
        let optimizer = Sgd::new(self.learning_rate);
        for layer in &mut self.layers {
            optimizer.step(layer)?;
        }
        Ok(())
    }
}
