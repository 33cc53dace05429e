use rand::Rng;

use crate::activation::activation::ActivationKind;
use crate::error::{ensure_shape, NnError, Result};
use crate::math::matrix::Matrix;
use crate::math::ops;

/// Training-only state of a layer, created once by
/// [`Layer::prepare_gradients`] and overwritten on every sample.
#[derive(Debug)]
pub struct GradientBuffers {
    /// Copy of the last input fed to this layer, shape (in, 1).
    pub input: Matrix,
    pub weight_grad: Matrix,
    pub bias_grad: Matrix,
    /// Reserved, shape (out, 1). Not written by `backward`.
    pub output_grad: Matrix,
}

/// One affine transform `y = f(W·x + b)` with cached forward state.
#[derive(Debug)]
pub struct Layer {
    /// Shape (out, in).
    pub(crate) weights: Matrix,
    /// Shape (out, 1).
    pub(crate) bias: Matrix,
    /// Activated output of the last forward pass, shape (out, 1).
    pub(crate) output: Matrix,
    /// `W·x + b` of the last forward pass; the derivative is evaluated here.
    pre_activation: Matrix,
    grads: Option<GradientBuffers>,
}

impl Layer {
    /// Creates a layer mapping `input_size` values to `output_size` values.
    ///
    /// Weights are drawn uniformly from `[-s, s]` with `s = sqrt(2 / input_size)`
    /// (He scaling on the fan-in); biases start at zero.
    pub fn new<R: Rng>(input_size: usize, output_size: usize, rng: &mut R) -> Result<Layer> {
        let mut weights = Matrix::create(output_size, input_size)?;
        let scale = (2.0 / input_size as f32).sqrt();
        for w in weights.as_mut_slice() {
            *w = rng.gen_range(-scale..=scale);
        }

        let bias = Matrix::create_with_value(output_size, 1, 0.0)?;
        let output = Matrix::create(output_size, 1)?;
        let pre_activation = Matrix::create(output_size, 1)?;

        Ok(Layer { weights, bias, output, pre_activation, grads: None })
    }

    #[inline]
    pub fn input_size(&self) -> usize {
        self.weights.cols()
    }

    #[inline]
    pub fn output_size(&self) -> usize {
        self.weights.rows()
    }

    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    pub fn bias(&self) -> &Matrix {
        &self.bias
    }

    pub fn output(&self) -> &Matrix {
        &self.output
    }

    pub fn gradients(&self) -> Option<&GradientBuffers> {
        self.grads.as_ref()
    }

    /// Allocates the training buffers if they do not exist yet.
    /// Returns `true` when it allocated.
    pub fn prepare_gradients(&mut self) -> Result<bool> {
        if self.grads.is_some() {
            return Ok(false);
        }
        let (out, inp) = self.weights.shape();
        self.grads = Some(GradientBuffers {
            input: Matrix::create(inp, 1)?,
            weight_grad: Matrix::create(out, inp)?,
            bias_grad: Matrix::create(out, 1)?,
            output_grad: Matrix::create(out, 1)?,
        });
        Ok(true)
    }

    /// Stores a copy of `input` as the cached layer input used by `backward`.
    pub fn cache_input(&mut self, input: &Matrix) -> Result<()> {
        let grads = self.grads.as_mut().ok_or(NnError::TrainingStateMissing)?;
        grads.input.copy_from(input)
    }

    /// Computes `output = activation(W·input + b)`.
    ///
    /// On any error `output` keeps its previous contents.
    pub fn forward(&mut self, input: &Matrix, activation: ActivationKind) -> Result<()> {
        ensure_shape("layer_forward", (self.weights.cols(), 1), input.shape())?;
        ensure_shape("layer_forward", (self.weights.rows(), 1), self.output.shape())?;
        ensure_shape("layer_forward", self.output.shape(), self.bias.shape())?;

        let mut product = Matrix::create(self.output.rows(), 1)?;
        ops::multiply(&self.weights, input, &mut product)?;
        ops::add(&product, &self.bias, &mut self.pre_activation)?;

        for (y, &z) in self.output.as_mut_slice().iter_mut().zip(self.pre_activation.as_slice()) {
            *y = activation.function(z);
        }
        Ok(())
    }

    /// Backpropagates `output_grad` (∂L/∂output) through this layer.
    ///
    /// Overwrites `weight_grad` and `bias_grad` and writes ∂L/∂input into
    /// `input_grad`. Requires gradient buffers and a cached input.
    pub fn backward(
        &mut self,
        output_grad: &Matrix,
        input_grad: &mut Matrix,
        activation: ActivationKind,
    ) -> Result<()> {
        let grads = self.grads.as_mut().ok_or(NnError::TrainingStateMissing)?;
        ensure_shape("layer_backward", self.output.shape(), output_grad.shape())?;
        ensure_shape("layer_backward", grads.input.shape(), input_grad.shape())?;

        // δ = ∂L/∂y ⊙ f'(z)
        let mut delta = Matrix::create(self.output.rows(), 1)?;
        for ((d, &g), &z) in delta.as_mut_slice().iter_mut()
            .zip(output_grad.as_slice())
            .zip(self.pre_activation.as_slice())
        {
            *d = g * activation.derivative(z);
        }

        grads.bias_grad.copy_from(&delta)?;

        for i in 0..self.weights.rows() {
            for j in 0..self.weights.cols() {
                // SAFETY: weight_grad is (out, in), delta is (out, 1), input is (in, 1).
                unsafe {
                    let g = delta.get_unchecked(i, 0) * grads.input.get_unchecked(j, 0);
                    grads.weight_grad.set_unchecked(i, j, g);
                }
            }
        }

        let weights_t = self.weights.transpose()?;
        ops::multiply(&weights_t, &delta, input_grad)
    }

    /// Applies pre-computed gradients scaled by lr: `W -= lr·dW`, `b -= lr·db`.
    pub fn apply_gradients(&mut self, lr: f32) -> Result<()> {
        let grads = self.grads.as_ref().ok_or(NnError::TrainingStateMissing)?;
        for (w, g) in self.weights.as_mut_slice().iter_mut().zip(grads.weight_grad.as_slice()) {
            *w -= lr * g;
        }
        for (b, g) in self.bias.as_mut_slice().iter_mut().zip(grads.bias_grad.as_slice()) {
            *b -= lr * g;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// 2 -> 2 layer with hand-picked weights.
    fn fixed_layer() -> Layer {
        let mut rng = StdRng::seed_from_u64(0);
        let mut layer = Layer::new(2, 2, &mut rng).unwrap();
        layer.weights = Matrix::from_data(&[vec![1.0, 2.0], vec![-1.0, 0.5]]).unwrap();
        layer.bias = Matrix::column(&[0.5, -0.5]).unwrap();
        layer
    }

    #[test]
    fn new_uses_he_uniform_bounds_and_zero_bias() {
        let mut rng = StdRng::seed_from_u64(7);
        let layer = Layer::new(8, 3, &mut rng).unwrap();
        let scale = (2.0_f32 / 8.0).sqrt();
        assert_eq!(layer.weights().shape(), (3, 8));
        assert!(layer.weights().as_slice().iter().all(|w| w.abs() <= scale));
        assert!(layer.bias().as_slice().iter().all(|&b| b == 0.0));
        assert!(layer.gradients().is_none());
    }

    #[test]
    fn forward_computes_affine_then_activation() {
        let mut layer = fixed_layer();
        let x = Matrix::column(&[1.0, 2.0]).unwrap();
        layer.forward(&x, ActivationKind::ReLU).unwrap();
        // z = [1 + 4 + 0.5, -1 + 1 - 0.5] = [5.5, -0.5]
        assert_eq!(layer.output().as_slice(), &[5.5, 0.0]);
    }

    #[test]
    fn forward_rejects_wrong_input_and_keeps_output() {
        let mut layer = fixed_layer();
        layer.output.fill(3.0);
        let x = Matrix::column(&[1.0, 2.0, 3.0]).unwrap();
        assert!(layer.forward(&x, ActivationKind::Sigmoid).is_err());
        assert_eq!(layer.output().as_slice(), &[3.0, 3.0]);
    }

    #[test]
    fn backward_requires_gradient_buffers() {
        let mut layer = fixed_layer();
        let g = Matrix::column(&[1.0, 1.0]).unwrap();
        let mut dx = Matrix::create(2, 1).unwrap();
        assert!(matches!(
            layer.backward(&g, &mut dx, ActivationKind::Tanh),
            Err(NnError::TrainingStateMissing)
        ));
    }

    #[test]
    fn backward_matches_hand_derivation() {
        let mut layer = fixed_layer();
        assert!(layer.prepare_gradients().unwrap());
        assert!(!layer.prepare_gradients().unwrap());

        let x = Matrix::column(&[1.0, 2.0]).unwrap();
        layer.cache_input(&x).unwrap();
        layer.forward(&x, ActivationKind::ReLU).unwrap();

        let g = Matrix::column(&[2.0, 3.0]).unwrap();
        let mut dx = Matrix::create(2, 1).unwrap();
        layer.backward(&g, &mut dx, ActivationKind::ReLU).unwrap();

        // δ = [2·1, 3·0] = [2, 0]
        let grads = layer.gradients().unwrap();
        assert_eq!(grads.bias_grad.as_slice(), &[2.0, 0.0]);
        assert_eq!(grads.weight_grad.as_slice(), &[2.0, 4.0, 0.0, 0.0]);
        // Wᵗ·δ = [1·2 + -1·0, 2·2 + 0.5·0]
        assert_eq!(dx.as_slice(), &[2.0, 4.0]);
    }

    #[test]
    fn backward_gradient_agrees_with_finite_differences() {
        let mut layer = fixed_layer();
        layer.prepare_gradients().unwrap();
        let x = Matrix::column(&[0.3, -0.2]).unwrap();
        layer.cache_input(&x).unwrap();
        layer.forward(&x, ActivationKind::Tanh).unwrap();

        // L = sum(y), so ∂L/∂y = 1.
        let ones = Matrix::create_with_value(2, 1, 1.0).unwrap();
        let mut dx = Matrix::create(2, 1).unwrap();
        layer.backward(&ones, &mut dx, ActivationKind::Tanh).unwrap();
        let analytic = layer.gradients().unwrap().weight_grad.get(0, 1).unwrap();

        let h = 1e-3;
        let mut loss_at = |delta: f32| {
            let w = layer.weights.get(0, 1).unwrap();
            layer.weights.set(0, 1, w + delta).unwrap();
            layer.forward(&x, ActivationKind::Tanh).unwrap();
            layer.weights.set(0, 1, w).unwrap();
            layer.output().as_slice().iter().sum::<f32>()
        };
        let numeric = (loss_at(h) - loss_at(-h)) / (2.0 * h);
        assert!((analytic - numeric).abs() < 1e-2, "{analytic} vs {numeric}");
    }

    #[test]
    fn apply_gradients_steps_against_the_gradient() {
        let mut layer = fixed_layer();
        layer.prepare_gradients().unwrap();
        let x = Matrix::column(&[1.0, 2.0]).unwrap();
        layer.cache_input(&x).unwrap();
        layer.forward(&x, ActivationKind::ReLU).unwrap();
        let g = Matrix::column(&[2.0, 3.0]).unwrap();
        let mut dx = Matrix::create(2, 1).unwrap();
        layer.backward(&g, &mut dx, ActivationKind::ReLU).unwrap();

        layer.apply_gradients(0.5).unwrap();
        assert_eq!(layer.weights().as_slice(), &[0.0, 0.0, -1.0, 0.5]);
        assert_eq!(layer.bias().as_slice(), &[-0.5, -0.5]);
    }
}
