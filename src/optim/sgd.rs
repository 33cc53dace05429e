use crate::error::Result;
use crate::layers::dense::Layer;

/// Plain gradient descent: `param -= learning_rate * grad`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sgd {
    pub learning_rate: f32,
}

impl Sgd {
    pub fn new(learning_rate: f32) -> Sgd {
        Sgd { learning_rate }
    }

    /// Applies one SGD weight update to a layer using the gradients left in
    /// its buffers by the last `backward` call.
    pub fn step(&self, layer: &mut Layer) -> Result<()> {
        layer.apply_gradients(self.learning_rate)
    }
}
