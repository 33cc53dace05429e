use serde::{Deserialize, Serialize};
use std::f32::consts::E;

/// Element-wise nonlinearity applied to a layer's pre-activation sum.
///
/// Tags are resolved through [`ActivationKind::from_name`] /
/// [`ActivationKind::from_index`]; any unrecognized tag resolves to
/// `Sigmoid`. JSON configs go through the same lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum ActivationKind {
    #[default]
    Sigmoid,
    Tanh,
    #[serde(rename = "relu")]
    ReLU,
}

impl ActivationKind {
    /// Case-insensitive name lookup; unknown names fall back to `Sigmoid`.
    pub fn from_name(name: &str) -> ActivationKind {
        match name.trim().to_ascii_lowercase().as_str() {
            "sigmoid" => ActivationKind::Sigmoid,
            "tanh" => ActivationKind::Tanh,
            "relu" => ActivationKind::ReLU,
            _ => ActivationKind::Sigmoid,
        }
    }

    /// Numeric tag lookup (0 sigmoid, 1 tanh, 2 relu); anything else is `Sigmoid`.
    pub fn from_index(index: u32) -> ActivationKind {
        match index {
            1 => ActivationKind::Tanh,
            2 => ActivationKind::ReLU,
            _ => ActivationKind::Sigmoid,
        }
    }

    pub fn function(&self, x: f32) -> f32 {
        match self {
            ActivationKind::Sigmoid => sigmoid(x),
            ActivationKind::Tanh => x.tanh(),
            ActivationKind::ReLU => if x > 0.0 { x } else { 0.0 },
        }
    }

    /// Derivative with respect to the pre-activation input `x`.
    ///
    /// ReLU is not differentiable at 0; it is treated as 0 there.
    pub fn derivative(&self, x: f32) -> f32 {
        match self {
            ActivationKind::Sigmoid => {
                let s = sigmoid(x);
                s * (1.0 - s)
            }
            ActivationKind::Tanh => {
                let t = x.tanh();
                1.0 - t * t
            }
            ActivationKind::ReLU => if x > 0.0 { 1.0 } else { 0.0 },
        }
    }
}

impl From<&str> for ActivationKind {
    fn from(name: &str) -> Self {
        ActivationKind::from_name(name)
    }
}

impl From<String> for ActivationKind {
    fn from(name: String) -> Self {
        ActivationKind::from_name(&name)
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + E.powf(-x))
}
