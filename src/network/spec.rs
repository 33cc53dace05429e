use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationKind;
use crate::error::{NnError, Result};
use crate::loss::loss_type::LossKind;
use crate::network::network::Network;
use crate::train::train_config::{TrainConfig, DEFAULT_LOG_EVERY};

/// A serializable description of a network architecture plus its training
/// hyperparameters.
///
/// `NetworkSpec` carries no weights: it is the configuration a run starts
/// from, saved to / loaded from JSON.
///
/// ```json
/// {
///   "name": "xor",
///   "dims": [2, 4, 1],
///   "activations": ["tanh", "sigmoid"],
///   "learning_rate": 0.1,
///   "loss": "mse",
///   "epochs": 2000,
///   "seed": 42
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Human-readable name used in log output.
    pub name: String,
    /// Layer widths, input first: `[input, hidden..., output]`.
    pub dims: Vec<usize>,
    /// One activation per layer transition (`dims.len() - 1`).
    pub activations: Vec<ActivationKind>,
    pub learning_rate: f32,
    /// Loss function to pair with this network during training.
    pub loss: LossKind,
    pub epochs: usize,
    /// Seed for weight initialization; `None` draws from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Progress is logged every `log_every` epochs and on the final epoch.
    #[serde(default = "default_log_every")]
    pub log_every: usize,
}

fn default_log_every() -> usize {
    DEFAULT_LOG_EVERY
}

impl NetworkSpec {
    /// The 2 → 4 → 1 tanh/sigmoid XOR setup.
    pub fn xor() -> NetworkSpec {
        NetworkSpec {
            name: "xor".to_string(),
            dims: vec![2, 4, 1],
            activations: vec![ActivationKind::Tanh, ActivationKind::Sigmoid],
            learning_rate: 0.1,
            loss: LossKind::Mse,
            epochs: 2000,
            seed: None,
            log_every: DEFAULT_LOG_EVERY,
        }
    }

    /// Checks everything that can be checked without allocating a network.
    pub fn validate(&self) -> Result<()> {
        if self.dims.len() < 2 {
            return Err(NnError::InvalidConfig("dims needs at least two entries".into()));
        }
        if self.dims.contains(&0) {
            return Err(NnError::InvalidConfig("dims must all be positive".into()));
        }
        if self.activations.len() != self.dims.len() - 1 {
            return Err(NnError::InvalidConfig(format!(
                "expected {} activations, got {}",
                self.dims.len() - 1,
                self.activations.len()
            )));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(NnError::InvalidConfig("learning_rate must be finite and positive".into()));
        }
        if self.epochs == 0 {
            return Err(NnError::InvalidConfig("epochs must be at least 1".into()));
        }
        if self.log_every == 0 {
            return Err(NnError::InvalidConfig("log_every must be at least 1".into()));
        }
        Ok(())
    }

    /// Allocates a freshly initialized network for this spec.
    pub fn build(&self) -> Result<Network> {
        self.validate()?;
        match self.seed {
            Some(seed) => Network::with_seed(&self.dims, &self.activations, self.learning_rate, seed),
            None => Network::new(&self.dims, &self.activations, self.learning_rate, &mut rand::thread_rng()),
        }
    }

    pub fn train_config(&self) -> TrainConfig {
        let mut config = TrainConfig::new(self.epochs, self.loss);
        config.log_every = self.log_every;
        config
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes and validates a `NetworkSpec` from a JSON file.
    pub fn load_json(path: &str) -> Result<NetworkSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let spec: NetworkSpec = serde_json::from_reader(reader)?;
        spec.validate()?;
        Ok(spec)
    }
}
