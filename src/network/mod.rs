pub mod network;
pub mod spec;

pub use network::{Network, TrainingState};
pub use spec::NetworkSpec;
