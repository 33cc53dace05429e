use std::sync::mpsc;

use crate::loss::loss_type::LossKind;
use crate::train::epoch_stats::EpochStats;

/// Progress is logged on every epoch whose 0-based index is a multiple of
/// this, plus the final epoch.
pub const DEFAULT_LOG_EVERY: usize = 10;

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `epochs`      — total number of full passes over the training data
/// - `loss`        — which loss function to use
/// - `log_every`   — epoch interval of the `tracing` progress line
/// - `progress_tx` — optional channel sender; one `EpochStats` is sent per
///                   completed epoch. A dropped receiver is ignored.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    pub epochs: usize,
    pub loss: LossKind,
    pub log_every: usize,
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
}

impl TrainConfig {
    /// Creates a minimal `TrainConfig` with the default log interval and no
    /// progress channel.
    pub fn new(epochs: usize, loss: LossKind) -> Self {
        TrainConfig {
            epochs,
            loss,
            log_every: DEFAULT_LOG_EVERY,
            progress_tx: None,
        }
    }
}
