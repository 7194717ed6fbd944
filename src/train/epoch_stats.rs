use serde::{Serialize, Deserialize};

/// Per-epoch training statistics returned by `train_loop`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Total epochs requested for this run.
    pub total_epochs: usize,
    /// Mean loss per example over this epoch, measured on the forward
    /// passes that produced the gradients.
    pub train_loss: f64,
    /// Fraction in [0, 1] of examples whose output argmax matched the
    /// target argmax, evaluated after the epoch's last update; only set
    /// for cross-entropy runs.
    pub train_accuracy: Option<f64>,
    /// Wall-clock duration of this single epoch in milliseconds.
    pub elapsed_ms: u64,
}
