use serde::{Serialize, Deserialize};

use crate::error::{NnError, Result};

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `epochs`        — total number of full passes over the training data
/// - `batch_size`    — examples accumulated per momentum update; `1` for online training
/// - `training_step` — scale applied to the accumulated derivatives
/// - `momentum`      — decay of the previous velocity, in [0, 1)
/// - `shuffle`       — reshuffle example order every epoch
/// - `seed`          — fixes the shuffle order; drawn from entropy when absent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub training_step: f64,
    pub momentum: f64,
    pub shuffle: bool,
    pub seed: Option<u64>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            epochs: 100,
            batch_size: 1,
            training_step: 0.01,
            momentum: 0.9,
            shuffle: true,
            seed: None,
        }
    }
}

impl TrainConfig {
    /// Creates a `TrainConfig` with the default shuffle and no fixed seed.
    pub fn new(epochs: usize, batch_size: usize, training_step: f64, momentum: f64) -> Self {
        TrainConfig {
            epochs,
            batch_size,
            training_step,
            momentum,
            ..TrainConfig::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(NnError::InvalidConfig("batch_size must be at least 1".into()));
        }
        if !self.training_step.is_finite() || self.training_step <= 0.0 {
            return Err(NnError::InvalidConfig(format!("training_step must be positive, got {}", self.training_step)));
        }
        if !(0.0..1.0).contains(&self.momentum) {
            return Err(NnError::InvalidConfig(format!("momentum must be in [0, 1), got {}", self.momentum)));
        }
        Ok(())
    }

    /// Deserializes and validates a `TrainConfig` from a JSON file. Missing
    /// fields take their defaults.
    pub fn load_json(path: &str) -> Result<TrainConfig> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let config: TrainConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }
}
