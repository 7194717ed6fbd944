use std::time::Instant;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{NnError, Result};
use crate::loss::CostFunction;
use crate::network::network::Network;
use crate::train::epoch_stats::EpochStats;
use crate::train::train_config::TrainConfig;

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `network` for `config.epochs` epochs and returns the statistics
/// of every completed epoch.
///
/// Within a mini-batch every example runs forward, backward and gradient
/// accumulation; a single momentum update is applied at the end of the
/// batch. The last batch of an epoch may be shorter.
///
/// # Errors
/// An invalid numeric value anywhere in the graph aborts the run
/// immediately. The network keeps whatever updates were applied before the
/// failing batch; the partially accumulated batch is discarded so a later
/// run starts from clean accumulators.
pub fn train_loop(
    network: &mut Network,
    inputs: &[Vec<f64>],
    targets: &[Vec<f64>],
    config: &TrainConfig,
) -> Result<Vec<EpochStats>> {
    config.validate()?;
    if inputs.is_empty() {
        return Err(NnError::InvalidConfig("training set is empty".into()));
    }
    if inputs.len() != targets.len() {
        return Err(NnError::ShapeMismatch {
            what: "target set",
            expected: inputs.len(),
            actual: targets.len(),
        });
    }

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut order: Vec<usize> = (0..inputs.len()).collect();
    let mut history = Vec::with_capacity(config.epochs);

    for epoch in 1..=config.epochs {
        let t_start = Instant::now();
        if config.shuffle {
            order.shuffle(&mut rng);
        }

        let epoch_result = run_one_epoch(network, inputs, targets, &order, config)
            .and_then(|train_loss| {
                let train_accuracy = match network.cost {
                    CostFunction::CrossEntropy => Some(compute_accuracy(network, inputs, targets)?),
                    _ => None,
                };
                Ok((train_loss, train_accuracy))
            });
        let (train_loss, train_accuracy) = match epoch_result {
            Ok(result) => result,
            Err(e) => {
                network.clear_accumulators();
                log::error!("training aborted in epoch {}/{}: {}", epoch, config.epochs, e);
                return Err(e);
            }
        };

        let stats = EpochStats {
            epoch,
            total_epochs: config.epochs,
            train_loss,
            train_accuracy,
            elapsed_ms: t_start.elapsed().as_millis() as u64,
        };
        log::info!("Epoch {}/{}: loss = {:.6}", epoch, config.epochs, train_loss);
        history.push(stats);
    }

    Ok(history)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// One pass over the data in `order`. Returns the mean loss.
fn run_one_epoch(
    network: &mut Network,
    inputs: &[Vec<f64>],
    targets: &[Vec<f64>],
    order: &[usize],
    config: &TrainConfig,
) -> Result<f64> {
    let mut total_loss = 0.0;

    for batch in order.chunks(config.batch_size) {
        for &idx in batch {
            let output = network.forward(&inputs[idx])?;
            network.backward(&targets[idx])?;
            network.accumulate_gradients();
            total_loss += network.cost.total(&targets[idx], &output);
        }
        network.apply_updates(config.training_step, config.momentum);
    }

    Ok(total_loss / order.len() as f64)
}

/// Fraction of examples classified correctly (argmax match), measured with
/// the weights as they stand after the epoch.
fn compute_accuracy(
    network: &mut Network,
    inputs: &[Vec<f64>],
    targets: &[Vec<f64>],
) -> Result<f64> {
    let mut correct = 0usize;
    for (input, target) in inputs.iter().zip(targets.iter()) {
        let output = network.forward(input)?;
        if argmax(&output) == argmax(target) {
            correct += 1;
        }
    }
    Ok(correct as f64 / inputs.len() as f64)
}

/// Index of the maximum element in a slice.
fn argmax(v: &[f64]) -> usize {
    v.iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_picks_largest() {
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), 1);
        assert_eq!(argmax(&[]), 0);
    }
}
