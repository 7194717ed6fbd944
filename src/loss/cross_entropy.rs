/// Categorical cross-entropy, one output at a time. Pair with a SoftMax
/// output layer.
pub struct CrossEntropyLoss;

/// Small epsilon added inside log() to prevent log(0) = -inf.
const EPS: f64 = 1e-12;

impl CrossEntropyLoss {
    /// Per-output loss: −target·ln(predicted + ε)
    pub fn loss(target: f64, predicted: f64) -> f64 {
        -target * (predicted + EPS).ln()
    }

    /// ∂L/∂predicted: −target / (predicted + ε)
    ///
    /// When the output layer is SoftMax, the node gradient never goes through
    /// this formula: the composed SoftMax + cross-entropy gradient with respect
    /// to the logits collapses to `predicted − target`
    /// (see `OutputGradientRule::SoftMaxCrossEntropy`).
    pub fn derivative(target: f64, predicted: f64) -> f64 {
        -target / (predicted + EPS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confident_correct_prediction_costs_nothing() {
        assert!(CrossEntropyLoss::loss(1.0, 1.0).abs() < 1e-9);
        assert_eq!(CrossEntropyLoss::loss(0.0, 0.3), 0.0);
    }

    #[test]
    fn derivative_pushes_probability_up() {
        assert!(CrossEntropyLoss::derivative(1.0, 0.25) < 0.0);
        assert!((CrossEntropyLoss::derivative(1.0, 0.25) + 4.0).abs() < 1e-9);
    }
}
