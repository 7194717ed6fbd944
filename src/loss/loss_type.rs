use serde::{Serialize, Deserialize};

use crate::loss::{
    bce::BceLoss, cross_entropy::CrossEntropyLoss, huber::HuberLoss, mae::MaeLoss, mse::MseLoss,
};

/// Selects the cost function applied to the output layer.
///
/// - `Mse`                — halved squared error; pair with a linear-ish or Sigmoid output.
/// - `CrossEntropy`       — categorical cross-entropy; pair with SoftMax output.
/// - `BinaryCrossEntropy` — pair with Sigmoid output.
/// - `Mae`                — absolute error.
/// - `Huber`              — Huber loss (δ=1.0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostFunction {
    Mse,
    CrossEntropy,
    BinaryCrossEntropy,
    Mae,
    Huber,
}

impl CostFunction {
    /// Loss contributed by a single output.
    pub fn loss(self, target: f64, predicted: f64) -> f64 {
        match self {
            CostFunction::Mse => MseLoss::loss(target, predicted),
            CostFunction::CrossEntropy => CrossEntropyLoss::loss(target, predicted),
            CostFunction::BinaryCrossEntropy => BceLoss::loss(target, predicted),
            CostFunction::Mae => MaeLoss::loss(target, predicted),
            CostFunction::Huber => HuberLoss::loss(target, predicted),
        }
    }

    /// ∂loss/∂predicted for a single output.
    pub fn derivative(self, target: f64, predicted: f64) -> f64 {
        match self {
            CostFunction::Mse => MseLoss::derivative(target, predicted),
            CostFunction::CrossEntropy => CrossEntropyLoss::derivative(target, predicted),
            CostFunction::BinaryCrossEntropy => BceLoss::derivative(target, predicted),
            CostFunction::Mae => MaeLoss::derivative(target, predicted),
            CostFunction::Huber => HuberLoss::derivative(target, predicted),
        }
    }

    /// Summed loss over an output vector.
    pub fn total(self, targets: &[f64], predicted: &[f64]) -> f64 {
        targets.iter().zip(predicted.iter())
            .map(|(&t, &p)| self.loss(t, p))
            .sum()
    }
}
