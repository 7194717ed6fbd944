/// Squared error, halved so the derivative is the plain residual.
pub struct MseLoss;

impl MseLoss {
    /// Per-output loss: 0.5·(predicted − target)²
    pub fn loss(target: f64, predicted: f64) -> f64 {
        0.5 * (predicted - target).powi(2)
    }

    /// ∂L/∂predicted: predicted − target
    pub fn derivative(target: f64, predicted: f64) -> f64 {
        predicted - target
    }
}
