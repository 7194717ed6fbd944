pub struct MaeLoss;

impl MaeLoss {
    /// Per-output loss: |predicted − target|
    pub fn loss(target: f64, predicted: f64) -> f64 {
        (predicted - target).abs()
    }

    /// Subgradient: sign(predicted − target), 0 when equal
    pub fn derivative(target: f64, predicted: f64) -> f64 {
        let diff = predicted - target;
        if diff > 0.0 { 1.0 } else if diff < 0.0 { -1.0 } else { 0.0 }
    }
}
