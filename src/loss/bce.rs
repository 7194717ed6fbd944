pub struct BceLoss;

const EPS: f64 = 1e-12;

impl BceLoss {
    /// Per-output BCE: −(y·ln(p+ε) + (1−y)·ln(1−p+ε))
    pub fn loss(target: f64, predicted: f64) -> f64 {
        -(target * (predicted + EPS).ln() + (1.0 - target) * (1.0 - predicted + EPS).ln())
    }

    /// (p − y) / ((p + ε) · (1 − p + ε))
    pub fn derivative(target: f64, predicted: f64) -> f64 {
        (predicted - target) / ((predicted + EPS) * (1.0 - predicted + EPS))
    }
}
