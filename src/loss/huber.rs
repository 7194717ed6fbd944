pub struct HuberLoss;

const DELTA: f64 = 1.0;

impl HuberLoss {
    /// h(x) = 0.5·x²  if |x| ≤ δ
    ///        δ·(|x| − 0.5·δ)  otherwise
    /// with x = predicted − target.
    pub fn loss(target: f64, predicted: f64) -> f64 {
        let x = predicted - target;
        if x.abs() <= DELTA {
            0.5 * x * x
        } else {
            DELTA * (x.abs() - 0.5 * DELTA)
        }
    }

    /// x  if |x| ≤ δ,  else δ·sign(x)
    pub fn derivative(target: f64, predicted: f64) -> f64 {
        let x = predicted - target;
        if x.abs() <= DELTA { x } else { DELTA * x.signum() }
    }
}
