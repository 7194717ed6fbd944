/// Errors raised by the engine.
///
/// `InvalidValue` is fatal for the current training run: it means a net
/// input, activation or gradient became NaN or infinite, and continuing
/// would write corrupted values into every weight downstream.
#[derive(thiserror::Error, Debug)]
pub enum NnError {
    #[error("invalid {quantity}: {value}")]
    InvalidValue { quantity: &'static str, value: f64 },

    #[error("graph inconsistency: {0}")]
    GraphInconsistency(String),

    #[error("{what} length mismatch: expected {expected}, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NnError>;

/// Rejects NaN and infinities.
pub fn ensure_finite(quantity: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(NnError::InvalidValue { quantity, value })
    }
}
