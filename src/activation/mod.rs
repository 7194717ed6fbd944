pub mod activation;

pub use activation::{ActivationFunction, ActivationPair, softmax, softmax_all};
