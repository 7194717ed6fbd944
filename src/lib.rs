pub mod error;
pub mod activation;
pub mod loss;
pub mod graph;
pub mod layers;
pub mod network;
pub mod train;

// Convenience re-exports
pub use error::{NnError, Result};
pub use activation::activation::ActivationFunction;
pub use loss::loss_type::CostFunction;
pub use graph::{Graph, Node, NodeId, Connection, ConnectionId, OutputGradientRule};
pub use layers::dense::Layer;
pub use network::network::Network;
pub use network::spec::{NetworkSpec, LayerSpec};
pub use train::{train_loop, TrainConfig, EpochStats};
