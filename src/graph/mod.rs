pub mod connection;
pub mod graph;
pub mod node;

use serde::{Serialize, Deserialize};

pub use connection::Connection;
pub use graph::Graph;
pub use node::{Node, OutputGradientRule};

/// Handle of a node inside a `Graph`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// Handle of a connection inside a `Graph`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub usize);
