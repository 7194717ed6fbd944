use serde::{Serialize, Deserialize};

use crate::graph::NodeId;

/// Directed weighted edge between two nodes of a `Graph`.
///
/// Both endpoints are plain handles into the graph's node arena; the
/// connection does not own either node. The handle of a connection appears
/// in exactly one node's `output_connections` (`node_in`) and one node's
/// `input_connections` (`node_out`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub weight: f64,
    pub weight_derivative: f64,
    pub weight_velocity: f64,
    pub node_in: NodeId,
    pub node_out: NodeId,
}

impl Connection {
    pub fn new(node_in: NodeId, node_out: NodeId, weight: f64) -> Connection {
        Connection {
            weight,
            weight_derivative: 0.0,
            weight_velocity: 0.0,
            node_in,
            node_out,
        }
    }

    /// Adds this example's ∂L/∂w = gradient(node_out) · value(node_in).
    pub fn accumulate_weight_gradient(&mut self, input_value: f64, output_gradient: f64) {
        self.weight_derivative += output_gradient * input_value;
    }

    /// Momentum step; consumes the accumulated derivative.
    pub fn apply_weight_update(&mut self, training_step: f64, momentum: f64) {
        let velocity = self.weight_velocity * momentum - self.weight_derivative * training_step;
        self.weight_velocity = velocity;
        self.weight += velocity;
        self.weight_derivative = 0.0;
    }
}
