use serde::{Serialize, Deserialize};

use crate::activation::ActivationFunction;
use crate::error::{NnError, Result};
use crate::graph::{Connection, ConnectionId, Node, NodeId, OutputGradientRule};

/// Arena owning every node and connection of a network.
///
/// Nodes refer to their connections, and connections to their endpoints,
/// through the integer handles handed out by `add_node` and `connect`. The
/// topology is fixed once built; training only mutates scalar fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    nodes: Vec<Node>,
    connections: Vec<Connection>,
}

impl Graph {
    pub fn new() -> Graph {
        Graph::default()
    }

    pub fn add_node(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Creates a connection `from -> to` and registers it on both endpoints.
    pub fn connect(&mut self, from: NodeId, to: NodeId, weight: f64) -> Result<ConnectionId> {
        for id in [from, to] {
            if id.0 >= self.nodes.len() {
                return Err(NnError::GraphInconsistency(format!("unknown node {}", id.0)));
            }
        }
        let id = ConnectionId(self.connections.len());
        self.connections.push(Connection::new(from, to, weight));
        self.nodes[from.0].output_connections.push(id);
        self.nodes[to.0].input_connections.push(id);
        Ok(id)
    }

    /// # Panics
    /// Panics if `id` was not handed out by this graph.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// # Panics
    /// Panics if `id` was not handed out by this graph.
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// # Panics
    /// Panics if `id` was not handed out by this graph.
    pub fn connection(&self, id: ConnectionId) -> &Connection {
        &self.connections[id.0]
    }

    /// # Panics
    /// Panics if `id` was not handed out by this graph.
    pub fn connection_mut(&mut self, id: ConnectionId) -> &mut Connection {
        &mut self.connections[id.0]
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    /// Zeroes every bias and weight accumulator, discarding a partially
    /// accumulated batch. Velocities are kept.
    pub fn clear_accumulators(&mut self) {
        for node in &mut self.nodes {
            node.bias_derivative = 0.0;
        }
        for con in &mut self.connections {
            con.weight_derivative = 0.0;
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Verifies that every connection is listed exactly once as an output
    /// of its source and once as an input of its destination, and that no
    /// node lists a connection that does not point back at it.
    ///
    /// Meant for construction and loading, not for every training step.
    pub fn check_symmetry(&self) -> Result<()> {
        for (index, con) in self.connections.iter().enumerate() {
            let id = ConnectionId(index);
            for (end, node_id) in [("source", con.node_in), ("destination", con.node_out)] {
                if node_id.0 >= self.nodes.len() {
                    return Err(NnError::GraphInconsistency(format!(
                        "connection {} has unknown {} node {}", index, end, node_id.0
                    )));
                }
            }
            let outgoing = self.nodes[con.node_in.0].output_connections.iter()
                .filter(|&&c| c == id)
                .count();
            let incoming = self.nodes[con.node_out.0].input_connections.iter()
                .filter(|&&c| c == id)
                .count();
            if outgoing != 1 || incoming != 1 {
                return Err(NnError::GraphInconsistency(format!(
                    "connection {} listed {} time(s) by its source and {} time(s) by its destination",
                    index, outgoing, incoming
                )));
            }
        }

        for (index, node) in self.nodes.iter().enumerate() {
            let points_back = |ids: &[ConnectionId], outgoing: bool| {
                ids.iter().all(|c| {
                    self.connections.get(c.0).map_or(false, |con| {
                        let end = if outgoing { con.node_in } else { con.node_out };
                        end.0 == index
                    })
                })
            };
            if !points_back(node.output_connections.as_slice(), true)
                || !points_back(node.input_connections.as_slice(), false)
            {
                return Err(NnError::GraphInconsistency(format!(
                    "node {} lists a connection that does not belong to it", index
                )));
            }
        }
        Ok(())
    }

    // Id-based wrappers around the per-node operations. Each reads the
    // arena immutably, then writes the one field it owns.

    pub fn compute_net_input(&self, id: NodeId) -> Result<f64> {
        self.node(id).compute_net_input(self)
    }

    pub fn activate(
        &mut self,
        id: NodeId,
        activation: ActivationFunction,
        layer_net_inputs: &[f64],
        net_input: f64,
    ) -> Result<f64> {
        self.node_mut(id).activate(activation, layer_net_inputs, net_input)
    }

    pub fn update_hidden_gradient(
        &mut self,
        id: NodeId,
        activation: ActivationFunction,
        layer_net_inputs: &[f64],
    ) -> Result<()> {
        let gradient = self.node(id).hidden_gradient(self, activation, layer_net_inputs)?;
        self.node_mut(id).gradient = gradient;
        Ok(())
    }

    pub fn update_output_gradient(
        &mut self,
        id: NodeId,
        rule: OutputGradientRule,
        layer_net_inputs: &[f64],
        target: f64,
    ) -> Result<()> {
        let gradient = self.node(id).output_gradient(self, rule, layer_net_inputs, target)?;
        self.node_mut(id).gradient = gradient;
        Ok(())
    }

    pub fn accumulate_bias_gradient(&mut self, id: NodeId) {
        self.node_mut(id).accumulate_bias_gradient();
    }

    pub fn apply_bias_update(&mut self, id: NodeId, training_step: f64, momentum: f64) {
        self.node_mut(id).apply_bias_update(training_step, momentum);
    }

    pub fn accumulate_weight_gradient(&mut self, id: ConnectionId) {
        let con = self.connection(id);
        let input_value = self.node(con.node_in).value;
        let output_gradient = self.node(con.node_out).gradient;
        self.connection_mut(id).accumulate_weight_gradient(input_value, output_gradient);
    }

    pub fn apply_weight_update(&mut self, id: ConnectionId, training_step: f64, momentum: f64) {
        self.connection_mut(id).apply_weight_update(training_step, momentum);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_registers_both_endpoints() {
        let mut graph = Graph::new();
        let a = graph.add_node(Node::default());
        let b = graph.add_node(Node::default());
        let c = graph.connect(a, b, 0.5).unwrap();

        assert_eq!(graph.node(a).output_connections, vec![c]);
        assert_eq!(graph.node(b).input_connections, vec![c]);
        assert!(graph.node(a).input_connections.is_empty());
        assert_eq!(graph.connection(c).node_in, a);
        assert_eq!(graph.connection(c).node_out, b);
        graph.check_symmetry().unwrap();
    }

    #[test]
    fn connect_rejects_unknown_nodes() {
        let mut graph = Graph::new();
        let a = graph.add_node(Node::default());
        assert!(matches!(
            graph.connect(a, NodeId(7), 1.0),
            Err(NnError::GraphInconsistency(_))
        ));
        assert_eq!(graph.connection_count(), 0);
        assert!(graph.node(a).output_connections.is_empty());
    }

    #[test]
    fn one_sided_connection_is_detected() {
        let mut graph = Graph::new();
        let a = graph.add_node(Node::default());
        let b = graph.add_node(Node::default());
        let c = graph.connect(a, b, 1.0).unwrap();
        graph.node_mut(b).input_connections.clear();
        assert!(matches!(graph.check_symmetry(), Err(NnError::GraphInconsistency(_))));

        graph.node_mut(b).input_connections.push(c);
        graph.node_mut(a).input_connections.push(c);
        assert!(matches!(graph.check_symmetry(), Err(NnError::GraphInconsistency(_))));
    }

    #[test]
    fn weight_gradient_is_source_value_times_destination_gradient() {
        let mut graph = Graph::new();
        let a = graph.add_node(Node::new(3.0, 0.0));
        let b = graph.add_node(Node::default());
        let c = graph.connect(a, b, 1.0).unwrap();
        graph.node_mut(b).gradient = -0.5;

        graph.accumulate_weight_gradient(c);
        graph.accumulate_weight_gradient(c);
        assert_eq!(graph.connection(c).weight_derivative, -3.0);

        graph.apply_weight_update(c, 0.1, 0.0);
        assert!((graph.connection(c).weight - 1.3).abs() < 1e-12);
        assert_eq!(graph.connection(c).weight_derivative, 0.0);
    }

    #[test]
    fn clearing_accumulators_keeps_velocity() {
        let mut graph = Graph::new();
        let a = graph.add_node(Node::new(1.0, 0.0));
        let b = graph.add_node(Node::default());
        let c = graph.connect(a, b, 1.0).unwrap();
        graph.node_mut(b).gradient = 2.0;
        graph.node_mut(b).bias_velocity = 0.3;
        graph.accumulate_bias_gradient(b);
        graph.accumulate_weight_gradient(c);

        graph.clear_accumulators();
        assert_eq!(graph.node(b).bias_derivative, 0.0);
        assert_eq!(graph.connection(c).weight_derivative, 0.0);
        assert_eq!(graph.node(b).bias_velocity, 0.3);
        assert!(graph.contains(b));
        assert!(!graph.contains(NodeId(2)));
    }

    #[test]
    fn hidden_gradient_pulls_from_downstream() {
        // input -> hidden -> {out1, out2}
        let mut graph = Graph::new();
        let input = graph.add_node(Node::new(1.0, 0.0));
        let hidden = graph.add_node(Node::new(0.0, 0.5));
        let out1 = graph.add_node(Node::default());
        let out2 = graph.add_node(Node::default());
        graph.connect(input, hidden, 2.0).unwrap();
        graph.connect(hidden, out1, 0.25).unwrap();
        graph.connect(hidden, out2, -1.0).unwrap();
        graph.node_mut(out1).gradient = 4.0;
        graph.node_mut(out2).gradient = 0.5;

        graph.update_hidden_gradient(hidden, ActivationFunction::Tanh, &[]).unwrap();
        let t = 2.5f64.tanh();
        let expected = (4.0 * 0.25 + 0.5 * -1.0) * (1.0 - t * t);
        assert!((graph.node(hidden).gradient - expected).abs() < 1e-12);
    }
}
