use serde::{Serialize, Deserialize};

use crate::activation::ActivationFunction;
use crate::error::{NnError, Result};
use crate::graph::{Graph, NodeId, OutputGradientRule};

/// Ordered group of nodes sharing one activation.
///
/// For an output layer the node order is the order of the target vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub nodes: Vec<NodeId>,
    pub activation: ActivationFunction,
}

impl Layer {
    pub fn new(nodes: Vec<NodeId>, activation: ActivationFunction) -> Layer {
        Layer { nodes, activation }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Rejects handles that `graph` never handed out.
    pub fn check_nodes(&self, graph: &Graph) -> Result<()> {
        match self.nodes.iter().find(|&&id| !graph.contains(id)) {
            Some(id) => Err(NnError::GraphInconsistency(format!("layer refers to unknown node {}", id.0))),
            None => Ok(()),
        }
    }

    /// One fresh net input per node, in node order.
    pub fn compute_all_net_inputs(&self, graph: &Graph) -> Result<Vec<f64>> {
        self.check_nodes(graph)?;
        self.nodes.iter()
            .map(|&id| graph.compute_net_input(id))
            .collect()
    }

    /// Net inputs for the layer, but only when the activation reads them.
    fn vector_context(&self, graph: &Graph) -> Result<Vec<f64>> {
        if self.activation.is_vector() {
            self.compute_all_net_inputs(graph)
        } else {
            Ok(Vec::new())
        }
    }

    /// Computes every node's net input, then activates them. The previous
    /// layer must already hold this example's values.
    pub fn forward(&self, graph: &mut Graph) -> Result<Vec<f64>> {
        let net_inputs = self.compute_all_net_inputs(graph)?;
        self.nodes.iter().zip(net_inputs.iter())
            .map(|(&id, &net_input)| graph.activate(id, self.activation, &net_inputs, net_input))
            .collect()
    }

    pub fn values(&self, graph: &Graph) -> Vec<f64> {
        self.nodes.iter().map(|&id| graph.node(id).value).collect()
    }

    /// Output-layer gradients for `targets`, one per node.
    pub fn update_output_gradients(
        &self,
        graph: &mut Graph,
        targets: &[f64],
        rule: OutputGradientRule,
    ) -> Result<()> {
        if targets.len() != self.nodes.len() {
            return Err(NnError::ShapeMismatch {
                what: "target",
                expected: self.nodes.len(),
                actual: targets.len(),
            });
        }
        self.check_nodes(graph)?;
        let net_inputs = match rule {
            OutputGradientRule::SoftMaxCrossEntropy => Vec::new(),
            OutputGradientRule::ChainRule { activation, .. } if activation.is_vector() => {
                self.compute_all_net_inputs(graph)?
            }
            OutputGradientRule::ChainRule { .. } => Vec::new(),
        };
        for (&id, &target) in self.nodes.iter().zip(targets.iter()) {
            graph.update_output_gradient(id, rule, &net_inputs, target)?;
        }
        Ok(())
    }

    /// Hidden-layer gradients. Every downstream layer must be done first.
    pub fn update_hidden_gradients(&self, graph: &mut Graph) -> Result<()> {
        self.check_nodes(graph)?;
        let net_inputs = self.vector_context(graph)?;
        for &id in &self.nodes {
            graph.update_hidden_gradient(id, self.activation, &net_inputs)?;
        }
        Ok(())
    }

    /// Adds this example's gradients to the bias accumulators and to the
    /// weight accumulators of the incoming connections.
    ///
    /// # Panics
    /// Panics on node handles foreign to `graph`; `forward` reports those
    /// as an error first.
    pub fn accumulate_gradients(&self, graph: &mut Graph) {
        for &id in &self.nodes {
            graph.accumulate_bias_gradient(id);
            for i in 0..graph.node(id).input_connections.len() {
                let con = graph.node(id).input_connections[i];
                graph.accumulate_weight_gradient(con);
            }
        }
    }

    /// Momentum update of biases and incoming weights. Panics on foreign
    /// node handles, like `accumulate_gradients`.
    pub fn apply_updates(&self, graph: &mut Graph, training_step: f64, momentum: f64) {
        for &id in &self.nodes {
            graph.apply_bias_update(id, training_step, momentum);
            for i in 0..graph.node(id).input_connections.len() {
                let con = graph.node(id).input_connections[i];
                graph.apply_weight_update(con, training_step, momentum);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::softmax_all;
    use crate::graph::Node;
    use crate::loss::CostFunction;

    /// Two inputs fully connected to `size` nodes.
    fn fan_out(inputs: [f64; 2], weights: &[[f64; 2]], activation: ActivationFunction) -> (Graph, Layer) {
        let mut graph = Graph::new();
        let sources: Vec<NodeId> = inputs.iter().map(|&v| graph.add_node(Node::new(v, 0.0))).collect();
        let mut nodes = Vec::new();
        for row in weights {
            let id = graph.add_node(Node::new(0.0, 0.1));
            for (&src, &w) in sources.iter().zip(row.iter()) {
                graph.connect(src, id, w).unwrap();
            }
            nodes.push(id);
        }
        (graph, Layer::new(nodes, activation))
    }

    #[test]
    fn net_inputs_follow_node_order() {
        let (graph, layer) = fan_out([1.0, 2.0], &[[1.0, 0.0], [0.0, 1.0], [-1.0, -1.0]], ActivationFunction::Relu);
        let net = layer.compute_all_net_inputs(&graph).unwrap();
        for (actual, expected) in net.iter().zip([1.1, 2.1, -2.9]) {
            assert!((actual - expected).abs() < 1e-12);
        }
        assert_eq!(net.len(), 3);
    }

    #[test]
    fn softmax_layer_normalizes_across_nodes() {
        let (mut graph, layer) = fan_out([1.0, 2.0], &[[1.0, 0.0], [0.0, 1.0], [3.0, 3.0]], ActivationFunction::SoftMax);
        let values = layer.forward(&mut graph).unwrap();
        let expected = softmax_all(&[1.1, 2.1, 9.1]);
        for (v, e) in values.iter().zip(expected.iter()) {
            assert!((v - e).abs() < 1e-12);
        }
        assert!((values.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert_eq!(layer.values(&graph), values);
    }

    #[test]
    fn softmax_cross_entropy_gradient_is_residual() {
        let (mut graph, layer) = fan_out([0.5, -0.5], &[[1.0, 2.0], [2.0, 1.0]], ActivationFunction::SoftMax);
        let values = layer.forward(&mut graph).unwrap();
        let rule = OutputGradientRule::for_pairing(ActivationFunction::SoftMax, CostFunction::CrossEntropy);
        layer.update_output_gradients(&mut graph, &[0.0, 1.0], rule).unwrap();
        assert_eq!(graph.node(layer.nodes[0]).gradient, values[0]);
        assert_eq!(graph.node(layer.nodes[1]).gradient, values[1] - 1.0);
    }

    #[test]
    fn general_softmax_path_uses_layer_net_inputs() {
        let (mut graph, layer) = fan_out([0.5, -0.5], &[[1.0, 2.0], [2.0, 1.0]], ActivationFunction::SoftMax);
        let values = layer.forward(&mut graph).unwrap();
        let rule = OutputGradientRule::ChainRule {
            activation: ActivationFunction::SoftMax,
            cost: CostFunction::Mse,
        };
        layer.update_output_gradients(&mut graph, &[0.0, 1.0], rule).unwrap();
        let p = values[1];
        assert!((graph.node(layer.nodes[1]).gradient - (p - 1.0) * p * (1.0 - p)).abs() < 1e-12);
    }

    #[test]
    fn target_length_must_match() {
        let (mut graph, layer) = fan_out([1.0, 1.0], &[[1.0, 1.0]], ActivationFunction::Sigmoid);
        layer.forward(&mut graph).unwrap();
        let rule = OutputGradientRule::for_pairing(ActivationFunction::Sigmoid, CostFunction::Mse);
        assert!(matches!(
            layer.update_output_gradients(&mut graph, &[1.0, 0.0], rule),
            Err(NnError::ShapeMismatch { expected: 1, actual: 2, .. })
        ));
    }

    #[test]
    fn foreign_node_handles_are_reported() {
        let (mut graph, _) = fan_out([1.0, 1.0], &[[1.0, 1.0]], ActivationFunction::Tanh);
        let layer = Layer::new(vec![NodeId(2), NodeId(40)], ActivationFunction::Tanh);
        assert!(matches!(layer.forward(&mut graph), Err(NnError::GraphInconsistency(_))));
        assert!(matches!(layer.update_hidden_gradients(&mut graph), Err(NnError::GraphInconsistency(_))));
        let rule = OutputGradientRule::for_pairing(ActivationFunction::Tanh, CostFunction::Mse);
        assert!(matches!(
            layer.update_output_gradients(&mut graph, &[0.0, 0.0], rule),
            Err(NnError::GraphInconsistency(_))
        ));
    }

    #[test]
    fn updates_touch_biases_and_incoming_weights() {
        let (mut graph, layer) = fan_out([1.0, 2.0], &[[1.0, 1.0]], ActivationFunction::LeakyRelu);
        let id = layer.nodes[0];
        graph.node_mut(id).gradient = 0.5;
        layer.accumulate_gradients(&mut graph);
        layer.apply_updates(&mut graph, 0.1, 0.0);

        assert!((graph.node(id).bias - 0.05).abs() < 1e-12);
        let incoming = graph.node(id).input_connections.clone();
        assert!((graph.connection(incoming[0]).weight - 0.95).abs() < 1e-12);
        assert!((graph.connection(incoming[1]).weight - 0.9).abs() < 1e-12);
        assert_eq!(graph.connection(incoming[1]).weight_derivative, 0.0);
    }
}
