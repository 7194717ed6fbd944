use serde::{Serialize, Deserialize};

use crate::activation::ActivationFunction;
use crate::error::{ensure_finite, Result};
use crate::graph::{ConnectionId, Graph};
use crate::loss::CostFunction;

/// How an output node turns its target into a gradient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputGradientRule {
    /// `value − target`. This is the closed form of the chain rule ONLY for
    /// cross-entropy cost composed with a SoftMax output; it is wrong for
    /// any other pairing.
    SoftMaxCrossEntropy,
    /// `cost'(target, value) · activation'(net input)`.
    ChainRule {
        activation: ActivationFunction,
        cost: CostFunction,
    },
}

impl OutputGradientRule {
    /// Picks the closed form for SoftMax + cross-entropy and the general
    /// chain rule for everything else.
    pub fn for_pairing(activation: ActivationFunction, cost: CostFunction) -> OutputGradientRule {
        match (activation, cost) {
            (ActivationFunction::SoftMax, CostFunction::CrossEntropy) => {
                OutputGradientRule::SoftMaxCrossEntropy
            }
            _ => OutputGradientRule::ChainRule { activation, cost },
        }
    }
}

/// A unit of the network.
///
/// `gradient` is ∂L/∂(net input) for the example of the last backward pass.
/// `bias_derivative` accumulates gradients across a mini-batch and is only
/// cleared by `apply_bias_update`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub value: f64,
    pub bias: f64,
    pub bias_derivative: f64,
    pub bias_velocity: f64,
    pub gradient: f64,
    pub input_connections: Vec<ConnectionId>,
    pub output_connections: Vec<ConnectionId>,
}

impl Node {
    pub fn new(value: f64, bias: f64) -> Node {
        Node {
            value,
            bias,
            ..Node::default()
        }
    }

    /// Σ weight · value(source) over the incoming connections, plus bias.
    pub fn compute_net_input(&self, graph: &Graph) -> Result<f64> {
        let weighted: f64 = self.input_connections.iter()
            .map(|&id| {
                let con = graph.connection(id);
                con.weight * graph.node(con.node_in).value
            })
            .sum();
        ensure_finite("net input", weighted + self.bias)
    }

    /// Applies `activation` to `net_input` and stores the result as `value`.
    pub fn activate(
        &mut self,
        activation: ActivationFunction,
        layer_net_inputs: &[f64],
        net_input: f64,
    ) -> Result<f64> {
        self.value = ensure_finite("activation", activation.activation(layer_net_inputs, net_input))?;
        Ok(self.value)
    }

    /// Gradient of a hidden node: Σ gradient(target) · weight over the
    /// outgoing connections, times the activation derivative at this node's
    /// own net input. Downstream gradients must already be final.
    pub fn hidden_gradient(
        &self,
        graph: &Graph,
        activation: ActivationFunction,
        layer_net_inputs: &[f64],
    ) -> Result<f64> {
        let downstream: f64 = self.output_connections.iter()
            .map(|&id| {
                let con = graph.connection(id);
                graph.node(con.node_out).gradient * con.weight
            })
            .sum();
        let net_input = self.compute_net_input(graph)?;
        ensure_finite("gradient", downstream * activation.derivative(layer_net_inputs, net_input))
    }

    /// Gradient of an output node for `target`.
    pub fn output_gradient(
        &self,
        graph: &Graph,
        rule: OutputGradientRule,
        layer_net_inputs: &[f64],
        target: f64,
    ) -> Result<f64> {
        let gradient = match rule {
            OutputGradientRule::SoftMaxCrossEntropy => self.value - target,
            OutputGradientRule::ChainRule { activation, cost } => {
                let net_input = self.compute_net_input(graph)?;
                cost.derivative(target, self.value) * activation.derivative(layer_net_inputs, net_input)
            }
        };
        ensure_finite("gradient", gradient)
    }

    /// Adds the current gradient to the bias accumulator. Once per example.
    pub fn accumulate_bias_gradient(&mut self) {
        self.bias_derivative += self.gradient;
    }

    /// Momentum step; consumes the accumulated derivative.
    pub fn apply_bias_update(&mut self, training_step: f64, momentum: f64) {
        let velocity = self.bias_velocity * momentum - self.bias_derivative * training_step;
        self.bias_velocity = velocity;
        self.bias += velocity;
        self.bias_derivative = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NnError;

    /// source(value) --weight--> target(bias)
    fn pair(value: f64, weight: f64, bias: f64) -> (Graph, crate::graph::NodeId) {
        let mut graph = Graph::new();
        let source = graph.add_node(Node::new(value, 0.0));
        let target = graph.add_node(Node::new(0.0, bias));
        graph.connect(source, target, weight).unwrap();
        (graph, target)
    }

    #[test]
    fn net_input_is_weighted_sum_plus_bias() {
        let (graph, target) = pair(0.75, -1.5, 0.125);
        let net = graph.node(target).compute_net_input(&graph).unwrap();
        assert_eq!(net, -1.5 * 0.75 + 0.125);
    }

    #[test]
    fn infinite_net_input_is_fatal() {
        let (graph, target) = pair(f64::MAX, 4.0, 0.0);
        match graph.node(target).compute_net_input(&graph) {
            Err(NnError::InvalidValue { quantity, .. }) => assert_eq!(quantity, "net input"),
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn nan_gradient_is_fatal() {
        let (graph, target) = pair(1.0, 1.0, 0.0);
        let mut node = graph.node(target).clone();
        node.value = f64::NAN;
        let result = node.output_gradient(&graph, OutputGradientRule::SoftMaxCrossEntropy, &[], 1.0);
        assert!(matches!(result, Err(NnError::InvalidValue { .. })));
    }

    #[test]
    fn zero_derivative_and_zero_momentum_leave_bias_alone() {
        let mut node = Node::new(0.0, 0.7);
        node.bias_velocity = 3.0;
        node.apply_bias_update(0.5, 0.0);
        assert_eq!(node.bias, 0.7);
        assert_eq!(node.bias_velocity, 0.0);
    }

    #[test]
    fn bias_update_uses_the_accumulated_batch() {
        let mut node = Node::new(0.0, 1.0);
        node.gradient = 0.5;
        node.accumulate_bias_gradient();
        node.gradient = 0.3;
        node.accumulate_bias_gradient();
        assert!((node.bias_derivative - 0.8).abs() < 1e-12);

        node.apply_bias_update(0.1, 0.9);
        assert!((node.bias_velocity + 0.08).abs() < 1e-12);
        assert!((node.bias - 0.92).abs() < 1e-12);
        assert_eq!(node.bias_derivative, 0.0);
    }

    #[test]
    fn pairing_selects_closed_form_only_for_softmax_cross_entropy() {
        assert_eq!(
            OutputGradientRule::for_pairing(ActivationFunction::SoftMax, CostFunction::CrossEntropy),
            OutputGradientRule::SoftMaxCrossEntropy,
        );
        assert_eq!(
            OutputGradientRule::for_pairing(ActivationFunction::Sigmoid, CostFunction::CrossEntropy),
            OutputGradientRule::ChainRule {
                activation: ActivationFunction::Sigmoid,
                cost: CostFunction::CrossEntropy,
            },
        );
    }

    #[test]
    fn chain_rule_multiplies_cost_and_activation_derivatives() {
        let (mut graph, target) = pair(1.0, 0.5, 0.0);
        graph.node_mut(target).activate(ActivationFunction::Sigmoid, &[], 0.5).unwrap();
        let rule = OutputGradientRule::for_pairing(ActivationFunction::Sigmoid, CostFunction::Mse);
        let gradient = graph.node(target).output_gradient(&graph, rule, &[], 1.0).unwrap();
        let s = 1.0 / (1.0 + (-0.5f64).exp());
        assert!((gradient - (s - 1.0) * s * (1.0 - s)).abs() < 1e-12);
    }
}
