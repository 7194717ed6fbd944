use std::collections::HashSet;

use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::error::{ensure_finite, NnError, Result};
use crate::graph::{Graph, Node, NodeId, OutputGradientRule};
use crate::layers::dense::Layer;
use crate::loss::CostFunction;
use crate::network::spec::NetworkSpec;

/// Layers wired over a shared `Graph`, driven forward input → output and
/// backward output → input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub graph: Graph,
    /// Input nodes; their values are set directly by `forward`.
    pub inputs: Vec<NodeId>,
    /// Hidden layers followed by the output layer.
    pub layers: Vec<Layer>,
    pub cost: CostFunction,
}

impl Network {
    /// Builds a fully connected network from `spec` with random weights.
    pub fn from_spec(spec: &NetworkSpec) -> Result<Network> {
        Network::from_spec_with_rng(spec, &mut rand::thread_rng())
    }

    /// Same as `from_spec`, drawing initial weights from `rng`.
    ///
    /// Weights are uniform in ±sqrt(6 / (fan_in + fan_out)); biases start at 0.
    pub fn from_spec_with_rng<R: Rng + ?Sized>(spec: &NetworkSpec, rng: &mut R) -> Result<Network> {
        spec.validate()?;

        let mut graph = Graph::new();
        let inputs: Vec<NodeId> = (0..spec.input_size)
            .map(|_| graph.add_node(Node::default()))
            .collect();

        let mut previous = inputs.clone();
        let mut layers = Vec::with_capacity(spec.layers.len());
        for layer_spec in &spec.layers {
            let limit = (6.0 / (previous.len() + layer_spec.size) as f64).sqrt();
            let mut nodes = Vec::with_capacity(layer_spec.size);
            for _ in 0..layer_spec.size {
                let id = graph.add_node(Node::default());
                for &source in &previous {
                    graph.connect(source, id, rng.gen_range(-limit..limit))?;
                }
                nodes.push(id);
            }
            previous = nodes.clone();
            layers.push(Layer::new(nodes, layer_spec.activation));
        }

        log::debug!(
            "built network '{}': {} nodes, {} connections, {} layers",
            spec.name,
            graph.node_count(),
            graph.connection_count(),
            layers.len() + 1
        );
        Network::from_parts(graph, inputs, layers, spec.cost)
    }

    /// Assembles a network from an already wired graph. The graph's
    /// connection symmetry is checked here, once, and every node may appear
    /// in at most one place among the inputs and layers.
    pub fn from_parts(
        graph: Graph,
        inputs: Vec<NodeId>,
        layers: Vec<Layer>,
        cost: CostFunction,
    ) -> Result<Network> {
        if inputs.is_empty() {
            return Err(NnError::InvalidConfig("input layer must have at least one node".into()));
        }
        if layers.is_empty() || layers.iter().any(Layer::is_empty) {
            return Err(NnError::InvalidConfig("every layer needs at least one node".into()));
        }
        let mut seen = HashSet::new();
        for &id in inputs.iter().chain(layers.iter().flat_map(|l| l.nodes.iter())) {
            if !graph.contains(id) {
                return Err(NnError::GraphInconsistency(format!("layer refers to unknown node {}", id.0)));
            }
            if !seen.insert(id) {
                return Err(NnError::GraphInconsistency(format!("node {} appears in more than one place", id.0)));
            }
        }
        graph.check_symmetry()?;
        Ok(Network { graph, inputs, layers, cost })
    }

    pub fn input_size(&self) -> usize {
        self.inputs.len()
    }

    pub fn output_size(&self) -> usize {
        self.output_layer().len()
    }

    fn output_layer(&self) -> &Layer {
        &self.layers[self.layers.len() - 1]
    }

    /// Gradient rule for the output layer's activation and the cost.
    pub fn output_rule(&self) -> OutputGradientRule {
        OutputGradientRule::for_pairing(self.output_layer().activation, self.cost)
    }

    /// Forward pass; returns the output layer's values.
    pub fn forward(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        if input.len() != self.inputs.len() {
            return Err(NnError::ShapeMismatch {
                what: "input",
                expected: self.inputs.len(),
                actual: input.len(),
            });
        }
        for (&id, &value) in self.inputs.iter().zip(input.iter()) {
            self.graph.node_mut(id).value = ensure_finite("input", value)?;
        }
        let mut output = Vec::new();
        for layer in &self.layers {
            output = layer.forward(&mut self.graph)?;
        }
        Ok(output)
    }

    /// Backward pass for the example of the last `forward`: output layer
    /// first, then hidden layers in reverse.
    pub fn backward(&mut self, targets: &[f64]) -> Result<()> {
        let rule = self.output_rule();
        let (output, hidden) = match self.layers.split_last() {
            Some(split) => split,
            None => return Err(NnError::InvalidConfig("network has no layers".into())),
        };
        output.update_output_gradients(&mut self.graph, targets, rule)?;
        for layer in hidden.iter().rev() {
            layer.update_hidden_gradients(&mut self.graph)?;
        }
        Ok(())
    }

    /// Adds the current gradients to every bias and weight accumulator.
    pub fn accumulate_gradients(&mut self) {
        for layer in &self.layers {
            layer.accumulate_gradients(&mut self.graph);
        }
    }

    /// Drops whatever was accumulated since the last update.
    pub fn clear_accumulators(&mut self) {
        self.graph.clear_accumulators();
    }

    /// One momentum update from everything accumulated since the last one.
    pub fn apply_updates(&mut self, training_step: f64, momentum: f64) {
        for layer in &self.layers {
            layer.apply_updates(&mut self.graph, training_step, momentum);
        }
    }

    /// Forward, backward and accumulate for one example, without updating.
    /// Returns the example's loss.
    pub fn train_example(&mut self, input: &[f64], targets: &[f64]) -> Result<f64> {
        let output = self.forward(input)?;
        self.backward(targets)?;
        self.accumulate_gradients();
        Ok(self.cost.total(targets, &output))
    }

    /// Serializes the full network state to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a network written by `save_json`, re-checking the graph.
    pub fn load_json(path: &str) -> Result<Network> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let network: Network = serde_json::from_reader(reader)?;
        Network::from_parts(network.graph, network.inputs, network.layers, network.cost)
    }
}
