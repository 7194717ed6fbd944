use serde::{Serialize, Deserialize};

use crate::activation::ActivationFunction;
use crate::error::{NnError, Result};
use crate::loss::CostFunction;

/// Describes one non-input layer in a network specification.
///
/// Fields:
/// - `size`       — number of nodes in this layer
/// - `activation` — activation applied by every node of the layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub size: usize,
    pub activation: ActivationFunction,
}

/// A fully serializable description of a fully connected network: input
/// width, hidden and output layers (input → output), and the cost applied
/// to the output layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Number of input nodes.
    pub input_size: usize,
    /// Hidden layers followed by the output layer.
    pub layers: Vec<LayerSpec>,
    /// Cost function applied to the output layer.
    pub cost: CostFunction,
}

impl NetworkSpec {
    /// Rejects empty networks and zero-width layers.
    pub fn validate(&self) -> Result<()> {
        if self.input_size == 0 {
            return Err(NnError::InvalidConfig("input layer must have at least one node".into()));
        }
        if self.layers.is_empty() {
            return Err(NnError::InvalidConfig("network needs an output layer".into()));
        }
        if let Some(i) = self.layers.iter().position(|l| l.size == 0) {
            return Err(NnError::InvalidConfig(format!("layer {} has no nodes", i + 1)));
        }
        Ok(())
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes and validates a `NetworkSpec` from a JSON file.
    pub fn load_json(path: &str) -> Result<NetworkSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let spec: NetworkSpec = serde_json::from_reader(reader)?;
        spec.validate()?;
        Ok(spec)
    }
}
