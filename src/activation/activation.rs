use serde::{Serialize, Deserialize};

const SELU_SCALE_NEGATIVE: f64 = 1.758;
const SELU_SCALE_POSITIVE: f64 = 1.051;
const LEAKY_RELU_ALPHA: f64 = 1.0 / 128.0;

/// The activation applied by every node of a layer.
///
/// Every kind has an activation formula and its derivative, both taking the
/// node's pre-activation net input. The derivative must be evaluated at the
/// same net input that produced the forward value.
///
/// `SoftMax` is the only vector-aware kind: it normalizes across the whole
/// layer, so both of its formulas also take the layer's net inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationFunction {
    Selu,
    Relu,
    LeakyRelu,
    Sigmoid,
    Silu,
    SoftPlus,
    SoftMax,
    Tanh,
}

/// Forward/derivative formulas of one activation kind.
#[derive(Clone, Copy)]
pub enum ActivationPair {
    Scalar {
        function: fn(f64) -> f64,
        derivative: fn(f64) -> f64,
    },
    Vector {
        function: fn(&[f64], f64) -> f64,
        derivative: fn(&[f64], f64) -> f64,
    },
}

impl ActivationFunction {
    pub const ALL: [ActivationFunction; 8] = [
        ActivationFunction::Selu,
        ActivationFunction::Relu,
        ActivationFunction::LeakyRelu,
        ActivationFunction::Sigmoid,
        ActivationFunction::Silu,
        ActivationFunction::SoftPlus,
        ActivationFunction::SoftMax,
        ActivationFunction::Tanh,
    ];

    /// Looks up the formula pair for this kind.
    pub fn pair(self) -> ActivationPair {
        use ActivationPair::{Scalar, Vector};
        match self {
            ActivationFunction::Selu => Scalar { function: selu, derivative: selu_derivative },
            ActivationFunction::Relu => Scalar { function: relu, derivative: relu_derivative },
            ActivationFunction::LeakyRelu => Scalar { function: leaky_relu, derivative: leaky_relu_derivative },
            ActivationFunction::Sigmoid => Scalar { function: sigmoid, derivative: sigmoid_derivative },
            ActivationFunction::Silu => Scalar { function: silu, derivative: silu_derivative },
            ActivationFunction::SoftPlus => Scalar { function: soft_plus, derivative: soft_plus_derivative },
            ActivationFunction::SoftMax => Vector { function: softmax, derivative: softmax_derivative },
            ActivationFunction::Tanh => Scalar { function: tanh, derivative: tanh_derivative },
        }
    }

    pub fn is_vector(self) -> bool {
        matches!(self.pair(), ActivationPair::Vector { .. })
    }

    /// Forward transform of `net_input`. `layer_net_inputs` is only read by
    /// `SoftMax`; scalar kinds ignore it.
    pub fn activation(self, layer_net_inputs: &[f64], net_input: f64) -> f64 {
        match self.pair() {
            ActivationPair::Scalar { function, .. } => function(net_input),
            ActivationPair::Vector { function, .. } => function(layer_net_inputs, net_input),
        }
    }

    /// Derivative at `net_input`. For `SoftMax` this is the diagonal term
    /// `p * (1 - p)` of the Jacobian.
    pub fn derivative(self, layer_net_inputs: &[f64], net_input: f64) -> f64 {
        match self.pair() {
            ActivationPair::Scalar { derivative, .. } => derivative(net_input),
            ActivationPair::Vector { derivative, .. } => derivative(layer_net_inputs, net_input),
        }
    }
}

pub fn selu(x: f64) -> f64 {
    if x <= 0.0 { SELU_SCALE_NEGATIVE * (x.exp() - 1.0) } else { SELU_SCALE_POSITIVE * x }
}

pub fn selu_derivative(x: f64) -> f64 {
    if x <= 0.0 { SELU_SCALE_NEGATIVE * x.exp() } else { SELU_SCALE_POSITIVE }
}

pub fn relu(x: f64) -> f64 {
    if x >= 0.0 { x } else { 0.0 }
}

pub fn relu_derivative(x: f64) -> f64 {
    if x >= 0.0 { 1.0 } else { 0.0 }
}

pub fn leaky_relu(x: f64) -> f64 {
    if x >= 0.0 { x } else { LEAKY_RELU_ALPHA * x }
}

pub fn leaky_relu_derivative(x: f64) -> f64 {
    if x >= 0.0 { 1.0 } else { LEAKY_RELU_ALPHA }
}

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

pub fn sigmoid_derivative(x: f64) -> f64 {
    let s = sigmoid(x);
    s * (1.0 - s)
}

pub fn silu(x: f64) -> f64 {
    x * sigmoid(x)
}

pub fn silu_derivative(x: f64) -> f64 {
    let s = sigmoid(x);
    s * (1.0 + x * (1.0 - s))
}

/// `ln(1 + e^x)`, rewritten as `max(x, 0) + ln(1 + e^-|x|)` so large
/// positive inputs do not overflow the exponential.
pub fn soft_plus(x: f64) -> f64 {
    x.max(0.0) + (-x.abs()).exp().ln_1p()
}

pub fn soft_plus_derivative(x: f64) -> f64 {
    sigmoid(x)
}

pub fn tanh(x: f64) -> f64 {
    x.tanh()
}

pub fn tanh_derivative(x: f64) -> f64 {
    let t = x.tanh();
    1.0 - t * t
}

/// Safe softmax of `value` over `net_inputs`.
///
/// The maximum is subtracted before exponentiating so that large inputs
/// cannot overflow. `value` takes part in the maximum as well, which leaves
/// the result unchanged when it is one of `net_inputs` and keeps the
/// numerator bounded when it is not. An empty `net_inputs` yields infinity;
/// callers validate the result.
pub fn softmax(net_inputs: &[f64], value: f64) -> f64 {
    let max = net_inputs.iter().copied().fold(value, f64::max);
    let exp_sum: f64 = net_inputs.iter().map(|x| (x - max).exp()).sum();
    (value - max).exp() / exp_sum
}

pub fn softmax_derivative(net_inputs: &[f64], value: f64) -> f64 {
    let p = softmax(net_inputs, value);
    p * (1.0 - p)
}

/// Softmax of every element of `net_inputs`, in order.
pub fn softmax_all(net_inputs: &[f64]) -> Vec<f64> {
    net_inputs.iter().map(|&x| softmax(net_inputs, x)).collect()
}
