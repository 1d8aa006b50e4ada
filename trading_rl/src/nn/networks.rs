//! Network definitions.
//!
//! All networks share the same body: dense layers with ReLU activations.
//! Policy heads end in a softmax over the three trading actions; value heads
//! are a single linear unit.

use burn::module::Module;
use burn::nn::{Linear, LinearConfig};
use burn::tensor::activation::{relu, softmax};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::core::N_ACTIONS;

/// Hidden layer widths.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkConfig {
    pub hidden_sizes: Vec<usize>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            hidden_sizes: vec![512, 256, 64],
        }
    }
}

impl NetworkConfig {
    pub fn new(hidden_sizes: Vec<usize>) -> Self {
        Self { hidden_sizes }
    }

    /// Width of the last hidden layer, or `input` if there is none.
    fn output_size(&self, input: usize) -> usize {
        self.hidden_sizes.last().copied().unwrap_or(input)
    }
}

/// Stack of dense ReLU layers.
#[derive(Module, Debug)]
pub struct Mlp<B: Backend> {
    layers: Vec<Linear<B>>,
}

impl<B: Backend> Mlp<B> {
    pub fn new(input: usize, config: &NetworkConfig, device: &B::Device) -> Self {
        let mut layers = Vec::with_capacity(config.hidden_sizes.len());
        let mut d_input = input;
        for &d_output in &config.hidden_sizes {
            layers.push(LinearConfig::new(d_input, d_output).init(device));
            d_input = d_output;
        }
        Self { layers }
    }

    pub fn forward(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        self.layers
            .iter()
            .fold(x, |h, layer| relu(layer.forward(h)))
    }
}

/// Policy network: flattened window → action probabilities [batch, 3].
#[derive(Module, Debug)]
pub struct PolicyNet<B: Backend> {
    body: Mlp<B>,
    head: Linear<B>,
}

impl<B: Backend> PolicyNet<B> {
    pub fn new(input: usize, config: &NetworkConfig, device: &B::Device) -> Self {
        Self {
            body: Mlp::new(input, config, device),
            head: LinearConfig::new(config.output_size(input), N_ACTIONS).init(device),
        }
    }

    pub fn forward(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        softmax(self.head.forward(self.body.forward(x)), 1)
    }
}

/// Value network: flattened window → value estimate [batch, 1].
#[derive(Module, Debug)]
pub struct ValueNet<B: Backend> {
    body: Mlp<B>,
    head: Linear<B>,
}

impl<B: Backend> ValueNet<B> {
    pub fn new(input: usize, config: &NetworkConfig, device: &B::Device) -> Self {
        Self {
            body: Mlp::new(input, config, device),
            head: LinearConfig::new(config.output_size(input), 1).init(device),
        }
    }

    pub fn forward(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        self.head.forward(self.body.forward(x))
    }
}

/// One trunk, two heads.
#[derive(Module, Debug)]
pub struct SharedNet<B: Backend> {
    trunk: Mlp<B>,
    policy_head: Linear<B>,
    value_head: Linear<B>,
}

impl<B: Backend> SharedNet<B> {
    pub fn new(input: usize, config: &NetworkConfig, device: &B::Device) -> Self {
        let features = config.output_size(input);
        Self {
            trunk: Mlp::new(input, config, device),
            policy_head: LinearConfig::new(features, N_ACTIONS).init(device),
            value_head: LinearConfig::new(features, 1).init(device),
        }
    }

    /// Action probabilities [batch, 3].
    pub fn forward_policy(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        softmax(self.policy_head.forward(self.trunk.forward(x)), 1)
    }

    /// Value estimates [batch, 1].
    pub fn forward_value(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        self.value_head.forward(self.trunk.forward(x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type B = NdArray<f32>;

    #[test]
    fn test_policy_rows_sum_to_one() {
        let device = Default::default();
        let net = PolicyNet::<B>::new(6, &NetworkConfig::new(vec![8, 4]), &device);
        let probs = net.forward(Tensor::ones([5, 6], &device));

        assert_eq!(probs.dims(), [5, 3]);
        let sums = probs.sum_dim(1).into_data().to_vec::<f32>().unwrap();
        for s in sums {
            assert!((s - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_value_and_shared_shapes() {
        let device = Default::default();
        let config = NetworkConfig::new(vec![8]);
        let value = ValueNet::<B>::new(6, &config, &device);
        assert_eq!(value.forward(Tensor::zeros([4, 6], &device)).dims(), [4, 1]);

        let shared = SharedNet::<B>::new(6, &config, &device);
        assert_eq!(shared.forward_policy(Tensor::zeros([4, 6], &device)).dims(), [4, 3]);
        assert_eq!(shared.forward_value(Tensor::zeros([4, 6], &device)).dims(), [4, 1]);
    }

    #[test]
    fn test_no_hidden_layers() {
        let device = Default::default();
        let net = PolicyNet::<B>::new(6, &NetworkConfig::new(vec![]), &device);
        assert_eq!(net.forward(Tensor::zeros([2, 6], &device)).dims(), [2, 3]);
    }
}
