//! Parameter block shared by all layer types.
//!
//! A `Gate` holds, for every output unit, a bias and a weight row over the
//! layer's (concatenated) input, together with the matching gradient
//! accumulators and RMSProp caches. The simple recurrent layer uses one gate,
//! the LSTM four, and the softmax projection one.

use crate::optimizers::{Optimizer, RmsProp};
use crate::utils::SimpleRng;

/// Parameters are drawn uniformly from [-INIT_RANGE, INIT_RANGE).
pub const INIT_RANGE: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct Gate {
    fan_in: usize,
    /// Row-major, `units` rows of `fan_in` values.
    weights: Vec<f64>,
    biases: Vec<f64>,
    weight_gradients: Vec<f64>,
    bias_gradients: Vec<f64>,
    weight_optimizer: RmsProp,
    bias_optimizer: RmsProp,
}

impl Gate {
    /// Zero-initialized gate; call [`Gate::reset_parameters`] to randomize it.
    pub fn new(units: usize, fan_in: usize) -> Self {
        Self {
            fan_in,
            weights: vec![0.0; units * fan_in],
            biases: vec![0.0; units],
            weight_gradients: vec![0.0; units * fan_in],
            bias_gradients: vec![0.0; units],
            weight_optimizer: RmsProp::new(units * fan_in),
            bias_optimizer: RmsProp::new(units),
        }
    }

    pub fn fan_in(&self) -> usize {
        self.fan_in
    }

    /// Weight row of one output unit.
    pub fn row(&self, unit: usize) -> &[f64] {
        &self.weights[unit * self.fan_in..(unit + 1) * self.fan_in]
    }

    /// `bias[unit] + Σ_i weight[unit][i] · x[i]`
    pub fn pre_activation(&self, unit: usize, x: &[f64]) -> f64 {
        self.row(unit)
            .iter()
            .zip(x)
            .fold(self.biases[unit], |sum, (w, xi)| sum + w * xi)
    }

    /// Add `delta` to the bias gradient and `x · delta` to the weight row gradient.
    pub fn accumulate(&mut self, unit: usize, delta: f64, x: &[f64]) {
        self.bias_gradients[unit] += delta;
        let start = unit * self.fan_in;
        for (grad, xi) in self.weight_gradients[start..start + self.fan_in]
            .iter_mut()
            .zip(x)
        {
            *grad += xi * delta;
        }
    }

    /// One RMSProp step over every weight and bias.
    pub fn update(&mut self, learning_rate: f64) {
        self.weight_optimizer
            .update(&mut self.weights, &self.weight_gradients, learning_rate);
        self.bias_optimizer
            .update(&mut self.biases, &self.bias_gradients, learning_rate);
    }

    pub fn reset_parameters(&mut self, rng: &mut SimpleRng) {
        for value in self.weights.iter_mut().chain(self.biases.iter_mut()) {
            *value = rng.gen_range_f64(-INIT_RANGE, INIT_RANGE);
        }
    }

    pub fn reset_gradients(&mut self) {
        self.weight_gradients.fill(0.0);
        self.bias_gradients.fill(0.0);
    }

    pub fn reset_caches(&mut self) {
        self.weight_optimizer.reset();
        self.bias_optimizer.reset();
    }

    pub fn parameter_count(&self) -> usize {
        self.weights.len() + self.biases.len()
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn weights_mut(&mut self) -> &mut [f64] {
        &mut self.weights
    }

    pub fn biases(&self) -> &[f64] {
        &self.biases
    }

    pub fn biases_mut(&mut self) -> &mut [f64] {
        &mut self.biases
    }

    pub fn weight_gradients(&self) -> &[f64] {
        &self.weight_gradients
    }

    pub fn bias_gradients(&self) -> &[f64] {
        &self.bias_gradients
    }

    pub fn weight_cache(&self) -> &[f64] {
        self.weight_optimizer.cache()
    }

    pub fn bias_cache(&self) -> &[f64] {
        self.bias_optimizer.cache()
    }
}
