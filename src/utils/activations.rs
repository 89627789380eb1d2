//! Activation functions for recurrent networks
//!
//! This module provides the scalar squashing functions used by the recurrent
//! layers, their derivatives, gradient clipping and a row softmax:
//! - Sigmoid and tanh, with derivatives expressed via the function's own output
//! - Symmetric clipping of gradients to [-1, 1]
//! - Softmax (in-place, for the output layer)

/// Bound applied by [`clip`].
pub const CLIP_LIMIT: f64 = 1.0;

/// Sigmoid activation function.
///
/// Returns the sigmoid of the input: 1 / (1 + exp(-x))
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Sigmoid derivative assuming y = sigmoid(z).
///
/// Returns the derivative: y * (1 - y)
pub fn sigmoid_derivative(y: f64) -> f64 {
    y * (1.0 - y)
}

/// Hyperbolic tangent, squashing into (-1, 1).
pub fn tanh(x: f64) -> f64 {
    x.tanh()
}

/// Tanh derivative assuming y = tanh(z).
///
/// Returns the derivative: 1 - y²
pub fn tanh_derivative(y: f64) -> f64 {
    1.0 - y * y
}

/// Clamp a gradient into [-CLIP_LIMIT, CLIP_LIMIT].
pub fn clip(x: f64) -> f64 {
    x.clamp(-CLIP_LIMIT, CLIP_LIMIT)
}

/// Softmax applied in-place to a single row.
///
/// Converts logits to probabilities. Uses the max-subtraction trick for
/// numerical stability to avoid overflow with large values.
pub fn softmax_in_place(row: &mut [f64]) {
    if row.is_empty() {
        return;
    }

    let max_value = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let mut sum = 0.0;
    for value in row.iter_mut() {
        *value = (*value - max_value).exp();
        sum += *value;
    }

    let inv_sum = 1.0 / sum;
    for value in row.iter_mut() {
        *value *= inv_sum;
    }
}
