//! Recurrent layer trait definition
//!
//! This module defines the core RecurrentLayer trait implemented by the simple
//! recurrent layer, the LSTM and the softmax output layer. The trait provides a
//! common interface for windowed forward propagation, backpropagation through
//! time, parameter updates and lifecycle resets.

use crate::error::Result;
use crate::layers::Gate;
use crate::sequence::Sequence;
use crate::utils::SimpleRng;

/// Core trait for layers that process a fixed-width window of timesteps.
///
/// Every layer is built for fixed input width, output width and window
/// width. Row 0 of each window is the carry slot: its input is ignored and
/// its output holds the state handed over from the previous window.
///
/// # Example
///
/// ```ignore
/// let outputs = layer.forward(&inputs, reset)?.clone();
/// let grad_inputs = layer.backward(&grad_outputs, learning_rate)?;
/// ```
pub trait RecurrentLayer {
    /// Forward propagation over one window.
    ///
    /// Reads `inputs` (`window × input_size`, never modified) and returns the
    /// layer output (`window × output_size`). With `reset` the carry row is
    /// zeroed, otherwise it receives the final-timestep state of the previous
    /// call.
    ///
    /// # Errors
    ///
    /// Fails on a shape mismatch, or with `PendingForward` if the previous
    /// window has neither been backpropagated nor released.
    fn forward(&mut self, inputs: &Sequence, reset: bool) -> Result<&Sequence>;

    /// Backpropagation through time over the pending window.
    ///
    /// Zeroes the parameter gradients, accumulates this window's gradients in
    /// reverse time order and returns the gradient with respect to the
    /// external input at every timestep (row 0 is always zero). Does not touch
    /// parameters.
    ///
    /// # Errors
    ///
    /// Fails on a shape mismatch, or with `NoPendingForward` if there is no
    /// forward state to replay.
    fn accumulate_gradients(&mut self, grad_outputs: &Sequence) -> Result<Sequence>;

    /// Drop the pending window without backpropagating it (inference, sampling).
    fn release(&mut self);

    /// Reallocate per-timestep state and return to the idle phase.
    fn reset_state(&mut self);

    /// Parameter blocks of this layer.
    fn gates(&self) -> &[Gate];

    fn gates_mut(&mut self) -> &mut [Gate];

    /// Get the input size of the layer.
    fn input_size(&self) -> usize;

    /// Get the output size of the layer.
    fn output_size(&self) -> usize;

    /// Number of timesteps per window, carry row included.
    fn window(&self) -> usize;

    /// Short layer name used in logs.
    fn kind(&self) -> &'static str;

    /// Full training step: accumulate, apply one optimizer step, clear gradients.
    fn backward(&mut self, grad_outputs: &Sequence, learning_rate: f64) -> Result<Sequence> {
        let grad_inputs = self.accumulate_gradients(grad_outputs)?;
        self.update(learning_rate);
        self.reset_gradients();
        Ok(grad_inputs)
    }

    /// Apply accumulated gradients to every gate.
    fn update(&mut self, learning_rate: f64) {
        for gate in self.gates_mut() {
            gate.update(learning_rate);
        }
    }

    /// Redraw every parameter from the initialization distribution.
    fn reset_parameters(&mut self, rng: &mut SimpleRng) {
        for gate in self.gates_mut() {
            gate.reset_parameters(rng);
        }
    }

    fn reset_gradients(&mut self) {
        for gate in self.gates_mut() {
            gate.reset_gradients();
        }
    }

    fn reset_caches(&mut self) {
        for gate in self.gates_mut() {
            gate.reset_caches();
        }
    }

    /// Get the number of trainable parameters in the layer.
    ///
    /// Returns the total count of weights and biases across all gates.
    fn parameter_count(&self) -> usize {
        self.gates().iter().map(Gate::parameter_count).sum()
    }
}
