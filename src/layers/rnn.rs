//! Simple recurrent layer implementation
//!
//! This module provides a SimpleRecurrentLayer with a single tanh recurrence:
//! output[t] = tanh(b + W · (input[t] ⧺ output[t-1]))

use crate::error::Result;
use crate::layers::{validate_dimensions, Gate, RecurrentLayer, WindowPhase};
use crate::sequence::Sequence;
use crate::utils::{clip, tanh, tanh_derivative, SimpleRng};
use tracing::debug;

/// Elman-style recurrent layer trained by backpropagation through time.
///
/// # Fields
///
/// * `input_size` - Width of the external input at each timestep
/// * `output_size` - Number of hidden units
/// * `window` - Timesteps per window, carry row included
/// * `outputs` - Hidden state per timestep (`window × output_size`)
/// * `concat` - Concatenated input per timestep (`window × (input_size + output_size)`)
/// * `gates` - Single parameter block over the concatenated input
///
/// # Example
///
/// ```ignore
/// use char_rnn::layers::{RecurrentLayer, SimpleRecurrentLayer};
/// use char_rnn::utils::SimpleRng;
///
/// let mut rng = SimpleRng::new(42);
/// let layer = SimpleRecurrentLayer::new(65, 128, 24, &mut rng)?;
/// assert_eq!(layer.parameter_count(), 128 + 128 * (65 + 128));
/// ```
pub struct SimpleRecurrentLayer {
    input_size: usize,
    output_size: usize,
    window: usize,
    outputs: Sequence,
    concat: Sequence,
    gates: [Gate; 1],
    phase: WindowPhase,
}

impl SimpleRecurrentLayer {
    /// Create a layer with parameters drawn uniformly from [-0.5, 0.5).
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a width is zero or the window has
    /// fewer than two timesteps.
    pub fn new(
        input_size: usize,
        output_size: usize,
        window: usize,
        rng: &mut SimpleRng,
    ) -> Result<Self> {
        validate_dimensions("rnn", input_size, output_size, window)?;

        let concat_size = input_size + output_size;
        let mut layer = Self {
            input_size,
            output_size,
            window,
            outputs: Sequence::zeros(window, output_size),
            concat: Sequence::zeros(window, concat_size),
            gates: [Gate::new(output_size, concat_size)],
            phase: WindowPhase::Idle,
        };

        layer.reset_state();
        layer.reset_parameters(rng);
        layer.reset_gradients();
        layer.reset_caches();

        debug!(
            input_size,
            output_size,
            window,
            parameters = layer.parameter_count(),
            "constructed rnn layer"
        );
        Ok(layer)
    }

    /// Hidden state of the most recent forward pass.
    pub fn outputs(&self) -> &Sequence {
        &self.outputs
    }
}

impl RecurrentLayer for SimpleRecurrentLayer {
    fn forward(&mut self, inputs: &Sequence, reset: bool) -> Result<&Sequence> {
        inputs.expect_shape(self.window, self.input_size, "rnn inputs")?;
        self.phase.begin_forward()?;

        if reset {
            self.outputs.row_mut(0).fill(0.0);
        } else {
            self.outputs.copy_row(self.window - 1, 0);
        }

        let gate = &self.gates[0];
        for t in 1..self.window {
            {
                let (x, h) = self.concat.row_mut(t).split_at_mut(self.input_size);
                x.copy_from_slice(inputs.row(t));
                h.copy_from_slice(self.outputs.row(t - 1));
            }

            let vcx = self.concat.row(t);
            let out = self.outputs.row_mut(t);
            for (j, y) in out.iter_mut().enumerate() {
                *y = tanh(gate.pre_activation(j, vcx));
            }
        }

        Ok(&self.outputs)
    }

    fn accumulate_gradients(&mut self, grad_outputs: &Sequence) -> Result<Sequence> {
        grad_outputs.expect_shape(self.window, self.output_size, "rnn output gradients")?;
        self.phase.begin_backward()?;
        for gate in self.gates.iter_mut() {
            gate.reset_gradients();
        }

        let mut grad_inputs = Sequence::zeros(self.window, self.input_size);
        // Gradient reaching output[t] through the recurrent input of step t+1.
        let mut carried = vec![0.0; self.output_size];
        let gate = &mut self.gates[0];

        for t in (1..self.window).rev() {
            let mut dy = std::mem::replace(&mut carried, vec![0.0; self.output_size]);
            let vcx = self.concat.row(t);
            let y = self.outputs.row(t);
            let grads = grad_outputs.row(t);

            for (j, d) in dy.iter_mut().enumerate() {
                *d += clip(grads[j]);
                *d *= tanh_derivative(y[j]);
            }

            let grad_x = grad_inputs.row_mut(t);
            for (j, &d) in dy.iter().enumerate() {
                gate.accumulate(j, d, vcx);

                let (w_x, w_h) = gate.row(j).split_at(self.input_size);
                for (g, &w) in grad_x.iter_mut().zip(w_x) {
                    *g += w * d;
                }
                for (c, &w) in carried.iter_mut().zip(w_h) {
                    *c += w * d;
                }
            }
        }

        Ok(grad_inputs)
    }

    fn release(&mut self) {
        self.phase.release();
    }

    fn reset_state(&mut self) {
        self.outputs = Sequence::zeros(self.window, self.output_size);
        self.concat = Sequence::zeros(self.window, self.input_size + self.output_size);
        self.phase = WindowPhase::Idle;
    }

    fn gates(&self) -> &[Gate] {
        &self.gates
    }

    fn gates_mut(&mut self) -> &mut [Gate] {
        &mut self.gates
    }

    fn input_size(&self) -> usize {
        self.input_size
    }

    fn output_size(&self) -> usize {
        self.output_size
    }

    fn window(&self) -> usize {
        self.window
    }

    fn kind(&self) -> &'static str {
        "rnn"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rnn_creation() {
        let mut rng = SimpleRng::new(42);
        let layer = SimpleRecurrentLayer::new(3, 5, 4, &mut rng).unwrap();

        assert_eq!(layer.input_size(), 3);
        assert_eq!(layer.output_size(), 5);
        assert_eq!(layer.window(), 4);
        assert_eq!(layer.gates()[0].fan_in(), 8);
    }

    #[test]
    fn test_rnn_parameter_count() {
        let mut rng = SimpleRng::new(42);
        let layer = SimpleRecurrentLayer::new(65, 128, 24, &mut rng).unwrap();

        // 128 biases + 128 × (65 + 128) weights
        assert_eq!(layer.parameter_count(), 128 + 128 * 193);
    }

    #[test]
    fn test_rnn_rejects_degenerate_dimensions() {
        let mut rng = SimpleRng::new(42);
        assert!(SimpleRecurrentLayer::new(0, 4, 4, &mut rng).is_err());
        assert!(SimpleRecurrentLayer::new(3, 0, 4, &mut rng).is_err());
        assert!(SimpleRecurrentLayer::new(3, 4, 1, &mut rng).is_err());
    }

    #[test]
    fn test_rnn_outputs_bounded_by_tanh() {
        let mut rng = SimpleRng::new(7);
        let mut layer = SimpleRecurrentLayer::new(3, 4, 6, &mut rng).unwrap();
        let inputs = Sequence::one_hot(&[0, 1, 2, 0, 1], 3).unwrap();

        let outputs = layer.forward(&inputs, true).unwrap();
        assert_eq!(outputs.row(0), &[0.0; 4]);
        for row in outputs.rows().skip(1) {
            assert!(row.iter().all(|y| y.abs() < 1.0));
        }
    }

    #[test]
    fn test_rnn_backward_clears_gradients() {
        let mut rng = SimpleRng::new(11);
        let mut layer = SimpleRecurrentLayer::new(3, 4, 5, &mut rng).unwrap();
        let inputs = Sequence::one_hot(&[0, 1, 2, 0], 3).unwrap();
        layer.forward(&inputs, true).unwrap();

        let mut grads = Sequence::zeros(5, 4);
        grads.as_mut_slice().fill(0.3);
        let grad_inputs = layer.backward(&grads, 0.01).unwrap();

        assert_eq!(grad_inputs.steps(), 5);
        assert_eq!(grad_inputs.width(), 3);
        assert_eq!(grad_inputs.row(0), &[0.0; 3]);
        assert!(layer.gates()[0].weight_gradients().iter().all(|&g| g == 0.0));
        assert!(layer.gates()[0].weight_cache().iter().any(|&c| c > 0.0));
    }
}
