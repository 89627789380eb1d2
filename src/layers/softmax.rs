//! Softmax output layer implementation
//!
//! Projects the hidden state of each timestep onto the vocabulary and
//! normalizes it into a categorical distribution:
//! p[t] = softmax(b + W · hidden[t])

use crate::error::Result;
use crate::layers::{validate_dimensions, Gate, RecurrentLayer, WindowPhase};
use crate::sequence::Sequence;
use crate::utils::{clip, softmax_in_place, SimpleRng};
use tracing::debug;

/// Output projection followed by softmax.
///
/// The layer carries no state between windows: the carry row of its output
/// is always zero and `reset` has no effect.
///
/// The backward pass expects the gradient of the cross-entropy loss at the
/// logits, which for a softmax/cross-entropy pair is `predicted - target`.
pub struct SoftmaxLayer {
    input_size: usize,
    output_size: usize,
    window: usize,
    inputs: Sequence,
    outputs: Sequence,
    gates: [Gate; 1],
    phase: WindowPhase,
}

impl SoftmaxLayer {
    /// Create a projection from `input_size` hidden units onto `output_size` classes.
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
        validate_dimensions("softmax", input_size, output_size, window)?;

        let mut layer = Self {
            input_size,
            output_size,
            window,
            inputs: Sequence::zeros(window, input_size),
            outputs: Sequence::zeros(window, output_size),
            gates: [Gate::new(output_size, input_size)],
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
            "constructed softmax layer"
        );
        Ok(layer)
    }
}

impl RecurrentLayer for SoftmaxLayer {
    fn forward(&mut self, inputs: &Sequence, _reset: bool) -> Result<&Sequence> {
        inputs.expect_shape(self.window, self.input_size, "softmax inputs")?;
        self.phase.begin_forward()?;

        self.inputs.as_mut_slice().copy_from_slice(inputs.as_slice());

        let gate = &self.gates[0];
        for t in 1..self.window {
            let hidden = self.inputs.row(t);
            let probs = self.outputs.row_mut(t);
            for (j, p) in probs.iter_mut().enumerate() {
                *p = gate.pre_activation(j, hidden);
            }
            softmax_in_place(probs);
        }

        Ok(&self.outputs)
    }

    fn accumulate_gradients(&mut self, grad_outputs: &Sequence) -> Result<Sequence> {
        grad_outputs.expect_shape(self.window, self.output_size, "softmax output gradients")?;
        self.phase.begin_backward()?;
        for gate in self.gates.iter_mut() {
            gate.reset_gradients();
        }

        let mut grad_inputs = Sequence::zeros(self.window, self.input_size);
        let gate = &mut self.gates[0];

        for t in (1..self.window).rev() {
            let hidden = self.inputs.row(t);
            let grad_hidden = grad_inputs.row_mut(t);

            for (j, &g) in grad_outputs.row(t).iter().enumerate() {
                let dy = clip(g);
                gate.accumulate(j, dy, hidden);
                for (gh, &w) in grad_hidden.iter_mut().zip(gate.row(j)) {
                    *gh += w * dy;
                }
            }
        }

        Ok(grad_inputs)
    }

    fn release(&mut self) {
        self.phase.release();
    }

    fn reset_state(&mut self) {
        self.inputs = Sequence::zeros(self.window, self.input_size);
        self.outputs = Sequence::zeros(self.window, self.output_size);
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
        "softmax"
    }
}
