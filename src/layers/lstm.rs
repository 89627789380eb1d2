//! Long short-term memory layer implementation
//!
//! Four gates per output unit read the same concatenated input
//! vcx[t] = input[t] ⧺ output[t-1]:
//!
//! ```text
//! i = sigmoid(b_i + W_i · vcx)      input gate
//! f = sigmoid(b_f + W_f · vcx)      forget gate
//! o = sigmoid(b_o + W_o · vcx)      output gate
//! g = tanh(b_g + W_g · vcx)         candidate
//! cell[t]   = g · i + cell[t-1] · f
//! output[t] = tanh(cell[t]) · o
//! ```

use crate::error::Result;
use crate::layers::{validate_dimensions, Gate, RecurrentLayer, WindowPhase};
use crate::sequence::Sequence;
use crate::utils::{clip, sigmoid, sigmoid_derivative, tanh, tanh_derivative, SimpleRng};
use tracing::debug;

/// Index of the input gate in [`LstmLayer::gates`].
pub const INPUT_GATE: usize = 0;
/// Index of the forget gate.
pub const FORGET_GATE: usize = 1;
/// Index of the output gate.
pub const OUTPUT_GATE: usize = 2;
/// Index of the candidate (cell input) block.
pub const CANDIDATE: usize = 3;

const GATE_COUNT: usize = 4;

/// LSTM layer trained by backpropagation through time.
///
/// Per-timestep activations of all four gates, the cell state and the output
/// are retained for the whole window so that the backward pass can replay
/// them in reverse order.
pub struct LstmLayer {
    input_size: usize,
    output_size: usize,
    window: usize,
    /// Squashed gate values per timestep, indexed like `gates`.
    activations: [Sequence; GATE_COUNT],
    cells: Sequence,
    outputs: Sequence,
    concat: Sequence,
    gates: [Gate; GATE_COUNT],
    phase: WindowPhase,
}

impl LstmLayer {
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
        validate_dimensions("lstm", input_size, output_size, window)?;

        let concat_size = input_size + output_size;
        let mut layer = Self {
            input_size,
            output_size,
            window,
            activations: std::array::from_fn(|_| Sequence::zeros(window, output_size)),
            cells: Sequence::zeros(window, output_size),
            outputs: Sequence::zeros(window, output_size),
            concat: Sequence::zeros(window, concat_size),
            gates: std::array::from_fn(|_| Gate::new(output_size, concat_size)),
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
            "constructed lstm layer"
        );
        Ok(layer)
    }

    /// Output of the most recent forward pass.
    pub fn outputs(&self) -> &Sequence {
        &self.outputs
    }

    /// Cell state of the most recent forward pass.
    pub fn cells(&self) -> &Sequence {
        &self.cells
    }

    /// Squashed activations of one gate (see [`INPUT_GATE`] and friends).
    pub fn activations(&self, gate: usize) -> &Sequence {
        &self.activations[gate]
    }
}

impl RecurrentLayer for LstmLayer {
    fn forward(&mut self, inputs: &Sequence, reset: bool) -> Result<&Sequence> {
        inputs.expect_shape(self.window, self.input_size, "lstm inputs")?;
        self.phase.begin_forward()?;

        if reset {
            self.cells.row_mut(0).fill(0.0);
            self.outputs.row_mut(0).fill(0.0);
        } else {
            self.cells.copy_row(self.window - 1, 0);
            self.outputs.copy_row(self.window - 1, 0);
        }

        for t in 1..self.window {
            {
                let (x, h) = self.concat.row_mut(t).split_at_mut(self.input_size);
                x.copy_from_slice(inputs.row(t));
                h.copy_from_slice(self.outputs.row(t - 1));
            }
            let vcx = self.concat.row(t);

            for (k, (gate, activation)) in self
                .gates
                .iter()
                .zip(self.activations.iter_mut())
                .enumerate()
            {
                let squash: fn(f64) -> f64 = if k == CANDIDATE { tanh } else { sigmoid };
                for (j, a) in activation.row_mut(t).iter_mut().enumerate() {
                    *a = squash(gate.pre_activation(j, vcx));
                }
            }

            let [gate_i, gate_f, gate_o, candidate] = &self.activations;
            for j in 0..self.output_size {
                let cell = candidate.row(t)[j] * gate_i.row(t)[j]
                    + self.cells.row(t - 1)[j] * gate_f.row(t)[j];
                self.cells.row_mut(t)[j] = cell;
                self.outputs.row_mut(t)[j] = tanh(cell) * gate_o.row(t)[j];
            }
        }

        Ok(&self.outputs)
    }

    fn accumulate_gradients(&mut self, grad_outputs: &Sequence) -> Result<Sequence> {
        grad_outputs.expect_shape(self.window, self.output_size, "lstm output gradients")?;
        self.phase.begin_backward()?;
        for gate in self.gates.iter_mut() {
            gate.reset_gradients();
        }

        let mut grad_inputs = Sequence::zeros(self.window, self.input_size);
        let mut d_cell = vec![0.0; self.output_size];
        let mut d_output = vec![0.0; self.output_size];
        let [gate_i, gate_f, gate_o, candidate] = &self.activations;

        for t in (1..self.window).rev() {
            let mut d_output_prev = vec![0.0; self.output_size];
            let vcx = self.concat.row(t);
            let grads = grad_outputs.row(t);
            let grad_x = grad_inputs.row_mut(t);

            for j in 0..self.output_size {
                let i = gate_i.row(t)[j];
                let f = gate_f.row(t)[j];
                let o = gate_o.row(t)[j];
                let g = candidate.row(t)[j];

                d_output[j] += clip(grads[j]);
                let tanh_cell = tanh(self.cells.row(t)[j]);
                let d_gate_output = tanh_cell * d_output[j];

                d_cell[j] += o * d_output[j] * tanh_derivative(tanh_cell);

                let d_gate_forget = self.cells.row(t - 1)[j] * d_cell[j];
                let d_gate_input = g * d_cell[j];
                let d_candidate = i * d_cell[j];

                d_cell[j] *= f;

                let mut deltas = [0.0; GATE_COUNT];
                deltas[INPUT_GATE] = sigmoid_derivative(i) * d_gate_input;
                deltas[FORGET_GATE] = sigmoid_derivative(f) * d_gate_forget;
                deltas[OUTPUT_GATE] = sigmoid_derivative(o) * d_gate_output;
                deltas[CANDIDATE] = tanh_derivative(g) * d_candidate;

                for (gate, &delta) in self.gates.iter_mut().zip(deltas.iter()) {
                    gate.accumulate(j, delta, vcx);

                    let (w_x, w_h) = gate.row(j).split_at(self.input_size);
                    for (gx, &w) in grad_x.iter_mut().zip(w_x) {
                        *gx += w * delta;
                    }
                    for (dh, &w) in d_output_prev.iter_mut().zip(w_h) {
                        *dh += w * delta;
                    }
                }
            }

            // Recomputed in full from the four gates; only d_cell carries over.
            d_output = d_output_prev;
        }

        Ok(grad_inputs)
    }

    fn release(&mut self) {
        self.phase.release();
    }

    fn reset_state(&mut self) {
        let concat_size = self.input_size + self.output_size;
        for activation in self.activations.iter_mut() {
            *activation = Sequence::zeros(self.window, self.output_size);
        }
        self.cells = Sequence::zeros(self.window, self.output_size);
        self.outputs = Sequence::zeros(self.window, self.output_size);
        self.concat = Sequence::zeros(self.window, concat_size);
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
        "lstm"
    }
}
