//! Stack of recurrent layers driven window by window.

use crate::error::{config, Result};
use crate::layers::RecurrentLayer;
use crate::sequence::Sequence;
use tracing::debug;

/// Ordered stack of layers sharing one window width.
///
/// Forward runs the layers first to last, backward last to first, each layer
/// consuming the gradient returned by the layer above it.
pub struct SequenceModel {
    layers: Vec<Box<dyn RecurrentLayer>>,
}

impl SequenceModel {
    /// Assemble a model, checking that adjacent layers fit together.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the stack is empty, if window widths
    /// differ, or if a layer's input width differs from the previous layer's
    /// output width.
    pub fn new(layers: Vec<Box<dyn RecurrentLayer>>) -> Result<Self> {
        let first = layers
            .first()
            .ok_or_else(|| config("model needs at least one layer"))?;
        let window = first.window();

        for (index, pair) in layers.windows(2).enumerate() {
            let (lower, upper) = (&pair[0], &pair[1]);
            if lower.output_size() != upper.input_size() {
                return Err(config(format!(
                    "layer {} ({}) outputs {} values but layer {} ({}) expects {}",
                    index,
                    lower.kind(),
                    lower.output_size(),
                    index + 1,
                    upper.kind(),
                    upper.input_size()
                )));
            }
        }

        if let Some((index, layer)) = layers
            .iter()
            .enumerate()
            .find(|(_, layer)| layer.window() != window)
        {
            return Err(config(format!(
                "layer {} ({}) has window {}, expected {}",
                index,
                layer.kind(),
                layer.window(),
                window
            )));
        }

        let model = Self { layers };
        debug!(
            layers = model.layers.len(),
            window,
            parameters = model.parameter_count(),
            "assembled sequence model"
        );
        Ok(model)
    }

    /// Run one window through every layer.
    pub fn forward(&mut self, inputs: &Sequence, reset: bool) -> Result<Sequence> {
        let mut current = inputs.clone();
        for layer in self.layers.iter_mut() {
            current = layer.forward(&current, reset)?.clone();
        }
        Ok(current)
    }

    /// Backpropagate one window through every layer and update parameters.
    ///
    /// Returns the gradient with respect to the model input.
    pub fn backward(&mut self, grad_outputs: Sequence, learning_rate: f64) -> Result<Sequence> {
        let mut grad = grad_outputs;
        for layer in self.layers.iter_mut().rev() {
            grad = layer.backward(&grad, learning_rate)?;
        }
        Ok(grad)
    }

    /// Drop the pending window of every layer.
    pub fn release(&mut self) {
        for layer in self.layers.iter_mut() {
            layer.release();
        }
    }

    pub fn layers(&self) -> &[Box<dyn RecurrentLayer>] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut [Box<dyn RecurrentLayer>] {
        &mut self.layers
    }

    pub fn window(&self) -> usize {
        self.layers[0].window()
    }

    pub fn input_size(&self) -> usize {
        self.layers[0].input_size()
    }

    pub fn output_size(&self) -> usize {
        self.layers[self.layers.len() - 1].output_size()
    }

    pub fn parameter_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.parameter_count()).sum()
    }
}
