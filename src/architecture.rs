//! Architecture configuration structures
//!
//! This module describes the recurrent stack of a model as a list of layer
//! configurations and turns it into a [`SequenceModel`]. The softmax output
//! layer is always appended on top of the configured stack.

use crate::error::{config, Result};
use crate::layers::{LstmLayer, RecurrentLayer, SimpleRecurrentLayer, SoftmaxLayer};
use crate::model::SequenceModel;
use crate::utils::SimpleRng;
use serde::Deserialize;

/// Layer types accepted in `layer_type`.
pub const LAYER_TYPES: [&str; 2] = ["lstm", "rnn"];

/// Configuration for a single recurrent layer.
///
/// # Example
///
/// ```json
/// { "layer_type": "lstm", "size": 160 }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LayerConfig {
    /// Type of layer: "lstm" or "rnn"
    pub layer_type: String,

    /// Number of hidden units
    pub size: usize,
}

impl LayerConfig {
    pub fn lstm(size: usize) -> Self {
        Self {
            layer_type: "lstm".to_string(),
            size,
        }
    }

    pub fn rnn(size: usize) -> Self {
        Self {
            layer_type: "rnn".to_string(),
            size,
        }
    }
}

/// Check every layer entry and that the stack is non-empty.
pub fn validate_architecture(layers: &[LayerConfig]) -> Result<()> {
    if layers.is_empty() {
        return Err(config("architecture must contain at least one recurrent layer"));
    }

    for (index, layer) in layers.iter().enumerate() {
        if !LAYER_TYPES.contains(&layer.layer_type.as_str()) {
            return Err(config(format!(
                "Layer {}: invalid layer_type '{}'. Must be one of: {}",
                index,
                layer.layer_type,
                LAYER_TYPES.join(", ")
            )));
        }
        if layer.size == 0 {
            return Err(config(format!("Layer {}: size must be positive", index)));
        }
    }

    Ok(())
}

/// Build a model for `vocab_size` symbols and the given window width.
///
/// Layer `k` reads the output of layer `k - 1` (the one-hot input for `k = 0`);
/// a softmax layer projects the last hidden state back onto the vocabulary.
pub fn build_model(
    layers: &[LayerConfig],
    vocab_size: usize,
    window: usize,
    rng: &mut SimpleRng,
) -> Result<SequenceModel> {
    validate_architecture(layers)?;

    let mut stack: Vec<Box<dyn RecurrentLayer>> = Vec::with_capacity(layers.len() + 1);
    let mut input_size = vocab_size;

    for layer in layers {
        let built: Box<dyn RecurrentLayer> = match layer.layer_type.as_str() {
            "lstm" => Box::new(LstmLayer::new(input_size, layer.size, window, rng)?),
            "rnn" => Box::new(SimpleRecurrentLayer::new(input_size, layer.size, window, rng)?),
            other => return Err(config(format!("unknown layer type '{}'", other))),
        };
        stack.push(built);
        input_size = layer.size;
    }

    stack.push(Box::new(SoftmaxLayer::new(input_size, vocab_size, window, rng)?));
    SequenceModel::new(stack)
}
