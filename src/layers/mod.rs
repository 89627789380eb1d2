//! Layer abstractions for recurrent networks
//!
//! This module provides the RecurrentLayer trait and its implementations: the
//! simple tanh recurrence, the LSTM and the softmax output projection. All of
//! them share the `Gate` parameter block and the forward/backward phase guard.

mod r#trait;
pub mod gate;
pub mod lstm;
pub mod phase;
pub mod rnn;
pub mod softmax;

pub use gate::Gate;
pub use lstm::LstmLayer;
pub use phase::WindowPhase;
pub use r#trait::RecurrentLayer;
pub use rnn::SimpleRecurrentLayer;
pub use softmax::SoftmaxLayer;

use crate::error::{config, Result};

/// Check construction-time dimensions shared by every layer type.
pub(crate) fn validate_dimensions(
    kind: &str,
    input_size: usize,
    output_size: usize,
    window: usize,
) -> Result<()> {
    if input_size == 0 || output_size == 0 {
        return Err(config(format!(
            "{} layer needs non-zero widths, got input {} and output {}",
            kind, input_size, output_size
        )));
    }
    if window < 2 {
        return Err(config(format!(
            "{} layer window must hold a carry row and at least one timestep, got {}",
            kind, window
        )));
    }
    Ok(())
}
