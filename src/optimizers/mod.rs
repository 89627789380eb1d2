//! Optimizer abstractions for parameter updates
//!
//! Every layer owns one optimizer instance per parameter tensor, so optimizer
//! state (such as the RMSProp cache) lives exactly as long as the parameters it
//! scales. The learning rate is supplied by the caller on every update.
//!
//! # Example
//!
//! ```ignore
//! use char_rnn::optimizers::{Optimizer, RmsProp};
//!
//! let mut optimizer = RmsProp::new(weights.len());
//! optimizer.update(&mut weights, &gradients, 1e-3);
//! ```

pub mod rmsprop;

pub use rmsprop::RmsProp;

/// Core trait for parameter optimizers.
///
/// # State Management
///
/// Optimizers may keep per-parameter state across updates. That state must
/// survive every `update` call and is only cleared by `reset`.
pub trait Optimizer {
    /// Update parameters in-place from their accumulated gradients.
    ///
    /// # Panics
    ///
    /// Implementations may panic if `parameters`, `gradients` and the
    /// optimizer state have different lengths.
    fn update(&mut self, parameters: &mut [f64], gradients: &[f64], learning_rate: f64);

    /// Clear any accumulated optimizer state.
    fn reset(&mut self);
}
