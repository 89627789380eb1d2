//! Character-level recurrent networks
//!
//! This library trains character-level sequence models by backpropagation
//! through time over a sliding window of a text stream, and samples new text
//! from them.
//!
//! # Modules
//!
//! - `layers`: RecurrentLayer trait and implementations (RNN, LSTM, Softmax)
//! - `optimizers`: Optimizer trait and the RMSProp implementation
//! - `utils`: Shared utilities (RNG, activation functions, LR schedules)
//! - `sequence`: Fixed-width window of per-timestep vectors
//! - `model`: Stack of layers driven window by window
//! - `architecture`: Layer configuration and model building
//! - `config`: Training configuration structures
//! - `vocabulary`: Character ↔ index mapping
//! - `train`: Windowed training loop and cross-entropy loss
//! - `sampling`: Weighted sampling and text generation
//! - `error`: Crate error type

pub mod architecture;
pub mod config;
pub mod error;
pub mod layers;
pub mod model;
pub mod optimizers;
pub mod sampling;
pub mod sequence;
pub mod train;
pub mod utils;
pub mod vocabulary;

pub use error::{Error, Result};
pub use model::SequenceModel;
pub use sequence::Sequence;
pub use vocabulary::Vocabulary;
