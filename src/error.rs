//! Error type shared by every module of the crate.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building, running or training a model.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid dimensions or settings detected at construction/validation time.
    #[error("configuration error: {0}")]
    Config(String),

    /// A buffer passed at call time does not match the layer's fixed shape.
    #[error("shape error: {0}")]
    Shape(String),

    /// `forward` was called while the previous window still awaits `backward`.
    #[error("forward called while a previous window is still pending backward")]
    PendingForward,

    /// `backward` was called without a preceding `forward`.
    #[error("backward called without a pending forward pass")]
    NoPendingForward,

    /// Loss or gradients left the finite range.
    #[error("non-finite value encountered: {0}")]
    NonFinite(String),

    /// Character missing from the vocabulary.
    #[error("symbol {0:?} is not in the vocabulary")]
    UnknownSymbol(char),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn config(message: impl Into<String>) -> Error {
    Error::Config(message.into())
}

pub fn shape(message: impl Into<String>) -> Error {
    Error::Shape(message.into())
}
