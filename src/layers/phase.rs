//! Forward/backward alternation guard.

use crate::error::{Error, Result};

/// Whether a layer holds forward state that has not been backpropagated yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowPhase {
    #[default]
    Idle,
    Forwarded,
}

impl WindowPhase {
    /// Enter the forwarded phase; fails if the previous window is still pending.
    pub fn begin_forward(&mut self) -> Result<()> {
        match self {
            WindowPhase::Forwarded => Err(Error::PendingForward),
            WindowPhase::Idle => {
                *self = WindowPhase::Forwarded;
                Ok(())
            }
        }
    }

    /// Consume the pending window; fails if there is none.
    pub fn begin_backward(&mut self) -> Result<()> {
        match self {
            WindowPhase::Idle => Err(Error::NoPendingForward),
            WindowPhase::Forwarded => {
                *self = WindowPhase::Idle;
                Ok(())
            }
        }
    }

    /// Drop the pending window without backpropagating it.
    pub fn release(&mut self) {
        *self = WindowPhase::Idle;
    }

    pub fn is_pending(&self) -> bool {
        *self == WindowPhase::Forwarded
    }
}
