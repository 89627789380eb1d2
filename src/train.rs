//! Training driver
//!
//! Slides a window over an encoded corpus, runs forward/backward through the
//! model for every window and tracks a smoothed cross-entropy loss.
//!
//! ## Windows
//!
//! A window of `T` timesteps consumes `T` consecutive symbols: symbols
//! `0..T-1` are the inputs of rows `1..T`, symbols `1..T` their targets.
//! Consecutive windows advance by `T - 1` symbols, so the state left in the
//! last row of one window is carried into the next one. Only the first
//! window of an epoch resets the state.

use crate::error::{config, shape, Error, Result};
use crate::model::SequenceModel;
use crate::sequence::Sequence;
use tracing::info;

/// Smallest probability used inside the logarithm.
const MIN_PROBABILITY: f64 = 1e-12;

/// Cross-entropy loss of one window and its gradient at the logits.
///
/// `targets[k]` is the expected symbol for row `k + 1` of `probs`. Returns
/// the mean loss per predicted symbol and `probs - onehot(targets)` (row 0
/// zero).
pub fn cross_entropy(probs: &Sequence, targets: &[usize]) -> Result<(f64, Sequence)> {
    if targets.len() + 1 != probs.steps() {
        return Err(shape(format!(
            "{} targets for a window of {} timesteps",
            targets.len(),
            probs.steps()
        )));
    }

    let mut grads = Sequence::zeros(probs.steps(), probs.width());
    let mut loss = 0.0;
    for (k, &target) in targets.iter().enumerate() {
        let t = k + 1;
        let row = probs.row(t);
        let p = row
            .get(target)
            .copied()
            .ok_or_else(|| shape(format!("target {} outside {} classes", target, row.len())))?;

        // NaN must survive the floor so divergence is reported.
        let floored = if p.is_nan() { p } else { p.max(MIN_PROBABILITY) };
        loss -= floored.ln();

        let grad = grads.row_mut(t);
        grad.copy_from_slice(row);
        grad[target] -= 1.0;
    }

    Ok((loss / targets.len().max(1) as f64, grads))
}

/// Exponentially smoothed loss, seeded with the first observation.
#[derive(Debug, Clone)]
pub struct LossTracker {
    smoothing: f64,
    value: Option<f64>,
}

impl LossTracker {
    pub const DEFAULT_SMOOTHING: f64 = 0.99;

    pub fn new(smoothing: f64) -> Self {
        Self {
            smoothing,
            value: None,
        }
    }

    pub fn observe(&mut self, loss: f64) -> f64 {
        let value = match self.value {
            Some(previous) => previous * self.smoothing + loss * (1.0 - self.smoothing),
            None => loss,
        };
        self.value = Some(value);
        value
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }
}

impl Default for LossTracker {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SMOOTHING)
    }
}

/// Result of one pass over the corpus.
#[derive(Debug, Clone, PartialEq)]
pub struct EpochSummary {
    pub windows: usize,
    /// Mean of the per-window losses of this epoch.
    pub mean_loss: f64,
    /// Smoothed loss at the end of the epoch.
    pub smoothed_loss: f64,
}

/// Owns the model and runs windows through it.
pub struct Trainer {
    model: SequenceModel,
    loss: LossTracker,
    windows_seen: usize,
}

impl Trainer {
    pub fn new(model: SequenceModel) -> Self {
        Self {
            model,
            loss: LossTracker::default(),
            windows_seen: 0,
        }
    }

    pub fn model(&self) -> &SequenceModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut SequenceModel {
        &mut self.model
    }

    pub fn into_model(self) -> SequenceModel {
        self.model
    }

    pub fn smoothed_loss(&self) -> Option<f64> {
        self.loss.value()
    }

    pub fn windows_seen(&self) -> usize {
        self.windows_seen
    }

    /// Train on one window of `window` consecutive symbols; returns its loss.
    ///
    /// # Errors
    ///
    /// Fails if `symbols` has the wrong length or the loss is not finite.
    pub fn train_window(&mut self, symbols: &[usize], reset: bool, learning_rate: f64) -> Result<f64> {
        let window = self.model.window();
        if symbols.len() != window {
            return Err(shape(format!(
                "training window needs {} symbols, got {}",
                window,
                symbols.len()
            )));
        }

        let inputs = Sequence::one_hot(&symbols[..window - 1], self.model.input_size())?;
        let probs = self.model.forward(&inputs, reset)?;
        let (loss, grads) = match cross_entropy(&probs, &symbols[1..]) {
            Ok(result) => result,
            Err(err) => {
                self.model.release();
                return Err(err);
            }
        };

        if !loss.is_finite() {
            self.model.release();
            return Err(Error::NonFinite(format!(
                "loss {} after {} windows",
                loss, self.windows_seen
            )));
        }

        self.model.backward(grads, learning_rate)?;
        self.loss.observe(loss);
        self.windows_seen += 1;
        Ok(loss)
    }

    /// One pass over `corpus`, resetting state on the first window only.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the corpus is shorter than one window.
    pub fn train_epoch(&mut self, corpus: &[usize], learning_rate: f64) -> Result<EpochSummary> {
        let window = self.model.window();
        if corpus.len() < window {
            return Err(config(format!(
                "corpus of {} symbols is shorter than the window of {}",
                corpus.len(),
                window
            )));
        }

        let mut windows = 0;
        let mut total = 0.0;
        let mut pos = 0;
        while pos + window <= corpus.len() {
            total += self.train_window(&corpus[pos..pos + window], pos == 0, learning_rate)?;
            windows += 1;
            pos += window - 1;
        }

        let summary = EpochSummary {
            windows,
            mean_loss: total / windows as f64,
            smoothed_loss: self.loss.value().unwrap_or(f64::NAN),
        };
        info!(
            windows = summary.windows,
            mean_loss = summary.mean_loss,
            smoothed_loss = summary.smoothed_loss,
            learning_rate,
            "epoch finished"
        );
        Ok(summary)
    }
}
