//! Configuration structures for training
//!
//! This module provides the training configuration: window width, recurrent
//! architecture, learning rate schedule and sampling settings. Every field is
//! optional in the JSON file and falls back to the defaults below.

use crate::architecture::{validate_architecture, LayerConfig};
use crate::error::{config, Result};
use crate::utils::lr_scheduler::{
    ConstantLR, ExponentialDecay, InverseTimeDecay, LRScheduler, StepDecay,
};
use serde::Deserialize;
use std::fs;

/// Scheduler types accepted in `scheduler_type`.
pub const SCHEDULER_TYPES: [&str; 4] = ["constant", "step_decay", "exponential", "inverse_time"];

/// Configuration for a training run.
///
/// Different scheduler types read different optional fields:
///
/// - **constant**: no parameters
/// - **step_decay**: requires `step_size` and `gamma`
/// - **exponential**: requires `decay_rate`
/// - **inverse_time**: optional `decay` (default `learning_rate / epochs`)
///
/// # Example
///
/// ```json
/// {
///   "window": 24,
///   "epochs": 25,
///   "learning_rate": 0.001,
///   "scheduler_type": "inverse_time",
///   "layers": [{ "layer_type": "lstm", "size": 160 }],
///   "sample_length": 80,
///   "samples_per_epoch": 3,
///   "seed": 42,
///   "log_path": "log.txt"
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainingConfig {
    /// Timesteps per window, carry row included
    pub window: usize,

    /// Number of passes over the corpus
    pub epochs: usize,

    /// Initial learning rate
    pub learning_rate: f64,

    /// Type of learning rate scheduler
    pub scheduler_type: String,

    /// Epochs between reductions for step_decay
    pub step_size: Option<usize>,

    /// Multiplicative factor for step_decay
    pub gamma: Option<f64>,

    /// Per-epoch multiplier for exponential
    pub decay_rate: Option<f64>,

    /// Decay constant for inverse_time
    pub decay: Option<f64>,

    /// Recurrent layers, bottom to top; the softmax output is implicit
    pub layers: Vec<LayerConfig>,

    /// Symbols generated per sample
    pub sample_length: usize,

    /// Samples generated after each epoch
    pub samples_per_epoch: usize,

    /// Seed for initialization and sampling; time-based when absent
    pub seed: Option<u64>,

    /// Plain-text log of epoch losses and samples
    pub log_path: Option<String>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            window: 24,
            epochs: 25,
            learning_rate: 1e-3,
            scheduler_type: "inverse_time".to_string(),
            step_size: None,
            gamma: None,
            decay_rate: None,
            decay: None,
            layers: vec![LayerConfig::lstm(160)],
            sample_length: 80,
            samples_per_epoch: 3,
            seed: None,
            log_path: None,
        }
    }
}

impl TrainingConfig {
    /// Build the learning rate scheduler described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a required scheduler field is missing.
    pub fn scheduler(&self) -> Result<Box<dyn LRScheduler>> {
        let lr = self.learning_rate;
        let scheduler: Box<dyn LRScheduler> = match self.scheduler_type.as_str() {
            "constant" => Box::new(ConstantLR::new(lr)),
            "step_decay" => {
                let step_size = self
                    .step_size
                    .ok_or_else(|| config("step_decay requires step_size"))?;
                let gamma = self.gamma.ok_or_else(|| config("step_decay requires gamma"))?;
                Box::new(StepDecay::new(lr, step_size, gamma))
            }
            "exponential" => {
                let decay_rate = self
                    .decay_rate
                    .ok_or_else(|| config("exponential requires decay_rate"))?;
                Box::new(ExponentialDecay::new(lr, decay_rate))
            }
            "inverse_time" => match self.decay {
                Some(decay) => Box::new(InverseTimeDecay::with_decay(lr, decay)),
                None => Box::new(InverseTimeDecay::new(lr, self.epochs)),
            },
            other => {
                return Err(config(format!(
                    "Invalid scheduler_type '{}'. Must be one of: {}",
                    other,
                    SCHEDULER_TYPES.join(", ")
                )))
            }
        };
        Ok(scheduler)
    }
}

/// Loads a training configuration from a JSON file.
///
/// Reads the file at `path`, deserializes it into a `TrainingConfig` and
/// validates it.
///
/// # Examples
///
/// ```no_run
/// use char_rnn::config::load_config;
///
/// let cfg = load_config("config/aesop.json").unwrap();
/// assert!(cfg.window >= 2);
/// ```
pub fn load_config(path: &str) -> Result<TrainingConfig> {
    let contents = fs::read_to_string(path)?;
    let config: TrainingConfig = serde_json::from_str(&contents)?;
    validate_config(&config)?;
    Ok(config)
}

/// Check value ranges and cross-field requirements.
pub fn validate_config(cfg: &TrainingConfig) -> Result<()> {
    if cfg.window < 2 {
        return Err(config("window must be at least 2"));
    }

    if cfg.epochs == 0 {
        return Err(config("epochs must be positive"));
    }

    if !(cfg.learning_rate > 0.0 && cfg.learning_rate.is_finite()) {
        return Err(config("learning_rate must be positive"));
    }

    if let Some(gamma) = cfg.gamma {
        if gamma < 0.0 {
            return Err(config("gamma must be non-negative"));
        }
    }

    if let Some(decay_rate) = cfg.decay_rate {
        if decay_rate < 0.0 {
            return Err(config("decay_rate must be non-negative"));
        }
    }

    if let Some(decay) = cfg.decay {
        if decay < 0.0 {
            return Err(config("decay must be non-negative"));
        }
    }

    validate_architecture(&cfg.layers)?;
    cfg.scheduler()?;

    Ok(())
}
