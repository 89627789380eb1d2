//! RMSProp optimizer with clipped gradients.

use crate::optimizers::Optimizer;
use crate::utils::clip;

/// Decay of the running average of squared gradients.
pub const RMS_DECAY: f64 = 0.95;

/// Added under the square root to keep the step finite.
pub const RMS_EPSILON: f64 = 1e-6;

/// RMSProp optimizer.
///
/// Keeps one running average of squared gradients per parameter:
///
/// ```text
/// cache = decay * cache + (1 - decay) * g²
/// p     = p - clip(g) * α / sqrt(cache + ε)
/// ```
///
/// The cache is sized for one parameter tensor at construction and persists
/// for the whole training run.
#[derive(Debug, Clone)]
pub struct RmsProp {
    decay: f64,
    epsilon: f64,
    cache: Vec<f64>,
}

impl RmsProp {
    /// Optimizer for `size` parameters with the default decay and epsilon.
    pub fn new(size: usize) -> Self {
        Self::with_hyperparameters(size, RMS_DECAY, RMS_EPSILON)
    }

    pub fn with_hyperparameters(size: usize, decay: f64, epsilon: f64) -> Self {
        Self {
            decay,
            epsilon,
            cache: vec![0.0; size],
        }
    }

    /// Running averages of squared gradients, one per parameter.
    pub fn cache(&self) -> &[f64] {
        &self.cache
    }

    pub fn decay(&self) -> f64 {
        self.decay
    }
}

impl Optimizer for RmsProp {
    /// # Panics
    ///
    /// Panics if `parameters`, `gradients` and the cache differ in length.
    fn update(&mut self, parameters: &mut [f64], gradients: &[f64], learning_rate: f64) {
        assert_eq!(
            parameters.len(),
            gradients.len(),
            "parameters and gradients must have the same length"
        );
        assert_eq!(
            parameters.len(),
            self.cache.len(),
            "optimizer cache was sized for a different tensor"
        );

        for ((param, &grad), cache) in parameters
            .iter_mut()
            .zip(gradients.iter())
            .zip(self.cache.iter_mut())
        {
            *cache = self.decay * *cache + (1.0 - self.decay) * grad * grad;
            *param -= clip(grad) * learning_rate / (*cache + self.epsilon).sqrt();
        }
    }

    fn reset(&mut self) {
        self.cache.fill(0.0);
    }
}
