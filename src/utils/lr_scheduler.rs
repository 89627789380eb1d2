//! Learning rate scheduler trait and implementations
//!
//! The training driver owns one scheduler and passes `get_lr()` into every
//! backward call, so the learning rate is never ambient mutable state.
//! Schedules: constant, step decay, exponential decay and inverse-time decay.

/// Per-epoch learning rate schedule.
///
/// # Example
///
/// ```ignore
/// let mut scheduler = InverseTimeDecay::new(1e-3, 25);
///
/// for epoch in 0..25 {
///     let lr = scheduler.get_lr();
///     // ... train with current learning rate ...
///     scheduler.step();
/// }
/// ```
pub trait LRScheduler {
    /// Rate for the epoch about to run.
    fn get_lr(&self) -> f64;

    /// Called once after every epoch.
    fn step(&mut self);

    fn reset(&mut self);
}

/// Constant learning rate.
pub struct ConstantLR {
    lr: f64,
}

impl ConstantLR {
    pub fn new(lr: f64) -> Self {
        Self { lr }
    }
}

impl LRScheduler for ConstantLR {
    fn get_lr(&self) -> f64 {
        self.lr
    }

    fn step(&mut self) {}

    fn reset(&mut self) {}
}

/// Scales the rate by `gamma` every `step_size` epochs.
///
/// `lr(epoch) = initial_lr · gamma^(epoch / step_size)`, integer division.
/// A `step_size` of zero is treated as one.
pub struct StepDecay {
    initial_lr: f64,
    step_size: usize,
    gamma: f64,
    epoch: usize,
}

impl StepDecay {
    pub fn new(initial_lr: f64, step_size: usize, gamma: f64) -> Self {
        Self {
            initial_lr,
            step_size: step_size.max(1),
            gamma,
            epoch: 0,
        }
    }
}

impl LRScheduler for StepDecay {
    fn get_lr(&self) -> f64 {
        let decays = (self.epoch / self.step_size) as i32;
        self.initial_lr * self.gamma.powi(decays)
    }

    fn step(&mut self) {
        self.epoch += 1;
    }

    fn reset(&mut self) {
        self.epoch = 0;
    }
}

/// `lr(epoch) = initial_lr · gamma^epoch`
pub struct ExponentialDecay {
    initial_lr: f64,
    gamma: f64,
    epoch: usize,
}

impl ExponentialDecay {
    pub fn new(initial_lr: f64, gamma: f64) -> Self {
        Self {
            initial_lr,
            gamma,
            epoch: 0,
        }
    }
}

impl LRScheduler for ExponentialDecay {
    fn get_lr(&self) -> f64 {
        self.initial_lr * self.gamma.powi(self.epoch as i32)
    }

    fn step(&mut self) {
        self.epoch += 1;
    }

    fn reset(&mut self) {
        self.epoch = 0;
    }
}

/// Inverse-time decay, compounding once per epoch.
///
/// At each step: lr = lr / (1 + decay * epoch), with epoch the index of the
/// epoch about to start. The default decay is `initial_lr / epochs`.
///
/// # Example
///
/// ```ignore
/// let mut scheduler = InverseTimeDecay::new(1e-3, 25);
/// scheduler.step();
/// // 1e-3 / (1 + 4e-5)
/// ```
pub struct InverseTimeDecay {
    initial_lr: f64,
    decay: f64,
    current_epoch: usize,
    current_lr: f64,
}

impl InverseTimeDecay {
    /// Creates a schedule whose decay is spread over `epochs`.
    pub fn new(initial_lr: f64, epochs: usize) -> Self {
        Self::with_decay(initial_lr, initial_lr / epochs.max(1) as f64)
    }

    pub fn with_decay(initial_lr: f64, decay: f64) -> Self {
        Self {
            initial_lr,
            decay,
            current_epoch: 0,
            current_lr: initial_lr,
        }
    }

    pub fn decay(&self) -> f64 {
        self.decay
    }
}

impl LRScheduler for InverseTimeDecay {
    fn get_lr(&self) -> f64 {
        self.current_lr
    }

    fn step(&mut self) {
        self.current_epoch += 1;
        self.current_lr /= 1.0 + self.decay * self.current_epoch as f64;
    }

    fn reset(&mut self) {
        self.current_epoch = 0;
        self.current_lr = self.initial_lr;
    }
}
