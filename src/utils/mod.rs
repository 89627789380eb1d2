//! Shared utilities for the recurrent models
//!
//! This module provides random number generation, activation functions and
//! learning rate schedules used across layers and drivers.

pub mod activations;
pub mod lr_scheduler;
pub mod rng;

pub use activations::{clip, sigmoid, sigmoid_derivative, softmax_in_place, tanh, tanh_derivative};
pub use rng::SimpleRng;
