//! Text generation from a trained model.

use crate::error::{shape, Result};
use crate::model::SequenceModel;
use crate::sequence::Sequence;
use crate::utils::SimpleRng;
use tracing::debug;

/// Draw an index from a categorical distribution.
///
/// Walks the distribution subtracting each probability from a uniform draw and
/// returns the first index whose mass covers the remainder. If rounding leaves
/// residual mass, the last index is returned. Returns `None` only for an empty
/// distribution.
pub fn weighted_choice(distribution: &[f64], rng: &mut SimpleRng) -> Option<usize> {
    let mut remaining = rng.next_f64();
    for (index, &p) in distribution.iter().enumerate() {
        if remaining <= p {
            return Some(index);
        }
        remaining -= p;
    }

    let last = distribution.len().checked_sub(1)?;
    debug!(remaining, last, "weighted choice fell through to the last index");
    Some(last)
}

/// Generate `length` symbols following `primer`.
///
/// `primer` must hold `window - 1` symbols. The first step resets the model
/// state; every following step shifts the window by one, appending the symbol
/// drawn from the last timestep's distribution.
///
/// # Errors
///
/// Fails if the primer does not fill a window, or on a shape mismatch.
pub fn sample(
    model: &mut SequenceModel,
    primer: &[usize],
    length: usize,
    rng: &mut SimpleRng,
) -> Result<Vec<usize>> {
    let window = model.window();
    if primer.len() != window - 1 {
        return Err(shape(format!(
            "primer needs {} symbols, got {}",
            window - 1,
            primer.len()
        )));
    }

    let vocab_size = model.input_size();
    let mut context = primer.to_vec();
    let mut generated = Vec::with_capacity(length);

    for step in 0..length {
        let inputs = Sequence::one_hot(&context, vocab_size)?;
        let probs = model.forward(&inputs, step == 0)?;
        model.release();

        let last = probs.row(window - 1);
        let symbol = weighted_choice(last, rng).unwrap_or(0);
        generated.push(symbol);

        context.remove(0);
        context.push(symbol);
    }

    Ok(generated)
}
