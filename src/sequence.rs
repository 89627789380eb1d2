//! Fixed-size window of per-timestep vectors.
//!
//! A `Sequence` stores `steps` rows of `width` values each, flattened in
//! row-major order. Row 0 is the carry slot of a window: layers never read it
//! as input, and write the carried-over state into it on output.

use crate::error::{shape, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    steps: usize,
    width: usize,
    data: Vec<f64>,
}

impl Sequence {
    /// All-zero sequence of `steps` rows of `width` values.
    pub fn zeros(steps: usize, width: usize) -> Self {
        Self {
            steps,
            width,
            data: vec![0.0; steps * width],
        }
    }

    /// Build from explicit rows; every row must have the same width.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let width = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * width);
        for (t, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(shape(format!(
                    "row {} has width {}, expected {}",
                    t,
                    row.len(),
                    width
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            steps: rows.len(),
            width,
            data,
        })
    }

    /// One-hot window: `symbols[k]` is encoded into row `k + 1`, row 0 stays zero.
    ///
    /// # Errors
    ///
    /// Returns a shape error if a symbol lies outside `0..width`.
    pub fn one_hot(symbols: &[usize], width: usize) -> Result<Self> {
        let mut sequence = Self::zeros(symbols.len() + 1, width);
        for (t, &symbol) in symbols.iter().enumerate() {
            let slot = sequence.row_mut(t + 1).get_mut(symbol).ok_or_else(|| {
                shape(format!(
                    "symbol {} at position {} outside {} classes",
                    symbol, t, width
                ))
            })?;
            *slot = 1.0;
        }
        Ok(sequence)
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn row(&self, t: usize) -> &[f64] {
        &self.data[t * self.width..(t + 1) * self.width]
    }

    pub fn row_mut(&mut self, t: usize) -> &mut [f64] {
        &mut self.data[t * self.width..(t + 1) * self.width]
    }

    /// Copy row `from` over row `to`.
    pub fn copy_row(&mut self, from: usize, to: usize) {
        let start = from * self.width;
        self.data
            .copy_within(start..start + self.width, to * self.width);
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.width.max(1)).take(self.steps)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Fail with a shape error unless this sequence is `steps` × `width`.
    pub fn expect_shape(&self, steps: usize, width: usize, what: &str) -> Result<()> {
        if self.steps != steps || self.width != width {
            return Err(shape(format!(
                "{} is {}x{}, expected {}x{}",
                what, self.steps, self.width, steps, width
            )));
        }
        Ok(())
    }
}
