//! Character vocabulary
//!
//! Maps the distinct characters of a corpus onto dense indices `0..len`,
//! ordered by character value, and back.

use crate::error::{config, Error, Result};
use std::collections::HashMap;

/// Bidirectional character ↔ index table built once from a corpus.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    symbols: Vec<char>,
    index: HashMap<char, usize>,
}

impl Vocabulary {
    /// Build from the sorted distinct characters of `text`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an empty text.
    pub fn from_text(text: &str) -> Result<Self> {
        let mut symbols: Vec<char> = text.chars().collect();
        symbols.sort_unstable();
        symbols.dedup();

        if symbols.is_empty() {
            return Err(config("corpus is empty"));
        }

        let index = symbols
            .iter()
            .enumerate()
            .map(|(i, &c)| (c, i))
            .collect();
        Ok(Self { symbols, index })
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn index_of(&self, symbol: char) -> Option<usize> {
        self.index.get(&symbol).copied()
    }

    pub fn symbol(&self, index: usize) -> Option<char> {
        self.symbols.get(index).copied()
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    /// Encode every character of `text`.
    pub fn encode(&self, text: &str) -> Result<Vec<usize>> {
        text.chars()
            .map(|c| self.index_of(c).ok_or(Error::UnknownSymbol(c)))
            .collect()
    }

    /// Decode indices, skipping any outside the vocabulary.
    pub fn decode(&self, indices: &[usize]) -> String {
        indices.iter().filter_map(|&i| self.symbol(i)).collect()
    }

    /// One-hot vector of width `len()`.
    pub fn one_hot(&self, index: usize) -> Vec<f64> {
        let mut vector = vec![0.0; self.len()];
        if let Some(slot) = vector.get_mut(index) {
            *slot = 1.0;
        }
        vector
    }
}
