//! In-memory embedding store keyed by track name.

use std::collections::HashMap;

use crate::errors::{Result, SelectionError};

/// Insertion-ordered map from track name to embedding vector.
///
/// All vectors share one dimension, fixed by the first insert. Iteration
/// order is insertion order (or name order after [`sort_by_name`]); when
/// the store is used as a seed set this order is the seed priority order
/// of the fairness round.
///
/// [`sort_by_name`]: EmbeddingStore::sort_by_name
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EmbeddingStore {
    entries: Vec<(String, Vec<f32>)>,
    index: HashMap<String, usize>,
}

/// Seeds are an [`EmbeddingStore`]; its order is the seed priority order.
pub type SeedSet = EmbeddingStore;

impl EmbeddingStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from `(name, vector)` pairs, in order.
    pub fn from_entries<I, N>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, Vec<f32>)>,
        N: Into<String>,
    {
        let mut store = Self::new();
        for (name, vector) in entries {
            let _ = store.insert(name, vector)?;
        }
        Ok(store)
    }

    /// Insert or replace an embedding.
    ///
    /// Replacing keeps the original position. Returns the previous vector
    /// for `name`, if any.
    pub fn insert(&mut self, name: impl Into<String>, vector: Vec<f32>) -> Result<Option<Vec<f32>>> {
        if let Some(expected) = self.dims() {
            if vector.len() != expected {
                return Err(SelectionError::DimensionMismatch {
                    expected,
                    got: vector.len(),
                });
            }
        }

        let name = name.into();
        if let Some(&pos) = self.index.get(&name) {
            let previous = std::mem::replace(&mut self.entries[pos].1, vector);
            return Ok(Some(previous));
        }

        let _ = self.index.insert(name.clone(), self.entries.len());
        self.entries.push((name, vector));
        Ok(None)
    }

    /// Embedding for `name`.
    pub fn get(&self, name: &str) -> Option<&[f32]> {
        self.index
            .get(name)
            .map(|&pos| self.entries[pos].1.as_slice())
    }

    /// Shared vector dimension, `None` while empty.
    pub fn dims(&self) -> Option<usize> {
        self.entries.first().map(|(_, v)| v.len())
    }

    /// Number of embeddings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names in iteration order.
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(n, _)| n.clone()).collect()
    }

    /// `(name, vector)` pairs in iteration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f32])> {
        self.entries
            .iter()
            .map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    /// Reorder entries by name (byte order).
    pub fn sort_by_name(&mut self) {
        self.entries.sort_by(|a, b| a.0.cmp(&b.0));
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, (n, _))| (n.clone(), i))
            .collect();
    }
}
