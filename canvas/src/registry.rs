//! Engine identifier to object mapping.
//!
//! Identifiers are unique while registered: defining one twice is an error,
//! never an overwrite. Iteration follows registration order, which is the
//! order hit literals and drag releases are reported in. There is no
//! single-entry removal; the registry only empties as a whole.

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;

use std::collections::HashMap;

use crate::doc::ObjectKey;
use crate::error::SceneError;

/// Insertion-ordered identifier map.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    order: Vec<(String, ObjectKey)>,
    index: HashMap<String, ObjectKey>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `id` for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::DuplicateIdentifier`] if `id` is already present.
    pub fn register(&mut self, id: &str, key: ObjectKey) -> Result<(), SceneError> {
        if self.index.contains_key(id) {
            return Err(SceneError::DuplicateIdentifier(id.to_owned()));
        }
        self.index.insert(id.to_owned(), key);
        self.order.push((id.to_owned(), key));
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<ObjectKey> {
        self.index.get(id).copied()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ObjectKey)> {
        self.order.iter().map(|(id, key)| (id.as_str(), *key))
    }

    /// Drop every entry.
    pub fn reset(&mut self) {
        self.order.clear();
        self.index.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
