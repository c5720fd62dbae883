//! Document model: the live objects of the current run.
//!
//! `DocStore` owns three views of the same objects and keeps them in step:
//!
//! - an arena of [`CanvasObject`]s keyed by an internal [`ObjectKey`],
//! - the drawable sequence (arena keys in draw order),
//! - the [`Registry`] from engine identifiers to arena keys.
//!
//! Objects defined without an identifier are drawable but unreachable by
//! the engine. The only way to drop objects is [`DocStore::clear`], which
//! empties all three views in one step so no stale key can survive into the
//! next run.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashMap;

use crate::error::SceneError;
use crate::object::CanvasObject;
use crate::order::RenderOrder;
use crate::registry::Registry;
use crate::render::Surface;

/// Internal arena handle. Never reused within a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey(u64);

/// In-memory store of canvas objects.
#[derive(Debug, Default)]
pub struct DocStore {
    objects: HashMap<ObjectKey, CanvasObject>,
    draw_order: Vec<ObjectKey>,
    registry: Registry,
    next_key: u64,
}

impl DocStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object to the end of the drawable sequence, registering it
    /// under `id` when one is given.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::DuplicateIdentifier`] if `id` is taken; the store
    /// is left unchanged.
    pub fn insert(&mut self, id: Option<&str>, obj: CanvasObject) -> Result<ObjectKey, SceneError> {
        let key = ObjectKey(self.next_key);
        if let Some(id) = id {
            self.registry.register(id, key)?;
        }
        self.next_key += 1;
        self.objects.insert(key, obj);
        self.draw_order.push(key);
        Ok(key)
    }

    /// Whether `id` is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.registry.contains(id)
    }

    /// Look up a registered object.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CanvasObject> {
        self.registry.get(id).and_then(|key| self.objects.get(&key))
    }

    /// Look up a registered object for mutation.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut CanvasObject> {
        let key = self.registry.get(id)?;
        self.objects.get_mut(&key)
    }

    /// Registered objects in registry order.
    pub fn registered(&self) -> impl Iterator<Item = (&str, &CanvasObject)> {
        self.registry
            .iter()
            .filter_map(|(id, key)| self.objects.get(&key).map(|obj| (id, obj)))
    }

    /// Visit registered objects mutably, in registry order.
    pub fn for_each_registered_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&str, &mut CanvasObject),
    {
        for (id, key) in self.registry.iter() {
            if let Some(obj) = self.objects.get_mut(&key) {
                f(id, obj);
            }
        }
    }

    /// All objects in draw order, registered or not.
    pub fn drawable(&self) -> impl Iterator<Item = &CanvasObject> {
        self.draw_order.iter().filter_map(|key| self.objects.get(key))
    }

    /// Stable re-sort of the drawable sequence.
    pub fn sort(&mut self, order: &dyn RenderOrder) {
        let objects = &self.objects;
        self.draw_order.sort_by(|a, b| match (objects.get(a), objects.get(b)) {
            (Some(x), Some(y)) => order.compare(x, y),
            _ => std::cmp::Ordering::Equal,
        });
    }

    /// Advance animations and paint every object in draw order.
    ///
    /// # Errors
    ///
    /// Stops at the first surface failure.
    pub fn draw<S: Surface>(&mut self, surface: &mut S, now_ms: f64) -> Result<(), S::Error> {
        for key in &self.draw_order {
            if let Some(obj) = self.objects.get_mut(key) {
                obj.draw(surface, now_ms)?;
            }
        }
        Ok(())
    }

    /// Whether any object has an animation in flight.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.objects.values().any(CanvasObject::is_animating)
    }

    /// Drop every object, the drawable sequence and the registry together.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.draw_order.clear();
        self.registry.reset();
    }

    /// Number of drawable objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.draw_order.len()
    }

    /// Returns `true` if the store contains no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.draw_order.is_empty()
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
