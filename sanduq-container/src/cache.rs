//! Singleton instance cache.
//!
//! Keys are resolved (post-alias) identifiers; the facade resolves aliases
//! before it touches the cache. Values are shared [`Instance`] handles, so a
//! caller holding one keeps it alive after it is removed from the cache.

use dashmap::DashMap;
use tracing::trace;

use crate::error::{ContainerError, NotFoundKind, Result};
use crate::identifier::Identifier;
use crate::value::Instance;

#[derive(Debug, Default)]
pub struct InstanceCache {
    instances: DashMap<Identifier, Instance>,
}

impl InstanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, id: &Identifier) -> bool {
        self.instances.contains_key(id)
    }

    /// # Errors
    /// [`ContainerError::NotFound`] when nothing is cached under `id`.
    pub fn get(&self, id: &Identifier) -> Result<Instance> {
        self.find(id)
            .ok_or_else(|| ContainerError::not_found(id, NotFoundKind::Instance))
    }

    /// Like [`InstanceCache::get`], without the error.
    pub fn find(&self, id: &Identifier) -> Option<Instance> {
        self.instances.get(id).map(|entry| entry.value().clone())
    }

    /// Stores `instance`, silently replacing any previous one.
    pub fn set(&self, id: Identifier, instance: Instance) {
        trace!(id = %id.short(), "Caching instance");
        self.instances.insert(id, instance);
    }

    /// Stores `instance` only when nothing is cached yet.
    pub fn insert_if_absent(&self, id: Identifier, instance: Instance) -> bool {
        match self.instances.entry(id) {
            dashmap::mapref::entry::Entry::Occupied(_) => false,
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(instance);
                true
            }
        }
    }

    /// Returns `true` if something was removed.
    pub fn remove(&self, id: &Identifier) -> bool {
        self.instances.remove(id).is_some()
    }

    pub fn clear(&self) {
        self.instances.clear();
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn keys(&self) -> Vec<Identifier> {
        self.instances.iter().map(|entry| entry.key().clone()).collect()
    }
}
