//! Map-style access to the instance cache.

use std::sync::Arc;

use crate::container::Container;
use crate::error::Result;
use crate::identifier::Identifier;
use crate::value::Instance;

/// A borrowed, map-like view of a [`Container`]'s instances.
///
/// `get` goes through [`Container::make`], so reading an absent key
/// constructs and caches it.
///
/// ```rust
/// use sanduq_container::prelude::*;
///
/// let container = Container::builder().build().unwrap();
/// let mut map = container.instances();
/// map.insert("answer", instance(42u32));
/// assert!(map.contains_key("answer"));
/// assert_eq!(*map.get("answer").unwrap().downcast::<u32>().unwrap(), 42);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct InstanceMap<'a> {
    container: &'a Container,
}

impl<'a> InstanceMap<'a> {
    pub(crate) fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub fn contains_key(&self, id: impl Into<Identifier>) -> bool {
        self.container.has(id)
    }

    pub fn get(&self, id: impl Into<Identifier>) -> Result<Instance> {
        self.container.make(id, Vec::new(), false)
    }

    pub fn get_as<T: Send + Sync + 'static>(&self, id: impl Into<Identifier>) -> Result<Arc<T>> {
        self.container.make_as(id, Vec::new(), false)
    }

    pub fn insert(&mut self, id: impl Into<Identifier>, instance: Instance) {
        self.container.set(id, instance);
    }

    pub fn remove(&mut self, id: impl Into<Identifier>) -> bool {
        self.container.remove(id)
    }

    pub fn len(&self) -> usize {
        self.container.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.container.instances.is_empty()
    }

    /// Resolved identifiers of all cached instances.
    pub fn keys(&self) -> Vec<Identifier> {
        self.container.instances.keys()
    }
}
