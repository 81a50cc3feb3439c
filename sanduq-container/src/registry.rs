//! Component registry — identifier → [`Component`].
//!
//! The registry is the container's stand-in for runtime type introspection.
//! It also indexes components by [`TypeId`] so a live instance can be mapped
//! back to the component that describes its methods.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use sanduq_support::rendering::suggest_similar;
use tracing::debug;

use crate::component::Component;
use crate::error::{ContainerError, Result};
use crate::identifier::Identifier;

/// A component submitted for discovery with [`inventory::submit!`].
///
/// ```rust,ignore
/// fn mailer() -> Component {
///     Component::of::<Mailer>().default_constructible().build()
/// }
///
/// inventory::submit! { Discovered::new(mailer) }
/// ```
pub struct Discovered {
    build: fn() -> Component,
}

impl Discovered {
    pub const fn new(build: fn() -> Component) -> Self {
        Self { build }
    }

    pub fn component(&self) -> Component {
        (self.build)()
    }
}

inventory::collect!(Discovered);

/// All components submitted with `inventory::submit!` in the binary.
pub fn discovered() -> impl Iterator<Item = Component> {
    inventory::iter::<Discovered>.into_iter().map(Discovered::component)
}

#[derive(Debug, Default)]
struct Entries {
    components: HashMap<Identifier, Arc<Component>>,
    by_type: HashMap<TypeId, Identifier>,
}

impl Entries {
    /// Inserts `component`, replacing any component with the same id.
    ///
    /// When the replacement has a different type, the old type stops
    /// pointing at the id and is handed to another component of that type,
    /// if one is left.
    fn insert(&mut self, component: Component) {
        let id = component.id.clone();

        let replaced = self.components.get(&id).and_then(|c| c.type_id);
        if let Some(previous) = replaced.filter(|t| component.type_id != Some(*t)) {
            if self.by_type.get(&previous) == Some(&id) {
                self.by_type.remove(&previous);
                let heir = self
                    .components
                    .iter()
                    .find(|(other, c)| **other != id && c.type_id == Some(previous))
                    .map(|(other, _)| other.clone());
                if let Some(heir) = heir {
                    self.by_type.insert(previous, heir);
                }
            }
        }

        if let Some(type_id) = component.type_id {
            self.by_type.entry(type_id).or_insert_with(|| id.clone());
        }

        debug!(
            id = %id.short(),
            methods = component.methods.len(),
            refreshable = component.refreshable,
            "Registered component"
        );
        self.components.insert(id, Arc::new(component));
    }
}

#[derive(Debug, Default)]
pub struct ComponentRegistry {
    entries: RwLock<Entries>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a component.
    ///
    /// # Errors
    /// Returns [`ContainerError::AlreadyRegistered`] if the identifier is
    /// taken and `allow_override` is false.
    pub fn register(&self, component: Component, allow_override: bool) -> Result<()> {
        let mut entries = self.entries.write();

        if !allow_override && entries.components.contains_key(&component.id) {
            return Err(ContainerError::AlreadyRegistered(component.id));
        }

        entries.insert(component);
        Ok(())
    }

    /// Registers a component, replacing any previous one with the same id.
    pub fn replace(&self, component: Component) {
        self.entries.write().insert(component);
    }

    pub fn get(&self, id: &Identifier) -> Option<Arc<Component>> {
        self.entries.read().components.get(id).cloned()
    }

    /// The component describing instances of `type_id`. When several
    /// components share a type, the first registered wins.
    pub fn get_by_type(&self, type_id: TypeId) -> Option<Arc<Component>> {
        let entries = self.entries.read();
        let id = entries.by_type.get(&type_id)?;
        entries.components.get(id).cloned()
    }

    pub fn contains(&self, id: &Identifier) -> bool {
        self.entries.read().components.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.read().components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().components.is_empty()
    }

    pub fn identifiers(&self) -> Vec<Identifier> {
        self.entries.read().components.keys().cloned().collect()
    }

    /// Snapshot of all components, for validation.
    pub fn components(&self) -> Vec<Arc<Component>> {
        self.entries.read().components.values().cloned().collect()
    }

    /// Registered identifiers that look like `id`, best first.
    pub fn suggestions(&self, id: &Identifier) -> Vec<String> {
        let entries = self.entries.read();
        suggest_similar(id.as_str(), entries.components.keys().map(Identifier::as_str), 3)
    }
}
