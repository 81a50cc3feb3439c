//! Alias and binding tables.
//!
//! Both tables are plain maps behind a [`parking_lot::RwLock`]. Locks are
//! held only for the duration of a single lookup or update, never across a
//! factory call, so resolution may re-enter the tables freely.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::error::{ContainerError, NotFoundKind, Result};
use crate::identifier::Identifier;
use crate::value::Argument;

/// Logical identifier → target identifier. Lookups are single-hop.
#[derive(Debug, Default)]
pub struct AliasTable {
    aliases: RwLock<HashMap<Identifier, Identifier>>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Points `id` at `target`, replacing any previous alias.
    pub fn set_alias(&self, id: Identifier, target: Identifier) {
        debug!(from = %id, to = %target, "Registered alias");
        self.aliases.write().insert(id, target);
    }

    /// Returns `true` if an alias was removed.
    pub fn remove_alias(&self, id: &Identifier) -> bool {
        self.aliases.write().remove(id).is_some()
    }

    pub fn contains(&self, id: &Identifier) -> bool {
        self.aliases.read().contains_key(id)
    }

    /// The alias target of `id`, or `id` itself when unmapped.
    ///
    /// Only one hop is followed: with `a → b` and `b → c`, `a` resolves to `b`.
    pub fn resolve(&self, id: &Identifier) -> Identifier {
        match self.aliases.read().get(id) {
            Some(target) => {
                trace!(from = %id, to = %target, "Following alias");
                target.clone()
            }
            None => id.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.aliases.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.read().is_empty()
    }
}

/// Stored construction arguments and renew policy for a target.
#[derive(Debug, Clone, Default)]
pub struct Binding {
    pub arguments: Vec<Argument>,
    pub renew: bool,
}

/// Target identifier → [`Binding`].
#[derive(Debug, Default)]
pub struct BindingTable {
    bindings: RwLock<HashMap<Identifier, Binding>>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a binding for `target`, replacing any previous one.
    pub fn bind(&self, target: Identifier, arguments: Vec<Argument>, renew: bool) {
        debug!(target = %target, arguments = arguments.len(), renew, "Registered binding");
        self.bindings.write().insert(target, Binding { arguments, renew });
    }

    /// Returns `true` if a binding was removed.
    pub fn unbind(&self, target: &Identifier) -> bool {
        self.bindings.write().remove(target).is_some()
    }

    pub fn is_bound(&self, target: &Identifier) -> bool {
        self.bindings.read().contains_key(target)
    }

    /// # Errors
    /// [`ContainerError::NotFound`] when `target` is not bound.
    pub fn get(&self, target: &Identifier) -> Result<Binding> {
        self.find(target)
            .ok_or_else(|| ContainerError::not_found(target, NotFoundKind::Binding))
    }

    /// Like [`BindingTable::get`], without the error.
    pub fn find(&self, target: &Identifier) -> Option<Binding> {
        self.bindings.read().get(target).cloned()
    }

    pub fn len(&self) -> usize {
        self.bindings.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn id(s: &str) -> Identifier {
        Identifier::from(s)
    }

    #[test]
    fn unmapped_alias_resolves_to_itself() {
        let aliases = AliasTable::new();
        assert_eq!(aliases.resolve(&id("mailer")), id("mailer"));
    }

    #[test]
    fn alias_is_single_hop() {
        let aliases = AliasTable::new();
        aliases.set_alias(id("a"), id("b"));
        aliases.set_alias(id("b"), id("c"));
        assert_eq!(aliases.resolve(&id("a")), id("b"));
        assert_eq!(aliases.resolve(&id("b")), id("c"));
    }

    #[test]
    fn alias_lookup_is_case_sensitive() {
        let aliases = AliasTable::new();
        aliases.set_alias(id("Mailer"), id("smtp"));
        assert_eq!(aliases.resolve(&id("mailer")), id("mailer"));
    }

    #[test]
    fn remove_alias_reports_presence() {
        let aliases = AliasTable::new();
        aliases.set_alias(id("a"), id("b"));
        assert!(aliases.contains(&id("a")));
        assert!(aliases.remove_alias(&id("a")));
        assert!(!aliases.remove_alias(&id("a")));
        assert!(aliases.is_empty());
    }

    #[test]
    fn binding_roundtrip() {
        let bindings = BindingTable::new();
        bindings.bind(id("smtp"), vec![Argument::from("mail.local")], true);

        assert!(bindings.is_bound(&id("smtp")));
        let binding = bindings.get(&id("smtp")).unwrap();
        assert!(binding.renew);
        assert_eq!(binding.arguments[0].as_value(), Some(&Value::Str("mail.local".into())));
    }

    #[test]
    fn missing_binding_is_not_found() {
        let bindings = BindingTable::new();
        match bindings.get(&id("smtp")) {
            Err(ContainerError::NotFound(e)) => assert_eq!(e.kind, NotFoundKind::Binding),
            other => panic!("Expected NotFound, got: {other:?}"),
        }
    }

    #[test]
    fn unbind_reports_presence() {
        let bindings = BindingTable::new();
        bindings.bind(id("smtp"), vec![], false);
        assert!(bindings.unbind(&id("smtp")));
        assert!(!bindings.unbind(&id("smtp")));
        assert!(!bindings.is_bound(&id("smtp")));
    }
}
