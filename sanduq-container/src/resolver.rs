//! Instance construction.
//!
//! The resolver builds one new instance for an already alias-resolved
//! identifier. It never touches the instance cache; deciding whether the
//! result is cached is [`Container::make`]'s job.

use std::sync::Arc;

use tracing::{trace, warn};

use crate::component::{Component, Construction, Visibility};
use crate::container::Container;
use crate::error::{
    ConstructionError, ConstructionFailure, ContainerError, CyclicDependencyError, Result,
};
use crate::identifier::Identifier;
use crate::value::{Argument, Arguments, Instance};

/// Identifiers currently being constructed, outermost first.
///
/// Requesting an identifier that is already on the stack is a cycle.
#[derive(Debug)]
pub(crate) struct ResolutionStack {
    path: Vec<Identifier>,
    limit: usize,
}

impl ResolutionStack {
    pub(crate) fn new(limit: usize) -> Self {
        Self {
            path: Vec::new(),
            limit,
        }
    }

    pub(crate) fn current(&self) -> Option<&Identifier> {
        self.path.last()
    }

    pub(crate) fn enter(&mut self, id: &Identifier) -> Result<()> {
        if let Some(start) = self.path.iter().position(|entry| entry == id) {
            let mut chain = self.path[start..].to_vec();
            chain.push(id.clone());
            warn!(cycle = ?chain, "Circular dependency detected!");
            return Err(ContainerError::CyclicDependency(CyclicDependencyError { chain }));
        }

        if self.path.len() >= self.limit {
            return Err(ContainerError::DepthExceeded {
                id: id.clone(),
                limit: self.limit,
            });
        }

        self.path.push(id.clone());
        Ok(())
    }

    pub(crate) fn exit(&mut self) {
        self.path.pop();
    }
}

/// A freshly built instance and whether `make` may cache it.
pub(crate) struct Resolved {
    pub instance: Instance,
    pub cacheable: bool,
}

impl Container {
    /// Constructs a new instance of `id`.
    ///
    /// 1. a registered setter replaces the constructor;
    /// 2. a component without a declared constructor gets the explicit
    ///    arguments as they are;
    /// 3. otherwise the constructor's parameters are bound, auto-wiring
    ///    injected ones, and the constructor is called.
    pub(crate) fn resolve_in(
        &self,
        id: &Identifier,
        arguments: Vec<Argument>,
        stack: &mut ResolutionStack,
    ) -> Result<Resolved> {
        let component = self.registry.get(id).ok_or_else(|| {
            ContainerError::Construction(ConstructionError {
                id: id.clone(),
                required_by: stack.current().cloned(),
                reason: ConstructionFailure::Unknown {
                    suggestions: self.registry.suggestions(id),
                },
            })
        })?;

        stack.enter(id)?;
        let built = self.instantiate(&component, arguments, stack);
        stack.exit();

        let instance = built?;
        component.run_hooks(&instance)?;
        trace!(id = %id.short(), "Constructed instance");

        Ok(Resolved {
            instance,
            cacheable: !component.is_refreshable(),
        })
    }

    fn instantiate(
        &self,
        component: &Arc<Component>,
        arguments: Vec<Argument>,
        stack: &mut ResolutionStack,
    ) -> Result<Instance> {
        let id = component.id();

        if let Some(setter) = component.setter() {
            trace!(id = %id, "Using setter factory");
            let bound = self.bind_params(Some(id), &setter.signature, arguments, stack)?;
            return setter.call(&bound);
        }

        match component.construction() {
            Construction::Direct(factory) => {
                let slots = arguments.into_iter().map(Some).collect();
                let bound = Arguments::bound(Some(id.clone()), slots);
                factory(&bound)
            }
            Construction::Constructor(constructor) => {
                if constructor.visibility != Visibility::Public {
                    return Err(ContainerError::construction(
                        id,
                        ConstructionFailure::NonPublicConstructor,
                    ));
                }
                let bound = self.bind_params(Some(id), &constructor.signature, arguments, stack)?;
                constructor.call(&bound)
            }
            Construction::Abstract => {
                Err(ContainerError::construction(id, ConstructionFailure::Abstract))
            }
        }
    }
}
