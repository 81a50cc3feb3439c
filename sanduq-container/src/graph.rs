//! Dependency graph validation.
//!
//! Walks the injected dependencies of every registered component before
//! anything is resolved:
//! - Detects circular dependencies
//! - Checks that every injected identifier can be satisfied, either by a
//!   component or by an instance already in the cache
//!
//! Aliases are followed exactly as `make` follows them: one hop.

use std::collections::HashSet;

use tracing::{debug, instrument, warn};

use crate::container::Container;
use crate::error::{
    ConstructionError, ConstructionFailure, ContainerError, CyclicDependencyError, Result,
};
use crate::identifier::Identifier;

/// Depth-first walk over component dependencies.
///
/// Keeps the current path for cycle reporting and a set of identifiers
/// already proven satisfiable.
pub(crate) struct GraphValidator<'a> {
    container: &'a Container,
    /// Currently being visited (for cycle detection)
    visiting: HashSet<Identifier>,
    validated: HashSet<Identifier>,
    path: Vec<Identifier>,
}

impl<'a> GraphValidator<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self {
            container,
            visiting: HashSet::new(),
            validated: HashSet::new(),
            path: Vec::new(),
        }
    }

    /// # Errors
    /// - [`ContainerError::CyclicDependency`] — cycle detected
    /// - [`ContainerError::Construction`] — injected identifier has no component
    #[instrument(skip(self), name = "graph_validation")]
    pub fn validate(&mut self) -> Result<()> {
        let mut roots = self.container.registry.identifiers();
        roots.sort();

        debug!(component_count = roots.len(), "Starting dependency graph validation");

        for id in roots {
            self.visit(&id)?;
        }

        debug!("Dependency graph validation passed ✓");
        Ok(())
    }

    fn visit(&mut self, requested: &Identifier) -> Result<()> {
        let id = self.container.aliases.resolve(requested);

        if self.validated.contains(&id) {
            return Ok(());
        }

        if self.visiting.contains(&id) {
            let start = self.path.iter().position(|k| *k == id).unwrap_or(0);
            let mut chain = self.path[start..].to_vec();
            chain.push(id.clone());

            warn!(cycle = ?chain, "Circular dependency detected!");
            return Err(ContainerError::CyclicDependency(CyclicDependencyError { chain }));
        }

        // a cached instance satisfies the dependency without construction
        if self.container.instances.has(&id) {
            self.validated.insert(id);
            return Ok(());
        }

        let component = self.container.registry.get(&id).ok_or_else(|| {
            ContainerError::Construction(ConstructionError {
                id: id.clone(),
                required_by: self.path.last().cloned(),
                reason: ConstructionFailure::Unknown {
                    suggestions: self.container.registry.suggestions(&id),
                },
            })
        })?;

        self.visiting.insert(id.clone());
        self.path.push(id.clone());

        for dependency in component.dependencies() {
            self.visit(&dependency)?;
        }

        self.path.pop();
        self.visiting.remove(&id);
        self.validated.insert(id);

        Ok(())
    }
}
