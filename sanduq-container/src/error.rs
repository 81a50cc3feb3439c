//! Error types for container operations.
//!
//! Every failure names the identifier involved and, where it helps, a hint
//! or a list of similarly named registrations.

use std::fmt;

use sanduq_support::rendering::render_chain;

use crate::identifier::Identifier;

/// Main error type for all container operations.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    /// Nothing is cached or bound under the identifier.
    #[error("{}", .0)]
    NotFound(NotFoundError),

    /// The identifier could not be instantiated.
    #[error("{}", .0)]
    Construction(ConstructionError),

    /// The requested method could not be called.
    #[error("{}", .0)]
    Invocation(InvocationError),

    /// An identifier was requested while it was already being resolved.
    #[error("{}", .0)]
    CyclicDependency(CyclicDependencyError),

    /// The resolution stack grew past `ContainerSettings::max_depth`.
    #[error("Resolution of {id} exceeded the maximum depth of {limit}")]
    DepthExceeded { id: Identifier, limit: usize },

    /// A typed accessor was used with the wrong type.
    #[error("Type mismatch for {id}: expected {expected}")]
    TypeMismatch {
        id: Identifier,
        expected: &'static str,
    },

    /// A factory asked for an instance argument that was not supplied.
    #[error("Argument #{index} of {owner} is not an instance")]
    MissingArgument { owner: Identifier, index: usize },

    /// A component was registered twice while overriding is disabled.
    #[error(
        "Component already registered: {0}\n  Hint: enable `allow_override` in the settings"
    )]
    AlreadyRegistered(Identifier),

    /// `ContainerSettings` that no container can work with.
    #[error("Invalid container settings: {0}")]
    InvalidSettings(String),

    /// `global::install` was called after the global container existed.
    #[error("The global container is already installed")]
    GlobalAlreadyInstalled,

    /// A user factory, method or hook failed with its own error.
    #[error("{id} failed: {source}")]
    Factory {
        id: Identifier,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ContainerError {
    /// Wraps an application error raised inside a factory or method.
    pub fn factory(
        id: impl Into<Identifier>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        ContainerError::Factory {
            id: id.into(),
            source: source.into(),
        }
    }

    pub(crate) fn not_found(id: &Identifier, kind: NotFoundKind) -> Self {
        ContainerError::NotFound(NotFoundError {
            id: id.clone(),
            kind,
        })
    }

    pub(crate) fn construction(id: &Identifier, reason: ConstructionFailure) -> Self {
        ContainerError::Construction(ConstructionError {
            id: id.clone(),
            required_by: None,
            reason,
        })
    }

    pub(crate) fn invocation(id: &Identifier, method: &str, reason: InvocationFailure) -> Self {
        ContainerError::Invocation(InvocationError {
            target: id.clone(),
            method: method.to_string(),
            reason,
        })
    }
}

/// What the caller expected to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundKind {
    Instance,
    Binding,
}

/// No cached instance or binding exists for an identifier.
#[derive(Debug)]
pub struct NotFoundError {
    pub id: Identifier,
    pub kind: NotFoundKind,
}

impl fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            NotFoundKind::Instance => {
                write!(f, "No instance found: {}", self.id)?;
                write!(f, "\n  Hint: use make() to construct it on demand")
            }
            NotFoundKind::Binding => {
                write!(f, "No binding found: {}", self.id)?;
                write!(f, "\n  Hint: check bound() before reading a binding")
            }
        }
    }
}

/// Why an identifier could not be instantiated.
#[derive(Debug)]
pub enum ConstructionFailure {
    /// No component is registered under the identifier.
    Unknown { suggestions: Vec<String> },
    /// The component is abstract.
    Abstract,
    /// The component's constructor is not public.
    NonPublicConstructor,
}

/// Error raised when a component cannot be instantiated.
#[derive(Debug)]
pub struct ConstructionError {
    pub id: Identifier,
    /// The component whose dependency failed, when known.
    pub required_by: Option<Identifier>,
    pub reason: ConstructionFailure,
}

impl fmt::Display for ConstructionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cannot initialize {}", self.id)?;
        match &self.reason {
            ConstructionFailure::Unknown { suggestions } => {
                write!(f, ": no component registered")?;
                if let Some(parent) = &self.required_by {
                    write!(f, "\n  Required by: {parent}")?;
                }
                if !suggestions.is_empty() {
                    write!(f, "\n  Did you mean one of:")?;
                    for suggestion in suggestions {
                        write!(f, "\n    - {suggestion}")?;
                    }
                }
                Ok(())
            }
            ConstructionFailure::Abstract => {
                write!(f, ": component is abstract")?;
                write!(f, "\n  Hint: alias it to a concrete component")
            }
            ConstructionFailure::NonPublicConstructor => {
                write!(f, ": constructor is not public")
            }
        }
    }
}

/// Why a method could not be called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationFailure {
    /// The target has no registered component.
    UnknownTarget,
    /// The component has no method with that name.
    Missing,
    Abstract,
    NotPublic,
}

/// Error raised when a method cannot be invoked.
#[derive(Debug)]
pub struct InvocationError {
    pub target: Identifier,
    pub method: String,
    pub reason: InvocationFailure,
}

impl fmt::Display for InvocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unable to call method: {}::{}", self.target, self.method)?;
        match self.reason {
            InvocationFailure::UnknownTarget => write!(f, " (no component registered)"),
            InvocationFailure::Missing => write!(f, " (no such method)"),
            InvocationFailure::Abstract => write!(f, " (method is abstract)"),
            InvocationFailure::NotPublic => write!(f, " (method is not public)"),
        }
    }
}

/// Error raised when resolution re-enters an identifier on the same stack.
#[derive(Debug)]
pub struct CyclicDependencyError {
    /// The cycle, first and last entries equal.
    /// Example: `[Mailer, Transport, Mailer]`
    pub chain: Vec<Identifier>,
}

impl fmt::Display for CyclicDependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Circular dependency detected:\n  {}", render_chain(&self.chain))?;
        write!(
            f,
            "\n  Hint: inject one side through a method call instead of the constructor"
        )
    }
}

/// Convenient Result type for container operations.
pub type Result<T> = std::result::Result<T, ContainerError>;
