//! Provider trait — a module of related registrations.
//!
//! Providers group components, aliases and bindings that belong together,
//! the way a framework's service providers do.
//!
//! # Examples
//! ```rust,ignore
//! struct MailProvider;
//!
//! impl Provider for MailProvider {
//!     fn register(&self, registry: &mut dyn ProviderRegistry) {
//!         registry.register_component(Component::of::<SmtpTransport>().constructor(...).build());
//!         registry.register_alias("mailer".into(), Identifier::of::<SmtpTransport>());
//!     }
//! }
//!
//! let container = Container::builder().add_provider(&MailProvider).build()?;
//! ```

use crate::component::Component;
use crate::identifier::Identifier;
use crate::value::{Argument, Instance};

/// A module that registers related dependencies into a container.
///
/// Accepted both by `ContainerBuilder::add_provider` and, after the
/// container is built, by `Container::add_provider`.
pub trait Provider: Send + Sync {
    /// Register dependencies.
    fn register(&self, registry: &mut dyn ProviderRegistry);

    /// Optional: human-readable name for logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Interface that providers use to register dependencies.
///
/// Kept separate from the container so providers can be tested against a
/// mock registry.
pub trait ProviderRegistry {
    fn register_component(&mut self, component: Component);

    fn register_alias(&mut self, id: Identifier, target: Identifier);

    /// See `Container::bind`.
    fn register_binding(
        &mut self,
        id: Identifier,
        target: Identifier,
        arguments: Vec<Argument>,
        renew: bool,
    );

    /// Pre-populates the instance cache.
    fn register_instance(&mut self, id: Identifier, instance: Instance);
}
