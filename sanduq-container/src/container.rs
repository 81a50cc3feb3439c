//! # The Container
//!
//! Aliases, bindings, the instance cache and the component registry behind
//! one facade.
//!
//! # Architecture
//! ```text
//! make(id) ──alias──> target ──binding?──> (arguments, renew)
//!                                   │
//!                     renew ────────┼──────── cached? ── yes ──> cached instance
//!                       │           │            │
//!                       ▼           ▼            no
//!                 fresh, uncached   resolve ◄────┘
//!                                   │
//!                                   └──> cache (unless refreshable)
//! ```
//!
//! # Examples
//! ```rust
//! use sanduq_container::prelude::*;
//! use std::sync::Arc;
//!
//! struct Transport {
//!     host: String,
//! }
//!
//! struct Mailer {
//!     transport: Arc<Transport>,
//! }
//!
//! let container = Container::builder()
//!     .component(Component::of::<Transport>().constructor(
//!         Signature::new().value("host"),
//!         |args| Ok(Transport { host: args.str(0).unwrap_or("localhost").into() }),
//!     ))
//!     .component(Component::of::<Mailer>().constructor(
//!         Signature::new().inject::<Transport>("transport"),
//!         |args| Ok(Mailer { transport: args.instance(0)? }),
//!     ))
//!     .build()
//!     .expect("Failed to build container");
//!
//! let mailer: Arc<Mailer> = container.resolve().expect("Failed to resolve");
//! assert_eq!(mailer.transport.host, "localhost");
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, instrument, trace};

use crate::cache::InstanceCache;
use crate::component::Component;
use crate::error::{ContainerError, Result};
use crate::graph::GraphValidator;
use crate::identifier::Identifier;
use crate::map::InstanceMap;
use crate::provider::{Provider, ProviderRegistry};
use crate::registry::{ComponentRegistry, discovered};
use crate::resolver::ResolutionStack;
use crate::settings::ContainerSettings;
use crate::tables::{AliasTable, Binding, BindingTable};
use crate::value::{Argument, Instance, Value, downcast};

// ============================================================
// ContainerBuilder
// ============================================================

struct PendingBinding {
    id: Identifier,
    target: Identifier,
    arguments: Vec<Argument>,
    renew: bool,
}

/// Builds a [`Container`].
///
/// Registrations are collected first and applied in [`build()`](ContainerBuilder::build),
/// which also validates the dependency graph unless
/// [`ContainerSettings::validate_on_build`] is off.
///
/// # Examples
/// ```rust,ignore
/// let container = Container::builder()
///     .settings(settings)
///     .component(Component::of::<Database>().constructor(...))
///     .alias("db", Identifier::of::<Database>())
///     .build()?;
/// ```
pub struct ContainerBuilder {
    components: Vec<Component>,
    aliases: Vec<(Identifier, Identifier)>,
    bindings: Vec<PendingBinding>,
    instances: Vec<(Identifier, Instance)>,
    settings: ContainerSettings,
}

impl ContainerBuilder {
    fn new() -> Self {
        Self {
            components: Vec::new(),
            aliases: Vec::new(),
            bindings: Vec::new(),
            instances: Vec::new(),
            settings: ContainerSettings::default(),
        }
    }

    /// Replaces the settings. Configured aliases and bindings are applied
    /// before the ones registered on the builder.
    pub fn settings(mut self, settings: ContainerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Allow overriding previously registered components.
    pub fn allow_override(mut self, allow: bool) -> Self {
        self.settings.allow_override = allow;
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.settings.max_depth = depth;
        self
    }

    pub fn validate_on_build(mut self, validate: bool) -> Self {
        self.settings.validate_on_build = validate;
        self
    }

    pub fn component(mut self, component: impl Into<Component>) -> Self {
        self.components.push(component.into());
        self
    }

    /// Pre-populates the instance cache.
    pub fn instance(mut self, id: impl Into<Identifier>, instance: Instance) -> Self {
        self.instances.push((id.into(), instance));
        self
    }

    pub fn alias(mut self, id: impl Into<Identifier>, target: impl Into<Identifier>) -> Self {
        self.aliases.push((id.into(), target.into()));
        self
    }

    /// See [`Container::bind`].
    pub fn bind(
        mut self,
        id: impl Into<Identifier>,
        target: impl Into<Identifier>,
        arguments: Vec<Argument>,
        renew: bool,
    ) -> Self {
        self.bindings.push(PendingBinding {
            id: id.into(),
            target: target.into(),
            arguments,
            renew,
        });
        self
    }

    /// Adds every component submitted with `inventory::submit!`.
    pub fn discover(mut self) -> Self {
        self.components.extend(discovered());
        self
    }

    /// Add a [`Provider`] module.
    pub fn add_provider(mut self, provider: &dyn Provider) -> Self {
        debug!(provider = provider.name(), "Adding provider");
        provider.register(&mut self);
        self
    }

    /// Build the container.
    ///
    /// # Errors
    /// - [`ContainerError::InvalidSettings`] when `max_depth` is 0
    /// - [`ContainerError::AlreadyRegistered`] for duplicate components while
    ///   overriding is disabled
    /// - graph validation errors, see [`Container::validate`]
    #[instrument(skip(self), name = "container_build")]
    pub fn build(self) -> Result<Container> {
        self.settings.check()?;

        info!(
            components = self.components.len(),
            aliases = self.aliases.len() + self.settings.aliases.len(),
            bindings = self.bindings.len() + self.settings.bindings.len(),
            "Building container"
        );

        let container = Container::with_settings(self.settings);
        let allow_override = container.settings.allow_override;

        for component in self.components {
            container.registry.register(component, allow_override)?;
        }

        for (id, target) in &container.settings.aliases {
            container.alias(id.as_str(), target.as_str());
        }
        for binding in &container.settings.bindings {
            let arguments = binding.arguments.iter().cloned().map(Argument::Value).collect();
            container.bind(binding.id.as_str(), binding.target.as_str(), arguments, binding.renew);
        }

        for (id, target) in self.aliases {
            container.alias(id, target);
        }
        for binding in self.bindings {
            container.bind(binding.id, binding.target, binding.arguments, binding.renew);
        }
        for (id, instance) in self.instances {
            container.set(id, instance);
        }

        if container.settings.validate_on_build {
            container.validate()?;
        }

        info!("Container built successfully ✓");
        Ok(container)
    }
}

impl ProviderRegistry for ContainerBuilder {
    fn register_component(&mut self, component: Component) {
        self.components.push(component);
    }

    fn register_alias(&mut self, id: Identifier, target: Identifier) {
        self.aliases.push((id, target));
    }

    fn register_binding(
        &mut self,
        id: Identifier,
        target: Identifier,
        arguments: Vec<Argument>,
        renew: bool,
    ) {
        self.bindings.push(PendingBinding { id, target, arguments, renew });
    }

    fn register_instance(&mut self, id: Identifier, instance: Instance) {
        self.instances.push((id, instance));
    }
}

// ═══════════════════════════════════════════
// Container
// ═══════════════════════════════════════════

/// The dependency injection container.
///
/// All methods take `&self`; the tables use interior mutability, so one
/// container can be shared by reference (or `Arc`) across the application.
pub struct Container {
    pub(crate) registry: ComponentRegistry,
    pub(crate) aliases: AliasTable,
    pub(crate) bindings: BindingTable,
    pub(crate) instances: InstanceCache,
    pub(crate) settings: ContainerSettings,
}

impl Container {
    /// A container with default settings and every discovered component.
    pub fn new() -> Self {
        let container = Self::with_settings(ContainerSettings::default());
        for component in discovered() {
            // discovery order is unspecified; the last duplicate wins
            container.registry.replace(component);
        }
        container
    }

    /// Create a new builder.
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    fn with_settings(settings: ContainerSettings) -> Self {
        Self {
            registry: ComponentRegistry::new(),
            aliases: AliasTable::new(),
            bindings: BindingTable::new(),
            instances: InstanceCache::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &ContainerSettings {
        &self.settings
    }

    pub(crate) fn stack(&self) -> ResolutionStack {
        ResolutionStack::new(self.settings.max_depth)
    }

    // ── Components ──

    /// Registers a component after construction.
    pub fn register(&self, component: impl Into<Component>) -> Result<()> {
        self.registry.register(component.into(), self.settings.allow_override)
    }

    /// Runs a [`Provider`] against this container.
    pub fn add_provider(&self, provider: &dyn Provider) -> Result<()> {
        debug!(provider = provider.name(), "Adding provider");
        let mut live = LiveRegistry {
            container: self,
            error: None,
        };
        provider.register(&mut live);
        live.error.map_or(Ok(()), Err)
    }

    /// The component registered under `id` (after alias resolution).
    pub fn component(&self, id: impl Into<Identifier>) -> Option<Arc<Component>> {
        self.registry.get(&self.aliases.resolve(&id.into()))
    }

    /// Checks that every injected dependency can be satisfied and that the
    /// dependency graph has no cycles.
    pub fn validate(&self) -> Result<()> {
        GraphValidator::new(self).validate()
    }

    // ── make ──

    /// Resolves `id` into an instance.
    ///
    /// The alias is resolved first. A binding for the target replaces
    /// `arguments` and `renew`. With `renew` the cached instance is dropped
    /// and a fresh, uncached one returned; otherwise the cached instance is
    /// returned, constructing and caching it on first use.
    pub fn make(
        &self,
        id: impl Into<Identifier>,
        arguments: Vec<Argument>,
        renew: bool,
    ) -> Result<Instance> {
        let mut stack = self.stack();
        self.make_in(id.into(), arguments, renew, &mut stack)
    }

    /// [`Container::make`] with a typed result.
    pub fn make_as<T: Send + Sync + 'static>(
        &self,
        id: impl Into<Identifier>,
        arguments: Vec<Argument>,
        renew: bool,
    ) -> Result<Arc<T>> {
        let id = id.into();
        let instance = self.make(id.clone(), arguments, renew)?;
        downcast(&id, instance)
    }

    /// Resolves `T` under `Identifier::of::<T>()` with no arguments.
    ///
    /// ```rust,ignore
    /// let db: Arc<Database> = container.resolve()?;
    /// ```
    pub fn resolve<T: Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        self.make_as::<T>(Identifier::of::<T>(), Vec::new(), false)
    }

    pub(crate) fn make_in(
        &self,
        id: Identifier,
        arguments: Vec<Argument>,
        renew: bool,
        stack: &mut ResolutionStack,
    ) -> Result<Instance> {
        let id = self.aliases.resolve(&id);
        let (arguments, renew) = match self.bindings.find(&id) {
            Some(binding) => (binding.arguments, binding.renew),
            None => (arguments, renew),
        };

        if renew {
            trace!(id = %id, "Renewing instance");
            self.instances.remove(&id);
            return Ok(self.resolve_in(&id, arguments, stack)?.instance);
        }

        if let Some(instance) = self.instances.find(&id) {
            trace!(id = %id.short(), "Cache hit");
            return Ok(instance);
        }

        let resolved = self.resolve_in(&id, arguments, stack)?;
        if resolved.cacheable {
            self.instances.set(id, resolved.instance.clone());
        }
        Ok(resolved.instance)
    }

    // ── Instance cache ──

    /// The cached instance for `id`.
    ///
    /// # Errors
    /// [`ContainerError::NotFound`] when nothing is cached.
    pub fn get(&self, id: impl Into<Identifier>) -> Result<Instance> {
        self.instances.get(&self.aliases.resolve(&id.into()))
    }

    pub fn get_as<T: Send + Sync + 'static>(&self, id: impl Into<Identifier>) -> Result<Arc<T>> {
        let id = self.aliases.resolve(&id.into());
        downcast(&id, self.instances.get(&id)?)
    }

    pub fn has(&self, id: impl Into<Identifier>) -> bool {
        self.instances.has(&self.aliases.resolve(&id.into()))
    }

    /// Caches `instance` under `id`, replacing any previous instance.
    pub fn set(&self, id: impl Into<Identifier>, instance: Instance) {
        self.instances.set(self.aliases.resolve(&id.into()), instance);
    }

    /// Caches `instance` only if nothing is cached under `id` yet.
    pub fn push(&self, id: impl Into<Identifier>, instance: Instance) -> bool {
        self.instances
            .insert_if_absent(self.aliases.resolve(&id.into()), instance)
    }

    /// Drops the cached instance; `true` if there was one.
    pub fn remove(&self, id: impl Into<Identifier>) -> bool {
        self.instances.remove(&self.aliases.resolve(&id.into()))
    }

    /// Drops every cached instance.
    pub fn flush(&self) {
        debug!(instances = self.instances.len(), "Flushing instance cache");
        self.instances.clear();
    }

    /// Map-style view of the instance cache.
    pub fn instances(&self) -> InstanceMap<'_> {
        InstanceMap::new(self)
    }

    // ── Bindings ──

    /// Aliases `id` to `target` and stores `arguments` and `renew` for
    /// `target`. Both override whatever `make` callers pass.
    pub fn bind(
        &self,
        id: impl Into<Identifier>,
        target: impl Into<Identifier>,
        arguments: Vec<Argument>,
        renew: bool,
    ) -> &Self {
        let (id, target) = (id.into(), target.into());
        if id != target {
            self.aliases.set_alias(id, target.clone());
        }
        self.bindings.bind(target, arguments, renew);
        self
    }

    /// [`Container::bind`] with primitive arguments.
    pub fn bind_values(
        &self,
        id: impl Into<Identifier>,
        target: impl Into<Identifier>,
        values: Vec<Value>,
        renew: bool,
    ) -> &Self {
        self.bind(id, target, values.into_iter().map(Argument::Value).collect(), renew)
    }

    /// Removes the binding of `id`'s target. Aliases are left alone.
    pub fn unbind(&self, id: impl Into<Identifier>) -> bool {
        self.bindings.unbind(&self.aliases.resolve(&id.into()))
    }

    pub fn bound(&self, id: impl Into<Identifier>) -> bool {
        self.bindings.is_bound(&self.aliases.resolve(&id.into()))
    }

    /// # Errors
    /// [`ContainerError::NotFound`] when `id` is not bound.
    pub fn binding(&self, id: impl Into<Identifier>) -> Result<Binding> {
        self.bindings.get(&self.aliases.resolve(&id.into()))
    }

    // ── Aliases ──

    pub fn alias(&self, id: impl Into<Identifier>, target: impl Into<Identifier>) -> &Self {
        self.aliases.set_alias(id.into(), target.into());
        self
    }

    /// Removes the alias of `id`; `true` if there was one.
    pub fn un_alias(&self, id: impl Into<Identifier>) -> bool {
        self.aliases.remove_alias(&id.into())
    }

    pub fn has_alias(&self, id: impl Into<Identifier>) -> bool {
        self.aliases.contains(&id.into())
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("components", &self.registry.len())
            .field("aliases", &self.aliases.len())
            .field("bindings", &self.bindings.len())
            .field("instances", &self.instances.len())
            .finish()
    }
}

/// Applies provider registrations straight to a live container, keeping
/// the first error.
struct LiveRegistry<'a> {
    container: &'a Container,
    error: Option<ContainerError>,
}

impl ProviderRegistry for LiveRegistry<'_> {
    fn register_component(&mut self, component: Component) {
        if let Err(err) = self.container.register(component) {
            self.error.get_or_insert(err);
        }
    }

    fn register_alias(&mut self, id: Identifier, target: Identifier) {
        self.container.alias(id, target);
    }

    fn register_binding(
        &mut self,
        id: Identifier,
        target: Identifier,
        arguments: Vec<Argument>,
        renew: bool,
    ) {
        self.container.bind(id, target, arguments, renew);
    }

    fn register_instance(&mut self, id: Identifier, instance: Instance) {
        self.container.set(id, instance);
    }
}

// ═══════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════

pub mod prelude {
    pub use super::{Container, ContainerBuilder};
    pub use crate::args;
    pub use crate::component::{AttributeHook, Component, Function, Signature, Visibility};
    pub use crate::error::{ContainerError, Result};
    pub use crate::identifier::Identifier;
    pub use crate::invoker::Target;
    pub use crate::provider::{Provider, ProviderRegistry};
    pub use crate::settings::ContainerSettings;
    pub use crate::value::{Argument, Arguments, Instance, Value, instance};
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Signature;
    use crate::error::{ConstructionFailure, ContainerError};
    use crate::value::instance;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counter(usize);

    fn counting(built: &Arc<AtomicUsize>) -> Component {
        let built = built.clone();
        Component::named::<Counter>("counter")
            .direct(move |_| Ok(Counter(built.fetch_add(1, Ordering::SeqCst))))
            .build()
    }

    #[test]
    fn make_caches_by_default() {
        let built = Arc::new(AtomicUsize::new(0));
        let container = Container::builder().component(counting(&built)).build().unwrap();

        let a = container.make("counter", vec![], false).unwrap();
        let b = container.make("counter", vec![], false).unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(built.load(Ordering::SeqCst), 1);
        assert!(container.has("counter"));
    }

    #[test]
    fn renew_builds_fresh_and_leaves_cache_empty() {
        let built = Arc::new(AtomicUsize::new(0));
        let container = Container::builder().component(counting(&built)).build().unwrap();

        let cached = container.make("counter", vec![], false).unwrap();
        let fresh = container.make("counter", vec![], true).unwrap();

        assert!(!Arc::ptr_eq(&cached, &fresh));
        assert!(!container.has("counter"));

        let again = container.make_as::<Counter>("counter", vec![], false).unwrap();
        assert_eq!(again.0, 2);
    }

    #[test]
    fn binding_overrides_caller_arguments() {
        let container = Container::builder()
            .component(Component::named::<String>("greeting").constructor(
                Signature::new().value("name"),
                |args| Ok(format!("hello {}", args.str(0).unwrap_or("nobody"))),
            ))
            .build()
            .unwrap();

        container.bind("greeter", "greeting", vec![Argument::from("bound")], false);

        let greeting = container
            .make_as::<String>("greeter", vec![Argument::from("caller")], false)
            .unwrap();
        assert_eq!(*greeting, "hello bound");
        assert!(container.bound("greeter"));
        assert!(container.has_alias("greeter"));
    }

    #[test]
    fn bound_renew_never_caches() {
        let built = Arc::new(AtomicUsize::new(0));
        let container = Container::builder().component(counting(&built)).build().unwrap();
        container.bind("counter", "counter", vec![], true);

        container.make("counter", vec![], false).unwrap();
        container.make("counter", vec![], false).unwrap();

        assert_eq!(built.load(Ordering::SeqCst), 2);
        assert!(!container.has("counter"));
        assert!(!container.has_alias("counter"));
    }

    #[test]
    fn unbind_restores_caching() {
        let built = Arc::new(AtomicUsize::new(0));
        let container = Container::builder().component(counting(&built)).build().unwrap();
        container.bind("counter", "counter", vec![], true);

        assert!(container.unbind("counter"));
        assert!(!container.unbind("counter"));
        container.make("counter", vec![], false).unwrap();
        assert!(container.has("counter"));
    }

    #[test]
    fn refreshable_component_is_not_cached() {
        let container = Container::builder()
            .component(Component::named::<u8>("tick").direct(|_| Ok(1u8)).refreshable())
            .build()
            .unwrap();

        container.make("tick", vec![], false).unwrap();
        assert!(!container.has("tick"));
    }

    #[test]
    fn failed_make_leaves_no_entry() {
        let container = Container::builder()
            .component(
                Component::named::<u8>("broken")
                    .direct(|_| Err(ContainerError::factory("broken", "no disk"))),
            )
            .build()
            .unwrap();

        assert!(matches!(
            container.make("broken", vec![], false),
            Err(ContainerError::Factory { .. })
        ));
        assert!(!container.has("broken"));
    }

    #[test]
    fn set_get_remove_follow_aliases() {
        let container = Container::builder().build().unwrap();
        container.alias("cfg", "config");
        container.set("cfg", instance(5u32));

        assert!(container.has("config"));
        assert_eq!(*container.get_as::<u32>("config").unwrap(), 5);
        assert!(container.remove("cfg"));
        assert!(!container.has("config"));
        assert!(!container.remove("cfg"));
    }

    #[test]
    fn push_only_fills_empty_slots() {
        let container = Container::builder().build().unwrap();
        assert!(container.push("n", instance(1u8)));
        assert!(!container.push("n", instance(2u8)));
        assert_eq!(*container.get_as::<u8>("n").unwrap(), 1);
    }

    #[test]
    fn get_missing_is_not_found() {
        let container = Container::builder().build().unwrap();
        assert!(matches!(container.get("nothing"), Err(ContainerError::NotFound(_))));
        assert!(matches!(container.binding("nothing"), Err(ContainerError::NotFound(_))));
    }

    #[test]
    fn unknown_identifier_is_a_construction_error() {
        let container = Container::builder().build().unwrap();
        match container.make("ghost", vec![], false) {
            Err(ContainerError::Construction(e)) => {
                assert!(matches!(e.reason, ConstructionFailure::Unknown { .. }));
            }
            other => panic!("Expected Construction, got: {:?}", other.err()),
        }
    }

    #[test]
    fn typed_access_reports_mismatch() {
        let container = Container::builder().instance("n", instance(1u8)).build().unwrap();
        assert!(matches!(
            container.get_as::<String>("n"),
            Err(ContainerError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn flush_clears_cache() {
        let container = Container::builder()
            .instance("a", instance(1u8))
            .instance("b", instance(2u8))
            .build()
            .unwrap();
        container.flush();
        assert!(!container.has("a"));
        assert!(!container.has("b"));
    }

    #[test]
    fn debug_display() {
        let container = Container::builder()
            .component(Component::named::<u8>("a").direct(|_| Ok(1u8)))
            .alias("x", "a")
            .build()
            .unwrap();

        let debug = format!("{container:?}");
        assert!(debug.contains("Container"));
        assert!(debug.contains("components: 1"));
        assert!(debug.contains("aliases: 1"));
    }

    #[test]
    fn settings_apply_aliases_and_bindings() {
        let settings: ContainerSettings = serde_json::from_str(
            r#"{
                "aliases": { "hello": "greeting" },
                "bindings": [{ "id": "greeting", "target": "greeting", "arguments": ["config"] }]
            }"#,
        )
        .unwrap();

        let container = Container::builder()
            .settings(settings)
            .component(Component::named::<String>("greeting").constructor(
                Signature::new().value("name"),
                |args| Ok(format!("hello {}", args.str(0).unwrap_or("nobody"))),
            ))
            .build()
            .unwrap();

        assert_eq!(*container.make_as::<String>("hello", vec![], false).unwrap(), "hello config");
    }

    #[test]
    fn zero_max_depth_fails_build() {
        let result = Container::builder().max_depth(0).build();
        assert!(matches!(result, Err(ContainerError::InvalidSettings(_))));

        let container = Container::builder()
            .max_depth(1)
            .component(Component::named::<u8>("leaf").direct(|_| Ok(1u8)))
            .build()
            .unwrap();
        assert!(container.make("leaf", vec![], false).is_ok());
    }

    #[test]
    fn duplicate_component_fails_build() {
        let result = Container::builder()
            .component(Component::named::<u8>("a").direct(|_| Ok(1u8)))
            .component(Component::named::<u8>("a").direct(|_| Ok(2u8)))
            .build();
        assert!(matches!(result, Err(ContainerError::AlreadyRegistered(_))));

        let container = Container::builder()
            .allow_override(true)
            .component(Component::named::<u8>("a").direct(|_| Ok(1u8)))
            .component(Component::named::<u8>("a").direct(|_| Ok(2u8)))
            .build()
            .unwrap();
        assert_eq!(*container.make_as::<u8>("a", vec![], false).unwrap(), 2);
    }
}
