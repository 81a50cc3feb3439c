//! Component descriptors — the explicit registration model.
//!
//! A [`Component`] tells the container everything it would otherwise learn
//! by introspection: how to construct the type, which of its parameters are
//! positional values and which are injected, which methods it exposes and
//! whether those are public or static.
//!
//! # Examples
//! ```
//! use sanduq_container::component::{Component, Signature};
//!
//! struct Transport { host: String }
//! struct Mailer { transport: std::sync::Arc<Transport> }
//!
//! let transport = Component::of::<Transport>().constructor(
//!     Signature::new().value("host"),
//!     |args| Ok(Transport { host: args.str(0).unwrap_or("localhost").to_string() }),
//! );
//!
//! let mailer = Component::of::<Mailer>()
//!     .constructor(Signature::new().inject::<Transport>("transport"), |args| {
//!         Ok(Mailer { transport: args.instance(0)? })
//!     })
//!     .method("host", Signature::new(), |mailer, _| Ok(mailer.transport.host.clone()));
//! ```

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::{ContainerError, Result};
use crate::identifier::Identifier;
use crate::value::{Arguments, Instance};

/// One declared parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    /// Filled from the next unused explicit argument.
    Value { name: String },
    /// Filled by resolving `target` through the container.
    Inject { name: String, target: Identifier },
}

impl Param {
    pub fn name(&self) -> &str {
        match self {
            Param::Value { name } | Param::Inject { name, .. } => name,
        }
    }

    pub fn target(&self) -> Option<&Identifier> {
        match self {
            Param::Inject { target, .. } => Some(target),
            Param::Value { .. } => None,
        }
    }
}

/// Ordered parameter list of a constructor, setter, method or function.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    params: Vec<Param>,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional (primitive) parameter.
    pub fn value(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param::Value { name: name.into() });
        self
    }

    /// Appends a parameter injected by type.
    pub fn inject<T: ?Sized + 'static>(self, name: impl Into<String>) -> Self {
        self.inject_id(name, Identifier::of::<T>())
    }

    /// Appends a parameter injected by identifier.
    pub fn inject_id(mut self, name: impl Into<String>, target: impl Into<Identifier>) -> Self {
        self.params.push(Param::Inject {
            name: name.into(),
            target: target.into(),
        });
        self
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Identifiers this signature injects, in declaration order.
    pub fn dependencies(&self) -> impl Iterator<Item = &Identifier> {
        self.params.iter().filter_map(Param::target)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

/// Type-erased factory: bound arguments in, instance out.
pub type FactoryFn = Arc<dyn Fn(&Arguments) -> Result<Instance> + Send + Sync>;

/// Type-erased instance method.
pub type MethodFn = Arc<dyn Fn(&Instance, &Arguments) -> Result<Instance> + Send + Sync>;

/// A factory together with the parameters it declares.
#[derive(Clone)]
pub struct Constructor {
    pub signature: Signature,
    pub visibility: Visibility,
    pub(crate) factory: FactoryFn,
}

impl Constructor {
    pub(crate) fn call(&self, args: &Arguments) -> Result<Instance> {
        (self.factory)(args)
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("signature", &self.signature)
            .field("visibility", &self.visibility)
            .finish()
    }
}

/// How a component is instantiated when no setter is registered.
#[derive(Clone)]
pub enum Construction {
    /// No declared constructor: the factory receives the explicit
    /// arguments positionally, without auto-wiring.
    Direct(FactoryFn),
    /// A declared constructor whose parameters are bound.
    Constructor(Constructor),
    /// Cannot be instantiated; only aliasing it elsewhere helps.
    Abstract,
}

impl fmt::Debug for Construction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Construction::Direct(_) => f.write_str("Direct"),
            Construction::Constructor(c) => c.fmt(f),
            Construction::Abstract => f.write_str("Abstract"),
        }
    }
}

#[derive(Clone)]
pub(crate) enum MethodBody {
    Static(FactoryFn),
    Instance(MethodFn),
    Abstract,
}

/// A callable method on a component.
#[derive(Clone)]
pub struct Method {
    pub name: String,
    pub signature: Signature,
    pub visibility: Visibility,
    pub(crate) body: MethodBody,
}

impl Method {
    pub fn is_static(&self) -> bool {
        matches!(self.body, MethodBody::Static(_))
    }

    pub fn is_abstract(&self) -> bool {
        matches!(self.body, MethodBody::Abstract)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .field("visibility", &self.visibility)
            .field("static", &self.is_static())
            .finish()
    }
}

/// Extension hook run on every freshly constructed instance of a component.
///
/// Instances are shared, so a hook that needs to populate state relies on
/// interior mutability in the instance (`OnceCell`, `Mutex`, ...).
pub trait AttributeHook: Send + Sync {
    fn handle(&self, component: &Component, instance: &Instance) -> Result<()>;
}

/// Everything the container knows about one identifier.
#[derive(Clone)]
pub struct Component {
    pub(crate) id: Identifier,
    pub(crate) type_id: Option<TypeId>,
    pub(crate) construction: Construction,
    pub(crate) setter: Option<Constructor>,
    pub(crate) methods: HashMap<String, Method>,
    pub(crate) refreshable: bool,
    pub(crate) hooks: Vec<Arc<dyn AttributeHook>>,
}

impl Component {
    /// Starts describing type `T` under `Identifier::of::<T>()`.
    pub fn of<T: Send + Sync + 'static>() -> ComponentBuilder<T> {
        Self::named::<T>(Identifier::of::<T>())
    }

    /// Starts describing type `T` under a logical identifier.
    pub fn named<T: Send + Sync + 'static>(id: impl Into<Identifier>) -> ComponentBuilder<T> {
        ComponentBuilder {
            component: Component {
                id: id.into(),
                type_id: Some(TypeId::of::<T>()),
                construction: Construction::Abstract,
                setter: None,
                methods: HashMap::new(),
                refreshable: false,
                hooks: Vec::new(),
            },
            _marker: PhantomData,
        }
    }

    /// An abstract identifier: it can carry static methods and be aliased,
    /// but never instantiated.
    pub fn abstract_type(id: impl Into<Identifier>) -> ComponentBuilder<()> {
        let mut builder = Self::named::<()>(id);
        builder.component.type_id = None;
        builder
    }

    pub fn id(&self) -> &Identifier {
        &self.id
    }

    pub fn type_id(&self) -> Option<TypeId> {
        self.type_id
    }

    pub fn construction(&self) -> &Construction {
        &self.construction
    }

    pub fn setter(&self) -> Option<&Constructor> {
        self.setter.as_ref()
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.get(name)
    }

    /// Refreshable components are never cached by `make`.
    pub fn is_refreshable(&self) -> bool {
        self.refreshable
    }

    pub fn is_abstract(&self) -> bool {
        matches!(self.construction, Construction::Abstract) && self.setter.is_none()
    }

    /// Identifiers injected by the setter or the constructor.
    pub fn dependencies(&self) -> Vec<Identifier> {
        let mut deps = Vec::new();
        if let Some(setter) = &self.setter {
            deps.extend(setter.signature.dependencies().cloned());
        } else if let Construction::Constructor(ctor) = &self.construction {
            deps.extend(ctor.signature.dependencies().cloned());
        }
        deps
    }

    pub(crate) fn run_hooks(&self, instance: &Instance) -> Result<()> {
        self.hooks.iter().try_for_each(|hook| hook.handle(self, instance))
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<_> = self.methods.keys().collect();
        methods.sort();
        f.debug_struct("Component")
            .field("id", &self.id)
            .field("construction", &self.construction)
            .field("setter", &self.setter.is_some())
            .field("methods", &methods)
            .field("refreshable", &self.refreshable)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

/// Typed builder for a [`Component`] describing `T`.
pub struct ComponentBuilder<T> {
    component: Component,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> ComponentBuilder<T> {
    /// Declares a public constructor.
    pub fn constructor(
        self,
        signature: Signature,
        factory: impl Fn(&Arguments) -> Result<T> + Send + Sync + 'static,
    ) -> Self {
        self.constructor_with(signature, Visibility::Public, factory)
    }

    /// Declares a constructor with explicit visibility.
    pub fn constructor_with(
        mut self,
        signature: Signature,
        visibility: Visibility,
        factory: impl Fn(&Arguments) -> Result<T> + Send + Sync + 'static,
    ) -> Self {
        self.component.construction = Construction::Constructor(Constructor {
            signature,
            visibility,
            factory: erase(factory),
        });
        self
    }

    /// Declares no constructor: `factory` receives the explicit arguments
    /// as given.
    pub fn direct(
        mut self,
        factory: impl Fn(&Arguments) -> Result<T> + Send + Sync + 'static,
    ) -> Self {
        self.component.construction = Construction::Direct(erase(factory));
        self
    }

    /// Registers a static setter factory used instead of the constructor.
    pub fn setter(
        mut self,
        signature: Signature,
        factory: impl Fn(&Arguments) -> Result<T> + Send + Sync + 'static,
    ) -> Self {
        self.component.setter = Some(Constructor {
            signature,
            visibility: Visibility::Public,
            factory: erase(factory),
        });
        self
    }

    /// Registers a public instance method.
    pub fn method<R: Send + Sync + 'static>(
        self,
        name: impl Into<String>,
        signature: Signature,
        body: impl Fn(&T, &Arguments) -> Result<R> + Send + Sync + 'static,
    ) -> Self {
        self.method_with(name, signature, Visibility::Public, body)
    }

    /// Registers an instance method with explicit visibility.
    pub fn method_with<R: Send + Sync + 'static>(
        mut self,
        name: impl Into<String>,
        signature: Signature,
        visibility: Visibility,
        body: impl Fn(&T, &Arguments) -> Result<R> + Send + Sync + 'static,
    ) -> Self {
        let name = name.into();
        let owner = self.component.id.clone();
        let call: MethodFn = Arc::new(move |instance: &Instance, args: &Arguments| {
            let this = instance.downcast_ref::<T>().ok_or_else(|| ContainerError::TypeMismatch {
                id: owner.clone(),
                expected: std::any::type_name::<T>(),
            })?;
            Ok(Arc::new(body(this, args)?) as Instance)
        });
        self.component.methods.insert(
            name.clone(),
            Method {
                name,
                signature,
                visibility,
                body: MethodBody::Instance(call),
            },
        );
        self
    }

    /// Registers a public static method.
    pub fn static_method<R: Send + Sync + 'static>(
        mut self,
        name: impl Into<String>,
        signature: Signature,
        body: impl Fn(&Arguments) -> Result<R> + Send + Sync + 'static,
    ) -> Self {
        let name = name.into();
        self.component.methods.insert(
            name.clone(),
            Method {
                name,
                signature,
                visibility: Visibility::Public,
                body: MethodBody::Static(erase(body)),
            },
        );
        self
    }

    /// Declares a method without a body.
    pub fn abstract_method(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.component.methods.insert(
            name.clone(),
            Method {
                name,
                signature: Signature::new(),
                visibility: Visibility::Public,
                body: MethodBody::Abstract,
            },
        );
        self
    }

    /// Marks the component as never cached.
    pub fn refreshable(mut self) -> Self {
        self.component.refreshable = true;
        self
    }

    pub fn hook(mut self, hook: impl AttributeHook + 'static) -> Self {
        self.component.hooks.push(Arc::new(hook));
        self
    }

    pub fn build(self) -> Component {
        self.component
    }
}

impl<T: Default + Send + Sync + 'static> ComponentBuilder<T> {
    /// Shorthand for a type without a declared constructor, built with
    /// `T::default()`; explicit arguments are ignored.
    pub fn default_constructible(self) -> Self {
        self.direct(|_| Ok(T::default()))
    }
}

impl<T> From<ComponentBuilder<T>> for Component {
    fn from(builder: ComponentBuilder<T>) -> Self {
        builder.component
    }
}

/// A free function whose parameters are bound by the container.
pub struct Function<R> {
    pub signature: Signature,
    body: Arc<dyn Fn(&Arguments) -> Result<R> + Send + Sync>,
}

impl<R> Function<R> {
    pub fn new(
        signature: Signature,
        body: impl Fn(&Arguments) -> Result<R> + Send + Sync + 'static,
    ) -> Self {
        Self {
            signature,
            body: Arc::new(body),
        }
    }

    pub(crate) fn call(&self, args: &Arguments) -> Result<R> {
        (self.body)(args)
    }
}

impl<R> Clone for Function<R> {
    fn clone(&self) -> Self {
        Self {
            signature: self.signature.clone(),
            body: self.body.clone(),
        }
    }
}

impl<R> fmt::Debug for Function<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function").field("signature", &self.signature).finish()
    }
}

fn erase<T: Send + Sync + 'static>(
    factory: impl Fn(&Arguments) -> Result<T> + Send + Sync + 'static,
) -> FactoryFn {
    Arc::new(move |args: &Arguments| Ok(Arc::new(factory(args)?) as Instance))
}
