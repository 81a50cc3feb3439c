//! Method and function invocation with auto-wired parameters.

use std::sync::Arc;

use tracing::trace;

use crate::component::{Component, Function, Method, MethodBody, Visibility};
use crate::container::Container;
use crate::error::{ContainerError, InvocationFailure, Result};
use crate::identifier::Identifier;
use crate::resolver::ResolutionStack;
use crate::value::{Argument, Instance, downcast};

/// What a method is called on.
#[derive(Clone)]
pub enum Target {
    /// Resolved through the container, honoring aliases, bindings and renew.
    Id(Identifier),
    /// Used as-is; its component is found by the instance's type.
    Instance(Instance),
}

impl From<Identifier> for Target {
    fn from(id: Identifier) -> Self {
        Target::Id(id)
    }
}

impl From<&str> for Target {
    fn from(id: &str) -> Self {
        Target::Id(id.into())
    }
}

impl From<String> for Target {
    fn from(id: String) -> Self {
        Target::Id(id.into())
    }
}

impl From<Instance> for Target {
    fn from(instance: Instance) -> Self {
        Target::Instance(instance)
    }
}

impl std::fmt::Debug for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Id(id) => write!(f, "Target::Id({id})"),
            Target::Instance(_) => f.write_str("Target::Instance(..)"),
        }
    }
}

impl Container {
    /// Calls `method` on `target`.
    ///
    /// For an identifier target, a binding on the resolved identifier
    /// replaces `constructor_arguments` and `renew`. The method is checked
    /// before anything is resolved, so a missing or non-public method leaves
    /// the cache untouched. Static methods never resolve an instance.
    ///
    /// An identifier with no component of its own but a cached instance
    /// (from `set`, `push` or a provider) is called like a live instance.
    ///
    /// # Errors
    /// [`ContainerError::Invocation`] for unknown targets and missing,
    /// abstract or non-public methods; any error from resolving the target
    /// or auto-wired parameters.
    pub fn invoke_method(
        &self,
        target: impl Into<Target>,
        method: &str,
        arguments: Vec<Argument>,
        renew: bool,
        constructor_arguments: Vec<Argument>,
    ) -> Result<Instance> {
        let mut stack = self.stack();

        let id = match target.into() {
            Target::Id(id) => self.aliases.resolve(&id),
            Target::Instance(instance) => {
                return self.invoke_on_instance(None, instance, method, arguments, &mut stack);
            }
        };

        let Some(component) = self.registry.get(&id) else {
            let instance = self.instances.find(&id).ok_or_else(|| {
                ContainerError::invocation(&id, method, InvocationFailure::UnknownTarget)
            })?;
            return self.invoke_on_instance(Some(&id), instance, method, arguments, &mut stack);
        };

        let (constructor_arguments, renew) = match self.bindings.find(&id) {
            Some(binding) => (binding.arguments, binding.renew),
            None => (constructor_arguments, renew),
        };

        let callee = callable(&component, method)?;
        let bound = self.bind_params(Some(&id), &callee.signature, arguments, &mut stack)?;

        trace!(
            target = %id.short(),
            method,
            static_call = callee.is_static(),
            "Invoking method"
        );
        match &callee.body {
            MethodBody::Static(body) => body(&bound),
            MethodBody::Instance(body) => {
                let instance = self.make_in(id, constructor_arguments, renew, &mut stack)?;
                body(&instance, &bound)
            }
            MethodBody::Abstract => Err(abstract_method(&component, method)),
        }
    }

    /// [`Container::invoke_method`] with a typed result.
    pub fn invoke_method_as<R: Send + Sync + 'static>(
        &self,
        target: impl Into<Target>,
        method: &str,
        arguments: Vec<Argument>,
        renew: bool,
        constructor_arguments: Vec<Argument>,
    ) -> Result<Arc<R>> {
        let result = self.invoke_method(target, method, arguments, renew, constructor_arguments)?;
        downcast(&Identifier::from(method), result)
    }

    /// Calls a free function, binding its parameters like a constructor's.
    pub fn invoke_function<R>(
        &self,
        function: &Function<R>,
        arguments: Vec<Argument>,
    ) -> Result<R> {
        let mut stack = self.stack();
        let bound = self.bind_params(None, &function.signature, arguments, &mut stack)?;
        function.call(&bound)
    }

    /// Calls `method` on an instance the container does not construct; its
    /// component is found by the instance's type.
    fn invoke_on_instance(
        &self,
        id: Option<&Identifier>,
        instance: Instance,
        method: &str,
        arguments: Vec<Argument>,
        stack: &mut ResolutionStack,
    ) -> Result<Instance> {
        let component = self
            .registry
            .get_by_type((*instance).type_id())
            .ok_or_else(|| {
                let target = id.cloned().unwrap_or_else(|| Identifier::from("<instance>"));
                ContainerError::invocation(&target, method, InvocationFailure::UnknownTarget)
            })?;
        let callee = callable(&component, method)?;
        let bound = self.bind_params(Some(component.id()), &callee.signature, arguments, stack)?;

        trace!(target = %component.id().short(), method, "Invoking method on live instance");
        match &callee.body {
            MethodBody::Static(body) => body(&bound),
            MethodBody::Instance(body) => body(&instance, &bound),
            MethodBody::Abstract => Err(abstract_method(&component, method)),
        }
    }
}

fn callable<'c>(component: &'c Component, method: &str) -> Result<&'c Method> {
    let id = component.id();
    let callee = component
        .method(method)
        .ok_or_else(|| ContainerError::invocation(id, method, InvocationFailure::Missing))?;

    if callee.is_abstract() {
        return Err(abstract_method(component, method));
    }
    if callee.visibility != Visibility::Public {
        return Err(ContainerError::invocation(id, method, InvocationFailure::NotPublic));
    }
    Ok(callee)
}

fn abstract_method(component: &Component, method: &str) -> ContainerError {
    ContainerError::invocation(component.id(), method, InvocationFailure::Abstract)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::component::Signature;
    use crate::error::InvocationError;
    use crate::value::instance;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Greeter {
        greeting: String,
    }

    struct Audit {
        entries: AtomicUsize,
    }

    fn container(built: &Arc<AtomicUsize>) -> Container {
        let built = built.clone();
        Container::builder()
            .component(Component::named::<Audit>("audit").direct(|_| {
                Ok(Audit { entries: AtomicUsize::new(0) })
            }))
            .component(
                Component::named::<Greeter>("greeter")
                    .constructor(Signature::new().value("greeting"), move |args| {
                        built.fetch_add(1, Ordering::SeqCst);
                        Ok(Greeter { greeting: args.str(0).unwrap_or("hello").to_string() })
                    })
                    .method(
                        "greet",
                        Signature::new().value("name").inject_id("audit", "audit"),
                        |g, args| {
                            args.instance::<Audit>(1)?.entries.fetch_add(1, Ordering::SeqCst);
                            Ok(format!("{} {}", g.greeting, args.str(0).unwrap_or("you")))
                        },
                    )
                    .method_with("secret", Signature::new(), Visibility::Private, |_, _| Ok(()))
                    .static_method("version", Signature::new(), |_| Ok("2.1"))
                    .abstract_method("farewell"),
            )
            .build()
            .unwrap()
    }

    fn reason(err: ContainerError) -> InvocationFailure {
        match err {
            ContainerError::Invocation(InvocationError { reason, .. }) => reason,
            other => panic!("Expected Invocation, got: {other:?}"),
        }
    }

    #[test]
    fn invokes_with_positional_and_injected_params() {
        let built = Arc::new(AtomicUsize::new(0));
        let container = container(&built);

        let out = container
            .invoke_method_as::<String>("greeter", "greet", args!["Ada"], false, args!["hi"])
            .unwrap();
        assert_eq!(*out, "hi Ada");

        let audit = container.get_as::<Audit>("audit").unwrap();
        assert_eq!(audit.entries.load(Ordering::SeqCst), 1);
        assert!(container.has("greeter"));
    }

    #[test]
    fn reuses_cached_target() {
        let built = Arc::new(AtomicUsize::new(0));
        let container = container(&built);

        container.invoke_method("greeter", "greet", vec![], false, vec![]).unwrap();
        container.invoke_method("greeter", "greet", vec![], false, vec![]).unwrap();
        assert_eq!(built.load(Ordering::SeqCst), 1);

        container.invoke_method("greeter", "greet", vec![], true, vec![]).unwrap();
        assert_eq!(built.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn binding_overrides_constructor_arguments() {
        let built = Arc::new(AtomicUsize::new(0));
        let container = container(&built);
        container.bind("greeter", "greeter", vec!["howdy".into()], false);

        let out = container
            .invoke_method_as::<String>("greeter", "greet", args!["Bo"], false, args!["hi"])
            .unwrap();
        assert_eq!(*out, "howdy Bo");
    }

    #[test]
    fn static_method_does_not_resolve_instance() {
        let built = Arc::new(AtomicUsize::new(0));
        let container = container(&built);

        let version = container
            .invoke_method_as::<&str>("greeter", "version", vec![], false, vec![])
            .unwrap();
        assert_eq!(*version, "2.1");
        assert_eq!(built.load(Ordering::SeqCst), 0);
        assert!(!container.has("greeter"));
    }

    #[test]
    fn rejected_methods_cache_nothing() {
        let built = Arc::new(AtomicUsize::new(0));
        let container = container(&built);

        let private = container.invoke_method("greeter", "secret", vec![], false, vec![]);
        assert_eq!(reason(private.err().unwrap()), InvocationFailure::NotPublic);

        let missing = container.invoke_method("greeter", "shout", vec![], false, vec![]);
        assert_eq!(reason(missing.err().unwrap()), InvocationFailure::Missing);

        let abstract_call = container.invoke_method("greeter", "farewell", vec![], false, vec![]);
        assert_eq!(reason(abstract_call.err().unwrap()), InvocationFailure::Abstract);

        let unknown = container.invoke_method("nobody", "greet", vec![], false, vec![]);
        assert_eq!(reason(unknown.err().unwrap()), InvocationFailure::UnknownTarget);

        assert!(!container.has("greeter"));
        assert!(!container.has("audit"));
        assert_eq!(built.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn live_instance_is_used_as_is() {
        let built = Arc::new(AtomicUsize::new(0));
        let container = container(&built);
        let live = instance(Greeter { greeting: "yo".into() });

        let out = container
            .invoke_method_as::<String>(live, "greet", vec!["Cy".into()], false, vec![])
            .unwrap();
        assert_eq!(*out, "yo Cy");
        assert_eq!(built.load(Ordering::SeqCst), 0);
        assert!(!container.has("greeter"));
    }

    #[test]
    fn set_instance_is_invocable_by_id() {
        let built = Arc::new(AtomicUsize::new(0));
        let container = container(&built);
        container.set("front-desk", instance(Greeter { greeting: "welcome".into() }));

        let out = container
            .invoke_method_as::<String>("front-desk", "greet", args!["Di"], false, vec![])
            .unwrap();
        assert_eq!(*out, "welcome Di");
        assert_eq!(built.load(Ordering::SeqCst), 0);
        assert!(!container.has("greeter"));

        let secret = container.invoke_method("front-desk", "secret", vec![], false, vec![]);
        assert_eq!(reason(secret.err().unwrap()), InvocationFailure::NotPublic);
    }

    #[test]
    fn set_instance_without_component_is_unknown() {
        struct Stray;

        let built = Arc::new(AtomicUsize::new(0));
        let container = container(&built);
        container.set("stray", instance(Stray));

        let err = container.invoke_method("stray", "greet", vec![], false, vec![]).unwrap_err();
        assert_eq!(reason(err), InvocationFailure::UnknownTarget);
    }

    #[test]
    fn invoke_function_autowires() {
        let built = Arc::new(AtomicUsize::new(0));
        let container = container(&built);

        let count = Function::new(
            Signature::new().inject_id("audit", "audit").value("step"),
            |args| {
                let audit = args.instance::<Audit>(0)?;
                let step = args.int(1).unwrap_or(1) as usize;
                Ok(audit.entries.fetch_add(step, Ordering::SeqCst) + step)
            },
        );

        assert_eq!(container.invoke_function(&count, vec![Argument::from(5)]).unwrap(), 5);
        assert_eq!(container.invoke_function(&count, vec![]).unwrap(), 6);
    }
}
