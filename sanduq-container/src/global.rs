//! The process-wide container and shortcut functions.
//!
//! The container is an ordinary value; this module only gives one instance
//! a process lifetime. Install it explicitly at startup with [`install`].
//! If nothing is installed, the first call to [`app`] installs
//! `Container::new()`.

use once_cell::sync::OnceCell;
use tracing::info;

use crate::component::Function;
use crate::container::Container;
use crate::error::{ContainerError, Result};
use crate::identifier::Identifier;
use crate::invoker::Target;
use crate::value::{Argument, Instance};

static APP: OnceCell<Container> = OnceCell::new();

/// Installs `container` as the process-wide container.
///
/// # Errors
/// [`ContainerError::GlobalAlreadyInstalled`] if a container was installed
/// before, or [`app`] already created the default one.
pub fn install(container: Container) -> Result<&'static Container> {
    let installed = APP
        .try_insert(container)
        .map_err(|_| ContainerError::GlobalAlreadyInstalled)?;
    info!(container = ?installed, "Installed global container");
    Ok(installed)
}

/// The process-wide container.
pub fn app() -> &'static Container {
    APP.get_or_init(Container::new)
}

pub fn is_installed() -> bool {
    APP.get().is_some()
}

/// [`Container::make`] on [`app`].
pub fn make(id: impl Into<Identifier>, arguments: Vec<Argument>, renew: bool) -> Result<Instance> {
    app().make(id, arguments, renew)
}

/// [`Container::invoke_method`] on [`app`].
pub fn invoke_method(
    target: impl Into<Target>,
    method: &str,
    arguments: Vec<Argument>,
    renew: bool,
    constructor_arguments: Vec<Argument>,
) -> Result<Instance> {
    app().invoke_method(target, method, arguments, renew, constructor_arguments)
}

/// [`Container::invoke_function`] on [`app`].
pub fn invoke_function<R>(function: &Function<R>, arguments: Vec<Argument>) -> Result<R> {
    app().invoke_function(function, arguments)
}
