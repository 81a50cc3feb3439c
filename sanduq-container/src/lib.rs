//! Core container implementation for Sanduq DI.

mod binder;
pub mod cache;
pub mod component;
pub mod container;
pub mod error;
pub mod global;
mod graph;
pub mod identifier;
pub mod invoker;
pub mod map;
pub mod provider;
pub mod registry;
mod resolver;
pub mod settings;
pub mod tables;
pub mod value;

pub use container::{Container, ContainerBuilder, prelude};
pub use error::{ContainerError, Result};
pub use identifier::Identifier;
pub use value::{Argument, Instance, Value};
