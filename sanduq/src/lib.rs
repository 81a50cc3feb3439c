//! # Sanduq — Dependency Injection Container for Rust
//!
//! A runtime IoC container: components are registered with explicit
//! signatures, resolved on demand and cached as singletons. Aliases,
//! argument bindings and method invocation with auto-wired parameters sit
//! on top.

pub use sanduq_container::*;
pub use sanduq_support::*;
