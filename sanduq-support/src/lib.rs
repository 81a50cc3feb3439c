//! # Sanduq Support
//!
//! Shared helpers for the Sanduq container crates.
//!
//! This crate provides:
//! - Rendering of resolution chains and type names for error output
//! - "Did you mean?" suggestions for unknown identifiers

pub mod rendering;
