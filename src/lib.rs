//! Declarative secret resolution for shell-launching tooling.
//!
//! Reads a line-oriented manifest (the "Secretfile") mapping logical secret
//! names to backend addresses, and resolves each name through three tiers:
//! process environment, local cache, then a pluggable secret backend.
//!
//! ## Modules
//! - `backends` — Backend capability trait and implementations
//! - `cli` — Command-line handlers
//! - `core` — Manifest parsing, address handling, resolution engine
//! - `error` — Error taxonomy

pub mod backends;
pub mod cli;
pub mod constants;
pub mod core;
pub mod error;

pub use crate::backends::{Secret, SecretBackend};
pub use crate::core::resolver::Resolver;
pub use crate::error::{Error, Result};
