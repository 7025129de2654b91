//! Module and package resolution.
//!
//! - [`ModuleMapping`]: the read-only table of host modules and their targets
//! - [`TargetProbe`]: whether a target can be provided by this host
//! - [`Resolver`]: expands import statements into host imports, loading
//!   packages through a [`PackageCompiler`] with cycle detection
//! - [`PackageRecord`]: a loaded package with its ordered exports

mod error;
mod graph;
mod loader;
mod mapping;
mod package;
mod resolver;

pub use error::ResolutionError;
pub use loader::{PackageLoader, SOURCE_EXTENSION};
pub use mapping::{ModuleMapping, StaticProbe, TargetProbe};
pub use package::{exports_of, Export, ExportKind, PackageRecord};
pub use resolver::{PackageCompiler, Resolver, StandardCompiler};

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
