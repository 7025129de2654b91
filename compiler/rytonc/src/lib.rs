//! The Ryton compiler driver.
//!
//! A [`Session`] owns the configuration, the content-addressed
//! [`SourceCache`] and one package resolver per search path list. The
//! `ryton` binary is a thin argument parser over [`commands`].

pub mod cache;
pub mod commands;
pub mod config;
pub mod error;
pub mod report;
pub mod session;
pub mod tracing_setup;

pub use cache::{CompileError, Compiled, SourceCache};
pub use config::{ConfigError, OutputFormat, SessionConfig, StrategyKind};
pub use error::DriverError;
pub use report::Reporter;
pub use session::Session;
