//! Failures of a driver command.

use std::path::PathBuf;

use ry_eval::{ArtifactError, ExecError, Program};
use ry_ir::SourceUnit;
use ry_resolve::ResolutionError;

use crate::cache::CompileError;
use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{error}")]
    Compile {
        unit: SourceUnit,
        #[source]
        error: CompileError,
    },

    #[error("{error}")]
    Resolution {
        unit: SourceUnit,
        #[source]
        error: ResolutionError,
    },

    #[error("{error}")]
    Exec {
        /// The program that failed, when it got as far as running.
        program: Option<Box<Program>>,
        #[source]
        error: ExecError,
    },

    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

impl DriverError {
    /// Process exit status: 2 for unresolvable imports, the child's own
    /// status when a subprocess failed, 1 otherwise. A package that is found
    /// but fails to compile is a source error and exits with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            DriverError::Resolution { error, .. } if error.is_broken_package() => 1,
            DriverError::Resolution { .. } => 2,
            DriverError::Exec { error, .. } => error.exit_code(),
            _ => 1,
        }
    }

    /// The failure has already been printed, by a child process.
    pub fn is_reported(&self) -> bool {
        matches!(self, DriverError::Exec { error, .. } if error.is_reported())
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
