use std::path::PathBuf;

use ry_diagnostic::{Diagnostic, ErrorCode};
use ry_ir::{SourceUnit, Span};

/// Failure to resolve an import.
///
/// Spans point into the unit that contained the failing import. For
/// failures inside a package that unit is carried by [`InPackage`].
///
/// [`InPackage`]: ResolutionError::InPackage
#[derive(Clone, Debug, thiserror::Error)]
pub enum ResolutionError {
    #[error("module `{path}` not found")]
    ModuleNotFound { path: String, span: Span },

    #[error("module `{module}` needs `{target}`, which is not available")]
    TargetUnavailable {
        module: String,
        target: String,
        span: Span,
    },

    #[error("package `{name}` not found")]
    PackageNotFound {
        name: String,
        searched: Vec<PathBuf>,
        span: Span,
    },

    #[error("circular import detected: {}", cycle.join(" -> "))]
    PackageCycle { cycle: Vec<String>, span: Span },

    #[error("cannot read package `{name}` at {}: {message}", path.display())]
    PackageUnreadable {
        name: String,
        path: PathBuf,
        message: String,
        span: Span,
    },

    /// The package source itself is broken.
    #[error("package `{name}` failed to compile: {}", diagnostic.message)]
    PackageFailed {
        name: String,
        unit: SourceUnit,
        diagnostic: Box<Diagnostic>,
    },

    /// `source` happened while resolving the imports of `package`.
    #[error("{source}")]
    InPackage {
        package: String,
        unit: SourceUnit,
        source: Box<ResolutionError>,
    },
}

impl ResolutionError {
    /// The innermost error, with package context peeled off.
    pub fn root(&self) -> &ResolutionError {
        match self {
            ResolutionError::InPackage { source, .. } => source.root(),
            other => other,
        }
    }

    /// A package was found but its own source does not compile. This is a
    /// bug in that source rather than a failure to resolve.
    pub fn is_broken_package(&self) -> bool {
        matches!(self.root(), ResolutionError::PackageFailed { .. })
    }

    /// Source unit the diagnostic's spans refer to, when it is not the
    /// program being compiled.
    pub fn unit(&self) -> Option<&SourceUnit> {
        match self {
            ResolutionError::InPackage { source, unit, .. } => source.unit().or(Some(unit)),
            ResolutionError::PackageFailed { unit, .. } => Some(unit),
            _ => None,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ResolutionError::ModuleNotFound { .. } => ErrorCode::E3001,
            ResolutionError::PackageCycle { .. } => ErrorCode::E3002,
            ResolutionError::PackageNotFound { .. } => ErrorCode::E3003,
            ResolutionError::TargetUnavailable { .. } => ErrorCode::E3004,
            ResolutionError::PackageUnreadable { .. } => ErrorCode::E3005,
            ResolutionError::PackageFailed { diagnostic, .. } => diagnostic.code,
            ResolutionError::InPackage { source, .. } => source.code(),
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolutionError::PackageFailed { name, diagnostic, .. } => {
                (**diagnostic).clone().with_note(format!("while compiling package `{name}`"))
            }
            ResolutionError::InPackage {
                package, source, ..
            } => source
                .to_diagnostic()
                .with_note(format!("while resolving imports of package `{package}`")),
            ResolutionError::ModuleNotFound { span, .. }
            | ResolutionError::TargetUnavailable { span, .. }
            | ResolutionError::PackageCycle { span, .. }
            | ResolutionError::PackageUnreadable { span, .. } => {
                Diagnostic::error(self.code())
                    .with_message(self.to_string())
                    .with_label(*span, "imported here")
            }
            ResolutionError::PackageNotFound { span, searched, .. } => {
                let mut diag = Diagnostic::error(self.code())
                    .with_message(self.to_string())
                    .with_label(*span, "imported here");
                for dir in searched {
                    diag = diag.with_note(format!("looked in {}", dir.display()));
                }
                diag
            }
        }
    }
}
