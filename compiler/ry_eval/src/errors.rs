//! Runtime faults and non-local control flow.

use std::sync::Arc;
use std::time::Duration;

use ry_diagnostic::{Diagnostic, ErrorCode};
use ry_ir::Span;

use crate::{ArtifactError, Value};

/// An exception in flight.
#[derive(Debug)]
pub struct Raised {
    /// The exception instance.
    pub value: Value,
    pub kind: String,
    pub message: String,
    pub span: Span,
    pub package: Option<Arc<str>>,
}

/// Why execution stopped before the program finished.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Halt {
    Cancelled,
    TimedOut(Duration),
}

/// Everything that unwinds the evaluator.
#[derive(Debug)]
pub enum Flow {
    Raise(Box<Raised>),
    Return(Value),
    Break,
    Continue,
    Halt(Halt),
}

/// An uncaught exception, as reported to the user.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct RuntimeFault {
    pub kind: String,
    pub message: String,
    pub span: Span,
    /// Package whose code raised, `None` for the entry program.
    pub package: Option<String>,
    /// Most recent tracer events, oldest first.
    pub trace: Vec<String>,
}

impl RuntimeFault {
    pub fn code(&self) -> ErrorCode {
        match self.kind.as_str() {
            "BridgeError" => ErrorCode::E4002,
            "MemoryError" => ErrorCode::E4003,
            _ => ErrorCode::E4001,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(self.code())
            .with_kind(self.kind.clone())
            .with_message(self.message.clone());
        if self.span != Span::DUMMY {
            diag = diag.with_label(self.span, "raised here");
        }
        if let Some(package) = &self.package {
            diag = diag.with_note(format!("raised in package `{package}`"));
        }
        diag
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error(transparent)]
    Fault(Box<RuntimeFault>),

    #[error("execution cancelled")]
    Cancelled,

    #[error("execution timed out after {0:?}")]
    TimedOut(Duration),

    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("program exited with status {0}")]
    ChildFailed(i32),

    #[error("program was terminated by a signal")]
    ChildKilled,

    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

impl From<Halt> for ExecError {
    fn from(halt: Halt) -> Self {
        match halt {
            Halt::Cancelled => ExecError::Cancelled,
            Halt::TimedOut(after) => ExecError::TimedOut(after),
        }
    }
}

impl ExecError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ExecError::Fault(fault) => fault.to_diagnostic(),
            ExecError::Artifact(e) => e.to_diagnostic(),
            ExecError::TimedOut(_) => {
                Diagnostic::error(ErrorCode::E5005).with_message(self.to_string())
            }
            ExecError::Cancelled => {
                Diagnostic::error(ErrorCode::E5006).with_message(self.to_string())
            }
            ExecError::Spawn { .. } | ExecError::ChildFailed(_) | ExecError::ChildKilled => {
                Diagnostic::error(ErrorCode::E5007).with_message(self.to_string())
            }
        }
    }

    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            ExecError::ChildFailed(code) => *code,
            _ => 1,
        }
    }

    /// A child process has already reported this failure itself.
    pub fn is_reported(&self) -> bool {
        matches!(self, ExecError::ChildFailed(_))
    }
}
