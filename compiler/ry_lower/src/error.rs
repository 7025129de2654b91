use ry_diagnostic::{Diagnostic, ErrorCode};
use ry_ir::{PassId, Span};

/// A construct matched a pass trigger but could not be lowered.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message} (in pass `{pass}`)")]
pub struct LoweringError {
    pub pass: PassId,
    pub code: ErrorCode,
    pub span: Span,
    pub message: String,
}

impl LoweringError {
    #[cold]
    pub fn new(pass: PassId, code: ErrorCode, span: Span, message: impl Into<String>) -> Self {
        LoweringError {
            pass,
            code,
            span,
            message: message.into(),
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.code)
            .with_kind("LoweringError")
            .with_message(self.message.clone())
            .with_label(self.span, format!("while running `{}`", self.pass))
    }
}
