//! Syntax errors.

use ry_diagnostic::span_utils::LineOffsetTable;
use ry_diagnostic::{Diagnostic, ErrorCode};
use ry_ir::{SourceUnit, Span};
use ry_lexer::{LexError, LexErrorKind};

/// Error raised inside the parser, before it is located in the source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ParseError {
    pub code: ErrorCode,
    pub span: Span,
    pub message: String,
}

impl ParseError {
    #[cold]
    pub fn new(code: ErrorCode, span: Span, message: impl Into<String>) -> Self {
        ParseError {
            code,
            span,
            message: message.into(),
        }
    }
}

/// A lexical or grammatical error, located in its source unit.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{file}:{line}:{column}: {message}")]
pub struct SyntaxError {
    pub code: ErrorCode,
    pub span: Span,
    pub message: String,
    pub file: String,
    /// 1-based.
    pub line: u32,
    /// 1-based, in characters.
    pub column: u32,
    /// The offending source line.
    pub snippet: String,
}

impl SyntaxError {
    #[cold]
    pub(crate) fn locate(err: ParseError, unit: &SourceUnit) -> Self {
        let table = LineOffsetTable::build(unit.text());
        let (line, column) = table.offset_to_line_col(unit.text(), err.span.start);
        SyntaxError {
            code: err.code,
            span: err.span,
            message: err.message,
            file: unit.name(),
            line,
            column,
            snippet: table.line_text(unit.text(), line).to_string(),
        }
    }

    #[cold]
    pub(crate) fn from_lex(err: LexError, unit: &SourceUnit) -> Self {
        let code = match err.kind {
            LexErrorKind::UnterminatedString => ErrorCode::E0001,
            LexErrorKind::InvalidChar(_) => ErrorCode::E0002,
            LexErrorKind::InvalidNumber(_) => ErrorCode::E0003,
            LexErrorKind::UnterminatedForeign(_) => ErrorCode::E0004,
            LexErrorKind::UnterminatedAggregate => ErrorCode::E0005,
            LexErrorKind::Semicolon => ErrorCode::E0006,
            LexErrorKind::ForbiddenKeyword(_) => ErrorCode::E0007,
            LexErrorKind::TooLarge => ErrorCode::E0008,
        };
        Self::locate(ParseError::new(code, err.span, err.kind.to_string()), unit)
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.code)
            .with_kind("SyntaxError")
            .with_message(self.message.clone())
            .with_label(self.span, "here")
    }
}
