//! Lexer errors.

use ry_ir::Span;

/// The first lexical error in a source unit. Lexing stops there.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{kind}")]
pub struct LexError {
    pub span: Span,
    pub kind: LexErrorKind,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LexErrorKind {
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("invalid character `{0}`")]
    InvalidChar(char),
    #[error("invalid number literal `{0}`")]
    InvalidNumber(String),
    #[error("foreign block `#{0}(start)` has no matching `#{0}(end: name)` marker")]
    UnterminatedForeign(String),
    #[error("literal aggregate is missing its closing `}}>`")]
    UnterminatedAggregate,
    #[error("semicolons are not allowed; end the statement with a line break")]
    Semicolon,
    #[error("`{0}` is reserved and cannot be used; assign with `name = value`")]
    ForbiddenKeyword(String),
    #[error("source file exceeds 4 GiB")]
    TooLarge,
}

impl LexError {
    #[cold]
    pub fn new(span: Span, kind: LexErrorKind) -> Self {
        LexError { span, kind }
    }
}
