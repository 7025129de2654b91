//! Token cursor for navigating the token stream.

use ry_diagnostic::ErrorCode;
use ry_ir::Span;
use ry_lexer::{Token, TokenKind};

use crate::error::ParseError;

/// Position in a token slice whose last token is always `Eof`.
pub(crate) struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Cursor { tokens, pos: 0 }
    }

    #[inline]
    pub fn current(&self) -> &'a Token {
        // Never past the trailing Eof.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    #[inline]
    pub fn kind(&self) -> &'a TokenKind {
        &self.current().kind
    }

    #[inline]
    pub fn span(&self) -> Span {
        self.current().span
    }

    pub fn peek(&self, ahead: usize) -> &'a TokenKind {
        let idx = (self.pos + ahead).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    pub fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            Span::DUMMY
        }
    }

    #[inline]
    pub fn at_newline(&self) -> bool {
        self.current().newline_before
    }

    #[inline]
    pub fn check(&self, kind: &TokenKind) -> bool {
        self.kind() == kind
    }

    pub fn is_at_end(&self) -> bool {
        matches!(self.kind(), TokenKind::Eof)
    }

    pub fn advance(&mut self) -> &'a Token {
        let token = self.current();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    /// Consume the current token if it is `kind`.
    pub fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn expect(&mut self, kind: &TokenKind) -> Result<Span, ParseError> {
        if self.check(kind) {
            Ok(self.advance().span)
        } else {
            Err(self.unexpected(&format!("`{}`", symbol_of(kind))))
        }
    }

    pub fn expect_ident(&mut self) -> Result<(String, Span), ParseError> {
        match self.kind() {
            TokenKind::Ident(name) => {
                let span = self.advance().span;
                Ok((name.clone(), span))
            }
            other => Err(ParseError::new(
                ErrorCode::E1005,
                self.span(),
                format!("expected identifier, found {other}"),
            )),
        }
    }

    /// Consume the identifier `word` used as a contextual keyword.
    pub fn expect_word(&mut self, word: &str) -> Result<Span, ParseError> {
        if self.kind().is_word(word) {
            Ok(self.advance().span)
        } else {
            Err(self.unexpected(&format!("`{word}`")))
        }
    }

    #[cold]
    pub fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::new(
            ErrorCode::E1001,
            self.span(),
            format!("expected {expected}, found {}", self.kind()),
        )
    }
}

fn symbol_of(kind: &TokenKind) -> String {
    let described = kind.describe();
    described.trim_matches('`').to_string()
}
