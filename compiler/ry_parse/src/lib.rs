//! Parser for Ryton.
//!
//! Recursive descent over the token stream from `ry_lexer`. Every node gets
//! the span of the source text it was parsed from. On the first error
//! parsing stops and no tree is returned.

mod cursor;
mod error;
mod grammar;

use ry_ir::{SourceUnit, Tree};
use ry_lexer::TokenList;
use tracing::debug;

pub use error::SyntaxError;

/// Lex a source unit, mapping lexer errors to located syntax errors.
pub fn tokenize(unit: &SourceUnit) -> Result<TokenList, SyntaxError> {
    ry_lexer::lex(unit.text()).map_err(|e| SyntaxError::from_lex(e, unit))
}

/// Parse tokens previously produced by [`tokenize`] for `unit`.
#[tracing::instrument(level = "debug", skip_all, fields(file = %unit.name()))]
pub fn parse_tokens(tokens: &TokenList, unit: &SourceUnit) -> Result<Tree, SyntaxError> {
    let tree = grammar::Parser::new(tokens.as_slice())
        .parse_module()
        .map_err(|e| SyntaxError::locate(e, unit))?;
    debug!(stmts = tree.body.stmts.len(), "parsed");
    Ok(tree)
}

/// Lex and parse a source unit.
pub fn parse(unit: &SourceUnit) -> Result<Tree, SyntaxError> {
    let tokens = tokenize(unit)?;
    parse_tokens(&tokens, unit)
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
