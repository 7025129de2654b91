//! Recursive-descent grammar.
//!
//! Split by construct: statements and control flow in `stmt`, declarations
//! and imports in `item`, expressions in `expr`.

mod expr;
mod item;
mod stmt;

use ry_diagnostic::ErrorCode;
use ry_ir::{Block, BlockStyle, Directives, Span, Stmt, Tree};
use ry_lexer::{Token, TokenKind};
use ry_stack::ensure_sufficient_stack;

use crate::cursor::Cursor;
use crate::error::ParseError;

const DIRECTIVES: [&str; 2] = ["trash_cleaner", "strict_typing"];

pub(crate) struct Parser<'a> {
    cursor: Cursor<'a>,
    /// Brace nesting of the statement being parsed; 0 at top level.
    depth: u32,
    trash_cleaner: Option<bool>,
    strict_typing: Option<bool>,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
            depth: 0,
            trash_cleaner: None,
            strict_typing: None,
        }
    }

    pub fn parse_module(mut self) -> Result<Tree, ParseError> {
        let mut stmts = Vec::new();
        while !self.cursor.is_at_end() {
            if self.cursor.check(&TokenKind::RBrace) {
                return Err(ParseError::new(
                    ErrorCode::E1004,
                    self.cursor.span(),
                    "closing `}` has no matching `{`",
                ));
            }
            if self.at_directive() {
                self.parse_directive()?;
                continue;
            }
            stmts.push(self.parse_stmt()?);
        }
        let end = self.cursor.span().end;
        let Some(trash_cleaner) = self.trash_cleaner else {
            return Err(ParseError::new(
                ErrorCode::E1006,
                Span::point(0),
                "missing mandatory directive `trash_cleaner = true` or `trash_cleaner = false`",
            ));
        };
        Ok(Tree {
            body: Block::new(stmts, BlockStyle::Module, Span::new(0, end)),
            directives: Directives {
                trash_cleaner,
                strict_typing: self.strict_typing.unwrap_or(false),
            },
        })
    }

    fn at_directive(&self) -> bool {
        matches!(self.cursor.kind(), TokenKind::Ident(name) if DIRECTIVES.contains(&name.as_str()))
            && matches!(self.cursor.peek(1), TokenKind::Eq)
    }

    fn parse_directive(&mut self) -> Result<(), ParseError> {
        let (name, name_span) = self.cursor.expect_ident()?;
        if self.depth > 0 {
            return Err(ParseError::new(
                ErrorCode::E1010,
                name_span,
                format!("`{name}` may only be set at the top level"),
            ));
        }
        self.cursor.expect(&TokenKind::Eq)?;
        let value = match self.cursor.kind() {
            TokenKind::True => true,
            TokenKind::False => false,
            other => {
                return Err(ParseError::new(
                    ErrorCode::E1008,
                    self.cursor.span(),
                    format!("`{name}` must be `true` or `false`, found {other}"),
                ))
            }
        };
        self.cursor.advance();
        self.end_of_stmt()?;
        let slot = if name == "trash_cleaner" {
            &mut self.trash_cleaner
        } else {
            &mut self.strict_typing
        };
        if slot.is_some() {
            return Err(ParseError::new(
                ErrorCode::E1007,
                name_span,
                format!("`{name}` is set more than once"),
            ));
        }
        *slot = Some(value);
        Ok(())
    }

    /// `{ stmt* }`
    fn parse_block(&mut self) -> Result<Block, ParseError> {
        ensure_sufficient_stack(|| self.parse_block_inner())
    }

    fn parse_block_inner(&mut self) -> Result<Block, ParseError> {
        let open = self.cursor.expect(&TokenKind::LBrace)?;
        self.depth += 1;
        let mut stmts = Vec::new();
        loop {
            match self.cursor.kind() {
                TokenKind::RBrace => break,
                TokenKind::Eof => {
                    return Err(ParseError::new(
                        ErrorCode::E1003,
                        open,
                        "unclosed `{`: block is never closed",
                    ))
                }
                _ if self.at_directive() => self.parse_directive()?,
                _ => stmts.push(self.parse_stmt()?),
            }
        }
        let close = self.cursor.expect(&TokenKind::RBrace)?;
        self.depth -= 1;
        Ok(Block::new(stmts, BlockStyle::Brace, open.merge(close)))
    }

    /// Statements end at a line break, a closing brace or end of input.
    fn end_of_stmt(&self) -> Result<(), ParseError> {
        if self.cursor.at_newline() || matches!(self.cursor.kind(), TokenKind::RBrace | TokenKind::Eof)
        {
            Ok(())
        } else {
            Err(self.cursor.unexpected("a line break after the statement"))
        }
    }

    /// Span from `start` through the last consumed token.
    fn span_from(&self, start: Span) -> Span {
        start.merge(self.cursor.previous_span())
    }

    fn finish(&self, kind: ry_ir::StmtKind, start: Span) -> Result<Stmt, ParseError> {
        let span = self.span_from(start);
        self.end_of_stmt()?;
        Ok(Stmt::new(kind, span))
    }
}
