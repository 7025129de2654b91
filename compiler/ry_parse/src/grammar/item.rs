//! Declarations and imports.

use ry_diagnostic::ErrorCode;
use ry_ir::{
    Block, BlockStyle, Contract, Expr, ExprKind, FieldDecl, FuncDecl, ImportDecl, ImportItem,
    ImportKind, MacroDecl, PackDecl, Param, Protected, StateMachineDecl, Stmt, StmtKind,
    StructDecl, Transition,
};
use ry_lexer::TokenKind;

use super::Parser;
use crate::error::ParseError;

impl Parser<'_> {
    /// `func name(params) [require C ensure E body] { }`, starting at `func`.
    pub(super) fn parse_func(&mut self, private: bool) -> Result<FuncDecl, ParseError> {
        self.cursor.expect(&TokenKind::Func)?;
        let (name, _) = self.cursor.expect_ident()?;
        let params = self.parse_params()?;
        let contract = if self.cursor.eat(&TokenKind::Require) {
            let require = self.parse_expr()?;
            self.cursor.expect(&TokenKind::Ensure)?;
            let ensure = self.parse_expr()?;
            self.cursor.expect_word("body")?;
            Some(Contract { require, ensure })
        } else {
            None
        };
        let body = self.parse_block()?;
        Ok(FuncDecl {
            name,
            params,
            body,
            contract,
            private,
        })
    }

    /// `(name[: Type][= default], ...)`
    pub(super) fn parse_params(&mut self) -> Result<Vec<Param>, ParseError> {
        self.cursor.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        while !self.cursor.check(&TokenKind::RParen) {
            let (name, start) = self.cursor.expect_ident()?;
            let ty = if self.cursor.eat(&TokenKind::Colon) {
                Some(self.cursor.expect_ident()?.0)
            } else {
                None
            };
            let default = if self.cursor.eat(&TokenKind::Eq) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            params.push(Param {
                name,
                ty,
                default,
                span: self.span_from(start),
            });
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect(&TokenKind::RParen)?;
        Ok(params)
    }

    /// `pack Name [:: Base] { members }`; `init(...) { }` is the constructor.
    pub(super) fn parse_pack(&mut self, private: bool) -> Result<Stmt, ParseError> {
        let start = self.cursor.expect(&TokenKind::Pack)?;
        let (name, _) = self.cursor.expect_ident()?;
        let base = if self.cursor.eat(&TokenKind::DoubleColon) {
            Some(self.cursor.expect_ident()?.0)
        } else {
            None
        };
        let open = self.cursor.expect(&TokenKind::LBrace)?;
        self.depth += 1;
        let mut members = Vec::new();
        loop {
            match self.cursor.kind() {
                TokenKind::RBrace => break,
                TokenKind::Eof => {
                    return Err(ParseError::new(
                        ErrorCode::E1003,
                        open,
                        format!("unclosed `{{` in pack `{name}`"),
                    ))
                }
                TokenKind::Ident(word)
                    if word == "init" && matches!(self.cursor.peek(1), TokenKind::LParen) =>
                {
                    let init_start = self.cursor.advance().span;
                    let params = self.parse_params()?;
                    let body = self.parse_block()?;
                    let func = FuncDecl {
                        name: "init".to_string(),
                        params,
                        body,
                        contract: None,
                        private: false,
                    };
                    members.push(self.finish(StmtKind::Func(func), init_start)?);
                }
                _ => members.push(self.parse_stmt()?),
            }
        }
        let close = self.cursor.expect(&TokenKind::RBrace)?;
        self.depth -= 1;
        let decl = PackDecl {
            name,
            base,
            body: Block::new(members, BlockStyle::Brace, open.merge(close)),
            private,
        };
        self.finish(StmtKind::Pack(decl), start)
    }

    /// `struct Name { field: Type [= default] [,] ... }`
    pub(super) fn parse_struct(&mut self, private: bool) -> Result<Stmt, ParseError> {
        let start = self.cursor.expect(&TokenKind::Struct)?;
        let (name, _) = self.cursor.expect_ident()?;
        let open = self.cursor.expect(&TokenKind::LBrace)?;
        let mut fields = Vec::new();
        while !self.cursor.check(&TokenKind::RBrace) {
            if self.cursor.is_at_end() {
                return Err(ParseError::new(
                    ErrorCode::E1003,
                    open,
                    format!("unclosed `{{` in struct `{name}`"),
                ));
            }
            let (field, field_start) = self.cursor.expect_ident()?;
            self.cursor.expect(&TokenKind::Colon)?;
            let (ty, _) = self.cursor.expect_ident()?;
            let default = if self.cursor.eat(&TokenKind::Eq) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            fields.push(FieldDecl {
                name: field,
                ty,
                default,
                span: self.span_from(field_start),
            });
            self.cursor.eat(&TokenKind::Comma);
        }
        self.cursor.expect(&TokenKind::RBrace)?;
        self.finish(
            StmtKind::Struct(StructDecl {
                name,
                fields,
                private,
            }),
            start,
        )
    }

    /// `macro name(a, b) { }`
    pub(super) fn parse_macro(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.expect(&TokenKind::Macro)?;
        let (name, _) = self.cursor.expect_ident()?;
        self.cursor.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        while !self.cursor.check(&TokenKind::RParen) {
            params.push(self.cursor.expect_ident()?.0);
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect(&TokenKind::RParen)?;
        let body = self.parse_block()?;
        self.finish(StmtKind::MacroDef(MacroDecl { name, params, body }), start)
    }

    /// `name!(args)`
    pub(super) fn parse_macro_call(&mut self) -> Result<Stmt, ParseError> {
        let (name, start) = self.cursor.expect_ident()?;
        self.cursor.expect(&TokenKind::Bang)?;
        let args = self.parse_call_args()?;
        self.finish(StmtKind::MacroCall { name, args }, start)
    }

    /// `state_machine Name { initial s  a -> b : action ... }`
    pub(super) fn parse_state_machine(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.expect(&TokenKind::StateMachine)?;
        let (name, _) = self.cursor.expect_ident()?;
        let open = self.cursor.expect(&TokenKind::LBrace)?;
        self.cursor.expect_word("initial")?;
        let (initial, _) = self.cursor.expect_ident()?;
        let mut transitions = Vec::new();
        while !self.cursor.check(&TokenKind::RBrace) {
            if self.cursor.is_at_end() {
                return Err(ParseError::new(
                    ErrorCode::E1003,
                    open,
                    format!("unclosed `{{` in state machine `{name}`"),
                ));
            }
            let (from, from_span) = self.cursor.expect_ident()?;
            self.cursor.expect(&TokenKind::Arrow)?;
            let (to, _) = self.cursor.expect_ident()?;
            self.cursor.expect(&TokenKind::Colon)?;
            let (action, _) = self.cursor.expect_ident()?;
            transitions.push(Transition {
                from,
                to,
                action,
                span: self.span_from(from_span),
            });
        }
        self.cursor.expect(&TokenKind::RBrace)?;
        self.finish(
            StmtKind::StateMachine(StateMachineDecl {
                name,
                initial,
                transitions,
            }),
            start,
        )
    }

    /// `event left -> right { }`
    pub(super) fn parse_event(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.expect(&TokenKind::Event)?;
        let left = self.parse_expr()?;
        self.cursor.expect(&TokenKind::Arrow)?;
        let right = self.parse_expr()?;
        let body = self.parse_block()?;
        self.finish(StmtKind::Event { left, right, body }, start)
    }

    /// `module import { a.b.c[:alias], ... }` or `package import { ... }`
    pub(super) fn parse_import(&mut self) -> Result<Stmt, ParseError> {
        let (word, start) = self.cursor.expect_ident()?;
        let kind = if word == "module" {
            ImportKind::Module
        } else {
            ImportKind::Package
        };
        self.cursor.expect(&TokenKind::Import)?;
        let open = self.cursor.expect(&TokenKind::LBrace)?;
        let mut items = Vec::new();
        while !self.cursor.check(&TokenKind::RBrace) {
            if self.cursor.is_at_end() {
                return Err(ParseError::new(
                    ErrorCode::E1003,
                    open,
                    "unclosed `{` in import list",
                ));
            }
            let (first, item_start) = self.cursor.expect_ident()?;
            let mut path = vec![first];
            while self.cursor.eat(&TokenKind::Dot) {
                path.push(self.cursor.expect_ident()?.0);
            }
            let alias = if self.cursor.eat(&TokenKind::Colon) {
                Some(self.cursor.expect_ident()?.0)
            } else {
                None
            };
            items.push(ImportItem {
                path,
                alias,
                span: self.span_from(item_start),
            });
            self.cursor.eat(&TokenKind::Comma);
        }
        self.cursor.expect(&TokenKind::RBrace)?;
        if items.is_empty() {
            return Err(ParseError::new(
                ErrorCode::E1001,
                self.span_from(start),
                "import list is empty",
            ));
        }
        self.finish(StmtKind::Import(ImportDecl { kind, items }), start)
    }

    /// `table name <{ ... }>`
    pub(super) fn parse_table(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.expect_word("table")?;
        let (name, _) = self.cursor.expect_ident()?;
        let TokenKind::Aggregate(text) = self.cursor.kind() else {
            return Err(self.cursor.unexpected("a literal aggregate `<{ ... }>`"));
        };
        let value_span = self.cursor.advance().span;
        let value = Expr::new(ExprKind::Aggregate(Protected::Raw(text.clone())), value_span);
        self.finish(StmtKind::Table { name, value }, start)
    }
}
