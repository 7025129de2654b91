//! Statements and control flow.

use ry_diagnostic::ErrorCode;
use ry_ir::{
    BinaryOp, Block, BlockStyle, Expr, ExprKind, ForeignBlock, Handler, IfBranch, MatchArm,
    MatchStmt, Pattern, Protected, Stmt, StmtKind, TryStmt, UnaryOp,
};
use ry_lexer::TokenKind;

use super::Parser;
use crate::error::ParseError;

impl Parser<'_> {
    pub(super) fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.span();
        match self.cursor.kind() {
            TokenKind::Private => self.parse_private(),
            TokenKind::Func if matches!(self.cursor.peek(1), TokenKind::Ident(_)) => {
                let func = self.parse_func(false)?;
                self.finish(StmtKind::Func(func), start)
            }
            TokenKind::Pack => self.parse_pack(false),
            TokenKind::Struct => self.parse_struct(false),
            TokenKind::Macro => self.parse_macro(),
            TokenKind::StateMachine => self.parse_state_machine(),
            TokenKind::Event => self.parse_event(),
            TokenKind::Parallel => {
                self.cursor.advance();
                let body = self.parse_block()?;
                self.finish(StmtKind::Parallel(body), start)
            }
            TokenKind::Guard => {
                self.cursor.advance();
                let cond = self.parse_expr()?;
                let body = self.parse_block()?;
                self.finish(StmtKind::Guard { cond, body }, start)
            }
            TokenKind::Defer => {
                self.cursor.advance();
                let body = self.parse_block()?;
                self.finish(StmtKind::Defer(body), start)
            }
            TokenKind::Match => self.parse_match(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => {
                self.cursor.advance();
                let cond = self.parse_expr()?;
                let body = self.parse_block()?;
                self.finish(StmtKind::While { cond, body }, start)
            }
            TokenKind::For => {
                self.cursor.advance();
                let (var, _) = self.cursor.expect_ident()?;
                self.cursor.expect(&TokenKind::In)?;
                let iter = self.parse_expr()?;
                let body = self.parse_block()?;
                self.finish(StmtKind::For { var, iter, body }, start)
            }
            TokenKind::Try => self.parse_try(),
            TokenKind::Return => {
                self.cursor.advance();
                let value = if self.value_follows() {
                    Some(self.parse_expr()?)
                } else {
                    None
                };
                self.finish(StmtKind::Return(value), start)
            }
            TokenKind::Raise => {
                self.cursor.advance();
                let value = self.parse_expr()?;
                self.finish(StmtKind::Raise(value), start)
            }
            TokenKind::Break => {
                self.cursor.advance();
                self.finish(StmtKind::Break, start)
            }
            TokenKind::Continue => {
                self.cursor.advance();
                self.finish(StmtKind::Continue, start)
            }
            TokenKind::Pass => {
                self.cursor.advance();
                self.finish(StmtKind::Pass, start)
            }
            TokenKind::Clib => {
                self.cursor.advance();
                self.cursor.expect(&TokenKind::Colon)?;
                let (name, _) = self.cursor.expect_ident()?;
                self.finish(StmtKind::NativeLib { name }, start)
            }
            TokenKind::Foreign { lang, code, result } => {
                self.cursor.advance();
                let block = ForeignBlock {
                    lang: lang.clone(),
                    code: Protected::Raw(code.clone()),
                    result: result.clone(),
                };
                self.finish(StmtKind::Foreign(block), start)
            }
            TokenKind::Ident(word)
                if (word == "module" || word == "package")
                    && matches!(self.cursor.peek(1), TokenKind::Import) =>
            {
                self.parse_import()
            }
            TokenKind::Ident(word)
                if word == "table"
                    && matches!(self.cursor.peek(1), TokenKind::Ident(_))
                    && matches!(self.cursor.peek(2), TokenKind::Aggregate(_)) =>
            {
                self.parse_table()
            }
            TokenKind::Ident(_)
                if matches!(self.cursor.peek(1), TokenKind::Bang)
                    && matches!(self.cursor.peek(2), TokenKind::LParen) =>
            {
                self.parse_macro_call()
            }
            _ => self.parse_expr_stmt(false),
        }
    }

    /// Whether an expression follows on the same line.
    fn value_follows(&self) -> bool {
        !self.cursor.at_newline() && !matches!(self.cursor.kind(), TokenKind::RBrace | TokenKind::Eof)
    }

    fn parse_private(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.span();
        self.cursor.advance();
        match self.cursor.kind() {
            TokenKind::Func => {
                let func = self.parse_func(true)?;
                self.finish(StmtKind::Func(func), start)
            }
            TokenKind::Pack => self.parse_pack(true),
            TokenKind::Struct => self.parse_struct(true),
            TokenKind::Ident(_) => {
                let mut stmt = self.parse_expr_stmt(true)?;
                stmt.span = start.merge(stmt.span);
                Ok(stmt)
            }
            _ => Err(self
                .cursor
                .unexpected("`func`, `pack`, `struct` or an assignment after `private`")),
        }
    }

    /// Expression statement, assignment or compound assignment.
    fn parse_expr_stmt(&mut self, private: bool) -> Result<Stmt, ParseError> {
        let start = self.cursor.span();
        let target = self.parse_expr()?;
        let aug = match self.cursor.kind() {
            TokenKind::Eq => None,
            TokenKind::PlusEq => Some(BinaryOp::Add),
            TokenKind::MinusEq => Some(BinaryOp::Sub),
            TokenKind::StarEq => Some(BinaryOp::Mul),
            TokenKind::SlashEq => Some(BinaryOp::Div),
            _ => {
                if private {
                    return Err(self.cursor.unexpected("`=` after a private binding"));
                }
                return self.finish(StmtKind::Expr(target), start);
            }
        };
        let op_span = self.cursor.advance().span;
        if !matches!(
            target.kind,
            ExprKind::Name(_) | ExprKind::Attr { .. } | ExprKind::Index { .. }
        ) {
            return Err(ParseError::new(
                ErrorCode::E1001,
                target.span,
                "invalid assignment target",
            ));
        }
        if private && !matches!(target.kind, ExprKind::Name(_)) {
            return Err(ParseError::new(
                ErrorCode::E1001,
                op_span,
                "only plain names can be private",
            ));
        }
        let value = self.parse_expr()?;
        let kind = match aug {
            None => StmtKind::Assign {
                target,
                value,
                private,
            },
            Some(op) => StmtKind::AugAssign { target, op, value },
        };
        self.finish(kind, start)
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.expect(&TokenKind::If)?;
        let mut branches = vec![self.parse_if_branch()?];
        let mut else_block = None;
        loop {
            if self.cursor.eat(&TokenKind::Elif) {
                branches.push(self.parse_if_branch()?);
            } else if self.cursor.check(&TokenKind::Else) {
                self.cursor.advance();
                if self.cursor.eat(&TokenKind::If) {
                    branches.push(self.parse_if_branch()?);
                } else {
                    else_block = Some(self.parse_block()?);
                    break;
                }
            } else {
                break;
            }
        }
        self.finish(
            StmtKind::If {
                branches,
                else_block,
            },
            start,
        )
    }

    fn parse_if_branch(&mut self) -> Result<IfBranch, ParseError> {
        let cond = self.parse_expr()?;
        let body = self.parse_block()?;
        Ok(IfBranch { cond, body })
    }

    /// `try { } (elerr [Kind [as name]] { })* [finally { }]`
    fn parse_try(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.expect(&TokenKind::Try)?;
        let body = self.parse_block()?;
        let mut handlers = Vec::new();
        while self.cursor.check(&TokenKind::Elerr) {
            let handler_start = self.cursor.advance().span;
            let mut kind = None;
            let mut binding = None;
            if let TokenKind::Ident(name) = self.cursor.kind() {
                kind = Some(name.clone());
                self.cursor.advance();
            }
            if self.cursor.eat(&TokenKind::As) {
                binding = Some(self.cursor.expect_ident()?.0);
            }
            let handler_body = self.parse_block()?;
            handlers.push(Handler {
                kind,
                binding,
                body: handler_body,
                span: self.span_from(handler_start),
            });
        }
        let finally = if self.cursor.eat(&TokenKind::Finally) {
            Some(self.parse_block()?)
        } else {
            None
        };
        if handlers.is_empty() && finally.is_none() {
            return Err(self.cursor.unexpected("`elerr` or `finally` after `try` block"));
        }
        self.finish(
            StmtKind::Elerr(TryStmt {
                body,
                handlers,
                finally,
            }),
            start,
        )
    }

    /// `match v { case p => body ... else => body }`
    fn parse_match(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.expect(&TokenKind::Match)?;
        let scrutinee = self.parse_expr()?;
        let open = self.cursor.expect(&TokenKind::LBrace)?;
        self.depth += 1;
        let mut arms = Vec::new();
        let mut default = None;
        loop {
            match self.cursor.kind() {
                TokenKind::RBrace => break,
                TokenKind::Eof => {
                    return Err(ParseError::new(
                        ErrorCode::E1003,
                        open,
                        "unclosed `{` in match block",
                    ))
                }
                TokenKind::Case => {
                    let arm_start = self.cursor.advance().span;
                    if default.is_some() {
                        return Err(ParseError::new(
                            ErrorCode::E1001,
                            arm_start,
                            "`case` after the `else` arm is unreachable",
                        ));
                    }
                    let pattern = self.parse_pattern()?;
                    self.cursor.expect(&TokenKind::FatArrow)?;
                    let body = self.parse_arm_body()?;
                    arms.push(MatchArm {
                        pattern,
                        body,
                        span: self.span_from(arm_start),
                    });
                }
                TokenKind::Else => {
                    let else_span = self.cursor.advance().span;
                    if default.is_some() {
                        return Err(ParseError::new(
                            ErrorCode::E1001,
                            else_span,
                            "match has more than one `else` arm",
                        ));
                    }
                    self.cursor.expect(&TokenKind::FatArrow)?;
                    default = Some(self.parse_arm_body()?);
                }
                _ => return Err(self.cursor.unexpected("`case`, `else` or `}`")),
            }
        }
        self.cursor.expect(&TokenKind::RBrace)?;
        self.depth -= 1;
        self.finish(
            StmtKind::Match(MatchStmt {
                scrutinee,
                arms,
                default,
            }),
            start,
        )
    }

    fn parse_arm_body(&mut self) -> Result<Block, ParseError> {
        if self.cursor.check(&TokenKind::LBrace) {
            return self.parse_block();
        }
        let stmt = self.parse_stmt()?;
        let span = stmt.span;
        Ok(Block::new(vec![stmt], BlockStyle::Brace, span))
    }

    /// `literal | _ | Type(binding)`
    fn parse_pattern(&mut self) -> Result<Pattern, ParseError> {
        let start = self.cursor.span();
        match self.cursor.kind().clone() {
            TokenKind::Ident(name) if name == "_" => {
                self.cursor.advance();
                Ok(Pattern::Wildcard)
            }
            TokenKind::Ident(type_name) if matches!(self.cursor.peek(1), TokenKind::LParen) => {
                self.cursor.advance();
                self.cursor.advance();
                let (binding, _) = self.cursor.expect_ident()?;
                self.cursor.expect(&TokenKind::RParen)?;
                Ok(Pattern::Type { type_name, binding })
            }
            TokenKind::Int(_)
            | TokenKind::Float(_)
            | TokenKind::Str(_)
            | TokenKind::True
            | TokenKind::False
            | TokenKind::None => Ok(Pattern::Literal(self.parse_primary()?)),
            TokenKind::Minus if matches!(self.cursor.peek(1), TokenKind::Int(_) | TokenKind::Float(_)) => {
                self.cursor.advance();
                let operand = self.parse_primary()?;
                let span = self.span_from(start);
                Ok(Pattern::Literal(Expr::new(
                    ExprKind::Unary {
                        op: UnaryOp::Neg,
                        operand: Box::new(operand),
                    },
                    span,
                )))
            }
            other => Err(ParseError::new(
                ErrorCode::E1009,
                start,
                format!("expected a literal, `_` or `Type(name)` pattern, found {other}"),
            )),
        }
    }
}
