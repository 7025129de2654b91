//! Expression parsing.
//!
//! Precedence, lowest first: `|>`, `>>`, `or`, `and`, `not`, comparisons,
//! ranges, `+ -`, `* / %`, unary `-`, postfix.

use ry_diagnostic::ErrorCode;
use ry_ir::{BinaryOp, Expr, ExprKind, Protected, Span, UnaryOp};
use ry_lexer::TokenKind;
use ry_stack::ensure_sufficient_stack;

use super::Parser;
use crate::error::ParseError;

impl Parser<'_> {
    pub(super) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        ensure_sufficient_stack(|| self.parse_pipe())
    }

    fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
        let span = left.span.merge(right.span);
        Expr::new(
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
        )
    }

    fn parse_pipe(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_compose()?;
        while self.cursor.eat(&TokenKind::PipeGt) {
            let right = self.parse_compose()?;
            left = Self::binary(BinaryOp::Pipe, left, right);
        }
        Ok(left)
    }

    fn parse_compose(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_or()?;
        while self.cursor.eat(&TokenKind::GtGt) {
            let right = self.parse_or()?;
            left = Self::binary(BinaryOp::Compose, left, right);
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;
        while self.cursor.eat(&TokenKind::Or) {
            let right = self.parse_and()?;
            left = Self::binary(BinaryOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_not()?;
        while self.cursor.eat(&TokenKind::And) {
            let right = self.parse_not()?;
            left = Self::binary(BinaryOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, ParseError> {
        if self.cursor.check(&TokenKind::Not) {
            let start = self.cursor.advance().span;
            let operand = ensure_sufficient_stack(|| self.parse_not())?;
            let span = start.merge(operand.span);
            return Ok(Expr::new(
                ExprKind::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                },
                span,
            ));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_range()?;
        loop {
            let op = match self.cursor.kind() {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::NotEq => BinaryOp::NotEq,
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::LtEq => BinaryOp::LtEq,
                TokenKind::GtEq => BinaryOp::GtEq,
                TokenKind::Spaceship => BinaryOp::Spaceship,
                TokenKind::In => BinaryOp::In,
                _ => return Ok(left),
            };
            self.cursor.advance();
            let right = self.parse_range()?;
            left = Self::binary(op, left, right);
        }
    }

    fn parse_range(&mut self) -> Result<Expr, ParseError> {
        let start = self.parse_additive()?;
        let inclusive = match self.cursor.kind() {
            TokenKind::DotDot => true,
            TokenKind::DotDotDot => false,
            _ => return Ok(start),
        };
        self.cursor.advance();
        let end = self.parse_additive()?;
        let span = start.span.merge(end.span);
        Ok(Expr::new(
            ExprKind::Range {
                start: Box::new(start),
                end: Box::new(end),
                inclusive,
            },
            span,
        ))
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.cursor.kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => return Ok(left),
            };
            self.cursor.advance();
            let right = self.parse_multiplicative()?;
            left = Self::binary(op, left, right);
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.cursor.kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => return Ok(left),
            };
            self.cursor.advance();
            let right = self.parse_unary()?;
            left = Self::binary(op, left, right);
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if self.cursor.check(&TokenKind::Minus) {
            let start = self.cursor.advance().span;
            let operand = ensure_sufficient_stack(|| self.parse_unary())?;
            let span = start.merge(operand.span);
            return Ok(Expr::new(
                ExprKind::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(operand),
                },
                span,
            ));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.cursor.kind() {
                // A `(` or `[` on a new line starts a new statement.
                TokenKind::LParen if !self.cursor.at_newline() => {
                    let args = self.parse_call_args()?;
                    let span = self.span_from(expr.span);
                    expr = Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        span,
                    );
                }
                TokenKind::LBracket if !self.cursor.at_newline() => {
                    self.cursor.advance();
                    let index = self.parse_expr()?;
                    self.cursor.expect(&TokenKind::RBracket)?;
                    let span = self.span_from(expr.span);
                    expr = Expr::new(
                        ExprKind::Index {
                            object: Box::new(expr),
                            index: Box::new(index),
                        },
                        span,
                    );
                }
                TokenKind::Dot => {
                    self.cursor.advance();
                    let (name, _) = self.cursor.expect_ident()?;
                    let span = self.span_from(expr.span);
                    expr = Expr::new(
                        ExprKind::Attr {
                            object: Box::new(expr),
                            name,
                        },
                        span,
                    );
                }
                TokenKind::Bang
                    if matches!(expr.kind, ExprKind::Name(_))
                        && matches!(self.cursor.peek(1), TokenKind::LParen) =>
                {
                    return Err(ParseError::new(
                        ErrorCode::E1001,
                        self.span_from(expr.span),
                        "macro invocations must stand alone as statements",
                    ));
                }
                _ => return Ok(expr),
            }
        }
    }

    /// `(expr, ...)`
    pub(super) fn parse_call_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.cursor.expect(&TokenKind::LParen)?;
        let mut args = Vec::new();
        while !self.cursor.check(&TokenKind::RParen) {
            args.push(self.parse_expr()?);
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect(&TokenKind::RParen)?;
        Ok(args)
    }

    pub(super) fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let start = self.cursor.span();
        let kind = match self.cursor.kind() {
            TokenKind::Int(n) => ExprKind::Int(*n),
            TokenKind::Float(f) => ExprKind::Float(*f),
            TokenKind::Str(s) => ExprKind::Str(s.clone()),
            TokenKind::True => ExprKind::Bool(true),
            TokenKind::False => ExprKind::Bool(false),
            TokenKind::None => ExprKind::None,
            TokenKind::This => ExprKind::This,
            TokenKind::Ident(name) => ExprKind::Name(name.clone()),
            TokenKind::Aggregate(text) => ExprKind::Aggregate(Protected::Raw(text.clone())),
            TokenKind::LParen => return self.parse_group(),
            TokenKind::LBracket => return self.parse_list(),
            TokenKind::LBrace => return self.parse_dict(),
            TokenKind::Func if matches!(self.cursor.peek(1), TokenKind::LParen) => {
                return self.parse_lambda()
            }
            other => {
                return Err(ParseError::new(
                    ErrorCode::E1002,
                    start,
                    format!("expected expression, found {other}"),
                ))
            }
        };
        self.cursor.advance();
        Ok(Expr::new(kind, start))
    }

    fn parse_group(&mut self) -> Result<Expr, ParseError> {
        let open = self.cursor.expect(&TokenKind::LParen)?;
        let mut inner = self.parse_expr()?;
        let close = self.expect_closing(&TokenKind::RParen, open)?;
        inner.span = open.merge(close);
        Ok(inner)
    }

    fn parse_list(&mut self) -> Result<Expr, ParseError> {
        let open = self.cursor.expect(&TokenKind::LBracket)?;
        let mut items = Vec::new();
        while !self.cursor.check(&TokenKind::RBracket) {
            items.push(self.parse_expr()?);
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        let close = self.expect_closing(&TokenKind::RBracket, open)?;
        Ok(Expr::new(ExprKind::List(items), open.merge(close)))
    }

    fn parse_dict(&mut self) -> Result<Expr, ParseError> {
        let open = self.cursor.expect(&TokenKind::LBrace)?;
        let mut entries = Vec::new();
        while !self.cursor.check(&TokenKind::RBrace) {
            let key = self.parse_expr()?;
            self.cursor.expect(&TokenKind::Colon)?;
            let value = self.parse_expr()?;
            entries.push((key, value));
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        let close = self.expect_closing(&TokenKind::RBrace, open)?;
        Ok(Expr::new(ExprKind::Dict(entries), open.merge(close)))
    }

    /// `func(params) { body }`
    fn parse_lambda(&mut self) -> Result<Expr, ParseError> {
        let start = self.cursor.expect(&TokenKind::Func)?;
        let params = self.parse_params()?;
        let body = self.parse_block()?;
        Ok(Expr::new(ExprKind::Lambda { params, body }, self.span_from(start)))
    }

    fn expect_closing(&mut self, close: &TokenKind, open: Span) -> Result<Span, ParseError> {
        if self.cursor.is_at_end() {
            return Err(ParseError::new(
                ErrorCode::E1003,
                open,
                format!("unclosed delimiter; expected {close}"),
            ));
        }
        self.cursor.expect(close)
    }
}
