//! Constructors for synthesized nodes.
//!
//! Every node built through a [`Synth`] carries the span of the construct
//! it replaces and is tagged with the pass that made it.

use ry_ir::{
    BinaryOp, Block, BlockStyle, ClassDecl, Expr, ExprKind, FuncDecl, IfBranch, Param, PassId,
    Span, Stmt, StmtKind, UnaryOp,
};

#[derive(Copy, Clone, Debug)]
pub(crate) struct Synth {
    pub pass: PassId,
    pub span: Span,
}

impl Synth {
    pub fn new(pass: PassId, span: Span) -> Self {
        Synth { pass, span }
    }

    pub fn expr(self, kind: ExprKind) -> Expr {
        Expr::synth(kind, self.span, self.pass)
    }

    pub fn stmt(self, kind: StmtKind) -> Stmt {
        Stmt::synth(kind, self.span, self.pass)
    }

    pub fn name(self, name: &str) -> Expr {
        self.expr(ExprKind::Name(name.to_string()))
    }

    pub fn str(self, text: impl Into<String>) -> Expr {
        self.expr(ExprKind::Str(text.into()))
    }

    pub fn int(self, value: i64) -> Expr {
        self.expr(ExprKind::Int(value))
    }

    pub fn call(self, callee: Expr, args: Vec<Expr>) -> Expr {
        self.expr(ExprKind::Call {
            callee: Box::new(callee),
            args,
        })
    }

    pub fn call_name(self, name: &str, args: Vec<Expr>) -> Expr {
        self.call(self.name(name), args)
    }

    pub fn attr(self, object: Expr, name: &str) -> Expr {
        self.expr(ExprKind::Attr {
            object: Box::new(object),
            name: name.to_string(),
        })
    }

    pub fn index(self, object: Expr, index: Expr) -> Expr {
        self.expr(ExprKind::Index {
            object: Box::new(object),
            index: Box::new(index),
        })
    }

    pub fn binary(self, op: BinaryOp, left: Expr, right: Expr) -> Expr {
        self.expr(ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn not(self, operand: Expr) -> Expr {
        self.expr(ExprKind::Unary {
            op: UnaryOp::Not,
            operand: Box::new(operand),
        })
    }

    pub fn assign(self, target: Expr, value: Expr) -> Stmt {
        self.stmt(StmtKind::Assign {
            target,
            value,
            private: false,
        })
    }

    pub fn assign_name(self, name: &str, value: Expr) -> Stmt {
        self.assign(self.name(name), value)
    }

    pub fn ret(self, value: Option<Expr>) -> Stmt {
        self.stmt(StmtKind::Return(value))
    }

    /// `raise Kind(message)`
    pub fn raise(self, kind: &str, message: Expr) -> Stmt {
        self.stmt(StmtKind::Raise(self.call_name(kind, vec![message])))
    }

    pub fn block(self, stmts: Vec<Stmt>) -> Block {
        Block::new(stmts, BlockStyle::Brace, self.span)
    }

    pub fn if_then(self, cond: Expr, body: Vec<Stmt>) -> Stmt {
        self.stmt(StmtKind::If {
            branches: vec![IfBranch {
                cond,
                body: self.block(body),
            }],
            else_block: None,
        })
    }

    pub fn param(self, name: &str) -> Param {
        Param {
            name: name.to_string(),
            ty: None,
            default: None,
            span: self.span,
        }
    }

    pub fn func(self, name: &str, params: Vec<Param>, body: Vec<Stmt>) -> Stmt {
        self.stmt(StmtKind::Func(FuncDecl {
            name: name.to_string(),
            params,
            body: self.block(body),
            contract: None,
            private: false,
        }))
    }

    pub fn class(self, name: &str, body: Vec<Stmt>, private: bool) -> Stmt {
        self.stmt(StmtKind::Class(ClassDecl {
            name: name.to_string(),
            base: None,
            body: self.block(body),
            private,
        }))
    }
}
