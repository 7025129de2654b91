//! `pack` types become host classes.
//!
//! Every function declared directly in a pack becomes a method taking
//! `self` first, `init` becomes the constructor `__init__`, and `this`
//! anywhere inside the pack refers to `self`. A `this` outside any pack has
//! nothing to refer to and is rejected.

use ry_diagnostic::ErrorCode;
use ry_ir::visit::{walk_expr, Visit};
use ry_ir::{ClassDecl, Expr, ExprKind, PassId, Span, Stmt, StmtKind, Tree};
use smallvec::smallvec;

use crate::build::Synth;
use crate::rewrite::{keep, rewrite_exprs, rewrite_stmts};
use crate::{LoweringError, Pass, PassContext};

pub struct Oop;

impl Pass for Oop {
    fn id(&self) -> PassId {
        PassId::Oop
    }

    fn run(&self, mut tree: Tree, _cx: &mut PassContext) -> Result<Tree, LoweringError> {
        rewrite_stmts(&mut tree.body, |stmt| match stmt.kind {
            StmtKind::Pack(pack) => {
                let s = Synth::new(PassId::Oop, stmt.span);
                let mut body = pack.body;
                for member in &mut body.stmts {
                    if let StmtKind::Func(func) = &mut member.kind {
                        if func.name == "init" {
                            func.name = "__init__".to_string();
                        }
                        if !func.params.first().is_some_and(|p| p.name == "self") {
                            func.params.insert(0, s.param("self"));
                        }
                    }
                }
                rewrite_exprs(&mut body, |expr| match expr.kind {
                    ExprKind::This => Ok(Synth::new(PassId::Oop, expr.span).name("self")),
                    kind => Ok(Expr { kind, ..expr }),
                })?;
                Ok(smallvec![s.stmt(StmtKind::Class(ClassDecl {
                    name: pack.name,
                    base: pack.base,
                    body,
                    private: pack.private,
                }))])
            }
            kind => keep(Stmt { kind, ..stmt }),
        })?;

        StrayThis.visit_block(&tree.body)?;
        Ok(tree)
    }
}

struct StrayThis;

impl Visit for StrayThis {
    type Error = LoweringError;

    fn visit_expr(&mut self, expr: &Expr) -> Result<(), LoweringError> {
        if matches!(expr.kind, ExprKind::This) {
            return Err(stray(expr.span));
        }
        walk_expr(self, expr)
    }
}

#[cold]
fn stray(span: Span) -> LoweringError {
    LoweringError::new(
        PassId::Oop,
        ErrorCode::E2001,
        span,
        "`this` used outside of a pack",
    )
}
