//! Bottom-up rewriters shared by the passes.
//!
//! Both walk children before parents, so by the time a statement or
//! expression reaches the callback everything nested inside it has already
//! been rewritten. Replacement nodes are not visited again.

use std::mem;

use ry_ir::visit::{walk_block_mut, walk_expr_mut, VisitMut};
use ry_ir::{Block, Expr, ExprKind, Span, Stmt};
use ry_stack::ensure_sufficient_stack;
use smallvec::SmallVec;

use crate::LoweringError;

/// Statements replacing one statement.
pub(crate) type Stmts = SmallVec<[Stmt; 2]>;

pub(crate) fn keep(stmt: Stmt) -> Result<Stmts, LoweringError> {
    Ok(smallvec::smallvec![stmt])
}

/// Replace each statement in every block under `block` with the output of
/// `f`.
pub(crate) fn rewrite_stmts<F>(block: &mut Block, f: F) -> Result<(), LoweringError>
where
    F: FnMut(Stmt) -> Result<Stmts, LoweringError>,
{
    StmtRewriter { f }.visit_block(block)
}

/// Replace each expression under `block` with the output of `f`.
pub(crate) fn rewrite_exprs<F>(block: &mut Block, f: F) -> Result<(), LoweringError>
where
    F: FnMut(Expr) -> Result<Expr, LoweringError>,
{
    ExprRewriter { f }.visit_block(block)
}

struct StmtRewriter<F> {
    f: F,
}

impl<F> VisitMut for StmtRewriter<F>
where
    F: FnMut(Stmt) -> Result<Stmts, LoweringError>,
{
    type Error = LoweringError;

    fn visit_block(&mut self, block: &mut Block) -> Result<(), LoweringError> {
        ensure_sufficient_stack(|| {
            walk_block_mut(self, block)?;
            let old = mem::take(&mut block.stmts);
            let mut out = Vec::with_capacity(old.len());
            for stmt in old {
                out.extend((self.f)(stmt)?);
            }
            block.stmts = out;
            Ok(())
        })
    }
}

struct ExprRewriter<F> {
    f: F,
}

impl<F> VisitMut for ExprRewriter<F>
where
    F: FnMut(Expr) -> Result<Expr, LoweringError>,
{
    type Error = LoweringError;

    fn visit_expr(&mut self, expr: &mut Expr) -> Result<(), LoweringError> {
        ensure_sufficient_stack(|| {
            walk_expr_mut(self, expr)?;
            let old = mem::replace(expr, Expr::new(ExprKind::None, Span::DUMMY));
            *expr = (self.f)(old)?;
            Ok(())
        })
    }
}
