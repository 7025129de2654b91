//! Put protected text back, byte for byte.

use ry_diagnostic::ErrorCode;
use ry_ir::visit::{walk_expr_mut, walk_stmt_mut, VisitMut};
use ry_ir::{Expr, ExprKind, PassId, Protected, Span, Stmt, StmtKind, Tree};

use crate::{LoweringError, Pass, PassContext, ProtectTable};

pub struct Restore;

impl Pass for Restore {
    fn id(&self) -> PassId {
        PassId::Restore
    }

    fn run(&self, mut tree: Tree, cx: &mut PassContext) -> Result<Tree, LoweringError> {
        Restorer {
            table: cx.protected(),
        }
        .visit_block(&mut tree.body)?;
        Ok(tree)
    }
}

struct Restorer<'a> {
    table: &'a ProtectTable,
}

impl Restorer<'_> {
    fn restore(&self, slot: &mut Protected, span: Span) -> Result<(), LoweringError> {
        if let Protected::Placeholder(token) = *slot {
            let Some(text) = self.table.get(token) else {
                return Err(LoweringError::new(
                    PassId::Restore,
                    ErrorCode::E2001,
                    span,
                    format!("no protected text recorded for `{token}`"),
                ));
            };
            *slot = Protected::Raw(text.to_string());
        }
        Ok(())
    }
}

impl VisitMut for Restorer<'_> {
    type Error = LoweringError;

    fn visit_stmt(&mut self, stmt: &mut Stmt) -> Result<(), LoweringError> {
        if let StmtKind::Foreign(block) = &mut stmt.kind {
            self.restore(&mut block.code, stmt.span)?;
        }
        walk_stmt_mut(self, stmt)
    }

    fn visit_expr(&mut self, expr: &mut Expr) -> Result<(), LoweringError> {
        if let ExprKind::Aggregate(slot) | ExprKind::ForeignCall { code: slot, .. } = &mut expr.kind
        {
            self.restore(slot, expr.span)?;
        }
        walk_expr_mut(self, expr)
    }
}
