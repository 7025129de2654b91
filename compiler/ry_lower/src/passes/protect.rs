//! Hide foreign-language code and literal aggregates from every later pass.

use std::convert::Infallible;
use std::mem;

use ry_ir::visit::{walk_expr_mut, walk_stmt_mut, VisitMut};
use ry_ir::{Expr, ExprKind, PassId, Protected, Stmt, StmtKind, Tree};

use crate::{LoweringError, Pass, PassContext, ProtectTable};

pub struct Protect;

impl Pass for Protect {
    fn id(&self) -> PassId {
        PassId::Protect
    }

    fn run(&self, mut tree: Tree, cx: &mut PassContext) -> Result<Tree, LoweringError> {
        let mut protector = Protector {
            table: cx.protected_mut(),
        };
        if let Err(never) = protector.visit_block(&mut tree.body) {
            match never {}
        }
        Ok(tree)
    }
}

struct Protector<'a> {
    table: &'a mut ProtectTable,
}

impl Protector<'_> {
    fn protect(&mut self, slot: &mut Protected) {
        if let Protected::Raw(text) = slot {
            let token = self.table.protect(mem::take(text));
            *slot = Protected::Placeholder(token);
        }
    }
}

impl VisitMut for Protector<'_> {
    type Error = Infallible;

    fn visit_stmt(&mut self, stmt: &mut Stmt) -> Result<(), Infallible> {
        if let StmtKind::Foreign(block) = &mut stmt.kind {
            self.protect(&mut block.code);
        }
        walk_stmt_mut(self, stmt)
    }

    fn visit_expr(&mut self, expr: &mut Expr) -> Result<(), Infallible> {
        if let ExprKind::Aggregate(slot) | ExprKind::ForeignCall { code: slot, .. } = &mut expr.kind
        {
            self.protect(slot);
        }
        walk_expr_mut(self, expr)
    }
}
