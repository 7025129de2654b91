//! `defer { cleanup }` runs `cleanup` when the enclosing block is left.
//!
//! The statements following a defer are wrapped in a try whose finally
//! clause is the deferred block. Later defers in the same block end up
//! nested inside earlier ones, so cleanups run last-registered first.

use std::mem;

use ry_ir::visit::{walk_block_mut, VisitMut};
use ry_ir::{Block, PassId, Stmt, StmtKind, Tree, TryStmt};
use ry_stack::ensure_sufficient_stack;

use crate::build::Synth;
use crate::{LoweringError, Pass, PassContext};

pub struct Defer;

impl Pass for Defer {
    fn id(&self) -> PassId {
        PassId::Defer
    }

    fn run(&self, mut tree: Tree, _cx: &mut PassContext) -> Result<Tree, LoweringError> {
        DeferLowering.visit_block(&mut tree.body)?;
        Ok(tree)
    }
}

struct DeferLowering;

impl VisitMut for DeferLowering {
    type Error = LoweringError;

    fn visit_block(&mut self, block: &mut Block) -> Result<(), LoweringError> {
        ensure_sufficient_stack(|| {
            walk_block_mut(self, block)?;
            if block.stmts.iter().any(|s| matches!(s.kind, StmtKind::Defer(_))) {
                block.stmts = wrap(mem::take(&mut block.stmts));
            }
            Ok(())
        })
    }
}

fn wrap(mut stmts: Vec<Stmt>) -> Vec<Stmt> {
    let Some(at) = stmts.iter().position(|s| matches!(s.kind, StmtKind::Defer(_))) else {
        return stmts;
    };
    let rest = stmts.split_off(at + 1);
    let Some(defer) = stmts.pop() else {
        return stmts;
    };
    let StmtKind::Defer(cleanup) = defer.kind else {
        stmts.push(defer);
        return stmts;
    };
    let s = Synth::new(PassId::Defer, defer.span);
    let body_span = match (rest.first(), rest.last()) {
        (Some(first), Some(last)) => first.span.merge(last.span),
        _ => defer.span,
    };
    let mut body = s.block(wrap(rest));
    body.span = body_span;
    stmts.push(s.stmt(StmtKind::Try(TryStmt {
        body,
        handlers: Vec::new(),
        finally: Some(cleanup),
    })));
    stmts
}
