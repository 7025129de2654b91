//! `event a -> b { }` and `parallel { }` become watches.
//!
//! An event fires its body once when `a == b` first holds. A parallel block
//! is a watch whose condition is always true, so it runs at the first poll.

use ry_ir::{BinaryOp, ExprKind, PassId, Stmt, StmtKind, Tree};
use smallvec::smallvec;

use crate::build::Synth;
use crate::rewrite::{keep, rewrite_stmts};
use crate::{LoweringError, Pass, PassContext};

/// Poll interval for lowered watches.
pub const WATCH_INTERVAL_MS: u64 = 50;

pub struct Events;

impl Pass for Events {
    fn id(&self) -> PassId {
        PassId::Events
    }

    fn run(&self, mut tree: Tree, _cx: &mut PassContext) -> Result<Tree, LoweringError> {
        rewrite_stmts(&mut tree.body, |stmt| {
            let s = Synth::new(PassId::Events, stmt.span);
            let (cond, body) = match stmt.kind {
                StmtKind::Event { left, right, body } => {
                    (s.binary(BinaryOp::Eq, left, right), body)
                }
                StmtKind::Parallel(body) => (s.expr(ExprKind::Bool(true)), body),
                kind => return keep(Stmt { kind, ..stmt }),
            };
            Ok(smallvec![s.stmt(StmtKind::Watch {
                cond,
                body,
                interval_ms: WATCH_INTERVAL_MS,
            })])
        })?;
        Ok(tree)
    }
}
