//! `guard cond { body }` runs `body` and leaves the enclosing function when
//! `cond` does not hold.

use ry_ir::{Block, PassId, Stmt, StmtKind, Tree};
use smallvec::smallvec;

use crate::build::Synth;
use crate::rewrite::{keep, rewrite_stmts};
use crate::{LoweringError, Pass, PassContext};

pub struct Guards;

impl Pass for Guards {
    fn id(&self) -> PassId {
        PassId::Guards
    }

    fn run(&self, mut tree: Tree, _cx: &mut PassContext) -> Result<Tree, LoweringError> {
        rewrite_stmts(&mut tree.body, |stmt| match stmt.kind {
            StmtKind::Guard { cond, mut body } => {
                let s = Synth::new(PassId::Guards, stmt.span);
                if !exits(&body) {
                    body.stmts.push(s.ret(None));
                }
                Ok(smallvec![s.stmt(StmtKind::If {
                    branches: vec![ry_ir::IfBranch {
                        cond: s.not(cond),
                        body,
                    }],
                    else_block: None,
                })])
            }
            kind => keep(Stmt { kind, ..stmt }),
        })?;
        Ok(tree)
    }
}

fn exits(body: &Block) -> bool {
    matches!(
        body.stmts.last().map(|s| &s.kind),
        Some(StmtKind::Return(_) | StmtKind::Raise(_) | StmtKind::Break | StmtKind::Continue)
    )
}
