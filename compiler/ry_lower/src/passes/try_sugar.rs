//! `try { } elerr Kind as e { } finally { }` becomes a host try statement.

use ry_ir::{PassId, Stmt, StmtKind, Tree};
use smallvec::smallvec;

use crate::build::Synth;
use crate::rewrite::{keep, rewrite_stmts};
use crate::{LoweringError, Pass, PassContext};

pub struct TrySugar;

impl Pass for TrySugar {
    fn id(&self) -> PassId {
        PassId::TrySugar
    }

    fn run(&self, mut tree: Tree, _cx: &mut PassContext) -> Result<Tree, LoweringError> {
        rewrite_stmts(&mut tree.body, |stmt| match stmt.kind {
            StmtKind::Elerr(t) => {
                let s = Synth::new(PassId::TrySugar, stmt.span);
                Ok(smallvec![s.stmt(StmtKind::Try(t))])
            }
            kind => keep(Stmt { kind, ..stmt }),
        })?;
        Ok(tree)
    }
}
