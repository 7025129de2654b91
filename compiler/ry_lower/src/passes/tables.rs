//! `table name <{ .. }>` binds `name` to a meta table built from the
//! protected aggregate.

use ry_ir::{PassId, Stmt, StmtKind, Tree};
use smallvec::smallvec;

use crate::build::Synth;
use crate::rewrite::{keep, rewrite_stmts};
use crate::{LoweringError, Pass, PassContext};

pub struct Tables;

impl Pass for Tables {
    fn id(&self) -> PassId {
        PassId::Tables
    }

    fn run(&self, mut tree: Tree, _cx: &mut PassContext) -> Result<Tree, LoweringError> {
        rewrite_stmts(&mut tree.body, |stmt| match stmt.kind {
            StmtKind::Table { name, value } => {
                let s = Synth::new(PassId::Tables, stmt.span);
                Ok(smallvec![s.assign_name(&name, s.call_name("MetaTable", vec![value]))])
            }
            kind => keep(Stmt { kind, ..stmt }),
        })?;
        Ok(tree)
    }
}
