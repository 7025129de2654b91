//! Foreign blocks become bridge calls, `clib: name` a native import.

use ry_ir::{ExprKind, HostBinding, HostImport, PassId, Stmt, StmtKind, Tree};
use smallvec::smallvec;

use crate::build::Synth;
use crate::rewrite::{keep, rewrite_stmts};
use crate::{LoweringError, Pass, PassContext};

pub struct Foreign;

impl Pass for Foreign {
    fn id(&self) -> PassId {
        PassId::Foreign
    }

    fn run(&self, mut tree: Tree, _cx: &mut PassContext) -> Result<Tree, LoweringError> {
        rewrite_stmts(&mut tree.body, |stmt| {
            let s = Synth::new(PassId::Foreign, stmt.span);
            match stmt.kind {
                StmtKind::Foreign(block) => {
                    let call = s.expr(ExprKind::ForeignCall {
                        lang: block.lang,
                        code: block.code,
                    });
                    Ok(smallvec![s.assign_name(&block.result, call)])
                }
                StmtKind::NativeLib { name } => {
                    Ok(smallvec![s.stmt(StmtKind::HostImport(HostImport {
                        bindings: vec![HostBinding::Native {
                            local: name.clone(),
                            library: name,
                        }],
                    }))])
                }
                kind => keep(Stmt { kind, ..stmt }),
            }
        })?;
        Ok(tree)
    }
}
