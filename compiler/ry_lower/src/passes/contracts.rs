//! `func f(..) require C ensure E body { }`
//!
//! Becomes a plain function that checks `C`, runs the original body as an
//! inner closure, binds its value to `result`, checks `E` and returns
//! `result`. A failed check raises `ContractError`.

use ry_ir::{PassId, StmtKind, Tree};

use crate::build::Synth;
use crate::rewrite::{keep, rewrite_stmts};
use crate::{LoweringError, Pass, PassContext};

pub struct Contracts;

impl Pass for Contracts {
    fn id(&self) -> PassId {
        PassId::Contracts
    }

    fn run(&self, mut tree: Tree, cx: &mut PassContext) -> Result<Tree, LoweringError> {
        rewrite_stmts(&mut tree.body, |mut stmt| {
            let s = Synth::new(PassId::Contracts, stmt.span);
            let StmtKind::Func(func) = &mut stmt.kind else {
                return keep(stmt);
            };
            let Some(contract) = func.contract.take() else {
                return keep(stmt);
            };
            let inner = cx.fresh_name("body");
            let mut inner_func = s.func(&inner, Vec::new(), Vec::new());
            if let StmtKind::Func(decl) = &mut inner_func.kind {
                decl.body = std::mem::replace(&mut func.body, s.block(Vec::new()));
            }
            func.body.stmts = vec![
                s.if_then(
                    s.not(contract.require),
                    vec![s.raise(
                        "ContractError",
                        s.str(format!("Precondition failed for `{}`", func.name)),
                    )],
                ),
                inner_func,
                s.assign_name("result", s.call_name(&inner, Vec::new())),
                s.if_then(
                    s.not(contract.ensure),
                    vec![s.raise(
                        "ContractError",
                        s.str(format!("Postcondition failed for `{}`", func.name)),
                    )],
                ),
                s.ret(Some(s.name("result"))),
            ];
            keep(stmt)
        })?;
        Ok(tree)
    }
}
