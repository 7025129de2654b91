//! Runtime checks for annotated parameters under `strict_typing = true`.

use ry_ir::{PassId, StmtKind, Tree};

use crate::build::Synth;
use crate::rewrite::{keep, rewrite_stmts};
use crate::{LoweringError, Pass, PassContext};

pub struct StrictTyping;

impl Pass for StrictTyping {
    fn id(&self) -> PassId {
        PassId::StrictTyping
    }

    fn run(&self, mut tree: Tree, cx: &mut PassContext) -> Result<Tree, LoweringError> {
        if !cx.directives().strict_typing {
            return Ok(tree);
        }
        rewrite_stmts(&mut tree.body, |mut stmt| {
            if let StmtKind::Func(func) = &mut stmt.kind {
                let mut checks = Vec::new();
                for param in &func.params {
                    let Some(ty) = &param.ty else { continue };
                    let s = Synth::new(PassId::StrictTyping, param.span);
                    let check = s.call_name("isinstance", vec![s.name(&param.name), s.name(ty)]);
                    let message = format!(
                        "Argument `{}` of `{}` must be of type {ty}",
                        param.name, func.name
                    );
                    checks.push(s.if_then(s.not(check), vec![s.raise("TypeError", s.str(message))]));
                }
                if !checks.is_empty() {
                    checks.append(&mut func.body.stmts);
                    func.body.stmts = checks;
                }
            }
            keep(stmt)
        })?;
        Ok(tree)
    }
}
